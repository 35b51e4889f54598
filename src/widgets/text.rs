use crate::renderer::Canvas;

use super::font::{DEFAULT_FONT_SIZE, TextAlign, TextBaseline, TextStyle};
use super::{Color, Theme};

/// A line of text painted on top of a container, after its children.
///
/// Placement is relative to the container's own frame: the anchor is at
/// `margin_left`, the horizontal center, or `width - margin_right`
/// depending on alignment, and the baseline sits 2px above the bottom edge
/// shifted by `margin_top`.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Falls back to the theme's text color
    pub color: Option<Color>,
    pub align: TextAlign,
    pub style: TextStyle,
    pub size: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            align: TextAlign::Left,
            style: TextStyle::Normal,
            size: DEFAULT_FONT_SIZE,
            margin_left: 0.0,
            margin_right: 0.0,
            margin_top: 0.0,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn bold(mut self) -> Self {
        self.style = TextStyle::Bold;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn margin_left(mut self, v: f32) -> Self {
        self.margin_left = v;
        self
    }

    pub fn margin_right(mut self, v: f32) -> Self {
        self.margin_right = v;
        self
    }

    pub fn margin_top(mut self, v: f32) -> Self {
        self.margin_top = v;
        self
    }

    /// Anchor point for a container of the given size.
    pub fn anchor(&self, width: f32, height: f32) -> (f32, f32) {
        let x = match self.align {
            TextAlign::Left => self.margin_left,
            TextAlign::Center => width / 2.0,
            TextAlign::Right => width - self.margin_right,
        };
        (x, height - 2.0 + self.margin_top)
    }

    pub(crate) fn paint(&self, canvas: &mut dyn Canvas, theme: &Theme, width: f32, height: f32) {
        let (x, y) = self.anchor(width, height);
        canvas.set_font(self.style, self.size);
        canvas.set_text_align(self.align, TextBaseline::Alphabetic);
        canvas.set_fill(self.color.unwrap_or(theme.text));
        canvas.fill_text(&self.text, x, y);
    }
}
