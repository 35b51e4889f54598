//! Boundary to the rasterizer.
//!
//! The scene graph never touches pixels. It talks to a [`Canvas`], the small
//! set of immediate-mode primitives a 2D drawing surface offers. The crate
//! ships [`PaintContext`], a `Canvas` that records a flat display list of
//! [`DrawCommand`]s which a host rasterizer (or a test) can consume.

pub mod chrome;
pub mod commands;

pub use chrome::paint_chrome;
pub use commands::DrawCommand;

use crate::transform::Transform;
use crate::widgets::font::{DEFAULT_FONT_SIZE, TextAlign, TextBaseline, TextStyle};
use crate::widgets::{Color, Rect};

/// Immediate-mode drawing surface.
///
/// Mirrors the state machine of a typical 2D canvas: fill color, font and
/// text alignment are sticky until changed, and `save`/`restore` bracket a
/// nested transform and style scope.
pub trait Canvas {
    /// Push transform and style state.
    fn save(&mut self);
    /// Pop back to the last `save`. Unbalanced calls are ignored.
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);
    fn set_fill(&mut self, color: Color);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn set_font(&mut self, style: TextStyle, size: f32);
    fn set_text_align(&mut self, align: TextAlign, baseline: TextBaseline);
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CanvasState {
    transform: Transform,
    fill: Color,
    style: TextStyle,
    size: f32,
    align: TextAlign,
    baseline: TextBaseline,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            fill: Color::WHITE,
            style: TextStyle::Normal,
            size: DEFAULT_FONT_SIZE,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

/// A [`Canvas`] that records every primitive into a display list.
pub struct PaintContext {
    commands: Vec<DrawCommand>,
    state: CanvasState,
    /// Saved states, innermost last
    stack: Vec<CanvasState>,
}

impl PaintContext {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a new PaintContext with pre-allocated capacity to avoid per-frame allocations
    pub fn with_capacity(commands: usize) -> Self {
        Self {
            commands: Vec::with_capacity(commands),
            state: CanvasState::default(),
            stack: Vec::with_capacity(8),
        }
    }

    /// Clear the display list and reset state, preserving allocated capacity
    pub fn clear(&mut self) {
        self.commands.clear();
        self.stack.clear();
        self.state = CanvasState::default();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Current composed transform
    pub fn current_transform(&self) -> Transform {
        self.state.transform
    }

    /// Depth of the save stack; zero once every `save` has been restored.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Texts recorded so far, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Rect { .. } => None,
        })
    }
}

impl Default for PaintContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for PaintContext {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        } else {
            log::warn!("PaintContext::restore without matching save");
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.then(&Transform::translate(dx, dy));
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform.then(&Transform::rotate(radians));
    }

    fn set_fill(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::Rect {
            rect: Rect::new(x, y, width, height),
            color: self.state.fill,
            transform: self.state.transform,
        });
    }

    fn set_font(&mut self, style: TextStyle, size: f32) {
        self.state.style = style;
        self.state.size = size;
    }

    fn set_text_align(&mut self, align: TextAlign, baseline: TextBaseline) {
        self.state.align = align;
        self.state.baseline = baseline;
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color: self.state.fill,
            style: self.state.style,
            size: self.state.size,
            align: self.state.align,
            baseline: self.state.baseline,
            transform: self.state.transform,
        });
    }
}
