//! Draw command definitions for the display list.

use crate::transform::Transform;
use crate::widgets::font::{TextAlign, TextBaseline, TextStyle};
use crate::widgets::{Color, Rect};

/// A single recorded draw operation.
///
/// Geometry is kept in the coordinate frame that was current when the
/// command was issued; `transform` maps it to canvas space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled axis-aligned rectangle (in local coordinates).
    Rect {
        rect: Rect,
        color: Color,
        transform: Transform,
    },

    /// A run of text anchored at `(x, y)`.
    Text {
        text: String,
        x: f32,
        y: f32,
        color: Color,
        style: TextStyle,
        size: f32,
        align: TextAlign,
        baseline: TextBaseline,
        transform: Transform,
    },
}

impl DrawCommand {
    pub fn transform(&self) -> Transform {
        match self {
            DrawCommand::Rect { transform, .. } | DrawCommand::Text { transform, .. } => *transform,
        }
    }

    /// Rectangle in canvas space, if this is a rectangle under a
    /// translation-only transform.
    pub fn world_rect(&self) -> Option<Rect> {
        match self {
            DrawCommand::Rect {
                rect, transform, ..
            } if transform.is_translation_only() => {
                Some(rect.offset(transform.tx(), transform.ty()))
            }
            _ => None,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            DrawCommand::Rect { color, .. } | DrawCommand::Text { color, .. } => *color,
        }
    }
}
