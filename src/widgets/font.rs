//! Text style and alignment types.
//!
//! These mirror the knobs an immediate-mode canvas exposes for text: a style
//! (weight), a size, horizontal alignment and a vertical baseline.

/// Font style of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextStyle {
    #[default]
    Normal,
    Bold,
}

/// Horizontal anchor of the text relative to its `x` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of the text relative to its `y` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
    Bottom,
}

/// Default font size in logical pixels.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;
