use super::Color;

/// Palette shared by every container of a tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Fallback background of containers without one, and window chrome
    pub window: Color,
    pub titlebar: Color,
    pub titlebar_text: Color,
    /// Desktop (root) background
    pub desktop: Color,
    /// Default label color
    pub text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            window: Color::from_hex(0xc3c3c3),
            titlebar: Color::from_hex(0x000082),
            titlebar_text: Color::from_hex(0xffffff),
            desktop: Color::from_hex(0x008282),
            text: Color::BLACK,
        }
    }
}
