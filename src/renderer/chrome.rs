//! Border chrome painted behind a container's children.
//!
//! All three treatments draw in the container's own frame, starting at the
//! origin, with nested filled rectangles only.

use super::Canvas;
use crate::widgets::{BorderStyle, Color};

/// Semi-transparent black used for the shaded edges.
const SHADE: Color = Color::BLACK.with_alpha(0x7F);

/// Paint the chrome for `style` over a `width` x `height` area.
pub fn paint_chrome(
    canvas: &mut dyn Canvas,
    style: BorderStyle,
    background: Color,
    width: f32,
    height: f32,
) {
    match style {
        BorderStyle::None => paint_flat(canvas, background, width, height),
        BorderStyle::Bevel => paint_bevel(canvas, background, width, height),
        BorderStyle::Inset => paint_inset(canvas, background, width, height),
    }
}

pub fn paint_flat(canvas: &mut dyn Canvas, background: Color, w: f32, h: f32) {
    canvas.set_fill(background);
    canvas.fill_rect(0.0, 0.0, w, h);
}

/// Raised frame: black shadow outline, base fill, white highlight on the
/// top-left, shaded bottom-right, then the flat interior.
pub fn paint_bevel(canvas: &mut dyn Canvas, background: Color, w: f32, h: f32) {
    canvas.set_fill(Color::BLACK);
    canvas.fill_rect(0.0, 0.0, w, h);

    canvas.set_fill(background);
    canvas.fill_rect(0.0, 0.0, w - 1.0, h - 1.0);

    canvas.set_fill(Color::WHITE);
    canvas.fill_rect(1.0, 1.0, w - 2.0, h - 2.0);

    canvas.set_fill(SHADE);
    canvas.fill_rect(2.0, 2.0, w - 3.0, h - 3.0);

    canvas.set_fill(background);
    canvas.fill_rect(2.0, 2.0, w - 4.0, h - 4.0);
}

/// Recessed frame: shaded outline, white highlight, flat interior.
pub fn paint_inset(canvas: &mut dyn Canvas, background: Color, w: f32, h: f32) {
    canvas.set_fill(SHADE);
    canvas.fill_rect(0.0, 0.0, w - 1.0, h - 1.0);

    canvas.set_fill(Color::WHITE);
    canvas.fill_rect(1.0, 1.0, w - 1.0, h - 1.0);

    canvas.set_fill(background);
    canvas.fill_rect(1.0, 1.0, w - 2.0, h - 2.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, PaintContext};
    use crate::widgets::Rect;

    fn rects(ctx: &PaintContext) -> Vec<(Rect, Color)> {
        ctx.commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Rect { rect, color, .. } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_flat_is_a_single_fill() {
        let mut ctx = PaintContext::new();
        paint_chrome(&mut ctx, BorderStyle::None, Color::WHITE, 10.0, 20.0);
        assert_eq!(rects(&ctx), vec![(Rect::new(0.0, 0.0, 10.0, 20.0), Color::WHITE)]);
    }

    #[test]
    fn test_bevel_layers() {
        let bg = Color::from_hex(0xc3c3c3);
        let mut ctx = PaintContext::new();
        paint_chrome(&mut ctx, BorderStyle::Bevel, bg, 100.0, 50.0);

        let layers = rects(&ctx);
        assert_eq!(layers.len(), 5);
        assert_eq!(layers[0], (Rect::new(0.0, 0.0, 100.0, 50.0), Color::BLACK));
        assert_eq!(layers[1], (Rect::new(0.0, 0.0, 99.0, 49.0), bg));
        assert_eq!(layers[2], (Rect::new(1.0, 1.0, 98.0, 48.0), Color::WHITE));
        assert_eq!(layers[3], (Rect::new(2.0, 2.0, 97.0, 47.0), SHADE));
        assert_eq!(layers[4], (Rect::new(2.0, 2.0, 96.0, 46.0), bg));
    }

    #[test]
    fn test_inset_layers() {
        let bg = Color::from_hex(0xc3c3c3);
        let mut ctx = PaintContext::new();
        paint_chrome(&mut ctx, BorderStyle::Inset, bg, 64.0, 23.0);

        let layers = rects(&ctx);
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0], (Rect::new(0.0, 0.0, 63.0, 22.0), SHADE));
        assert_eq!(layers[1], (Rect::new(1.0, 1.0, 63.0, 22.0), Color::WHITE));
        assert_eq!(layers[2], (Rect::new(1.0, 1.0, 62.0, 21.0), bg));
    }
}
