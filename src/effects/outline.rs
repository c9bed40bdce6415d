use super::{Effect, EffectCx};
use crate::color::Color;
use anyhow::Result;

/// Border drawn just outside the node bounds, after everything else
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub width: f64,
    pub color: Color,
}

impl Outline {
    pub fn new(width: f64, color: Color) -> Self {
        Outline { width, color }
    }
}

impl Effect for Outline {
    fn post_draw(&mut self, cx: &mut EffectCx<'_>) -> Result<()> {
        if self.width <= 0.0 || self.color.is_transparent() {
            return Ok(());
        }
        let Some(bounds) = cx.bounds() else {
            return Ok(());
        };

        let backend = cx.backend();
        backend.set_color(self.color);
        backend.stroke_rect(bounds.outset(self.width), self.width);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ClipStack;
    use crate::layout::Rect;
    use crate::render::{DrawCommand, Headless};
    use crate::tree::NodeId;

    fn run(outline: &mut Outline, backend: &mut Headless) {
        let mut clips = ClipStack::new();
        let mut cx = EffectCx {
            id: NodeId::default(),
            bounds: Some(Rect::new(10.0, 10.0, 20.0, 20.0)),
            backend,
            clips: &mut clips,
        };
        outline.post_draw(&mut cx).unwrap();
    }

    #[test]
    fn test_outline_strokes_outside_bounds() {
        let mut backend = Headless::new(100.0, 100.0);
        run(&mut Outline::new(2.0, Color::WHITE), &mut backend);

        assert_eq!(
            backend.commands(),
            &[
                DrawCommand::Color(Color::WHITE),
                DrawCommand::Stroke {
                    rect: Rect::new(8.0, 8.0, 24.0, 24.0),
                    width: 2.0
                },
            ]
        );
    }

    #[test]
    fn test_outline_skips_invisible() {
        let mut backend = Headless::new(100.0, 100.0);
        run(&mut Outline::new(0.0, Color::WHITE), &mut backend);
        run(&mut Outline::new(3.0, Color::TRANSPARENT), &mut backend);
        assert!(backend.commands().is_empty());
    }
}
