use super::{Effect, EffectCx};
use crate::color::Color;
use crate::render::BlendMode;
use anyhow::Result;

/// Draws the node with inverted framebuffer colors
#[derive(Debug, Clone, Copy, Default)]
pub struct Invert;

impl Effect for Invert {
    fn pre_draw(&mut self, cx: &mut EffectCx<'_>) -> Result<()> {
        let backend = cx.backend();
        backend.set_blend(BlendMode::Invert);
        backend.set_color(Color::WHITE);
        Ok(())
    }

    fn post_draw(&mut self, cx: &mut EffectCx<'_>) -> Result<()> {
        cx.backend().set_blend(BlendMode::Alpha);
        Ok(())
    }

    fn forces_color(&self) -> bool {
        true
    }
}
