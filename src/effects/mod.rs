//! Effects - draw-time decorators attached to a node
//!
//! Effects wrap the node's own drawing. Their hooks run in the order the
//! effects were added, interleaved with the widget hooks:
//! `pre_draw` before the widget, `pre_child_draw` before the children,
//! `post_child_draw` after them and `post_draw` last.

mod clip;
mod invert;
mod outline;
mod scissor;

pub use clip::ClipStack;
pub use invert::Invert;
pub use outline::Outline;
pub use scissor::Scissor;

use crate::layout::Rect;
use crate::render::RenderBackend;
use crate::tree::NodeId;
use anyhow::Result;
use std::any::Any;

/// Context handed to effect hooks
pub struct EffectCx<'a> {
    pub(crate) id: NodeId,
    pub(crate) bounds: Option<Rect>,
    pub(crate) backend: &'a mut dyn RenderBackend,
    pub(crate) clips: &'a mut ClipStack,
}

impl<'a> EffectCx<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node bounds in screen space (`None` before the first layout)
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }

    /// Restrict drawing to `rect` within the current clip
    pub fn push_clip(&mut self, rect: Rect) {
        let effective = self.clips.push(rect);
        self.backend.set_clip(Some(effective));
    }

    /// Restore the enclosing clip, or disable clipping at the outermost level
    pub fn pop_clip(&mut self) {
        let current = self.clips.pop();
        self.backend.set_clip(current);
    }
}

/// Draw-time decorator
pub trait Effect: Any {
    fn pre_draw(&mut self, _cx: &mut EffectCx<'_>) -> Result<()> {
        Ok(())
    }

    fn post_draw(&mut self, _cx: &mut EffectCx<'_>) -> Result<()> {
        Ok(())
    }

    fn pre_child_draw(&mut self, _cx: &mut EffectCx<'_>) -> Result<()> {
        Ok(())
    }

    fn post_child_draw(&mut self, _cx: &mut EffectCx<'_>) -> Result<()> {
        Ok(())
    }

    /// Whether this effect binds its own color, suppressing the node color
    fn forces_color(&self) -> bool {
        false
    }
}
