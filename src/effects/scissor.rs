use super::{Effect, EffectCx};
use anyhow::Result;

/// Clips the node and its subtree to the node bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct Scissor {
    pushed: bool,
}

impl Scissor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for Scissor {
    fn pre_draw(&mut self, cx: &mut EffectCx<'_>) -> Result<()> {
        self.pushed = false;
        if let Some(bounds) = cx.bounds() {
            cx.push_clip(bounds);
            self.pushed = true;
        }
        Ok(())
    }

    fn post_draw(&mut self, cx: &mut EffectCx<'_>) -> Result<()> {
        if std::mem::take(&mut self.pushed) {
            cx.pop_clip();
        }
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

    #[test]
    fn test_scissor_pushes_and_pops() {
        let mut backend = Headless::new(100.0, 100.0);
        let mut clips = ClipStack::new();
        let bounds = Rect::new(0.0, 0.0, 40.0, 40.0);
        let mut scissor = Scissor::new();

        {
            let mut cx = EffectCx {
                id: NodeId::default(),
                bounds: Some(bounds),
                backend: &mut backend,
                clips: &mut clips,
            };
            scissor.pre_draw(&mut cx).unwrap();
            scissor.post_draw(&mut cx).unwrap();
        }

        assert!(clips.is_empty());
        assert_eq!(
            backend.commands(),
            &[DrawCommand::Clip(Some(bounds)), DrawCommand::Clip(None)]
        );
    }

    #[test]
    fn test_scissor_without_bounds_does_nothing() {
        let mut backend = Headless::new(100.0, 100.0);
        let mut clips = ClipStack::new();
        clips.push(Rect::new(0.0, 0.0, 5.0, 5.0));
        let mut scissor = Scissor::new();

        let mut cx = EffectCx {
            id: NodeId::default(),
            bounds: None,
            backend: &mut backend,
            clips: &mut clips,
        };
        scissor.pre_draw(&mut cx).unwrap();
        scissor.post_draw(&mut cx).unwrap();

        assert_eq!(clips.depth(), 1);
        assert!(backend.commands().is_empty());
    }
}
