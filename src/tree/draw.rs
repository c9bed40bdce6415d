//! Per-frame draw pipeline
//!
//! The root runs the viewport check, the layout pass and input handling,
//! then every visible node walks the same sequence: effects and widget
//! pre-draw, render, pre-child hooks, lazy relayout, children, post-child
//! hooks and post-draw. A failure anywhere in that sequence is contained at
//! the node that raised it.

use super::{NodeId, NodeKind, Tree};
use crate::animation::Axis;
use crate::component::DrawCx;
use crate::effects::{ClipStack, EffectCx};
use crate::event::{Event, EventKind, Payload};
use crate::input::InputSource;
use crate::layout::{Rect, Viewport};
use crate::render::{BlendMode, RenderBackend};
use std::time::Instant;

/// A node that failed while drawing
#[derive(Debug, Clone, PartialEq)]
pub struct NodeError {
    pub node: NodeId,
    /// Name of the node's widget (`"node"` for plain nodes)
    pub widget: String,
    pub message: String,
}

/// Outcome of one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Failures caught this frame, in draw order
    pub errors: Vec<NodeError>,
    /// Whether the viewport changed since the previous frame
    pub resized: bool,
}

impl FrameReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Hook point in the draw sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    PreDraw,
    Render,
    PreChildDraw,
    PostChildDraw,
    PostDraw,
}

/// State threaded through one traversal
struct Frame<'a> {
    backend: &'a mut dyn RenderBackend,
    clips: ClipStack,
    now: Instant,
    report: FrameReport,
}

impl Tree {
    /// Draw one frame, sampling `input` for this frame's events
    pub fn draw(
        &mut self,
        backend: &mut dyn RenderBackend,
        input: &mut dyn InputSource,
    ) -> FrameReport {
        self.draw_at(backend, input, Instant::now())
    }

    /// Draw one frame with an explicit clock, for animations
    pub fn draw_at(
        &mut self,
        backend: &mut dyn RenderBackend,
        input: &mut dyn InputSource,
        now: Instant,
    ) -> FrameReport {
        backend.begin_frame();
        let mut frame = Frame {
            backend,
            clips: ClipStack::new(),
            now,
            report: FrameReport::default(),
        };

        let viewport = frame.backend.viewport();
        frame.report.resized = self.check_viewport(viewport);
        self.layout();

        let root = self.root;
        if !self.is_hidden(root) {
            self.handle_input(input);
            for key in input.take_keys() {
                self.handle_key(key);
            }
            // Handlers may have dirtied nodes; settle them before drawing
            self.layout();
            self.draw_node(root, &mut frame, (0.0, 0.0));
        }

        let Frame {
            backend,
            mut clips,
            report,
            ..
        } = frame;
        if !clips.is_empty() {
            clips.clear();
            backend.set_clip(None);
        }
        backend.set_blend(BlendMode::Alpha);
        backend.end_frame();
        report
    }

    /// Cache the viewport; broadcast a resize when it changed after the
    /// first frame
    fn check_viewport(&mut self, viewport: Viewport) -> bool {
        match self.viewport {
            None => {
                self.viewport = Some(viewport);
                false
            }
            Some(previous) if previous != viewport => {
                log::debug!(
                    "viewport changed {}x{} -> {}x{}",
                    previous.width,
                    previous.height,
                    viewport.width,
                    viewport.height
                );
                self.viewport = Some(viewport);
                let root = self.root;
                let mut event = Event::detached(EventKind::Resize, root, Payload::Resize(viewport));
                self.propagate(root, &mut event);
                true
            }
            Some(_) => false,
        }
    }

    fn draw_node(&mut self, id: NodeId, frame: &mut Frame<'_>, offset: (f64, f64)) {
        if self.nodes.get(id).is_none_or(|node| node.hidden) {
            return;
        }

        let depth = frame.clips.depth();
        if let Err(err) = self.draw_steps(id, frame, offset) {
            let restored = frame.clips.truncate(depth);
            frame.backend.set_clip(restored);
            frame.backend.set_blend(BlendMode::Alpha);

            let widget = self
                .nodes
                .get(id)
                .map_or("node", |node| node.widget_name())
                .to_string();
            let message = format!("{err:#}");
            log::warn!("{} {:?} failed to draw: {}", widget, id, message);

            frame.report.errors.push(NodeError {
                node: id,
                widget,
                message: message.clone(),
            });
            let mut event = Event::detached(EventKind::Error, id, Payload::Error(message));
            self.propagate(id, &mut event);
        }
    }

    fn draw_steps(
        &mut self,
        id: NodeId,
        frame: &mut Frame<'_>,
        offset: (f64, f64),
    ) -> anyhow::Result<()> {
        let Some(node) = self.nodes.get(id) else {
            return Ok(());
        };
        let color = node.color;
        let screen = node.bounds.map(|b| b.translate(offset.0, offset.1));

        self.run_effects(id, frame, screen, Stage::PreDraw)?;
        let forced = self
            .nodes
            .get(id)
            .is_some_and(|node| node.effects.iter().any(|e| e.forces_color()));
        if !forced {
            frame.backend.set_color(color);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.animations.tick(frame.now);
        }
        self.run_widget(id, frame, offset, Stage::PreDraw)?;
        self.run_widget(id, frame, offset, Stage::Render)?;

        self.run_effects(id, frame, screen, Stage::PreChildDraw)?;
        self.run_widget(id, frame, offset, Stage::PreChildDraw)?;

        if self.is_dirty(id) {
            self.relayout(id)?;
        }

        let (children, child_offset) = match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Scrollable(state)) => {
                (state.visible.clone(), (offset.0, offset.1 - state.offset))
            }
            _ => (self.visible_children(id), offset),
        };
        for child in children {
            self.draw_node(child, frame, child_offset);
        }

        self.run_widget(id, frame, offset, Stage::PostChildDraw)?;
        self.run_effects(id, frame, screen, Stage::PostChildDraw)?;

        self.run_widget(id, frame, offset, Stage::PostDraw)?;
        self.run_effects(id, frame, screen, Stage::PostDraw)?;
        Ok(())
    }

    fn run_effects(
        &mut self,
        id: NodeId,
        frame: &mut Frame<'_>,
        bounds: Option<Rect>,
        stage: Stage,
    ) -> anyhow::Result<()> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(());
        };
        if node.effects.is_empty() {
            return Ok(());
        }
        let mut effects = std::mem::take(&mut node.effects);

        let mut cx = EffectCx {
            id,
            bounds,
            backend: &mut *frame.backend,
            clips: &mut frame.clips,
        };
        let result = effects.iter_mut().try_for_each(|effect| match stage {
            Stage::PreDraw => effect.pre_draw(&mut cx),
            Stage::PreChildDraw => effect.pre_child_draw(&mut cx),
            Stage::PostChildDraw => effect.post_child_draw(&mut cx),
            Stage::PostDraw => effect.post_draw(&mut cx),
            Stage::Render => Ok(()),
        });

        if let Some(node) = self.nodes.get_mut(id) {
            node.effects = effects;
        }
        result
    }

    fn run_widget(
        &mut self,
        id: NodeId,
        frame: &mut Frame<'_>,
        offset: (f64, f64),
        stage: Stage,
    ) -> anyhow::Result<()> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(());
        };
        let Some(mut widget) = node.widget.take() else {
            return Ok(());
        };
        let eases = Axis::ALL.map(|axis| node.animations.get(axis).map(|a| a.ease(frame.now)));

        let mut cx = DrawCx {
            id,
            bounds: node.bounds,
            color: node.color,
            eases,
            offset,
            backend: &mut *frame.backend,
        };
        let result = match stage {
            Stage::PreDraw => widget.pre_draw(&mut cx),
            Stage::Render => widget.render(&mut cx),
            Stage::PreChildDraw => widget.pre_child_draw(&mut cx),
            Stage::PostChildDraw => widget.post_child_draw(&mut cx),
            Stage::PostDraw => widget.post_draw(&mut cx),
        };

        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }
        result
    }
}
