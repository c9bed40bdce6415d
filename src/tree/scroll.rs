//! Scrollable viewports - offset clamping and visibility culling

use super::{NodeId, NodeKind, Tree};
use crate::error::Result;

/// Scroll position and culled child set of a scrollable node
///
/// The offset is relative to the node's top edge, so the absolute scroll
/// position is `top + offset` and the offset itself never goes negative.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScrollState {
    pub(crate) offset: f64,
    pub(crate) visible: Vec<NodeId>,
}

impl ScrollState {
    pub(crate) fn reset(&mut self) {
        self.offset = 0.0;
        self.visible.clear();
    }

    pub(crate) fn forget(&mut self, id: NodeId) {
        self.visible.retain(|v| *v != id);
    }
}

impl Tree {
    /// Clamp the offset of a scrollable node and recompute which children
    /// lie fully inside its window. No-op for plain nodes.
    pub(crate) fn refresh_scroll(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let NodeKind::Scrollable(state) = &node.kind else {
            return;
        };
        let Some(bounds) = node.bounds else {
            return;
        };

        let max_offset = node
            .children
            .last()
            .and_then(|last| self.nodes.get(*last)?.bounds)
            .map_or(0.0, |last| {
                (last.y2() - bounds.height + self.config.scroll_slack - bounds.y).max(0.0)
            });
        let offset = state.offset.clamp(0.0, max_offset);

        let top = bounds.y + offset;
        let bottom = top + bounds.height;
        let visible: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|child| {
                self.nodes.get(*child).is_some_and(|n| {
                    !n.hidden && n.bounds.is_some_and(|b| b.y >= top && b.y2() <= bottom)
                })
            })
            .collect();

        if let NodeKind::Scrollable(state) = &mut self.nodes[id].kind {
            state.offset = offset;
            state.visible = visible;
        }
    }

    /// Move a scrollable node by `delta` wheel notches (positive scrolls
    /// towards the top), returning the clamped offset
    ///
    /// Has no effect on plain nodes or on viewports without children.
    pub fn scroll_by(&mut self, id: NodeId, delta: i32) -> Result<f64> {
        let step = self.config.scroll_step;
        let node = self.node_mut(id)?;
        if node.children.is_empty() {
            return Ok(0.0);
        }
        let NodeKind::Scrollable(state) = &mut node.kind else {
            return Ok(0.0);
        };

        state.offset -= f64::from(delta) * step;
        self.refresh_scroll(id);
        Ok(self.scroll_offset(id).unwrap_or_default())
    }

    /// Current offset below the top edge (`None` for plain nodes)
    pub fn scroll_offset(&self, id: NodeId) -> Option<f64> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Scrollable(state) => Some(state.offset),
            NodeKind::Plain => None,
        }
    }

    /// Children that are drawn and offered pointer events
    ///
    /// For a scrollable node this is the culled set inside its window; for
    /// a plain node, every child that is not hidden.
    pub fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        match &node.kind {
            NodeKind::Scrollable(state) => state.visible.clone(),
            NodeKind::Plain => node
                .children
                .iter()
                .copied()
                .filter(|c| !self.is_hidden(*c))
                .collect(),
        }
    }
}
