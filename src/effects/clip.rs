//! Clip stack - nested scissor regions for one frame

use crate::layout::Rect;

/// Stack of active clip rectangles
///
/// Each entry is the effective region: the pushed rectangle intersected
/// with the one below it. Owned by the frame being drawn, so no clip state
/// outlives a frame.
#[derive(Debug, Clone, Default)]
pub struct ClipStack {
    regions: Vec<Rect>,
}

impl ClipStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a region, returning the effective clip
    pub fn push(&mut self, rect: Rect) -> Rect {
        let effective = match self.regions.last() {
            Some(outer) => outer.intersect(&rect),
            None => rect,
        };
        self.regions.push(effective);
        effective
    }

    /// Pop the innermost region, returning the clip now in force
    pub fn pop(&mut self) -> Option<Rect> {
        self.regions.pop();
        self.current()
    }

    /// Clip now in force (`None` when clipping is disabled)
    pub fn current(&self) -> Option<Rect> {
        self.regions.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.regions.len()
    }

    /// Drop every region above `depth`, returning the clip now in force
    pub fn truncate(&mut self, depth: usize) -> Option<Rect> {
        self.regions.truncate(depth);
        self.current()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
