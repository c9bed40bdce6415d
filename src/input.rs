//! Raw input polling - the host input service and per-button edge tracking

use crate::event::Key;
use std::collections::{HashMap, HashSet, VecDeque};

/// Raw input device the root samples once per frame
pub trait InputSource {
    /// Cursor position in scaled (layout) coordinates
    fn cursor(&self) -> (f64, f64);

    /// Whether the button at `index` is currently held
    fn button_down(&self, index: usize) -> bool;

    /// Accumulated wheel movement since the last call (positive = away from user)
    fn take_wheel(&mut self) -> i32;

    /// Keys typed since the last call
    fn take_keys(&mut self) -> Vec<Key> {
        Vec::new()
    }
}

/// Plain input state, filled by an adapter or a script
///
/// Backends fold their native events into this and hand it to
/// [`Tree::draw`](crate::Tree::draw). Tests drive it directly.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    cursor: (f64, f64),
    held: HashSet<usize>,
    wheel: i32,
    keys: VecDeque<Key>,
}

impl InputState {
    /// Create an empty input state with the cursor at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the cursor
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    /// Hold a button down
    pub fn press(&mut self, index: usize) {
        self.held.insert(index);
    }

    /// Let a button go
    pub fn release(&mut self, index: usize) {
        self.held.remove(&index);
    }

    /// Add wheel movement
    pub fn scroll(&mut self, delta: i32) {
        self.wheel = self.wheel.saturating_add(delta);
    }

    /// Queue a typed key
    pub fn type_key(&mut self, key: Key) {
        self.keys.push_back(key);
    }
}

impl InputSource for InputState {
    fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    fn button_down(&self, index: usize) -> bool {
        self.held.contains(&index)
    }

    fn take_wheel(&mut self) -> i32 {
        std::mem::take(&mut self.wheel)
    }

    fn take_keys(&mut self) -> Vec<Key> {
        self.keys.drain(..).collect()
    }
}

/// Transition of a button between two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    Press,
    Release,
}

/// Frame-to-frame button table plus the last position of each held button
#[derive(Debug, Default)]
pub(crate) struct ButtonTracker {
    down: HashMap<usize, bool>,
    dragged: HashMap<usize, (f64, f64)>,
}

impl ButtonTracker {
    /// Compare the sampled state with the previous frame's
    pub(crate) fn edge(&mut self, button: usize, is_down: bool) -> Option<Edge> {
        let was_down = self.down.get(&button).copied().unwrap_or(false);
        if was_down == is_down {
            return None;
        }

        self.down.insert(button, is_down);
        Some(if is_down { Edge::Press } else { Edge::Release })
    }

    /// Record (on press) or forget (on release) the drag origin
    pub(crate) fn track(&mut self, button: usize, edge: Edge, pos: (f64, f64)) {
        match edge {
            Edge::Press => {
                self.dragged.insert(button, pos);
            }
            Edge::Release => {
                self.dragged.remove(&button);
            }
        }
    }

    /// Movement since the recorded position of a held button; updates the
    /// recorded position when the cursor moved
    pub(crate) fn drag(&mut self, button: usize, pos: (f64, f64)) -> Option<(f64, f64)> {
        let last = self.dragged.get_mut(&button)?;
        if *last == pos {
            return None;
        }

        let delta = (pos.0 - last.0, pos.1 - last.1);
        *last = pos;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_state_drains() {
        let mut input = InputState::new();
        input.scroll(1);
        input.scroll(2);
        input.type_key(Key::Char('x'));

        assert_eq!(input.take_wheel(), 3);
        assert_eq!(input.take_wheel(), 0);
        assert_eq!(input.take_keys(), vec![Key::Char('x')]);
        assert!(input.take_keys().is_empty());
    }

    #[test]
    fn test_edges_fire_once() {
        let mut tracker = ButtonTracker::default();
        assert_eq!(tracker.edge(0, true), Some(Edge::Press));
        assert_eq!(tracker.edge(0, true), None);
        assert_eq!(tracker.edge(0, true), None);
        assert_eq!(tracker.edge(0, false), Some(Edge::Release));
        assert_eq!(tracker.edge(0, false), None);
    }

    #[test]
    fn test_drag_reports_delta_and_moves_origin() {
        let mut tracker = ButtonTracker::default();
        tracker.track(0, Edge::Press, (10.0, 10.0));

        assert_eq!(tracker.drag(0, (10.0, 10.0)), None);
        assert_eq!(tracker.drag(0, (15.0, 8.0)), Some((5.0, -2.0)));
        assert_eq!(tracker.drag(0, (16.0, 8.0)), Some((1.0, 0.0)));

        tracker.track(0, Edge::Release, (16.0, 8.0));
        assert_eq!(tracker.drag(0, (20.0, 20.0)), None);
    }
}
