//! Event dispatch - root input synthesis and depth-first propagation
//!
//! The root is the only node that samples the input device. Each frame it
//! turns the sampled state into events and hands every event to
//! [`Tree::propagate`], which delivers it to a node and then to the
//! children that pass the kind's gate, depth-first in declaration order.

use super::{NodeId, NodeKind, Tree};
use crate::component::{route, EventCx};
use crate::error::Result;
use crate::event::{Event, EventKind, Key, Payload};
use crate::input::{Edge, InputSource};

impl Tree {
    /// Hit-test a point against a node
    ///
    /// Hidden nodes and nodes that were never laid out never match.
    pub fn in_bounds(&self, id: NodeId, x: f64, y: f64) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if node.hidden {
            return false;
        }
        let Some(bounds) = node.bounds else {
            return false;
        };
        match node.widget.as_deref() {
            Some(widget) => widget.hit_test(bounds, x, y),
            None => bounds.contains(x, y),
        }
    }

    /// First child of `id` containing the point
    pub fn component_at(&self, id: NodeId, x: f64, y: f64) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.in_bounds(*child, x, y))
    }

    pub fn has_focus(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.focused)
    }

    /// Whether the pointer was inside the node at the last input pass
    pub fn is_mouse_inside(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.mouse_inside)
    }

    /// Give keyboard focus to `id`
    ///
    /// Every unfocused node on the path from the root down to `id` receives
    /// a focus event, so typed keys can reach it.
    pub fn focus(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        let mut path = vec![id];
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            path.push(parent);
            cursor = self.parent(parent);
        }

        for node in path.into_iter().rev() {
            let mut event = Event::detached(EventKind::Focus, self.root, Payload::Focus(true));
            self.focus_node(node, &mut event);
        }
        Ok(())
    }

    /// Drop focus from `id` and every focused descendant
    pub fn unfocus(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        let mut event = Event::detached(EventKind::Unfocus, self.root, Payload::Focus(false));
        self.propagate(id, &mut event);
        Ok(())
    }

    /// Type a key into the focused chain
    ///
    /// Ignored unless the root holds focus; only focused children receive
    /// it, regardless of the pointer.
    pub fn handle_key(&mut self, key: Key) {
        let root = self.root;
        if !self.has_focus(root) {
            return;
        }
        let mut event = Event::detached(EventKind::KeyType, root, Payload::Key(key));
        self.propagate(root, &mut event);
    }

    /// Deliver `event` to `id` and, unless stopped, to its gated children
    pub fn propagate(&mut self, id: NodeId, event: &mut Event) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let kind = event.kind();

        match kind {
            EventKind::Enter => {
                if !node.mouse_inside {
                    node.mouse_inside = true;
                    self.deliver(id, event);
                }
            }
            EventKind::Leave => {
                if node.mouse_inside && !self.in_bounds(id, event.x, event.y) {
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.mouse_inside = false;
                    }
                    self.deliver(id, event);
                }
            }
            EventKind::Focus => self.focus_node(id, event),
            EventKind::Unfocus => {
                node.focused = false;
                self.deliver(id, event);
                let mut lost = event.relabel(EventKind::LostFocus);
                self.deliver(id, &mut lost);
                if !lost.propagates() {
                    event.stop_propagation();
                }
            }
            EventKind::Resize => {
                node.dirty = true;
                self.deliver(id, event);
            }
            EventKind::Scroll => {
                if matches!(node.kind, NodeKind::Scrollable(_)) {
                    let delta = event.scroll_delta().unwrap_or_default();
                    let _ = self.scroll_by(id, delta);
                }
                self.deliver(id, event);
            }
            _ => self.deliver(id, event),
        }

        if !event.propagates() && !kind.is_broadcast() {
            return;
        }

        // Crossing into a scrolled viewport shifts the pointer into content
        // space; the shifted copy stops independently of the original
        let offset = self.scroll_offset(id);
        let mut remapped;
        let target: &mut Event = match offset {
            Some(offset) => {
                remapped = event.remapped(offset);
                &mut remapped
            }
            None => event,
        };

        for child in self.candidates(id, kind) {
            if kind == EventKind::Drag {
                let mut out = target.relabel(EventKind::DragOut);
                self.deliver(child, &mut out);
            }
            if !self.gate(child, target) {
                continue;
            }

            self.propagate(child, target);
            if !target.propagates() && !kind.is_broadcast() {
                break;
            }
        }
    }

    /// Children offered an event of `kind`
    fn candidates(&self, id: NodeId, kind: EventKind) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let pointer_gated = matches!(
            kind,
            EventKind::Click
                | EventKind::Release
                | EventKind::Drag
                | EventKind::Scroll
                | EventKind::Enter
                | EventKind::Hover
                | EventKind::Focus
        );

        match &node.kind {
            NodeKind::Scrollable(state) if pointer_gated => state.visible.clone(),
            _ if kind.is_broadcast() => node.children.clone(),
            _ => node
                .children
                .iter()
                .copied()
                .filter(|c| !self.is_hidden(*c))
                .collect(),
        }
    }

    /// Whether `child` receives the event its parent forwards
    fn gate(&self, child: NodeId, event: &Event) -> bool {
        let Some(node) = self.nodes.get(child) else {
            return false;
        };
        match event.kind() {
            EventKind::Click
            | EventKind::Release
            | EventKind::Hover
            | EventKind::Scroll
            | EventKind::Drag
            | EventKind::Enter => self.in_bounds(child, event.x, event.y),
            EventKind::Leave => node.mouse_inside,
            // Focused containers still pass focus on to the child under the pointer
            EventKind::Focus => self.in_bounds(child, event.x, event.y),
            EventKind::Unfocus | EventKind::KeyType => node.focused,
            EventKind::Resize | EventKind::Error => true,
            EventKind::DragOut | EventKind::LostFocus | EventKind::Update => false,
        }
    }

    /// Focus one node if it accepts focus and does not hold it yet
    fn focus_node(&mut self, id: NodeId, event: &mut Event) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let focusable = node.widget.as_deref().is_none_or(|w| w.focusable());
        if node.focused || !focusable {
            return;
        }

        self.deliver(id, event);
        if let Some(node) = self.nodes.get_mut(id) {
            node.focused = true;
        }
    }

    /// Unfocus every focused descendant of `id` that does not contain the
    /// pointer, descending through the focused ones that do
    fn unfocus_outside(&mut self, id: NodeId, x: f64, y: f64) {
        let y = y + self.scroll_offset(id).unwrap_or_default();
        for child in self.children(id).to_vec() {
            if !self.has_focus(child) {
                continue;
            }
            if self.in_bounds(child, x, y) {
                self.unfocus_outside(child, x, y);
            } else {
                let mut event =
                    Event::new(EventKind::Unfocus, self.root, x, y, Payload::Focus(false));
                self.propagate(child, &mut event);
            }
        }
    }

    /// Run the node's widget handler, then its hooks
    pub(crate) fn deliver(&mut self, id: NodeId, event: &mut Event) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let mut widget = node.widget.take();
        let bounds = node.bounds;
        let focused = node.focused;

        let mut relayout = false;
        if let Some(widget) = widget.as_deref_mut() {
            let mut cx = EventCx {
                id,
                bounds,
                focused,
                relayout: false,
                clipboard: &mut *self.clipboard,
            };
            route(widget, &mut cx, event);
            relayout = cx.relayout;
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = widget;
            node.hooks.emit(event);
        }
        if relayout {
            self.set_dirty_recursive(id, true);
        }
    }

    /// Sample the input device and dispatch this frame's pointer events
    pub(crate) fn handle_input(&mut self, input: &mut dyn InputSource) {
        if self.viewport.is_none() {
            return;
        }

        let root = self.root;
        let (mx, my) = input.cursor();
        let inside = self.in_bounds(root, mx, my);
        let pointer = |kind: EventKind, payload: Payload| Event::new(kind, root, mx, my, payload);

        let wheel = input.take_wheel();
        if wheel != 0 && inside {
            self.propagate(root, &mut pointer(EventKind::Scroll, Payload::Scroll(wheel.signum())));
        }

        if inside {
            self.propagate(root, &mut pointer(EventKind::Enter, Payload::Pointer));
            self.propagate(root, &mut pointer(EventKind::Hover, Payload::Pointer));
        }
        self.propagate(root, &mut pointer(EventKind::Leave, Payload::Pointer));
        if let Some(node) = self.nodes.get_mut(root) {
            node.mouse_inside = inside;
        }

        for button in 0..self.config.mouse_buttons {
            let down = input.button_down(button);
            if let Some(edge) = self.buttons.edge(button, down) {
                if inside {
                    match edge {
                        Edge::Release => {
                            self.propagate(root, &mut pointer(EventKind::Release, Payload::Button(button)));
                        }
                        Edge::Press => {
                            self.propagate(root, &mut pointer(EventKind::Click, Payload::Button(button)));
                            self.propagate(root, &mut pointer(EventKind::Focus, Payload::Focus(true)));
                        }
                    }
                }

                if self.has_focus(root) && !inside {
                    self.propagate(root, &mut pointer(EventKind::Unfocus, Payload::Focus(false)));
                } else {
                    self.unfocus_outside(root, mx, my);
                }

                self.buttons.track(button, edge, (mx, my));
            }

            if let Some((dx, dy)) = self.buttons.drag(button, (mx, my)) {
                if inside {
                    self.propagate(root, &mut pointer(EventKind::Drag, Payload::Drag { dx, dy, button }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Drawable, DrawCx, FocusTarget, HitTestable, KeyInputTarget, Widget};
    use crate::input::InputState;
    use crate::layout::{PercentRect, Viewport};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(NodeId, EventKind)>>>;

    fn tree_100x100() -> Tree {
        let mut tree = Tree::new();
        tree.viewport = Some(Viewport::new(100.0, 100.0));
        tree
    }

    fn record(tree: &mut Tree, id: NodeId, log: &Log, kinds: &[EventKind]) {
        for kind in kinds {
            let log = log.clone();
            tree.on(id, *kind, move |event| log.borrow_mut().push((id, event.kind())))
                .unwrap();
        }
    }

    fn frame(tree: &mut Tree, input: &mut InputState) {
        tree.layout();
        tree.handle_input(input);
    }

    #[test]
    fn test_click_then_focus_in_child() {
        let mut tree = tree_100x100();
        let child = tree.add(tree.root(), PercentRect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        let log: Log = Rc::default();
        record(&mut tree, child, &log, &[EventKind::Click, EventKind::Focus, EventKind::Release]);

        let mut input = InputState::new();
        input.move_to(10.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);

        assert_eq!(
            *log.borrow(),
            vec![(child, EventKind::Click), (child, EventKind::Focus)]
        );
        assert!(tree.has_focus(child));
        assert!(tree.has_focus(tree.root()));
    }

    #[test]
    fn test_held_button_clicks_once() {
        let mut tree = tree_100x100();
        let child = tree.add(tree.root(), PercentRect::full()).unwrap();
        let log: Log = Rc::default();
        record(&mut tree, child, &log, &[EventKind::Click, EventKind::Release]);

        let mut input = InputState::new();
        input.move_to(10.0, 10.0);
        input.press(0);
        for _ in 0..3 {
            frame(&mut tree, &mut input);
        }
        input.release(0);
        frame(&mut tree, &mut input);

        assert_eq!(
            *log.borrow(),
            vec![(child, EventKind::Click), (child, EventKind::Release)]
        );
    }

    #[test]
    fn test_enter_and_leave_once_per_span() {
        let mut tree = tree_100x100();
        let child = tree.add(tree.root(), PercentRect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        let grandchild = tree.add(child, PercentRect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        let log: Log = Rc::default();
        let kinds = [EventKind::Enter, EventKind::Leave];
        record(&mut tree, child, &log, &kinds);
        record(&mut tree, grandchild, &log, &kinds);

        let mut input = InputState::new();
        input.move_to(40.0, 40.0);
        frame(&mut tree, &mut input);
        frame(&mut tree, &mut input);
        // into the grandchild while staying in the child
        input.move_to(10.0, 10.0);
        frame(&mut tree, &mut input);
        frame(&mut tree, &mut input);
        input.move_to(90.0, 90.0);
        frame(&mut tree, &mut input);
        frame(&mut tree, &mut input);

        assert_eq!(
            *log.borrow(),
            vec![
                (child, EventKind::Enter),
                (grandchild, EventKind::Enter),
                (child, EventKind::Leave),
                (grandchild, EventKind::Leave),
            ]
        );
    }

    #[test]
    fn test_stop_propagation_blocks_descendants() {
        let mut tree = tree_100x100();
        let child = tree.add(tree.root(), PercentRect::full()).unwrap();
        let grandchild = tree.add(child, PercentRect::full()).unwrap();
        let sibling = tree.add(tree.root(), PercentRect::full()).unwrap();
        tree.on(child, EventKind::Click, |event| event.stop_propagation())
            .unwrap();
        let log: Log = Rc::default();
        record(&mut tree, grandchild, &log, &[EventKind::Click]);
        record(&mut tree, sibling, &log, &[EventKind::Click]);

        let mut input = InputState::new();
        input.move_to(10.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_unset_bounds_never_hit() {
        let mut tree = tree_100x100();
        let child = tree.add(tree.root(), PercentRect::full()).unwrap();
        assert!(!tree.in_bounds(child, 10.0, 10.0));
        assert_eq!(tree.component_at(tree.root(), 10.0, 10.0), None);

        tree.layout();
        assert!(tree.in_bounds(child, 10.0, 10.0));
        assert_eq!(tree.component_at(tree.root(), 10.0, 10.0), Some(child));

        tree.hide(child).unwrap();
        assert!(!tree.in_bounds(child, 10.0, 10.0));
    }

    #[test]
    fn test_clicking_elsewhere_unfocuses_child() {
        let mut tree = tree_100x100();
        let left = tree.add(tree.root(), PercentRect::new(0.0, 0.0, 50.0, 100.0)).unwrap();
        let right = tree.add(tree.root(), PercentRect::new(60.0, 0.0, 40.0, 100.0)).unwrap();
        let log: Log = Rc::default();
        let kinds = [EventKind::Unfocus, EventKind::LostFocus];
        record(&mut tree, left, &log, &kinds);

        let mut input = InputState::new();
        input.move_to(10.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);
        input.release(0);
        frame(&mut tree, &mut input);
        assert!(tree.has_focus(left));

        input.move_to(80.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);

        assert!(!tree.has_focus(left));
        assert!(tree.has_focus(right));
        assert_eq!(
            *log.borrow(),
            vec![(left, EventKind::Unfocus), (left, EventKind::LostFocus)]
        );
    }

    #[test]
    fn test_focus_moves_between_nested_children() {
        let mut tree = tree_100x100();
        let panel = tree.add(tree.root(), PercentRect::full()).unwrap();
        let left = tree.add(panel, PercentRect::new(0.0, 0.0, 50.0, 100.0)).unwrap();
        let right = tree.add(panel, PercentRect::new(50.0, 0.0, 50.0, 100.0)).unwrap();
        let log: Log = Rc::default();
        let kinds = [EventKind::Focus, EventKind::Unfocus];
        record(&mut tree, left, &log, &kinds);
        record(&mut tree, right, &log, &kinds);
        record(&mut tree, panel, &log, &kinds);

        let mut input = InputState::new();
        input.move_to(10.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);
        input.release(0);
        frame(&mut tree, &mut input);
        assert!(tree.has_focus(panel) && tree.has_focus(left));

        input.move_to(80.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);

        assert!(tree.has_focus(panel));
        assert!(tree.has_focus(right));
        assert!(!tree.has_focus(left));
        // the container keeps focus throughout
        assert_eq!(
            *log.borrow(),
            vec![
                (panel, EventKind::Focus),
                (left, EventKind::Focus),
                (right, EventKind::Focus),
                (left, EventKind::Unfocus),
            ]
        );

        let keys: Log = Rc::default();
        record(&mut tree, left, &keys, &[EventKind::KeyType]);
        record(&mut tree, right, &keys, &[EventKind::KeyType]);
        tree.handle_key(Key::Char('k'));
        assert_eq!(*keys.borrow(), vec![(right, EventKind::KeyType)]);
    }

    #[test]
    fn test_focus_sweep_uses_scrolled_coordinates() {
        let mut tree = tree_100x100();
        let view = tree.add_scrollable(tree.root(), PercentRect::full()).unwrap();
        let rows: Vec<NodeId> = (0..5)
            .map(|i| tree.add(view, PercentRect::new(0.0, i as f64 * 50.0, 100.0, 50.0)).unwrap())
            .collect();
        tree.layout();
        tree.scroll_by(view, -5).unwrap();

        // screen y 45 is content y 105: the third row
        let mut input = InputState::new();
        input.move_to(10.0, 45.0);
        input.press(0);
        frame(&mut tree, &mut input);
        input.release(0);
        frame(&mut tree, &mut input);
        assert!(tree.has_focus(rows[2]));

        // a second click inside the same row keeps it focused
        input.move_to(20.0, 50.0);
        input.press(0);
        frame(&mut tree, &mut input);
        assert!(tree.has_focus(rows[2]));
        assert!(!tree.has_focus(rows[1]));
    }

    #[test]
    fn test_drag_reports_movement_and_drag_out() {
        let mut tree = tree_100x100();
        let child = tree.add(tree.root(), PercentRect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        let drags = Rc::new(RefCell::new(Vec::new()));
        let outs = Rc::new(RefCell::new(0));
        {
            let drags = drags.clone();
            tree.on(child, EventKind::Drag, move |e| drags.borrow_mut().push(e.drag_delta()))
                .unwrap();
            let outs = outs.clone();
            tree.on(child, EventKind::DragOut, move |_| *outs.borrow_mut() += 1)
                .unwrap();
        }

        let mut input = InputState::new();
        input.move_to(10.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);
        input.move_to(15.0, 12.0);
        frame(&mut tree, &mut input);
        // outside the child, still inside the root
        input.move_to(80.0, 80.0);
        frame(&mut tree, &mut input);

        assert_eq!(*drags.borrow(), vec![Some((5.0, 2.0))]);
        assert_eq!(*outs.borrow(), 2);
    }

    #[test]
    fn test_keys_reach_only_focused_nodes() {
        let mut tree = tree_100x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        let b = tree.add(tree.root(), PercentRect::full()).unwrap();
        let log: Log = Rc::default();
        record(&mut tree, a, &log, &[EventKind::KeyType]);
        record(&mut tree, b, &log, &[EventKind::KeyType]);

        tree.handle_key(Key::Char('x'));
        assert!(log.borrow().is_empty());

        tree.focus(b).unwrap();
        tree.handle_key(Key::Char('x'));
        assert_eq!(*log.borrow(), vec![(b, EventKind::KeyType)]);

        tree.unfocus(tree.root()).unwrap();
        assert!(!tree.has_focus(b));
        tree.handle_key(Key::Char('y'));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_scrollable_remaps_pointer() {
        let mut tree = tree_100x100();
        let view = tree.add_scrollable(tree.root(), PercentRect::full()).unwrap();
        let rows: Vec<NodeId> = (0..5)
            .map(|i| tree.add(view, PercentRect::new(0.0, i as f64 * 50.0, 100.0, 50.0)).unwrap())
            .collect();
        let log: Log = Rc::default();
        for row in &rows {
            record(&mut tree, *row, &log, &[EventKind::Click]);
        }
        tree.layout();
        tree.scroll_by(view, -5).unwrap();
        assert_eq!(tree.scroll_offset(view), Some(60.0));

        let mut input = InputState::new();
        input.move_to(10.0, 45.0);
        input.press(0);
        frame(&mut tree, &mut input);

        // screen y 45 is content y 105, inside the third row
        assert_eq!(*log.borrow(), vec![(rows[2], EventKind::Click)]);
    }

    #[test]
    fn test_wheel_scrolls_viewport() {
        let mut tree = tree_100x100();
        let view = tree.add_scrollable(tree.root(), PercentRect::full()).unwrap();
        for i in 0..5 {
            tree.add(view, PercentRect::new(0.0, i as f64 * 50.0, 100.0, 50.0)).unwrap();
        }

        let mut input = InputState::new();
        input.move_to(50.0, 50.0);
        input.scroll(-240);
        frame(&mut tree, &mut input);

        // one notch per frame, whatever the raw magnitude
        assert_eq!(tree.scroll_offset(view), Some(12.0));
    }

    struct Unfocusable;

    impl Drawable for Unfocusable {
        fn render(&mut self, _cx: &mut DrawCx<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }
    impl HitTestable for Unfocusable {}
    impl FocusTarget for Unfocusable {
        fn focusable(&self) -> bool {
            false
        }
    }
    impl KeyInputTarget for Unfocusable {}
    impl Widget for Unfocusable {}

    #[test]
    fn test_unfocusable_widget_never_focuses() {
        let mut tree = tree_100x100();
        let label = tree.add_widget(tree.root(), PercentRect::full(), Unfocusable).unwrap();

        let mut input = InputState::new();
        input.move_to(10.0, 10.0);
        input.press(0);
        frame(&mut tree, &mut input);

        assert!(tree.has_focus(tree.root()));
        assert!(!tree.has_focus(label));
    }
}
