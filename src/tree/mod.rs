//! Component tree - node arena, structure, geometry and the layout pass
//!
//! Every node lives in one [`SlotMap`] owned by the [`Tree`]. Parent and
//! child links are plain [`NodeId`]s and only change through `Tree`
//! methods, which keep both directions consistent. Removing a node frees
//! its whole subtree; ids of freed nodes are rejected afterwards.
//!
//! # Example
//! ```ignore
//! let mut tree = Tree::new();
//! let panel = tree.add_widget(tree.root(), PercentRect::new(10.0, 10.0, 50.0, 50.0), Panel)?;
//! tree.on(panel, EventKind::Click, |event| println!("clicked at {}, {}", event.x, event.y))?;
//!
//! let mut backend = Headless::new(200.0, 100.0);
//! let mut input = InputState::new();
//! let report = tree.draw(&mut backend, &mut input);
//! assert!(report.is_ok());
//! ```

mod dispatch;
mod draw;
mod scroll;

pub use draw::{FrameReport, NodeError};
pub(crate) use scroll::ScrollState;

use crate::animation::{Animation, Axis, AxisAnimations};
use crate::color::Color;
use crate::component::{Panel, Widget};
use crate::config::TreeConfig;
use crate::effects::{Effect, Scissor};
use crate::error::{Error, Result};
use crate::event::{Event, EventKind, Payload};
use crate::hooks::HookBus;
use crate::input::ButtonTracker;
use crate::layout::{LayoutStrategy, PercentRect, Rect, Viewport};
use crate::render::{Clipboard, MemoryClipboard};
use slotmap::SlotMap;
use std::any::Any;
use std::time::Duration;

slotmap::new_key_type! {
    /// Handle to a node of a [`Tree`]
    pub struct NodeId;
}

/// What a node does with its children beyond plain layout
#[derive(Debug, Default)]
pub(crate) enum NodeKind {
    #[default]
    Plain,
    /// Clipped viewport over a vertically scrolled child list
    Scrollable(ScrollState),
}

/// One arena entry
pub(crate) struct Node {
    pub(crate) percent: PercentRect,
    /// Pixel geometry; `None` until the first layout
    pub(crate) bounds: Option<Rect>,
    pub(crate) dirty: bool,
    pub(crate) hidden: bool,
    pub(crate) focused: bool,
    pub(crate) mouse_inside: bool,
    pub(crate) color: Color,
    pub(crate) animations: AxisAnimations,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) effects: Vec<Box<dyn Effect>>,
    pub(crate) hooks: HookBus,
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) layout: Option<Box<dyn LayoutStrategy>>,
    pub(crate) kind: NodeKind,
}

impl Node {
    fn new(percent: PercentRect) -> Self {
        Node {
            percent,
            bounds: None,
            dirty: true,
            hidden: false,
            focused: false,
            mouse_inside: false,
            color: Color::TRANSPARENT,
            animations: AxisAnimations::default(),
            parent: None,
            children: Vec::new(),
            effects: Vec::new(),
            hooks: HookBus::new(),
            widget: None,
            layout: None,
            kind: NodeKind::Plain,
        }
    }

    fn widget_name(&self) -> &str {
        self.widget.as_deref().map_or("node", |w| w.name())
    }
}

/// Retained scene graph of UI nodes
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    config: TreeConfig,
    /// Viewport seen by the last frame
    viewport: Option<Viewport>,
    buttons: ButtonTracker,
    clipboard: Box<dyn Clipboard>,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Tree {
    /// Create a tree holding only a full-screen root
    pub fn new() -> Self {
        Tree::with_config(TreeConfig::default())
    }

    /// Create a tree with custom tunables
    pub fn with_config(config: TreeConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(PercentRect::full()));
        Tree {
            nodes,
            root,
            config,
            viewport: None,
            buttons: ButtonTracker::default(),
            clipboard: Box::new(MemoryClipboard::default()),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Viewport observed by the most recent frame
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Replace the clipboard service handed to widgets
    pub fn set_clipboard(&mut self, clipboard: impl Clipboard + 'static) {
        self.clipboard = Box::new(clipboard);
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::UnknownNode)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::UnknownNode)
    }

    // ---- creation ----

    /// Create a detached node; it draws once attached under the root
    pub fn create(&mut self, percent: PercentRect) -> NodeId {
        self.nodes.insert(Node::new(percent))
    }

    /// Create a detached node carrying a widget
    pub fn create_widget(&mut self, percent: PercentRect, widget: impl Widget) -> NodeId {
        let id = self.create(percent);
        self.nodes[id].widget = Some(Box::new(widget));
        id
    }

    /// Create a plain node as the last child of `parent`
    pub fn add(&mut self, parent: NodeId, percent: PercentRect) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.create(percent);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Create a node with a widget as the last child of `parent`
    pub fn add_widget(
        &mut self,
        parent: NodeId,
        percent: PercentRect,
        widget: impl Widget,
    ) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.create_widget(percent, widget);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Create a scrollable viewport as the last child of `parent`
    ///
    /// The viewport fills its background with the node color and clips its
    /// children to its bounds.
    pub fn add_scrollable(&mut self, parent: NodeId, percent: PercentRect) -> Result<NodeId> {
        let id = self.add_widget(parent, percent, Panel)?;
        let node = &mut self.nodes[id];
        node.kind = NodeKind::Scrollable(ScrollState::default());
        node.effects.push(Box::new(Scissor::new()));
        Ok(id)
    }

    // ---- structure ----

    /// Append `child` to `parent`, moving it out of its previous parent
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.prepare_attach(parent, child)?;
        self.insert_at(parent, child, len);
        Ok(())
    }

    /// Insert `child` at `index` of `parent`'s child list
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let len = self.prepare_attach(parent, child)?;
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        self.insert_at(parent, child, index);
        Ok(())
    }

    /// Put `new` in place of `old` under `parent`
    ///
    /// `old` is detached, not destroyed. Returns `false` when `old` is not a
    /// child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<bool> {
        self.node(old)?;
        if !self.has_child(parent, old) {
            return Ok(false);
        }
        if old == new {
            return Ok(true);
        }

        self.prepare_attach(parent, new)?;
        self.detach_from_parent(new);
        let index = self.nodes[parent]
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or(Error::UnknownNode)?;
        self.nodes[parent].children[index] = new;
        self.nodes[new].parent = Some(parent);
        self.nodes[old].parent = None;

        log::debug!("replaced {:?} with {:?} under {:?}", old, new, parent);
        self.mark_dirty(parent)?;
        Ok(true)
    }

    /// Take `id` out of its parent without destroying it
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::RootRemoval);
        }
        self.node(id)?;
        if let Some(parent) = self.detach_from_parent(id) {
            self.mark_dirty(parent)?;
        }
        Ok(())
    }

    /// Destroy `id` and its whole subtree
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::RootRemoval);
        }
        self.node(id)?;

        if let Some(parent) = self.detach_from_parent(id) {
            self.mark_dirty(parent)?;
        }
        let freed = self.destroy(id);
        log::debug!("removed {:?} ({} nodes freed)", id, freed);
        Ok(())
    }

    /// Destroy every child subtree of `id`
    pub fn clear_children(&mut self, id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.destroy(child);
        }
        if let NodeKind::Scrollable(state) = &mut self.nodes[id].kind {
            state.reset();
        }
        self.mark_dirty(id)
    }

    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.nodes
            .get(parent)
            .is_some_and(|node| node.children.contains(&child))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| &node.children)
    }

    /// Validate an attach and return the parent's child count once `child`
    /// has left it
    fn prepare_attach(&self, parent: NodeId, child: NodeId) -> Result<usize> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        if child == self.root {
            return Err(Error::RootRemoval);
        }

        // Walk up from the new parent; meeting `child` means a cycle
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(Error::CycleDetected);
            }
            cursor = self.nodes.get(id).and_then(|node| node.parent);
        }

        let len = parent_node.children.len();
        Ok(if parent_node.children.contains(&child) {
            len - 1
        } else {
            len
        })
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self.detach_from_parent(child);
        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        log::debug!("attached {:?} to {:?} at {}", child, parent, index);

        self.set_dirty_recursive(child, true);
        self.nodes[parent].dirty = true;
    }

    /// Unlink `id` from its parent's child list, returning the old parent
    fn detach_from_parent(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get_mut(id)?.parent.take()?;
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != id);
            if let NodeKind::Scrollable(state) = &mut node.kind {
                state.forget(id);
            }
        }
        Some(parent)
    }

    /// Free a subtree, returning how many nodes were freed
    fn destroy(&mut self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                freed += 1;
            }
        }
        freed
    }

    // ---- geometry & flags ----

    /// Move the node, in percent of the parent
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        let node = self.node_mut(id)?;
        node.percent.x = x;
        node.percent.y = y;
        self.mark_dirty(id)
    }

    /// Resize the node, in percent of the parent
    pub fn set_size(&mut self, id: NodeId, width: f64, height: f64) -> Result<()> {
        let node = self.node_mut(id)?;
        node.percent.width = width;
        node.percent.height = height;
        self.mark_dirty(id)
    }

    pub fn percent(&self, id: NodeId) -> Option<PercentRect> {
        Some(self.nodes.get(id)?.percent)
    }

    /// Last computed pixel geometry (`None` before the first layout)
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(id)?.bounds
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) -> Result<()> {
        self.node_mut(id)?.color = color;
        Ok(())
    }

    pub fn color(&self, id: NodeId) -> Option<Color> {
        Some(self.nodes.get(id)?.color)
    }

    /// Stop drawing the node and its subtree and exclude it from hit tests
    pub fn hide(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.hidden = true;
        Ok(())
    }

    pub fn unhide(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.hidden = false;
        self.mark_dirty(id)
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.hidden)
    }

    /// Flag the node and all descendants for recomputation
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        self.set_dirty(id, true)
    }

    /// Set the dirty flag of the node and all descendants
    pub fn set_dirty(&mut self, id: NodeId, state: bool) -> Result<()> {
        self.node(id)?;
        self.set_dirty_recursive(id, state);
        Ok(())
    }

    fn set_dirty_recursive(&mut self, id: NodeId, state: bool) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next) {
                node.dirty = state;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.dirty)
    }

    // ---- layout ----

    /// Recompute one node's pixel geometry from its parent (or the viewport)
    ///
    /// Clears only this node's dirty flag, then notifies the widget and the
    /// `Update` hooks.
    pub fn update(&mut self, id: NodeId) -> Result<Rect> {
        let node = self.node(id)?;
        let frame = match node.parent.and_then(|p| self.nodes.get(p)) {
            Some(parent) => parent.bounds.unwrap_or_default(),
            None => self.viewport.unwrap_or_default().frame(),
        };

        let rect = node.percent.resolve(frame);
        log::trace!("update {:?} -> {:?}", id, rect);

        let node = &mut self.nodes[id];
        node.dirty = false;
        node.bounds = Some(rect);
        if let Some(widget) = node.widget.as_mut() {
            widget.on_update(rect);
        }
        let mut event = Event::detached(EventKind::Update, id, Payload::Update);
        node.hooks.emit(&mut event);

        self.refresh_scroll(id);
        Ok(rect)
    }

    /// Top-down layout pass over every dirty node
    ///
    /// A parent is always recomputed before its children, so no node reads
    /// stale parent geometry.
    pub fn layout(&mut self) {
        let root = self.root;
        let forced = self.nodes[root].dirty;
        if forced {
            let _ = self.update(root);
        }
        self.layout_children(root, forced);
    }

    /// Lay out the subtree below `id`; `forced` recomputes every child
    pub(crate) fn layout_children(&mut self, id: NodeId, forced: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let children: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|c| self.nodes.get(*c).is_some_and(|n| !n.hidden))
            .collect();
        let has_strategy = node.layout.is_some();

        let mut updated: Vec<bool> = children
            .iter()
            .map(|c| forced || self.nodes[*c].dirty)
            .collect();
        let any_updated = updated.contains(&true);

        // A strategy positions siblings relative to each other, so one moved
        // child means all of them are recomputed and re-arranged
        if any_updated && has_strategy {
            updated.iter_mut().for_each(|u| *u = true);
        }
        for (child, update) in children.iter().zip(&updated) {
            if *update {
                let _ = self.update(*child);
            }
        }
        if any_updated && has_strategy {
            self.arrange(id, &children);
        }

        for (child, update) in children.iter().zip(&updated) {
            self.layout_children(*child, *update);
        }

        if any_updated {
            self.refresh_scroll(id);
        }
    }

    /// Recompute a node dirtied mid-frame and its subtree
    ///
    /// When the parent arranges its children with a strategy, the whole
    /// sibling row is recomputed and re-arranged instead.
    pub(crate) fn relayout(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(parent) if self.nodes.get(parent).is_some_and(|p| p.layout.is_some()) => {
                self.layout_children(parent, true);
            }
            _ => {
                self.update(id)?;
                self.layout_children(id, true);
            }
        }
        Ok(())
    }

    /// Apply the node's layout strategy to freshly computed children
    fn arrange(&mut self, id: NodeId, children: &[NodeId]) {
        let Some(mut strategy) = self.nodes[id].layout.take() else {
            return;
        };
        let parent = self.nodes[id].bounds.unwrap_or_default();
        let rects: Vec<Rect> = children
            .iter()
            .map(|c| self.nodes[*c].bounds.unwrap_or_default())
            .collect();

        let offsets = strategy.arrange(parent, &rects);
        for (child, (dx, dy)) in children.iter().zip(offsets) {
            if let Some(bounds) = self.nodes[*child].bounds.as_mut() {
                *bounds = bounds.translate(dx, dy);
            }
        }

        self.nodes[id].layout = Some(strategy);
    }

    /// Install a strategy that repositions the node's children after layout
    pub fn set_layout(&mut self, id: NodeId, strategy: impl LayoutStrategy + 'static) -> Result<()> {
        self.node_mut(id)?.layout = Some(Box::new(strategy));
        self.mark_dirty(id)
    }

    /// Remove the node's layout strategy
    pub fn clear_layout(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.layout = None;
        self.mark_dirty(id)
    }

    // ---- effects ----

    pub fn add_effect(&mut self, id: NodeId, effect: impl Effect) -> Result<()> {
        self.node_mut(id)?.effects.push(Box::new(effect));
        Ok(())
    }

    /// Remove every effect of type `T`, returning whether any was removed
    pub fn remove_effects<T: Effect>(&mut self, id: NodeId) -> Result<bool> {
        let effects = &mut self.node_mut(id)?.effects;
        let before = effects.len();
        effects.retain(|effect| !(&**effect as &dyn Any).is::<T>());
        Ok(effects.len() != before)
    }

    /// First effect of type `T` on the node
    pub fn effect<T: Effect>(&self, id: NodeId) -> Option<&T> {
        self.nodes
            .get(id)?
            .effects
            .iter()
            .find_map(|effect| (&**effect as &dyn Any).downcast_ref::<T>())
    }

    pub fn effect_mut<T: Effect>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes
            .get_mut(id)?
            .effects
            .iter_mut()
            .find_map(|effect| (&mut **effect as &mut dyn Any).downcast_mut::<T>())
    }

    // ---- animations ----

    /// Give the node an animation on `axis`, looked up by curve name
    pub fn set_animation(
        &mut self,
        id: NodeId,
        axis: Axis,
        name: &str,
        duration: Duration,
    ) -> Result<()> {
        let animation = Animation::named(name, duration)?;
        self.node_mut(id)?.animations.set(axis, animation);
        Ok(())
    }

    /// Same as [`Tree::set_animation`] with the configured default duration
    pub fn set_animation_default(&mut self, id: NodeId, axis: Axis, name: &str) -> Result<()> {
        let duration = self.config.default_animation;
        self.set_animation(id, axis, name, duration)
    }

    pub fn animation(&self, id: NodeId, axis: Axis) -> Option<&Animation> {
        self.nodes.get(id)?.animations.get(axis)
    }

    pub fn animation_mut(&mut self, id: NodeId, axis: Axis) -> Option<&mut Animation> {
        self.nodes.get_mut(id)?.animations.get_mut(axis)
    }

    // ---- hooks ----

    /// Subscribe to events of `kind` reaching the node
    pub fn on<F>(&mut self, id: NodeId, kind: EventKind, hook: F) -> Result<()>
    where
        F: FnMut(&mut Event) + 'static,
    {
        self.node_mut(id)?.hooks.subscribe(kind, Box::new(hook));
        Ok(())
    }

    /// Drop the node's subscribers of `kind`, returning how many were removed
    pub fn clear_hooks(&mut self, id: NodeId, kind: EventKind) -> Result<usize> {
        Ok(self.node_mut(id)?.hooks.clear(kind))
    }

    // ---- widgets ----

    /// Install or replace the node's widget
    pub fn set_widget(&mut self, id: NodeId, widget: impl Widget) -> Result<()> {
        self.node_mut(id)?.widget = Some(Box::new(widget));
        Ok(())
    }

    /// Typed access to the node's widget
    pub fn widget<T: Widget>(&self, id: NodeId) -> Option<&T> {
        let widget = self.nodes.get(id)?.widget.as_deref()?;
        (widget as &dyn Any).downcast_ref::<T>()
    }

    pub fn widget_mut<T: Widget>(&mut self, id: NodeId) -> Option<&mut T> {
        let widget = self.nodes.get_mut(id)?.widget.as_deref_mut()?;
        (widget as &mut dyn Any).downcast_mut::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Invert, Outline};
    use crate::layout::GridLayout;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tree_200x100() -> Tree {
        let mut tree = Tree::new();
        tree.viewport = Some(Viewport::new(200.0, 100.0));
        tree
    }

    #[test]
    fn test_new_tree_has_dirty_root() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_dirty(tree.root()));
        assert_eq!(tree.bounds(tree.root()), None);
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_layout_resolves_percent_geometry() {
        let mut tree = tree_200x100();
        let child = tree
            .add(tree.root(), PercentRect::new(10.0, 10.0, 50.0, 50.0))
            .unwrap();
        let grandchild = tree
            .add(child, PercentRect::new(50.0, 0.0, 50.0, 100.0))
            .unwrap();

        tree.layout();

        assert_eq!(tree.bounds(tree.root()), Some(Rect::new(0.0, 0.0, 200.0, 100.0)));
        assert_eq!(tree.bounds(child), Some(Rect::new(20.0, 10.0, 100.0, 50.0)));
        assert_eq!(tree.bounds(grandchild), Some(Rect::new(70.0, 10.0, 50.0, 50.0)));
        assert!(!tree.is_dirty(child));
        assert!(!tree.is_dirty(grandchild));
    }

    #[test]
    fn test_mark_dirty_is_recursive_clear_is_not() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        let b = tree.add(a, PercentRect::full()).unwrap();
        let c = tree.add(b, PercentRect::full()).unwrap();
        tree.layout();

        tree.mark_dirty(a).unwrap();
        assert!(tree.is_dirty(a) && tree.is_dirty(b) && tree.is_dirty(c));
        assert!(!tree.is_dirty(tree.root()));

        tree.update(a).unwrap();
        assert!(!tree.is_dirty(a));
        assert!(tree.is_dirty(b));
        assert!(tree.is_dirty(c));
    }

    #[test]
    fn test_set_position_relayouts_subtree() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        let b = tree.add(a, PercentRect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        tree.layout();

        tree.set_position(a, 50.0, 50.0).unwrap();
        tree.layout();

        assert_eq!(tree.bounds(a), Some(Rect::new(100.0, 50.0, 100.0, 50.0)));
        assert_eq!(tree.bounds(b), Some(Rect::new(100.0, 50.0, 10.0, 5.0)));
    }

    #[test]
    fn test_update_fires_hooks() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        let seen = Rc::new(RefCell::new(0));
        let counter = seen.clone();
        tree.on(a, EventKind::Update, move |_| *counter.borrow_mut() += 1)
            .unwrap();

        tree.layout();
        tree.layout();
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_attach_rejects_cycles_and_root() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        let b = tree.add(a, PercentRect::full()).unwrap();

        assert_eq!(tree.attach(b, a), Err(Error::CycleDetected));
        assert_eq!(tree.attach(a, a), Err(Error::CycleDetected));
        assert_eq!(tree.attach(a, tree.root()), Err(Error::RootRemoval));
        assert_eq!(tree.parent(a), Some(tree.root()));
    }

    #[test]
    fn test_reparent_keeps_links_consistent() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        let b = tree.add(tree.root(), PercentRect::full()).unwrap();
        let c = tree.add(a, PercentRect::full()).unwrap();

        tree.attach(b, c).unwrap();

        assert!(!tree.has_child(a, c));
        assert!(tree.has_child(b, c));
        assert_eq!(tree.parent(c), Some(b));
    }

    #[test]
    fn test_insert_and_replace_child() {
        let mut tree = tree_200x100();
        let root = tree.root();
        let a = tree.add(root, PercentRect::full()).unwrap();
        let b = tree.add(root, PercentRect::full()).unwrap();
        let c = tree.create(PercentRect::full());

        assert_eq!(
            tree.insert_child(root, c, 5),
            Err(Error::IndexOutOfRange { index: 5, len: 2 })
        );
        tree.insert_child(root, c, 1).unwrap();
        assert_eq!(tree.children(root), &[a, c, b]);

        // moving within the same parent
        tree.insert_child(root, a, 2).unwrap();
        assert_eq!(tree.children(root), &[c, b, a]);

        let d = tree.create(PercentRect::full());
        assert!(tree.replace_child(root, b, d).unwrap());
        assert_eq!(tree.children(root), &[c, d, a]);
        assert_eq!(tree.parent(b), None);
        assert_eq!(tree.parent(d), Some(root));
        assert!(!tree.replace_child(root, b, d).unwrap());
    }

    #[test]
    fn test_remove_frees_subtree() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        let b = tree.add(a, PercentRect::full()).unwrap();
        tree.add(b, PercentRect::full()).unwrap();
        assert_eq!(tree.len(), 4);

        tree.remove(a).unwrap();

        assert_eq!(tree.len(), 1);
        assert!(tree.children(tree.root()).is_empty());
        assert!(!tree.contains(b));
        assert_eq!(tree.set_position(b, 1.0, 1.0), Err(Error::UnknownNode));
        assert_eq!(tree.remove(tree.root()), Err(Error::RootRemoval));
    }

    #[test]
    fn test_clear_children() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        tree.add(a, PercentRect::full()).unwrap();
        tree.add(a, PercentRect::full()).unwrap();

        tree.clear_children(a).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_grid_layout_repositions_children() {
        let mut tree = tree_200x100();
        let grid = tree.add(tree.root(), PercentRect::full()).unwrap();
        tree.set_layout(grid, GridLayout::new(2)).unwrap();
        let cells: Vec<NodeId> = (0..3)
            .map(|_| tree.add(grid, PercentRect::new(0.0, 0.0, 10.0, 20.0)).unwrap())
            .collect();

        tree.layout();

        // column width = 200 / 2 - 10 = 90; second row at 20 + 5
        assert_eq!(tree.bounds(cells[0]), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
        assert_eq!(tree.bounds(cells[1]), Some(Rect::new(90.0, 0.0, 20.0, 20.0)));
        assert_eq!(tree.bounds(cells[2]), Some(Rect::new(0.0, 25.0, 20.0, 20.0)));

        // dirtying one cell re-arranges the whole grid
        tree.mark_dirty(cells[1]).unwrap();
        tree.layout();
        assert_eq!(tree.bounds(cells[1]), Some(Rect::new(90.0, 0.0, 20.0, 20.0)));

        // same for a single cell recomputed in the middle of a frame
        tree.mark_dirty(cells[2]).unwrap();
        tree.relayout(cells[2]).unwrap();
        assert_eq!(tree.bounds(cells[2]), Some(Rect::new(0.0, 25.0, 20.0, 20.0)));
        assert!(!tree.is_dirty(cells[2]));
    }

    #[test]
    fn test_effects_by_type() {
        let mut tree = tree_200x100();
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();
        tree.add_effect(a, Outline::new(1.0, Color::WHITE)).unwrap();
        tree.add_effect(a, Invert).unwrap();

        assert_eq!(tree.effect::<Outline>(a).map(|o| o.width), Some(1.0));
        tree.effect_mut::<Outline>(a).unwrap().width = 3.0;
        assert_eq!(tree.effect::<Outline>(a).map(|o| o.width), Some(3.0));

        assert!(tree.remove_effects::<Outline>(a).unwrap());
        assert!(!tree.remove_effects::<Outline>(a).unwrap());
        assert!(tree.effect::<Outline>(a).is_none());
        assert!(tree.effect::<Invert>(a).is_some());
    }

    #[test]
    fn test_set_animation_validates_name() {
        let mut tree = Tree::with_config(
            TreeConfig::new().with_default_animation(Duration::from_millis(250)),
        );
        let a = tree.add(tree.root(), PercentRect::full()).unwrap();

        assert_eq!(
            tree.set_animation(a, Axis::X, "WOBBLE", Duration::from_secs(1)),
            Err(Error::UnknownEasing("WOBBLE".into()))
        );
        tree.set_animation_default(a, Axis::Height, "EASE_OUT_EXPO").unwrap();

        let animation = tree.animation(a, Axis::Height).unwrap();
        assert_eq!(animation.duration(), Duration::from_millis(250));
        assert!(tree.animation(a, Axis::X).is_none());
    }

    #[test]
    fn test_typed_widget_access() {
        let mut tree = tree_200x100();
        let a = tree.add_widget(tree.root(), PercentRect::full(), Panel).unwrap();
        let b = tree.add(tree.root(), PercentRect::full()).unwrap();

        assert!(tree.widget::<Panel>(a).is_some());
        assert!(tree.widget_mut::<Panel>(a).is_some());
        assert!(tree.widget::<Panel>(b).is_none());
    }
}
