//! Widget contract - capability traits implemented by anything placed in the tree
//!
//! A node may carry one widget. The tree drives it through four small
//! capabilities instead of one override-everything base type:
//! - [`Drawable`]: the render hooks around the node's children
//! - [`HitTestable`]: whether a point hits the node
//! - [`FocusTarget`]: focus transitions
//! - [`KeyInputTarget`]: typed keys while focused
//!
//! Nodes without a widget still lay out, clip, hit-test and propagate events.

use crate::animation::Axis;
use crate::color::Color;
use crate::event::{Event, EventKind};
use crate::layout::Rect;
use crate::render::{BlendMode, Clipboard, RenderBackend};
use crate::tree::NodeId;
use anyhow::Result;
use std::any::Any;

/// Drawing context handed to widget render hooks
///
/// Coordinates given to the drawing methods are in layout space; the
/// context applies the translation of any scrolled ancestor.
pub struct DrawCx<'a> {
    pub(crate) id: NodeId,
    pub(crate) bounds: Option<Rect>,
    pub(crate) color: Color,
    pub(crate) eases: [Option<f32>; 4],
    pub(crate) offset: (f64, f64),
    pub(crate) backend: &'a mut dyn RenderBackend,
}

impl<'a> DrawCx<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node bounds in layout space (`None` before the first layout)
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Node bounds as they land on screen
    pub fn screen_bounds(&self) -> Option<Rect> {
        self.bounds.map(|b| b.translate(self.offset.0, self.offset.1))
    }

    /// Node background color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Current value of the node's animation on `axis`, if one is set
    pub fn ease(&self, axis: Axis) -> Option<f32> {
        let slot = Axis::ALL.iter().position(|a| *a == axis)?;
        self.eases[slot]
    }

    pub fn set_color(&mut self, color: Color) {
        self.backend.set_color(color);
    }

    pub fn set_blend(&mut self, mode: BlendMode) {
        self.backend.set_blend(mode);
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        self.backend
            .fill_rect(rect.translate(self.offset.0, self.offset.1));
    }

    /// Fill the node's own bounds with the bound color
    pub fn fill_bounds(&mut self) {
        if let Some(bounds) = self.bounds {
            self.fill_rect(bounds);
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, width: f64) {
        self.backend
            .stroke_rect(rect.translate(self.offset.0, self.offset.1), width);
    }

    pub fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        self.backend
            .draw_text(text, x + self.offset.0, y + self.offset.1, color);
    }

    pub fn text_width(&self, text: &str) -> f64 {
        self.backend.text_width(text)
    }

    /// Raw backend access (no translation applied)
    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }
}

/// Context handed to widget event handlers
pub struct EventCx<'a> {
    pub(crate) id: NodeId,
    pub(crate) bounds: Option<Rect>,
    pub(crate) focused: bool,
    pub(crate) relayout: bool,
    pub(crate) clipboard: &'a mut dyn Clipboard,
}

impl<'a> EventCx<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Ask the tree to recompute this node's subtree before the next draw
    pub fn mark_dirty(&mut self) {
        self.relayout = true;
    }

    pub fn clipboard(&mut self) -> &mut dyn Clipboard {
        &mut *self.clipboard
    }
}

/// Render hooks, called in pipeline order around the node's children
pub trait Drawable {
    /// Draw the widget's own content
    fn render(&mut self, cx: &mut DrawCx<'_>) -> Result<()>;

    fn pre_draw(&mut self, _cx: &mut DrawCx<'_>) -> Result<()> {
        Ok(())
    }

    fn post_draw(&mut self, _cx: &mut DrawCx<'_>) -> Result<()> {
        Ok(())
    }

    fn pre_child_draw(&mut self, _cx: &mut DrawCx<'_>) -> Result<()> {
        Ok(())
    }

    fn post_child_draw(&mut self, _cx: &mut DrawCx<'_>) -> Result<()> {
        Ok(())
    }

    /// Geometry was recomputed
    fn on_update(&mut self, _rect: Rect) {}
}

/// Point hit-testing against the node's last computed bounds
pub trait HitTestable {
    fn hit_test(&self, bounds: Rect, x: f64, y: f64) -> bool {
        bounds.contains(x, y)
    }
}

/// Focus transitions
pub trait FocusTarget {
    /// Whether clicks may focus this node
    fn focusable(&self) -> bool {
        true
    }

    fn on_focus(&mut self, _cx: &mut EventCx<'_>, _event: &mut Event) {}

    fn on_unfocus(&mut self, _cx: &mut EventCx<'_>, _event: &mut Event) {}

    fn on_lost_focus(&mut self, _cx: &mut EventCx<'_>, _event: &mut Event) {}
}

/// Typed keys, delivered only while the node holds focus
pub trait KeyInputTarget {
    fn on_key_type(&mut self, _cx: &mut EventCx<'_>, _event: &mut Event) {}
}

/// A widget: every capability plus pointer/broadcast handling
pub trait Widget: Drawable + HitTestable + FocusTarget + KeyInputTarget + Any {
    /// Widget name for logs and error reports
    fn name(&self) -> &str {
        "Widget"
    }

    /// Click, release, drag, drag-out, scroll, enter, hover, leave,
    /// resize and error events
    fn on_event(&mut self, _cx: &mut EventCx<'_>, _event: &mut Event) {}
}

/// Send an event to the capability that handles its kind
pub(crate) fn route(widget: &mut dyn Widget, cx: &mut EventCx<'_>, event: &mut Event) {
    match event.kind() {
        EventKind::Focus => widget.on_focus(cx, event),
        EventKind::Unfocus => widget.on_unfocus(cx, event),
        EventKind::LostFocus => widget.on_lost_focus(cx, event),
        EventKind::KeyType => widget.on_key_type(cx, event),
        EventKind::Update => {}
        _ => widget.on_event(cx, event),
    }
}

/// Plain rectangle filled with the node color
#[derive(Debug, Clone, Copy, Default)]
pub struct Panel;

impl Drawable for Panel {
    fn render(&mut self, cx: &mut DrawCx<'_>) -> Result<()> {
        if !cx.color().is_transparent() {
            cx.fill_bounds();
        }
        Ok(())
    }
}

impl HitTestable for Panel {}
impl FocusTarget for Panel {}
impl KeyInputTarget for Panel {}

impl Widget for Panel {
    fn name(&self) -> &str {
        "Panel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Payload;
    use crate::render::{DrawCommand, Headless, MemoryClipboard};

    #[derive(Default)]
    struct Recorder {
        seen: Vec<EventKind>,
    }

    impl Drawable for Recorder {
        fn render(&mut self, _cx: &mut DrawCx<'_>) -> Result<()> {
            Ok(())
        }
    }
    impl HitTestable for Recorder {}
    impl FocusTarget for Recorder {
        fn on_focus(&mut self, _cx: &mut EventCx<'_>, event: &mut Event) {
            self.seen.push(event.kind());
        }
    }
    impl KeyInputTarget for Recorder {
        fn on_key_type(&mut self, _cx: &mut EventCx<'_>, event: &mut Event) {
            self.seen.push(event.kind());
        }
    }
    impl Widget for Recorder {
        fn on_event(&mut self, _cx: &mut EventCx<'_>, event: &mut Event) {
            self.seen.push(event.kind());
        }
    }

    #[test]
    fn test_route_dispatches_by_kind() {
        let mut widget = Recorder::default();
        let mut clipboard = MemoryClipboard::default();
        let mut cx = EventCx {
            id: NodeId::default(),
            bounds: None,
            focused: false,
            relayout: false,
            clipboard: &mut clipboard,
        };

        for kind in [EventKind::Focus, EventKind::Click, EventKind::KeyType, EventKind::Update] {
            let mut event = Event::detached(kind, NodeId::default(), Payload::Pointer);
            route(&mut widget, &mut cx, &mut event);
        }

        assert_eq!(
            widget.seen,
            vec![EventKind::Focus, EventKind::Click, EventKind::KeyType]
        );
    }

    #[test]
    fn test_draw_cx_applies_offset() {
        let mut backend = Headless::new(100.0, 100.0);
        let mut cx = DrawCx {
            id: NodeId::default(),
            bounds: Some(Rect::new(0.0, 50.0, 10.0, 10.0)),
            color: Color::WHITE,
            eases: [None, Some(0.5), None, None],
            offset: (0.0, -20.0),
            backend: &mut backend,
        };

        Panel.render(&mut cx).unwrap();
        assert_eq!(cx.ease(Axis::Y), Some(0.5));
        assert_eq!(cx.ease(Axis::X), None);
        assert_eq!(cx.screen_bounds(), Some(Rect::new(0.0, 30.0, 10.0, 10.0)));
        assert_eq!(
            backend.commands(),
            &[DrawCommand::Fill(Rect::new(0.0, 30.0, 10.0, 10.0))]
        );
    }

    #[test]
    fn test_default_hit_test_uses_bounds() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(Panel.hit_test(bounds, 5.0, 5.0));
        assert!(!Panel.hit_test(bounds, 15.0, 5.0));
    }
}
