//! Event system - event kinds, payloads and the per-dispatch event value

use crate::layout::Viewport;
use crate::tree::NodeId;

/// Keyboard key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    F(u8),
    Ctrl(char),
    Alt(char),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    BackTab,
    Backspace,
    Delete,
    Insert,
    Enter,
    Tab,
    Esc,
    Null,
}

impl Key {
    /// The printable character carried by this key, if any
    pub fn char(&self) -> Option<char> {
        match self {
            Key::Char(c) => Some(*c),
            _ => None,
        }
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl MouseButton {
    /// Index into the per-button state table (left = 0, right = 1, middle = 2)
    pub fn index(&self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Other(n) => 3 + *n as usize,
        }
    }
}

/// Every kind of event a node can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Release,
    Drag,
    /// Sent to every child of a node receiving a drag, before hit-testing
    DragOut,
    Scroll,
    Enter,
    Hover,
    Leave,
    Focus,
    Unfocus,
    LostFocus,
    KeyType,
    Resize,
    Error,
    /// Fired after a node's geometry was recomputed
    Update,
}

impl EventKind {
    /// Broadcast kinds reach the whole subtree regardless of hit-testing or
    /// the propagate flag
    pub fn is_broadcast(&self) -> bool {
        matches!(self, EventKind::Resize | EventKind::Error)
    }
}

/// Kind-specific data carried by an [`Event`]
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Pointer position only (enter, hover, leave, drag-out)
    Pointer,
    /// Mouse button index (click, release)
    Button(usize),
    /// Wheel direction: positive is away from the user
    Scroll(i32),
    /// Movement since the last recorded position of a held button
    Drag { dx: f64, dy: f64, button: usize },
    /// Focus state being requested or lost
    Focus(bool),
    /// Typed key
    Key(Key),
    /// New scaled resolution
    Resize(Viewport),
    /// Message of a failure caught while drawing
    Error(String),
    /// Geometry recomputed
    Update,
}

/// One interaction, created fresh for each dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    origin: NodeId,
    /// Pointer x in the receiving node's coordinate space
    pub x: f64,
    /// Pointer y in the receiving node's coordinate space
    pub y: f64,
    payload: Payload,
    propagate: bool,
}

impl Event {
    pub(crate) fn new(kind: EventKind, origin: NodeId, x: f64, y: f64, payload: Payload) -> Self {
        Event {
            kind,
            origin,
            x,
            y,
            payload,
            propagate: true,
        }
    }

    /// Event without pointer coordinates
    pub(crate) fn detached(kind: EventKind, origin: NodeId, payload: Payload) -> Self {
        Event::new(kind, origin, -1.0, -1.0, payload)
    }

    /// Fresh copy with the vertical coordinate shifted, used when crossing
    /// into a scrolled viewport. The copy propagates independently.
    pub(crate) fn remapped(&self, dy: f64) -> Self {
        Event {
            y: self.y + dy,
            propagate: true,
            ..self.clone()
        }
    }

    /// Same event re-labelled as another kind (drag → drag-out, unfocus → lost-focus)
    pub(crate) fn relabel(&self, kind: EventKind) -> Self {
        Event {
            kind,
            propagate: true,
            ..self.clone()
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Node that synthesized this event (usually the root)
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Stop this event from reaching any further descendants or siblings.
    /// The current node still processes it.
    pub fn stop_propagation(&mut self) {
        self.propagate = false;
    }

    /// Whether the event will still be offered to children
    pub fn propagates(&self) -> bool {
        self.propagate
    }

    /// Mouse button of a click, release or drag
    pub fn button(&self) -> Option<usize> {
        match self.payload {
            Payload::Button(b) => Some(b),
            Payload::Drag { button, .. } => Some(button),
            _ => None,
        }
    }

    /// Wheel direction of a scroll event
    pub fn scroll_delta(&self) -> Option<i32> {
        match self.payload {
            Payload::Scroll(delta) => Some(delta),
            _ => None,
        }
    }

    /// Movement of a drag event
    pub fn drag_delta(&self) -> Option<(f64, f64)> {
        match self.payload {
            Payload::Drag { dx, dy, .. } => Some((dx, dy)),
            _ => None,
        }
    }

    /// Typed key of a key-type event
    pub fn key(&self) -> Option<Key> {
        match self.payload {
            Payload::Key(key) => Some(key),
            _ => None,
        }
    }

    /// New viewport of a resize event
    pub fn viewport(&self) -> Option<Viewport> {
        match self.payload {
            Payload::Resize(viewport) => Some(viewport),
            _ => None,
        }
    }

    /// Failure message of an error event
    pub fn error_message(&self) -> Option<&str> {
        match &self.payload {
            Payload::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_variants() {
        let k = Key::Char('a');
        assert_eq!(k, Key::Char('a'));
        assert_eq!(k.char(), Some('a'));
        assert_eq!(Key::Enter.char(), None);
    }

    #[test]
    fn test_remapped_event_propagates_independently() {
        let origin = NodeId::default();
        let mut event = Event::new(EventKind::Click, origin, 5.0, 10.0, Payload::Button(0));
        event.stop_propagation();

        let shifted = event.remapped(30.0);
        assert_eq!(shifted.y, 40.0);
        assert_eq!(shifted.x, 5.0);
        assert!(shifted.propagates());
        assert!(!event.propagates());
        assert_eq!(shifted.button(), Some(0));
    }

    #[test]
    fn test_broadcast_kinds() {
        assert!(EventKind::Resize.is_broadcast());
        assert!(EventKind::Error.is_broadcast());
        assert!(!EventKind::Click.is_broadcast());
    }

    #[test]
    fn test_mouse_button_index() {
        assert_eq!(MouseButton::Left.index(), 0);
        assert_eq!(MouseButton::Middle.index(), 2);
        assert_eq!(MouseButton::Other(1).index(), 4);
    }
}
