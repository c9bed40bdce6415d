//! Per-node event bus: ordered subscriber lists keyed by event kind

use crate::event::{Event, EventKind};
use std::collections::HashMap;

/// Subscriber closure
pub type Hook = Box<dyn FnMut(&mut Event)>;

/// Typed event bus owned by one node
#[derive(Default)]
pub struct HookBus {
    hooks: HashMap<EventKind, Vec<Hook>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber; subscribers run in registration order
    pub fn subscribe(&mut self, kind: EventKind, hook: Hook) {
        self.hooks.entry(kind).or_default().push(hook);
    }

    /// Drop every subscriber of `kind`, returning how many were removed
    pub fn clear(&mut self, kind: EventKind) -> usize {
        self.hooks.remove(&kind).map_or(0, |hooks| hooks.len())
    }

    /// Number of subscribers of `kind`
    pub fn count(&self, kind: EventKind) -> usize {
        self.hooks.get(&kind).map_or(0, Vec::len)
    }

    /// Run the subscribers of the event's kind
    pub fn emit(&mut self, event: &mut Event) {
        if let Some(hooks) = self.hooks.get_mut(&event.kind()) {
            for hook in hooks.iter_mut() {
                hook(event);
            }
        }
    }
}

impl std::fmt::Debug for HookBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self.hooks.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("HookBus").field("hooks", &counts).finish()
    }
}
