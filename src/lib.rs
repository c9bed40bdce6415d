//! tessera - A retained-mode UI core with percent layout and event propagation
//!
//! Nodes live in a [`Tree`] arena and are positioned in percent of their
//! parent. Each frame the root:
//! - re-resolves geometry for dirty nodes, top-down
//! - samples the host [`InputSource`] and propagates pointer, focus and key events
//! - draws the tree through a [`RenderBackend`], running effects and animations
//!
//! Scrollable viewports cull and translate their children. Failures in one
//! node's drawing are contained and reported per frame in a [`FrameReport`].
//!
//! Host backends are behind features: `tui` (crossterm terminal) and `gui`
//! (winit input with a bytemuck vertex batcher).

pub mod animation;
pub mod color;
pub mod component;
pub mod config;
pub mod effects;
pub mod error;
pub mod event;
#[cfg(feature = "gui")]
pub mod gui;
pub mod hooks;
pub mod input;
pub mod layout;
pub mod render;
#[cfg(feature = "tui")]
pub mod terminal;
pub mod tree;

// Re-export commonly used types
pub use animation::{Animation, Axis, Easing};
pub use color::Color;
pub use component::{
    DrawCx, Drawable, EventCx, FocusTarget, HitTestable, KeyInputTarget, Panel, Widget,
};
pub use config::TreeConfig;
pub use effects::{ClipStack, Effect, EffectCx, Invert, Outline, Scissor};
pub use error::{Error, Result};
pub use event::{Event, EventKind, Key, MouseButton, Payload};
pub use input::{InputSource, InputState};
pub use layout::{GridLayout, LayoutStrategy, PercentRect, Rect, Viewport};
pub use render::{BlendMode, Clipboard, DrawCommand, Headless, MemoryClipboard, RenderBackend};
pub use tree::{FrameReport, NodeError, NodeId, Tree};

#[cfg(feature = "gui")]
pub use gui::{QuadBatch, WinitInput};
#[cfg(feature = "tui")]
pub use terminal::{TerminalBackend, TerminalCapabilities, TerminalInput};
