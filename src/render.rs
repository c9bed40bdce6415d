//! Rendering backend - the drawing service the tree renders through
//!
//! The tree never touches a graphics API directly. Every frame it calls
//! `begin_frame`, issues immediate-mode primitives while walking the nodes,
//! and always finishes with `end_frame`, which must restore any global
//! state (blending, clipping) the frame changed.

use crate::color::Color;
use crate::layout::{Rect, Viewport};

/// How drawn pixels combine with the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard source-over alpha blending
    #[default]
    Alpha,
    /// Use the inverse of the existing framebuffer color
    Invert,
}

/// Immediate-mode drawing service provided by the host
pub trait RenderBackend {
    /// Called once before the root draws
    fn begin_frame(&mut self) {}

    /// Called once after the root finished, even when nodes failed
    fn end_frame(&mut self) {}

    /// Current scaled resolution of the surface
    fn viewport(&self) -> Viewport;

    /// Bind the current draw color
    fn set_color(&mut self, color: Color);

    /// Switch blend mode
    fn set_blend(&mut self, mode: BlendMode);

    /// Fill a rectangle with the bound color
    fn fill_rect(&mut self, rect: Rect);

    /// Stroke the inside edge of `rect` with a `width`-pixel border
    fn stroke_rect(&mut self, rect: Rect, width: f64);

    /// Draw a line of text with its top-left corner at `(x, y)`
    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color);

    /// Width of `text` in pixels
    fn text_width(&self, text: &str) -> f64;

    /// Restrict drawing to `rect`, or lift the restriction with `None`
    fn set_clip(&mut self, rect: Option<Rect>);
}

/// One recorded call on a [`Headless`] backend
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame,
    EndFrame,
    Color(Color),
    Blend(BlendMode),
    Fill(Rect),
    Stroke { rect: Rect, width: f64 },
    Text { text: String, x: f64, y: f64, color: Color },
    Clip(Option<Rect>),
}

/// Backend with no display that records every call
///
/// Useful for hosts that only need layout and input handling, and for
/// asserting on what a frame drew.
#[derive(Debug, Clone)]
pub struct Headless {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
    /// Advance per character used by `text_width`
    char_width: f64,
}

impl Headless {
    /// Create a headless backend with a fixed viewport
    pub fn new(width: f64, height: f64) -> Self {
        Headless {
            viewport: Viewport::new(width, height),
            commands: Vec::new(),
            char_width: 6.0,
        }
    }

    /// Set the per-character advance used for text measurement
    pub fn with_char_width(mut self, width: f64) -> Self {
        self.char_width = width;
        self
    }

    /// Change the reported viewport (simulates a window resize)
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Commands recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Rectangles filled so far
    pub fn fills(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Fill(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for Headless {
    fn begin_frame(&mut self) {
        self.commands.push(DrawCommand::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.commands.push(DrawCommand::EndFrame);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::Color(color));
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.commands.push(DrawCommand::Blend(mode));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Fill(rect));
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64) {
        self.commands.push(DrawCommand::Stroke { rect, width });
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.commands.push(DrawCommand::Clip(rect));
    }
}

/// Text clipboard service
pub trait Clipboard {
    fn get_text(&mut self) -> Option<String>;
    fn set_text(&mut self, text: &str);
}

/// In-process clipboard, the default when the host provides none
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.contents.clone()
    }

    fn set_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.contents = Some(text.to_string());
    }
}
