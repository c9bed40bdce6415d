//! Window host - winit input adapter and a GPU-ready quad batcher
//!
//! [`WinitInput`] folds `WindowEvent`s into per-frame input state in
//! logical coordinates. [`QuadBatch`] is a [`RenderBackend`] that turns the
//! frame into a `bytemuck`-castable vertex list split into batches by clip
//! and blend mode, plus text runs, ready for a host renderer to upload.

use crate::color::Color;
use crate::event::{Key, MouseButton};
use crate::input::{InputSource, InputState};
use crate::layout::{Rect, Viewport};
use crate::render::{BlendMode, RenderBackend};
use std::ops::Range;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey};

/// Pixels of smooth scrolling that count as one wheel notch
const PIXELS_PER_NOTCH: f64 = 40.0;

/// Window input folded into per-frame [`InputState`]
#[derive(Debug, Clone)]
pub struct WinitInput {
    state: InputState,
    size: PhysicalSize<u32>,
    scale_factor: f64,
    modifiers: ModifiersState,
    /// Leftover smooth-scroll pixels below one notch
    pending_scroll: f64,
}

impl WinitInput {
    pub fn new(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        WinitInput {
            state: InputState::new(),
            size,
            scale_factor,
            modifiers: ModifiersState::empty(),
            pending_scroll: 0.0,
        }
    }

    /// Start from a window's current size and scale
    pub fn from_window(window: &winit::window::Window) -> Self {
        WinitInput::new(window.inner_size(), window.scale_factor())
    }

    /// Logical viewport of the window
    pub fn viewport(&self) -> Viewport {
        let logical = self.size.to_logical::<f64>(self.scale_factor);
        Viewport::new(logical.width, logical.height).with_scale(self.scale_factor)
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Fold one window event in; returns whether it was an input event
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                self.size = *size;
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
            }
            WindowEvent::CursorMoved { position, .. } => self.move_cursor(*position),
            WindowEvent::MouseInput { state, button, .. } => {
                self.button(*state, convert_button(*button));
            }
            WindowEvent::MouseWheel { delta, .. } => self.wheel(*delta),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let Some(key) = convert_key(&event.logical_key, self.modifiers) {
                        self.state.type_key(key);
                    }
                }
            }
            _ => return false,
        }
        true
    }

    fn move_cursor(&mut self, position: PhysicalPosition<f64>) {
        let logical = position.to_logical::<f64>(self.scale_factor);
        self.state.move_to(logical.x, logical.y);
    }

    fn button(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => self.state.press(button.index()),
            ElementState::Released => self.state.release(button.index()),
        }
    }

    fn wheel(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => {
                self.state.scroll(y.round() as i32);
            }
            MouseScrollDelta::PixelDelta(position) => {
                self.pending_scroll += position.y;
                let notches = (self.pending_scroll / PIXELS_PER_NOTCH).trunc();
                self.pending_scroll -= notches * PIXELS_PER_NOTCH;
                self.state.scroll(notches as i32);
            }
        }
    }
}

impl InputSource for WinitInput {
    fn cursor(&self) -> (f64, f64) {
        self.state.cursor()
    }

    fn button_down(&self, index: usize) -> bool {
        self.state.button_down(index)
    }

    fn take_wheel(&mut self) -> i32 {
        self.state.take_wheel()
    }

    fn take_keys(&mut self) -> Vec<Key> {
        self.state.take_keys()
    }
}

fn convert_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(0),
        winit::event::MouseButton::Forward => MouseButton::Other(1),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n.saturating_add(2)),
    }
}

/// Convert a winit logical key to our Key type
fn convert_key(key: &WinitKey, modifiers: ModifiersState) -> Option<Key> {
    match key {
        WinitKey::Character(text) => {
            let c = text.chars().next()?;
            Some(if modifiers.control_key() {
                Key::Ctrl(c)
            } else if modifiers.alt_key() {
                Key::Alt(c)
            } else {
                Key::Char(c)
            })
        }
        WinitKey::Named(named) => convert_named(*named, modifiers),
        _ => None,
    }
}

fn convert_named(key: NamedKey, modifiers: ModifiersState) -> Option<Key> {
    let key = match key {
        NamedKey::ArrowUp => Key::Up,
        NamedKey::ArrowDown => Key::Down,
        NamedKey::ArrowLeft => Key::Left,
        NamedKey::ArrowRight => Key::Right,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::Tab if modifiers.shift_key() => Key::BackTab,
        NamedKey::Tab => Key::Tab,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Insert => Key::Insert,
        NamedKey::Enter => Key::Enter,
        NamedKey::Escape => Key::Esc,
        NamedKey::Space => Key::Char(' '),
        NamedKey::F1 => Key::F(1),
        NamedKey::F2 => Key::F(2),
        NamedKey::F3 => Key::F(3),
        NamedKey::F4 => Key::F(4),
        NamedKey::F5 => Key::F(5),
        NamedKey::F6 => Key::F(6),
        NamedKey::F7 => Key::F(7),
        NamedKey::F8 => Key::F(8),
        NamedKey::F9 => Key::F(9),
        NamedKey::F10 => Key::F(10),
        NamedKey::F11 => Key::F(11),
        NamedKey::F12 => Key::F(12),
        _ => return None,
    };
    Some(key)
}

/// One corner of a filled triangle, in logical pixels
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    /// RGBA, 0.0-1.0
    pub color: [f32; 4],
}

/// Contiguous vertices sharing one clip and blend state
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub clip: Option<Rect>,
    pub blend: BlendMode,
    /// Vertex index range
    pub vertices: Range<u32>,
}

/// Text to be shaped and drawn by the host
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub clip: Option<Rect>,
}

/// [`RenderBackend`] that tessellates a frame into triangle batches
#[derive(Debug, Clone)]
pub struct QuadBatch {
    viewport: Viewport,
    vertices: Vec<Vertex>,
    batches: Vec<Batch>,
    texts: Vec<TextRun>,
    color: Color,
    blend: BlendMode,
    clip: Option<Rect>,
    /// Advance per character used by `text_width`
    char_width: f64,
}

impl QuadBatch {
    pub fn new(viewport: Viewport) -> Self {
        QuadBatch {
            viewport,
            vertices: Vec::new(),
            batches: Vec::new(),
            texts: Vec::new(),
            color: Color::WHITE,
            blend: BlendMode::Alpha,
            clip: None,
            char_width: 8.0,
        }
    }

    /// Set the per-character advance used for text measurement
    pub fn with_char_width(mut self, width: f64) -> Self {
        self.char_width = width;
        self
    }

    /// Change the surface size (call on window resize)
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Vertex data ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    fn push_quad(&mut self, rect: Rect) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }

        let start = self.vertices.len() as u32;
        let same_state = self
            .batches
            .last()
            .is_some_and(|b| b.clip == self.clip && b.blend == self.blend);
        if !same_state {
            self.batches.push(Batch {
                clip: self.clip,
                blend: self.blend,
                vertices: start..start,
            });
        }

        let color = self.color.to_f32_array();
        let (x0, y0) = (rect.x as f32, rect.y as f32);
        let (x1, y1) = (rect.x2() as f32, rect.y2() as f32);
        for position in [[x0, y0], [x1, y0], [x0, y1], [x0, y1], [x1, y0], [x1, y1]] {
            self.vertices.push(Vertex { position, color });
        }

        let end = self.vertices.len() as u32;
        if let Some(batch) = self.batches.last_mut() {
            batch.vertices.end = end;
        }
    }
}

impl RenderBackend for QuadBatch {
    fn begin_frame(&mut self) {
        self.vertices.clear();
        self.batches.clear();
        self.texts.clear();
        self.blend = BlendMode::Alpha;
        self.clip = None;
    }

    fn end_frame(&mut self) {
        self.blend = BlendMode::Alpha;
        self.clip = None;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.push_quad(rect);
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64) {
        let w = width.min(rect.width / 2.0).min(rect.height / 2.0);
        if w <= 0.0 {
            return;
        }
        let inner_height = rect.height - w * 2.0;
        self.push_quad(Rect::new(rect.x, rect.y, rect.width, w));
        self.push_quad(Rect::new(rect.x, rect.y2() - w, rect.width, w));
        self.push_quad(Rect::new(rect.x, rect.y + w, w, inner_height));
        self.push_quad(Rect::new(rect.x2() - w, rect.y + w, w, inner_height));
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        if text.is_empty() {
            return;
        }
        self.texts.push(TextRun {
            text: text.to_string(),
            x,
            y,
            color,
            clip: self.clip,
        });
    }

    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.clip = rect;
    }
}
