//! Terminal host - a cell renderer and crossterm input adapter
//!
//! One layout unit is one character cell, so a tree drawn here lays out
//! against a `cols x rows` viewport. Output is plain ANSI written through a
//! buffered writer and flushed once per frame.

use crate::color::Color;
use crate::event::{Key, MouseButton};
use crate::input::{InputSource, InputState};
use crate::layout::{Rect, Viewport};
use crate::render::{BlendMode, RenderBackend};
use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};
use std::time::Duration;

/// Default buffer capacity for write batching (16KB)
const WRITE_BUFFER_CAPACITY: usize = 16 * 1024;

/// Terminal capability detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// Supports 24-bit true color
    pub truecolor: bool,
    /// Supports 256 colors
    pub colors_256: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities from the environment
    pub fn detect() -> Self {
        let term = std::env::var("TERM").unwrap_or_default();
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let multiplexer = std::env::var("TMUX").is_ok() || term.starts_with("screen");
        let kitty_window = std::env::var("KITTY_WINDOW_ID").is_ok();

        // A multiplexer inherits KITTY_WINDOW_ID without passing 24-bit color through
        let truecolor = colorterm.contains("truecolor")
            || colorterm.contains("24bit")
            || (kitty_window && !multiplexer);

        TerminalCapabilities {
            truecolor,
            colors_256: term.contains("256") || truecolor,
        }
    }

    /// SGR parameters selecting `color` as background (`layer = 48`) or
    /// foreground (`layer = 38`)
    fn sgr(&self, layer: u8, color: Color) -> String {
        if self.truecolor {
            format!("{};2;{};{};{}", layer, color.r, color.g, color.b)
        } else if self.colors_256 {
            format!("{};5;{}", layer, color.to_ansi256())
        } else {
            // 30-37 / 40-47, bright variants at 90-97 / 100-107
            let index = color.to_ansi16();
            let base = if index < 8 { layer - 8 } else { layer + 52 };
            format!("{}", base + index % 8)
        }
    }
}

/// [`RenderBackend`] drawing into character cells
pub struct TerminalBackend<W: Write> {
    writer: BufWriter<W>,
    cols: u16,
    rows: u16,
    capabilities: TerminalCapabilities,
    color: Color,
    blend: BlendMode,
    clip: Option<Rect>,
    /// First write failure of the current frame
    error: Option<io::Error>,
}

impl TerminalBackend<io::Stdout> {
    /// Backend on stdout sized to the current terminal
    pub fn stdout() -> Result<Self> {
        let (cols, rows) = crossterm::terminal::size().context("Failed to get terminal size")?;
        Ok(TerminalBackend::with_writer(
            io::stdout(),
            cols,
            rows,
            TerminalCapabilities::detect(),
        ))
    }
}

impl<W: Write> TerminalBackend<W> {
    /// Backend writing to any sink with a fixed cell grid
    pub fn with_writer(writer: W, cols: u16, rows: u16, capabilities: TerminalCapabilities) -> Self {
        TerminalBackend {
            writer: BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, writer),
            cols,
            rows,
            capabilities,
            color: Color::WHITE,
            blend: BlendMode::Alpha,
            clip: None,
            error: None,
        }
    }

    /// Change the grid size (call on terminal resize)
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    /// Switch to the alternate screen and hide the cursor
    pub fn enter(&mut self) -> Result<()> {
        write!(self.writer, "\x1b[?1049h\x1b[?25l")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Restore the main screen and the cursor
    pub fn leave(&mut self) -> Result<()> {
        write!(self.writer, "\x1b[0m\x1b[?25h\x1b[?1049l")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Take the write failure recorded during the last frame, if any
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Flush and hand back the underlying sink
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| err.into_error())
            .context("Failed to flush terminal output")
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.writer.write_fmt(args) {
            self.error = Some(err);
        }
    }

    /// Whole cells covered by `rect` after clipping to the grid and the
    /// active clip: `(col0, row0, col1, row1)`, end-exclusive
    fn cells(&self, rect: Rect) -> Option<(u16, u16, u16, u16)> {
        let grid = Rect::new(0.0, 0.0, f64::from(self.cols), f64::from(self.rows));
        let mut visible = rect.intersect(&grid);
        if let Some(clip) = self.clip {
            visible = visible.intersect(&clip);
        }

        let col0 = visible.x.round() as u16;
        let row0 = visible.y.round() as u16;
        let col1 = visible.x2().round() as u16;
        let row1 = visible.y2().round() as u16;
        if col0 >= col1 || row0 >= row1 {
            return None;
        }
        Some((col0, row0, col1, row1))
    }

    fn sgr_reset(&self) -> &'static str {
        match self.blend {
            BlendMode::Alpha => "\x1b[0m",
            BlendMode::Invert => "\x1b[0;7m",
        }
    }
}

impl<W: Write> RenderBackend for TerminalBackend<W> {
    fn begin_frame(&mut self) {
        self.blend = BlendMode::Alpha;
        self.clip = None;
        self.emit(format_args!("\x1b[0m\x1b[2J"));
    }

    fn end_frame(&mut self) {
        self.blend = BlendMode::Alpha;
        self.clip = None;
        self.emit(format_args!("\x1b[0m"));
        if let Err(err) = self.writer.flush() {
            self.error.get_or_insert(err);
        }
        if let Some(err) = &self.error {
            log::warn!("terminal output failed: {}", err);
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(f64::from(self.cols), f64::from(self.rows))
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn fill_rect(&mut self, rect: Rect) {
        if self.color.is_transparent() && self.blend == BlendMode::Alpha {
            return;
        }
        let Some((col0, row0, col1, row1)) = self.cells(rect) else {
            return;
        };

        let reset = self.sgr_reset();
        let background = self.capabilities.sgr(48, self.color);
        let blank = " ".repeat(usize::from(col1 - col0));
        for row in row0..row1 {
            self.emit(format_args!(
                "\x1b[{};{}H{}\x1b[{}m{}",
                row + 1,
                col0 + 1,
                reset,
                background,
                blank
            ));
        }
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64) {
        if width <= 0.0 {
            return;
        }
        let Some((col0, row0, col1, row1)) = self.cells(rect) else {
            return;
        };

        let reset = self.sgr_reset();
        let foreground = self.capabilities.sgr(38, self.color);
        let inner = usize::from((col1 - col0).saturating_sub(2));
        let last_row = row1 - 1;
        for row in row0..row1 {
            let line = if row == row0 {
                format!("┌{}┐", "─".repeat(inner))
            } else if row == last_row {
                format!("└{}┘", "─".repeat(inner))
            } else {
                format!("│{}│", " ".repeat(inner))
            };
            self.emit(format_args!(
                "\x1b[{};{}H{}\x1b[{}m{}",
                row + 1,
                col0 + 1,
                reset,
                foreground,
                line
            ));
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        let width = self.text_width(text);
        let Some((col0, row0, col1, _)) = self.cells(Rect::new(x, y, width, 1.0)) else {
            return;
        };

        // Drop characters cut off on the left by the clip
        let skip = usize::from(col0).saturating_sub(x.round().max(0.0) as usize);
        let visible: String = text
            .chars()
            .skip(skip)
            .take(usize::from(col1 - col0))
            .collect();

        let reset = self.sgr_reset();
        let foreground = self.capabilities.sgr(38, color);
        self.emit(format_args!(
            "\x1b[{};{}H{}\x1b[{}m{}",
            row0 + 1,
            col0 + 1,
            reset,
            foreground,
            visible
        ));
    }

    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.clip = rect;
    }
}

/// Raw-mode terminal input folded into per-frame [`InputState`]
///
/// Enables raw mode and mouse capture on creation and restores the
/// terminal when dropped.
pub struct TerminalInput {
    state: InputState,
    resized: Option<(u16, u16)>,
    quit: bool,
}

impl TerminalInput {
    pub fn new() -> Result<Self> {
        crossterm::terminal::enable_raw_mode().context("Failed to enable raw mode")?;

        // Try to enable mouse capture, but don't fail if not available
        let _ = crossterm::execute!(io::stdout(), crossterm::event::EnableMouseCapture);

        Ok(TerminalInput {
            state: InputState::new(),
            resized: None,
            quit: false,
        })
    }

    /// Drain every pending terminal event, waiting at most `timeout` for
    /// the first one. Returns whether anything arrived.
    pub fn poll(&mut self, timeout: Duration) -> Result<bool> {
        let mut any = false;
        let mut wait = timeout;
        while crossterm::event::poll(wait)? {
            let event = crossterm::event::read()?;
            self.apply(event);
            any = true;
            wait = Duration::ZERO;
        }
        Ok(any)
    }

    /// Fold one crossterm event into the input state
    pub fn apply(&mut self, event: crossterm::event::Event) {
        apply_event(&mut self.state, &mut self.resized, &mut self.quit, event);
    }

    /// New `(cols, rows)` if the terminal was resized since the last call
    pub fn take_resize(&mut self) -> Option<(u16, u16)> {
        self.resized.take()
    }

    /// Whether Ctrl-C was typed
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }
}

impl InputSource for TerminalInput {
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

impl Drop for TerminalInput {
    fn drop(&mut self) {
        let _ = crossterm::execute!(io::stdout(), crossterm::event::DisableMouseCapture);
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

fn apply_event(
    state: &mut InputState,
    resized: &mut Option<(u16, u16)>,
    quit: &mut bool,
    event: crossterm::event::Event,
) {
    use crossterm::event::{Event as CEvent, KeyEventKind, MouseEventKind};

    match event {
        CEvent::Key(key) if key.kind != KeyEventKind::Release => {
            let key = convert_key(key.code, key.modifiers);
            if key == Key::Ctrl('c') {
                *quit = true;
            }
            state.type_key(key);
        }
        CEvent::Mouse(me) => {
            state.move_to(f64::from(me.column), f64::from(me.row));
            match me.kind {
                MouseEventKind::Down(btn) => state.press(convert_button(btn).index()),
                MouseEventKind::Up(btn) => state.release(convert_button(btn).index()),
                MouseEventKind::ScrollUp => state.scroll(1),
                MouseEventKind::ScrollDown => state.scroll(-1),
                _ => {}
            }
        }
        CEvent::Resize(cols, rows) => *resized = Some((cols, rows)),
        _ => {}
    }
}

fn convert_button(button: crossterm::event::MouseButton) -> MouseButton {
    match button {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

/// Convert crossterm key code to our Key type
fn convert_key(code: crossterm::event::KeyCode, mods: crossterm::event::KeyModifiers) -> Key {
    use crossterm::event::{KeyCode, KeyModifiers};

    if mods.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = code {
            return Key::Ctrl(c);
        }
    }

    if mods.contains(KeyModifiers::ALT) {
        if let KeyCode::Char(c) = code {
            return Key::Alt(c);
        }
    }

    match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::F(n) => Key::F(n),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Esc,
        _ => Key::Null,
    }
}
