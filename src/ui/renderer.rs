/// Presentation layer: region-based terminal output.
///
/// How it works:
///   1. The frame driver composes only the dirty region into the grid buffer
///   2. `present` positions the cursor at the region's origin, row by row
///   3. Colour changes are emitted only when the style differs from the last cell
///   4. All commands are batched with `queue!`, flushed once at the end
///
/// Nothing outside the presented region is ever written.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geometry::ScreenRect;
use crate::domain::glyph::TRANSPARENT;
use super::grid::{GridBuffer, BASE_STYLE};

/// Sole boundary to the output device.
pub trait Device {
    /// Write `region` of `grid` with its top-left cell at device `origin`.
    fn present(&mut self, grid: &GridBuffer, region: ScreenRect, origin: (i32, i32)) -> io::Result<()>;

    /// Re-read the output size. Returns `true` when it changed since the last call;
    /// whatever the device showed is then gone.
    fn refresh_size(&mut self) -> io::Result<bool>;
}

// ── Palette ──

/// 16-entry console palette, index = attribute nibble.
const PALETTE: [(u8, u8, u8); 16] = [
    (0x0c, 0x0c, 0x0c), (0x00, 0x37, 0xda), (0x13, 0xa1, 0x0e), (0x3a, 0xb4, 0xdd),
    (0xc5, 0x0f, 0x1f), (0x88, 0x17, 0x98), (0xc1, 0x9c, 0x00), (0xcc, 0xcc, 0xcc),
    (0x76, 0x76, 0x76), (0x3b, 0x78, 0xff), (0x16, 0xc6, 0x0c), (0x61, 0xd6, 0xd6),
    (0xe7, 0x48, 0x56), (0xb4, 0x00, 0x9e), (0xf9, 0xf1, 0xa5), (0xf2, 0xf2, 0xf2),
];

fn palette_color(index: u8) -> Color {
    let (r, g, b) = PALETTE[(index & 0x0f) as usize];
    Color::Rgb { r, g, b }
}

/// (foreground, background) for an attribute byte.
pub fn style_colors(style: u8) -> (Color, Color) {
    (palette_color(style & 0x0f), palette_color(style >> 4))
}

// ── Terminal device ──

pub struct TerminalDevice {
    writer: BufWriter<io::Stdout>,
    term_w: i32,
    term_h: i32,
    enhanced_keys: bool,
}

impl TerminalDevice {
    pub fn new() -> Self {
        TerminalDevice {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
        }
    }

    /// Raw mode, alternate screen, hidden cursor. Returns whether the terminal
    /// reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        let (_, bg) = style_colors(BASE_STYLE);
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(bg),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as i32;
        self.term_h = th as i32;
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }
}

impl Device for TerminalDevice {
    fn present(&mut self, grid: &GridBuffer, region: ScreenRect, origin: (i32, i32)) -> io::Result<()> {
        if region.is_empty() {
            return Ok(());
        }
        let mut last_style: Option<u8> = None;

        for dy in 0..region.height {
            let row = origin.1 + dy;
            if row < 0 || row >= self.term_h {
                continue;
            }
            let first_col = origin.0.max(0);
            if first_col >= self.term_w {
                continue;
            }
            queue!(self.writer, MoveTo(first_col as u16, row as u16))?;

            for dx in 0..region.width {
                let col = origin.0 + dx;
                if col < 0 {
                    continue;
                }
                if col >= self.term_w {
                    break;
                }
                let Some(cell) = grid.get(region.x + dx, region.y + dy) else { continue };

                if last_style != Some(cell.style) {
                    let (fg, bg) = style_colors(cell.style);
                    queue!(self.writer, SetForegroundColor(fg), SetBackgroundColor(bg))?;
                    last_style = Some(cell.style);
                }
                let glyph = if cell.glyph == TRANSPARENT { ' ' } else { cell.glyph };
                queue!(self.writer, Print(glyph))?;
            }
        }

        self.writer.flush()
    }

    fn refresh_size(&mut self) -> io::Result<bool> {
        let (tw, th) = terminal::size().unwrap_or((self.term_w as u16, self.term_h as u16));
        if tw as i32 == self.term_w && th as i32 == self.term_h {
            return Ok(false);
        }
        self.term_w = tw as i32;
        self.term_h = th as i32;
        let (_, bg) = style_colors(BASE_STYLE);
        queue!(self.writer, SetBackgroundColor(bg), Clear(ClearType::All))?;
        Ok(true)
    }
}

// ── Recording device (tests) ──

/// Keeps its own copy of every presented cell, like a screen would.
#[cfg(test)]
pub struct RecordingDevice {
    pub screen: GridBuffer,
    pub presents: Vec<(ScreenRect, (i32, i32))>,
    /// Reported by the next `refresh_size`.
    pub resize_pending: bool,
}

#[cfg(test)]
impl RecordingDevice {
    pub fn new(viewport: crate::domain::geometry::Viewport) -> Self {
        RecordingDevice {
            screen: GridBuffer::new(viewport),
            presents: Vec::new(),
            resize_pending: false,
        }
    }

    pub fn row_text(&self, y: i32) -> String {
        self.screen.row_text(y)
    }
}

#[cfg(test)]
impl Device for RecordingDevice {
    fn present(&mut self, grid: &GridBuffer, region: ScreenRect, origin: (i32, i32)) -> io::Result<()> {
        assert!(!region.is_empty(), "degenerate region presented");
        self.presents.push((region, origin));
        for dy in 0..region.height {
            for dx in 0..region.width {
                if let Some(cell) = grid.get(region.x + dx, region.y + dy) {
                    self.screen.copy_cell(origin.0 + dx, origin.1 + dy, cell);
                }
            }
        }
        Ok(())
    }

    fn refresh_size(&mut self) -> io::Result<bool> {
        Ok(std::mem::take(&mut self.resize_pending))
    }
}
