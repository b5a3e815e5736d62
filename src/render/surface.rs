//! Cell-grid drawing surface.
//!
//! Owner-drawn widgets (list rows, progress bars, separators, labels)
//! render into a `Surface`: a flat row-major grid of styled cells that is
//! flushed to the terminal in one pass. All drawing operations clip
//! against an explicit rectangle, so a widget can never paint outside the
//! region the dispatcher handed it.

use std::io::Write;

use crossterm::style::{Attribute, Color};
use crossterm::{cursor, queue, style};

use crate::render::text::string_width;
use crate::types::Rect;

// =============================================================================
// Cells & styles
// =============================================================================

/// Foreground/background plus the two attributes the runtime uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub underline: bool,
}

impl Style {
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            bold: false,
            underline: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(Color::Reset, Color::Reset)
    }
}

/// One terminal cell. Wide graphemes occupy their first cell; the cells
/// they spill into keep whatever was there (the flush pass skips them).
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub symbol: String,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: " ".to_string(),
            style: Style::default(),
        }
    }
}

// =============================================================================
// Surface
// =============================================================================

/// A 2D buffer of terminal cells with row-major flat storage.
#[derive(Debug, Clone)]
pub struct Surface {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Surface {
    pub fn new(width: i32, height: i32) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        Self {
            width: w,
            height: h,
            cells: vec![Cell::default(); (w * h) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Resize the surface, clearing its contents.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(0);
        self.height = height.max(0);
        self.cells.clear();
        self.cells
            .resize((self.width * self.height) as usize, Cell::default());
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Fill `rect` (clipped to `clip` and the surface) with a styled space.
    pub fn fill(&mut self, rect: Rect, clip: Rect, style: Style) {
        let area = rect.intersect(&clip).intersect(&self.bounds());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let idx = self.index(x, y);
                self.cells[idx] = Cell {
                    symbol: " ".to_string(),
                    style,
                };
            }
        }
    }

    /// Draw `text` starting at (x, y), clipping against `clip`.
    ///
    /// The caller is responsible for pre-ellipsizing; anything that still
    /// overflows the clip rectangle is dropped cell by cell.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, clip: Rect, style: Style) {
        let area = clip.intersect(&self.bounds());
        if y < area.y || y >= area.bottom() {
            return;
        }
        let mut cx = x;
        for grapheme in unicode_segmentation::UnicodeSegmentation::graphemes(text, true) {
            let gw = string_width(grapheme);
            if gw == 0 {
                continue;
            }
            if cx >= area.right() {
                break;
            }
            // Partially clipped wide grapheme: skip it, keep advancing.
            if cx >= area.x && cx + gw <= area.right() {
                let idx = self.index(cx, y);
                self.cells[idx] = Cell {
                    symbol: grapheme.to_string(),
                    style,
                };
                // Blank the spill cells of a wide grapheme.
                for extra in 1..gw {
                    let idx = self.index(cx + extra, y);
                    self.cells[idx] = Cell {
                        symbol: String::new(),
                        style,
                    };
                }
            }
            cx += gw;
        }
    }

    /// Draw a single-cell-thick horizontal rule.
    pub fn draw_hline(&mut self, x: i32, y: i32, len: i32, clip: Rect, style: Style) {
        let area = clip.intersect(&self.bounds());
        if y < area.y || y >= area.bottom() {
            return;
        }
        for cx in x..x + len.max(0) {
            if cx < area.x || cx >= area.right() {
                continue;
            }
            let idx = self.index(cx, y);
            self.cells[idx] = Cell {
                symbol: "─".to_string(),
                style,
            };
        }
    }

    /// Flush the whole surface to `out` with crossterm commands.
    ///
    /// Unconditional full-frame write; the caller decides when a frame is
    /// worth flushing.
    pub fn flush(&self, out: &mut impl Write) -> std::io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let mut current = Style::default();
        queue!(out, style::ResetColor)?;
        for y in 0..self.height {
            queue!(out, cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let cell = &self.cells[self.index(x, y)];
                if cell.symbol.is_empty() {
                    // Spill cell of a wide grapheme; already covered.
                    continue;
                }
                if cell.style != current {
                    queue!(out, style::ResetColor)?;
                    queue!(out, style::SetForegroundColor(cell.style.fg))?;
                    queue!(out, style::SetBackgroundColor(cell.style.bg))?;
                    if cell.style.bold {
                        queue!(out, style::SetAttribute(Attribute::Bold))?;
                    } else {
                        queue!(out, style::SetAttribute(Attribute::NormalIntensity))?;
                    }
                    if cell.style.underline {
                        queue!(out, style::SetAttribute(Attribute::Underlined))?;
                    } else {
                        queue!(out, style::SetAttribute(Attribute::NoUnderline))?;
                    }
                    current = cell.style;
                }
                queue!(out, style::Print(&cell.symbol))?;
            }
        }
        out.flush()
    }
}
