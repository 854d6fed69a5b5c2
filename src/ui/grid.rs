/// Grid buffer: the fixed-size character grid the device presents from.
///
/// Each cell is a glyph plus a console-style attribute byte (low nibble =
/// foreground palette index, high nibble = background). The null glyph
/// (`TRANSPARENT`) is the cleared state and presents as a blank.
///
/// Every write takes a `clip` rectangle; callers pass the region they are
/// about to present so nothing outside it is touched.

use crate::domain::geometry::{ScreenRect, Viewport};
use crate::domain::glyph::{GlyphGrid, TRANSPARENT};

/// Black on bright white.
pub const BASE_STYLE: u8 = 0xf0;
/// Gold on bright white, used for the coin glyph.
pub const ACCENT_STYLE: u8 = 0xf6;
/// Applied to every cell by the palette toggle.
pub const PALETTE_MASK: u8 = 0xff;
/// Extra mask on accent cells so they stay coloured after inversion.
pub const ACCENT_MASK: u8 = 0x07;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub glyph: char,
    pub style: u8,
}

impl Cell {
    pub const BLANK: Cell = Cell { glyph: TRANSPARENT, style: BASE_STYLE };
}

pub struct GridBuffer {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    accents: Vec<(i32, i32)>,
}

impl GridBuffer {
    pub fn new(viewport: Viewport) -> Self {
        GridBuffer {
            width: viewport.width,
            height: viewport.height,
            cells: vec![Cell::BLANK; viewport.area()],
            accents: Vec::new(),
        }
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    /// Write the null glyph into every cell of `region`. Styles are kept.
    pub fn clear_region(&mut self, region: ScreenRect) {
        let Some(r) = region.intersect(&self.bounds()) else { return };
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                if let Some(i) = self.idx(x, y) {
                    self.cells[i].glyph = TRANSPARENT;
                }
            }
        }
    }

    /// Copy a glyph block with its top-left at screen `(sx, sy)`, skipping
    /// transparent cells.
    pub fn blit(&mut self, glyphs: &GlyphGrid, sx: i32, sy: i32, clip: ScreenRect) {
        let target = ScreenRect::new(sx, sy, glyphs.width() as i32, glyphs.height() as i32);
        let Some(r) = target.intersect(&clip).and_then(|r| r.intersect(&self.bounds())) else {
            return;
        };
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                let glyph = glyphs.get((x - sx) as usize, (y - sy) as usize);
                if let (Some(g), Some(i)) = (glyph, self.idx(x, y)) {
                    if g != TRANSPARENT {
                        self.cells[i].glyph = g;
                    }
                }
            }
        }
    }

    /// Fill `target` with one opaque glyph.
    pub fn fill(&mut self, target: ScreenRect, glyph: char, clip: ScreenRect) {
        let Some(r) = target.intersect(&clip).and_then(|r| r.intersect(&self.bounds())) else {
            return;
        };
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                if let Some(i) = self.idx(x, y) {
                    self.cells[i].glyph = glyph;
                }
            }
        }
    }

    /// Write `text` on one row and null out the rest of `span` cells.
    pub fn put_text(&mut self, sx: i32, sy: i32, text: &str, span: usize, clip: ScreenRect) {
        let mut chars = text.chars();
        for dx in 0..span.max(text.chars().count()) as i32 {
            let glyph = chars.next().unwrap_or(TRANSPARENT);
            let (x, y) = (sx + dx, sy);
            if !clip.contains(x, y) {
                continue;
            }
            if let Some(i) = self.idx(x, y) {
                self.cells[i].glyph = glyph;
            }
        }
    }

    /// Give the cell at `(x, y)` the accent style and remember it for palette toggles.
    pub fn set_accent(&mut self, x: i32, y: i32) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i].style = ACCENT_STYLE;
            if !self.accents.contains(&(x, y)) {
                self.accents.push((x, y));
            }
        }
    }

    /// Invert every cell's attributes. Applying it twice restores the original.
    pub fn toggle_palette(&mut self) {
        for cell in &mut self.cells {
            cell.style ^= PALETTE_MASK;
        }
        for &(x, y) in &self.accents {
            if let Some(i) = self.idx(x, y) {
                self.cells[i].style ^= ACCENT_MASK;
            }
        }
    }

    pub fn bounds(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width, self.height)
    }

    #[cfg(test)]
    pub fn copy_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    /// One row as a string, null glyphs shown as spaces.
    #[cfg(test)]
    pub fn row_text(&self, y: i32) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|c| if c.glyph == TRANSPARENT { ' ' } else { c.glyph })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridBuffer {
        GridBuffer::new(Viewport::new(10, 4))
    }

    #[test]
    fn blit_clips_to_grid_and_region() {
        let mut g = grid();
        let glyphs = GlyphGrid::from_rows(&["abc", "def"]).unwrap();
        g.blit(&glyphs, 8, -1, g.bounds());
        assert_eq!(g.row_text(0), "        de");
        let mut g = grid();
        g.blit(&glyphs, 0, 0, ScreenRect::new(1, 0, 1, 1));
        assert_eq!(g.row_text(0), " b        ");
        assert_eq!(g.row_text(1), "          ");
    }

    #[test]
    fn transparent_cells_show_through() {
        let mut g = grid();
        g.fill(ScreenRect::new(0, 0, 3, 1), '#', g.bounds());
        let sprite = GlyphGrid::from_rows_with(&[" O "], Some(' ')).unwrap();
        g.blit(&sprite, 0, 0, g.bounds());
        assert_eq!(&g.row_text(0)[..3], "#O#");
    }

    #[test]
    fn clear_region_only_touches_region() {
        let mut g = grid();
        g.fill(g.bounds(), 'x', g.bounds());
        g.clear_region(ScreenRect::new(2, 1, 3, 2));
        assert_eq!(g.row_text(0), "xxxxxxxxxx");
        assert_eq!(g.row_text(1), "xx   xxxxx");
        assert_eq!(g.row_text(2), "xx   xxxxx");
    }

    #[test]
    fn put_text_clears_leftover_span() {
        let mut g = grid();
        g.put_text(0, 0, "1234", 4, g.bounds());
        g.put_text(0, 0, "56", 4, g.bounds());
        assert_eq!(&g.row_text(0)[..4], "56  ");
    }

    #[test]
    fn palette_toggle_is_reversible() {
        let mut g = grid();
        g.set_accent(3, 2);
        g.toggle_palette();
        assert_eq!(g.get(0, 0).map(|c| c.style), Some(0x0f));
        assert_eq!(g.get(3, 2).map(|c| c.style), Some(0xf6 ^ 0xff ^ 0x07));
        g.toggle_palette();
        assert_eq!(g.get(0, 0).map(|c| c.style), Some(BASE_STYLE));
        assert_eq!(g.get(3, 2).map(|c| c.style), Some(ACCENT_STYLE));
    }
}
