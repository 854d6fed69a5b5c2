/// Fixed-size 2D glyph blocks (decorative texts, sprites, HUD frames).
///
/// `TRANSPARENT` cells are skipped when a grid is drawn, so whatever is
/// underneath shows through.

pub const TRANSPARENT: char = '\0';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl GlyphGrid {
    /// Build from equal-width rows. Returns `None` if any row's char count
    /// differs from the first row's or there are no rows.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        Self::from_rows_with(rows, None)
    }

    /// Like [`from_rows`](Self::from_rows), mapping `transparent` to
    /// [`TRANSPARENT`].
    pub fn from_rows_with(rows: &[&str], transparent: Option<char>) -> Option<Self> {
        let width = rows.first()?.chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in rows {
            let before = cells.len();
            cells.extend(row.chars().map(|c| match transparent {
                Some(t) if c == t => TRANSPARENT,
                _ => c,
            }));
            if cells.len() - before != width {
                return None;
            }
        }
        Some(GlyphGrid { width, height: rows.len(), cells })
    }

    /// Single-line grid.
    pub fn line(text: &str) -> Self {
        let cells: Vec<char> = text.chars().collect();
        GlyphGrid { width: cells.len(), height: 1, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }
}
