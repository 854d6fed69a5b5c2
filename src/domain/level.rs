/// Level geometry: decorative texts, glyph-filled blocks, invisible colliders.
///
/// Everything here is immutable after load except `camera`, which only the
/// motion resolver writes while the level is active.

use super::geometry::{Camera, Rect};
use super::glyph::GlyphGrid;

/// Read-only glyph block placed in world space (lower-left corner at `x, y`).
#[derive(Clone, Debug)]
pub struct DecorativeText {
    pub x: i32,
    pub y: i32,
    pub glyphs: GlyphGrid,
}

impl DecorativeText {
    pub fn height(&self) -> i32 {
        self.glyphs.height() as i32
    }
}

/// Solid obstacle drawn as a rectangle of one glyph.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub rect: Rect,
    pub glyph: char,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub width: i32,
    pub height: i32,
    pub camera: Camera,
    pub texts: Vec<DecorativeText>,
    pub blocks: Vec<Block>,
    pub colliders: Vec<Rect>,
}

impl Level {
    /// Every static obstacle: visible blocks first, then invisible colliders.
    pub fn obstacles(&self) -> impl Iterator<Item = &Rect> + '_ {
        self.blocks.iter().map(|b| &b.rect).chain(self.colliders.iter())
    }

    /// Where the entity appears after a reset: on top of the first block.
    /// Falls back to the origin for a level with no blocks (rejected by the loader).
    pub fn spawn_anchor(&self) -> (f64, f64) {
        self.blocks
            .first()
            .map(|b| (b.rect.x, b.rect.top()))
            .unwrap_or((0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Level {
        Level {
            width: 200,
            height: 40,
            camera: Camera::default(),
            texts: vec![],
            blocks: vec![
                Block { rect: Rect::new(4.0, 0.0, 20.0, 3.0), glyph: '#' },
                Block { rect: Rect::new(40.0, 0.0, 20.0, 6.0), glyph: '#' },
            ],
            colliders: vec![Rect::new(199.0, 0.0, 1.0, 40.0)],
        }
    }

    #[test]
    fn spawn_sits_on_first_block() {
        assert_eq!(level().spawn_anchor(), (4.0, 3.0));
    }

    #[test]
    fn obstacles_include_colliders() {
        let l = level();
        assert_eq!(l.obstacles().count(), 3);
        assert_eq!(l.obstacles().last().map(|r| r.x), Some(199.0));
    }
}
