/// GameState: everything the frame loop owns.
///
/// ## Ownership
///
///   - `world`  : level sequence + active index; camera offsets live per level
///   - `entity` : the single simulated body, in the active level's space
///   - `grid`   : projection of world + entity + HUD, rewritten only inside
///                the dirty region
///   - `dirty`  : cells stale since the last present
///   - `hud`    : screen-fixed texts and counters
///
/// One `GameState` is built at startup and lives until quit. The motion
/// resolver and frame driver take it by `&mut`; nothing is global.

use std::time::Duration;

use crate::domain::entity::{default_sprite, Entity};
use crate::domain::geometry::{anchor_camera, ScreenRect, Viewport};
use crate::domain::glyph::GlyphGrid;
use crate::domain::level::Level;
use crate::domain::physics::PhysicsConstants;
use crate::ui::dirty::DirtyRegion;
use crate::ui::grid::GridBuffer;
use super::frame::FpsMeter;
use super::input::InputTracker;

// ══════════════════════════════════════════════════════════════
// World: level sequence
// ══════════════════════════════════════════════════════════════

pub struct World {
    pub levels: Vec<Level>,
    pub active: usize,
}

impl World {
    /// `levels` must be non-empty (the level loader guarantees it).
    pub fn new(levels: Vec<Level>) -> Self {
        World { levels, active: 0 }
    }

    pub fn active_level(&self) -> &Level {
        &self.levels[self.active]
    }

    pub fn active_level_mut(&mut self) -> &mut Level {
        &mut self.levels[self.active]
    }

    pub fn is_leftmost(&self) -> bool {
        self.active == 0
    }

    pub fn is_rightmost(&self) -> bool {
        self.active + 1 >= self.levels.len()
    }
}

// ══════════════════════════════════════════════════════════════
// HUD
// ══════════════════════════════════════════════════════════════

const FPS_LABEL: &str = "FPS: ";
const TPS_LABEL: &str = "TPS: ";
const FRAME_ROWS: [&str; 4] = [
    "┌─────────┐",
    "│ LVL     │",
    "│  ©  000 │",
    "└─────────┘",
];
const FRAME_WIDTH: i32 = 11;
/// Column of the coin glyph inside the frame.
const COIN_COLUMN: i32 = 3;

/// Screen-fixed glyph block.
#[derive(Clone, Debug)]
pub struct FixedText {
    pub x: i32,
    pub y: i32,
    pub glyphs: GlyphGrid,
}

impl FixedText {
    pub fn rect(&self) -> ScreenRect {
        ScreenRect::new(self.x, self.y, self.glyphs.width() as i32, self.glyphs.height() as i32)
    }
}

/// One-line numeric readout. `span` is the widest text drawn by the last
/// update so a shorter value blanks the leftovers.
#[derive(Clone, Debug)]
pub struct Counter {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub span: usize,
}

impl Counter {
    pub fn new(x: i32, y: i32, text: &str) -> Self {
        Counter { x, y, text: text.to_string(), span: text.chars().count() }
    }

    /// Replace the text. Returns the cells to redraw, or `None` if unchanged.
    pub fn set(&mut self, text: String) -> Option<ScreenRect> {
        if text == self.text {
            return None;
        }
        self.span = self.text.chars().count().max(text.chars().count());
        self.text = text;
        Some(ScreenRect::new(self.x, self.y, self.span as i32, 1))
    }
}

pub struct Hud {
    pub rate_label: FixedText,
    pub frame: FixedText,
    pub fps: Counter,
    pub level: Counter,
    pub tps: bool,
}

impl Hud {
    pub fn new(viewport: Viewport) -> Self {
        let frame = GlyphGrid::from_rows(&FRAME_ROWS).unwrap_or_else(|| GlyphGrid::line("LVL"));
        Hud {
            rate_label: FixedText { x: 0, y: 0, glyphs: GlyphGrid::line(FPS_LABEL) },
            frame: FixedText { x: viewport.width - FRAME_WIDTH, y: 0, glyphs: frame },
            fps: Counter::new(FPS_LABEL.len() as i32, 0, ""),
            level: Counter::new(viewport.width - 5, 1, &level_number(0)),
            tps: false,
        }
    }

    pub fn fixed_texts(&self) -> [&FixedText; 2] {
        [&self.rate_label, &self.frame]
    }

    pub fn counters(&self) -> [&Counter; 2] {
        [&self.fps, &self.level]
    }

    /// Cell of the coin glyph, drawn in the accent style.
    pub fn coin_cell(&self) -> (i32, i32) {
        (self.frame.x + COIN_COLUMN, self.frame.y + 2)
    }

    /// Swap the `FPS:` label for `TPS:` (or back). Returns the label's cells.
    pub fn toggle_tick_label(&mut self) -> ScreenRect {
        self.tps = !self.tps;
        let label = if self.tps { TPS_LABEL } else { FPS_LABEL };
        self.rate_label.glyphs = GlyphGrid::line(label);
        self.rate_label.rect()
    }
}

/// Three-digit, one-based level number.
pub fn level_number(index: usize) -> String {
    format!("{:03}", index + 1)
}

// ══════════════════════════════════════════════════════════════
// GameState
// ══════════════════════════════════════════════════════════════

pub struct GameState {
    pub viewport: Viewport,
    pub physics: PhysicsConstants,
    pub world: World,
    pub entity: Entity,
    pub grid: GridBuffer,
    pub dirty: DirtyRegion,
    pub hud: Hud,
    pub input: InputTracker,
    pub fps: FpsMeter,
    /// Latched by a jump key-down, consumed by the next physics step.
    pub jump_requested: bool,
}

impl GameState {
    /// Entity standing on level 0's spawn block, camera anchored on it,
    /// whole frame pending.
    pub fn new(levels: Vec<Level>, viewport: Viewport, physics: PhysicsConstants, fps_refresh: Duration) -> Self {
        let mut world = World::new(levels);
        let (sx, sy) = world.active_level().spawn_anchor();
        let entity = Entity::new(default_sprite(), sx, sy);

        let level = world.active_level_mut();
        level.camera = anchor_camera(
            entity.rendered.0, entity.rendered.1, entity.height(),
            level.width, level.height, viewport,
        );

        let hud = Hud::new(viewport);
        let mut grid = GridBuffer::new(viewport);
        let (cx, cy) = hud.coin_cell();
        grid.set_accent(cx, cy);

        let mut dirty = DirtyRegion::new(viewport);
        dirty.mark_full_frame();

        GameState {
            viewport,
            physics,
            world,
            entity,
            grid,
            dirty,
            hud,
            input: InputTracker::new(),
            fps: FpsMeter::new(fps_refresh),
            jump_requested: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_span_covers_previous_text() {
        let mut c = Counter::new(5, 0, "");
        assert_eq!(c.set("144".into()), Some(ScreenRect::new(5, 0, 3, 1)));
        assert_eq!(c.set("60".into()), Some(ScreenRect::new(5, 0, 3, 1)));
        assert_eq!(c.span, 3);
        assert_eq!(c.set("60".into()), None);
        assert_eq!(c.set("61".into()), Some(ScreenRect::new(5, 0, 2, 1)));
    }

    #[test]
    fn hud_frame_sits_in_top_right() {
        let hud = Hud::new(Viewport::new(150, 40));
        assert_eq!(hud.frame.rect(), ScreenRect::new(139, 0, 11, 4));
        assert_eq!(hud.coin_cell(), (142, 2));
        assert_eq!(hud.frame.glyphs.get(3, 2), Some('©'));
        assert_eq!((hud.level.x, hud.level.text.as_str()), (145, "001"));
    }

    #[test]
    fn tick_label_toggles_back_and_forth() {
        let mut hud = Hud::new(Viewport::new(150, 40));
        assert_eq!(hud.toggle_tick_label(), ScreenRect::new(0, 0, 5, 1));
        assert_eq!(hud.rate_label.glyphs.get(0, 0), Some('T'));
        hud.toggle_tick_label();
        assert_eq!(hud.rate_label.glyphs.get(0, 0), Some('F'));
    }
}
