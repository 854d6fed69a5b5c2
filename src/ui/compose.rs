/// Composes the grid inside one screen region from the game state.
///
/// ## Layer order (later wins)
///
///   1. clear to the null glyph
///   2. decorative texts of the active level
///   3. entity sprite (transparent cells show layer 2)
///   4. blocks
///   5. screen-fixed HUD texts
///   6. HUD counters
///
/// Everything is clipped to `region`; cells outside it keep whatever the
/// device already shows.

use crate::domain::entity::Entity;
use crate::domain::geometry::{screen_rect_of, world_to_screen, Rect, ScreenRect, Viewport};
use crate::domain::level::Level;
use crate::sim::world::Hud;
use super::grid::GridBuffer;

pub fn compose_region(
    grid: &mut GridBuffer,
    level: &Level,
    entity: &Entity,
    hud: &Hud,
    viewport: Viewport,
    region: ScreenRect,
) {
    let camera = level.camera;
    grid.clear_region(region);

    for text in &level.texts {
        let (sx, sy) = world_to_screen(text.x, text.y, text.height(), camera, viewport);
        grid.blit(&text.glyphs, sx, sy, region);
    }

    let (ex, ey) = entity.rendered;
    let (sx, sy) = world_to_screen(ex, ey, entity.height(), camera, viewport);
    grid.blit(&entity.sprite, sx, sy, region);

    for block in &level.blocks {
        let (x, y, w, h) = cells_of(&block.rect);
        grid.fill(screen_rect_of(x, y, w, h, camera, viewport), block.glyph, region);
    }

    for text in hud.fixed_texts() {
        grid.blit(&text.glyphs, text.x, text.y, region);
    }
    for counter in hud.counters() {
        grid.put_text(counter.x, counter.y, &counter.text, counter.span, region);
    }
}

/// World rectangle snapped to whole cells.
fn cells_of(r: &Rect) -> (i32, i32, i32, i32) {
    (
        r.x.round() as i32,
        r.y.round() as i32,
        r.width.round() as i32,
        r.height.round() as i32,
    )
}
