/// Motion resolver: moves the entity one axis at a time against the active
/// level's obstacles, then keeps camera and dirty region in step.
///
/// Per call:
///   1. Tentative position = current + distance
///   2. Horizontal only: clamp at the ends of the level sequence, otherwise
///      crossing a level edge switches level and re-bases the position
///   3. Sweep obstacles that overlap the entity on the other axis; any whose
///      span meets the traversed span pushes the entity back to its leading
///      face (right/top-moving: lowest face wins, left/down-moving: highest)
///   4. Round; re-anchor the camera; mark the full frame if the camera moved,
///      otherwise only the union of the old and new entity cells
///
/// Vertical calls also drive the ground state and the fall-out-of-world reset.
/// The two axes never touch each other's velocity.

use tracing::info;

use crate::domain::geometry::{anchor_camera, screen_rect_of, spans_overlap};
use super::event::GameEvent;
use super::world::{level_number, GameState};

// ══════════════════════════════════════════════════════════════
// Horizontal
// ══════════════════════════════════════════════════════════════

pub fn apply_horizontal(state: &mut GameState, distance: f64, events: &mut Vec<GameEvent>) {
    if distance == 0.0 {
        return;
    }

    // `trail` is where the sweep starts, re-based with the position on a switch.
    let mut trail = state.entity.hitbox.x;
    let mut x = trail + distance;

    let width = state.world.active_level().width as f64;
    if x < 0.0 && !state.world.is_leftmost() {
        let to = state.world.active - 1;
        let shift = state.world.levels[to].width as f64;
        x += shift;
        trail += shift;
        enter_level(state, to, events);
    } else if x >= width && !state.world.is_rightmost() {
        let to = state.world.active + 1;
        x -= width;
        trail -= width;
        enter_level(state, to, events);
    }

    let body = state.entity.hitbox;
    let level = state.world.active_level();
    if state.world.is_leftmost() {
        x = x.max(0.0);
    }
    if state.world.is_rightmost() {
        x = x.min((level.width as f64 - body.width).max(0.0));
    }

    let tentative = x;
    for o in level.obstacles() {
        if !o.overlaps_y(&body) {
            continue;
        }
        if distance > 0.0 {
            if spans_overlap(trail, tentative + body.width, o.x, o.right()) {
                x = x.min(o.x - body.width);
            }
        } else if spans_overlap(tentative, trail + body.width, o.x, o.right()) {
            x = x.max(o.right());
        }
    }

    state.entity.hitbox.x = x;
    refresh_view(state);
}

// ══════════════════════════════════════════════════════════════
// Vertical
// ══════════════════════════════════════════════════════════════

pub fn apply_vertical(state: &mut GameState, distance: f64, events: &mut Vec<GameEvent>) {
    if distance == 0.0 {
        return;
    }

    let body = state.entity.hitbox;
    let tentative = body.y + distance;
    let mut y = tentative;
    let mut contact = false;

    for o in state.world.active_level().obstacles() {
        if !o.overlaps_x(&body) {
            continue;
        }
        if distance < 0.0 {
            if spans_overlap(tentative, body.top(), o.y, o.top()) {
                y = y.max(o.top());
                contact = true;
            }
        } else if spans_overlap(body.y, tentative + body.height, o.y, o.top()) {
            y = y.min(o.y - body.height);
            contact = true;
        }
    }

    state.entity.hitbox.y = y;

    let was_grounded = state.entity.is_on_ground();
    if distance < 0.0 && contact {
        state.entity.land();
        if !was_grounded {
            events.push(GameEvent::Landed);
        }
    } else {
        state.entity.leave_ground();
        if was_grounded {
            events.push(GameEvent::LeftGround);
        }
        if contact && state.entity.vertical_velocity > 0.0 {
            state.entity.vertical_velocity = 0.0;
        }
    }

    if state.entity.hitbox.y < 0.0 {
        respawn(state, events);
        return;
    }

    refresh_view(state);
}

// ══════════════════════════════════════════════════════════════
// Level switch / reset
// ══════════════════════════════════════════════════════════════

/// Make `to` the active level. The caller has already re-based the position.
fn enter_level(state: &mut GameState, to: usize, events: &mut Vec<GameEvent>) {
    let from = state.world.active;
    state.world.active = to;
    state.hud.level.set(level_number(to));
    state.dirty.mark_full_frame();
    info!(from, to, "level transition");
    events.push(GameEvent::LevelChanged { from, to });
}

/// Fell out of the world: back onto the active level's spawn block.
pub fn respawn(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let level_index = state.world.active;
    let (sx, sy) = state.world.active_level().spawn_anchor();
    state.entity.respawn(sx, sy);
    state.jump_requested = false;

    let (rx, ry) = state.entity.rendered;
    let height = state.entity.height();
    let viewport = state.viewport;
    let level = state.world.active_level_mut();
    level.camera = anchor_camera(rx, ry, height, level.width, level.height, viewport);

    state.dirty.mark_full_frame();
    info!(level = level_index, x = sx, y = sy, "entity fell out of the world");
    events.push(GameEvent::Died { level: level_index });
}

// ══════════════════════════════════════════════════════════════
// Camera + dirty cells
// ══════════════════════════════════════════════════════════════

fn refresh_view(state: &mut GameState) {
    let new = state.entity.rounded();
    let old = state.entity.rendered;
    let (w, h) = (state.entity.width(), state.entity.height());
    let viewport = state.viewport;

    let level = state.world.active_level_mut();
    let camera = anchor_camera(new.0, new.1, h, level.width, level.height, viewport);
    if camera != level.camera {
        level.camera = camera;
        state.dirty.mark_full_frame();
    } else if new != old {
        let vacated = screen_rect_of(old.0, old.1, w, h, camera, viewport);
        let covered = screen_rect_of(new.0, new.1, w, h, camera, viewport);
        state.dirty.mark_rect(vacated.union(&covered));
    }
    state.entity.rendered = new;
}
