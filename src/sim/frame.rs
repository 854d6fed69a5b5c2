/// Frame driver.
///
/// The outer loop calls, once per iteration:
///
/// ```text
///   advance(dt)          FPS readout, jump, held-direction moves, vertical step
///   present_pending()    compose + present the dirty region, if any
///   consume_input(..)    held set, fresh-press actions
/// ```
///
/// `dt` is the wall time since the previous iteration, unclamped: a long
/// stall produces one large step, and the collision sweep keeps it from
/// tunnelling.

use std::io;
use std::time::Duration;

use tracing::debug;

use crate::ui::compose::compose_region;
use crate::ui::renderer::Device;
use super::event::GameEvent;
use super::input::{Action, KeyTransition, KEYS_LEFT, KEYS_RIGHT};
use super::motion::{apply_horizontal, apply_vertical};
use super::world::GameState;

// ══════════════════════════════════════════════════════════════
// FPS meter
// ══════════════════════════════════════════════════════════════

/// Counts frames and reports a rate once at least `refresh` has passed.
pub struct FpsMeter {
    refresh: Duration,
    elapsed: Duration,
    frames: u32,
}

impl FpsMeter {
    pub fn new(refresh: Duration) -> Self {
        FpsMeter { refresh, elapsed: Duration::ZERO, frames: 0 }
    }

    /// Record one frame of length `dt`. Returns `frames * 1000 / ms` when the
    /// window closes, then starts a new window. A zero-length frame (the
    /// loop's first) is not counted.
    pub fn tick(&mut self, dt: Duration) -> Option<u32> {
        if dt.is_zero() {
            return None;
        }
        self.elapsed += dt;
        self.frames += 1;
        let ms = self.elapsed.as_millis();
        if ms == 0 || self.elapsed < self.refresh {
            return None;
        }
        let rate = (u128::from(self.frames) * 1000 / ms) as u32;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(rate)
    }
}

// ══════════════════════════════════════════════════════════════
// Advance
// ══════════════════════════════════════════════════════════════

/// One simulation step of `dt`. Returns what happened, in order.
pub fn advance(state: &mut GameState, dt: Duration) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let secs = dt.as_secs_f64();

    if let Some(rate) = state.fps.tick(dt) {
        if let Some(cells) = state.hud.fps.set(rate.to_string()) {
            state.dirty.mark_rect(cells);
        }
        events.push(GameEvent::FpsRefreshed(rate));
    }

    if std::mem::take(&mut state.jump_requested) && state.entity.try_jump(&state.physics) {
        events.push(GameEvent::Jumped);
    }

    // Both directions held means both moves apply.
    let step = state.physics.horizontal_speed * secs;
    if state.input.any_held(KEYS_LEFT) {
        apply_horizontal(state, -step, &mut events);
    }
    if state.input.any_held(KEYS_RIGHT) {
        apply_horizontal(state, step, &mut events);
    }

    let dy = state.physics.displacement(state.entity.vertical_velocity, secs);
    apply_vertical(state, dy, &mut events);
    state.entity.advance_airborne(secs, &state.physics);

    events
}

// ══════════════════════════════════════════════════════════════
// Present
// ══════════════════════════════════════════════════════════════

/// Compose and present the pending region. Returns `false` when nothing was dirty.
/// A device resize invalidates everything it shows.
pub fn present_pending<D: Device>(state: &mut GameState, device: &mut D) -> io::Result<bool> {
    if device.refresh_size()? {
        debug!("output resized");
        state.dirty.mark_full_frame();
    }
    let Some(region) = state.dirty.take_pending() else {
        return Ok(false);
    };
    compose_region(
        &mut state.grid,
        state.world.active_level(),
        &state.entity,
        &state.hud,
        state.viewport,
        region,
    );
    device.present(&state.grid, region, (region.x, region.y))?;
    Ok(true)
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Control {
    Continue,
    Quit,
}

/// Feed one frame's key transitions. Quit stops processing the rest.
pub fn consume_input(
    state: &mut GameState,
    transitions: &[KeyTransition],
    events: &mut Vec<GameEvent>,
) -> Control {
    for action in state.input.consume(transitions) {
        match action {
            Action::Quit => return Control::Quit,
            Action::Jump => state.jump_requested = true,
            Action::TogglePalette => {
                state.grid.toggle_palette();
                state.dirty.mark_full_frame();
                events.push(GameEvent::PaletteToggled);
            }
            Action::ToggleTickLabel => {
                let cells = state.hud.toggle_tick_label();
                state.dirty.mark_rect(cells);
                events.push(GameEvent::TickLabelToggled { tps: state.hud.tps });
            }
        }
    }
    Control::Continue
}

/// Transitions and deaths are already logged where they happen.
pub fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::FpsRefreshed(rate) => debug!(rate, "fps refreshed"),
            GameEvent::LevelChanged { .. } | GameEvent::Died { .. } => {}
            other => debug!(event = ?other),
        }
    }
}
