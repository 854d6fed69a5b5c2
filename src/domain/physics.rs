/// Jump/gravity tuning.
///
/// ## Jump arc
///
/// A jump launched at `jump_speed` under `gravity` while moving at
/// `horizontal_speed` peaks `h` units up after travelling `d` units across:
///
/// ```text
///   jump_speed =  2 h v / d
///   gravity    = -2 h v² / d²
/// ```
///
/// The compiled defaults below are fixed design values; `config.toml` may
/// supply a different arc, converted once at load.
///
/// ## Integration (per frame, variable dt)
///
/// ```text
///   dy = vy·dt + g·dt²/2        (applied through the motion resolver)
///   if airborne: coyote += dt; vy += g·dt
/// ```

pub const HORIZONTAL_SPEED: f64 = 20.0;
pub const JUMP_HEIGHT: f64 = 6.0;
pub const JUMP_DISTANCE: f64 = 8.0;
pub const COYOTE_TIME: f64 = 0.1;

pub const JUMP_SPEED: f64 = 2.0 * JUMP_HEIGHT * HORIZONTAL_SPEED / JUMP_DISTANCE;
pub const GRAVITY: f64 =
    -2.0 * JUMP_HEIGHT * HORIZONTAL_SPEED * HORIZONTAL_SPEED / (JUMP_DISTANCE * JUMP_DISTANCE);

/// Vertical velocity while standing. Slightly negative so every frame's sweep
/// re-detects the floor.
pub const GROUNDED_VELOCITY: f64 = -1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConstants {
    pub horizontal_speed: f64,
    pub jump_speed: f64,
    pub gravity: f64,
    pub coyote_time: f64,
}

impl PhysicsConstants {
    /// Derive `jump_speed` / `gravity` for an apex of `height` reached after
    /// `distance` units at `horizontal_speed`.
    pub fn from_jump_arc(horizontal_speed: f64, height: f64, distance: f64, coyote_time: f64) -> Self {
        PhysicsConstants {
            horizontal_speed,
            jump_speed: 2.0 * height * horizontal_speed / distance,
            gravity: -2.0 * height * horizontal_speed * horizontal_speed / (distance * distance),
            coyote_time,
        }
    }

    /// Vertical displacement over `dt` starting at velocity `vy`.
    #[inline]
    pub fn displacement(&self, vy: f64, dt: f64) -> f64 {
        vy * dt + self.gravity * dt * dt / 2.0
    }
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        PhysicsConstants {
            horizontal_speed: HORIZONTAL_SPEED,
            jump_speed: JUMP_SPEED,
            gravity: GRAVITY,
            coyote_time: COYOTE_TIME,
        }
    }
}
