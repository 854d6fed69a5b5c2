/// The controlled entity: hitbox, sprite, and the grounded/airborne state machine.
///
/// ```text
///   Grounded ──(sweep finds no floor)──▶ Airborne
///   Airborne ──(lands on a top face)───▶ Grounded   vy = GROUNDED_VELOCITY, coyote = 0
///   jump: Grounded, or Airborne with coyote < coyote_time
///         ─▶ Airborne, vy = jump_speed, coyote = coyote_time
/// ```

use super::geometry::Rect;
use super::glyph::GlyphGrid;
use super::physics::{PhysicsConstants, GROUNDED_VELOCITY};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GroundState {
    Grounded,
    Airborne,
}

#[derive(Clone, Debug)]
pub struct Entity {
    /// Continuous position and size, in the active level's world space.
    pub hitbox: Rect,
    /// Rounded position last drawn to the grid.
    pub rendered: (i32, i32),
    pub vertical_velocity: f64,
    pub ground: GroundState,
    /// Seconds since leaving the ground.
    pub coyote_counter: f64,
    pub sprite: GlyphGrid,
}

impl Entity {
    /// Standing entity whose hitbox matches the sprite size.
    pub fn new(sprite: GlyphGrid, x: f64, y: f64) -> Self {
        let hitbox = Rect::new(x, y, sprite.width() as f64, sprite.height() as f64);
        let mut e = Entity {
            hitbox,
            rendered: (0, 0),
            vertical_velocity: GROUNDED_VELOCITY,
            ground: GroundState::Grounded,
            coyote_counter: 0.0,
            sprite,
        };
        e.rendered = e.rounded();
        e
    }

    pub fn is_on_ground(&self) -> bool {
        self.ground == GroundState::Grounded
    }

    /// `round(position)`.
    pub fn rounded(&self) -> (i32, i32) {
        (self.hitbox.x.round() as i32, self.hitbox.y.round() as i32)
    }

    pub fn width(&self) -> i32 {
        self.sprite.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.sprite.height() as i32
    }

    pub fn can_jump(&self, c: &PhysicsConstants) -> bool {
        self.is_on_ground() || self.coyote_counter < c.coyote_time
    }

    /// Start a jump if allowed. The coyote counter is saturated so the same
    /// grace window cannot be used twice.
    pub fn try_jump(&mut self, c: &PhysicsConstants) -> bool {
        if !self.can_jump(c) {
            return false;
        }
        self.vertical_velocity = c.jump_speed;
        self.ground = GroundState::Airborne;
        self.coyote_counter = c.coyote_time;
        true
    }

    /// Lower edge met a top face while moving down.
    pub fn land(&mut self) {
        self.ground = GroundState::Grounded;
        self.vertical_velocity = GROUNDED_VELOCITY;
        self.coyote_counter = 0.0;
    }

    pub fn leave_ground(&mut self) {
        self.ground = GroundState::Airborne;
    }

    /// Post-displacement bookkeeping: only airborne entities accumulate
    /// coyote time and gravity.
    pub fn advance_airborne(&mut self, dt: f64, c: &PhysicsConstants) {
        if self.ground == GroundState::Airborne {
            self.coyote_counter += dt;
            self.vertical_velocity += c.gravity * dt;
        }
    }

    /// Put the entity back at `(x, y)`, standing, already drawn there.
    pub fn respawn(&mut self, x: f64, y: f64) {
        self.hitbox.x = x;
        self.hitbox.y = y;
        self.land();
        self.rendered = self.rounded();
    }
}

/// Default sprite: a 3x3 stick figure with transparent corners.
pub fn default_sprite() -> GlyphGrid {
    GlyphGrid::from_rows_with(&[" O ", "/|\\", "/ \\"], Some(' '))
        .unwrap_or_else(|| GlyphGrid::line("@"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airborne_with(coyote: f64) -> Entity {
        let mut e = Entity::new(default_sprite(), 0.0, 10.0);
        e.leave_ground();
        e.coyote_counter = coyote;
        e
    }

    #[test]
    fn hitbox_matches_sprite() {
        let e = Entity::new(default_sprite(), 2.4, 3.6);
        assert_eq!((e.hitbox.width, e.hitbox.height), (3.0, 3.0));
        assert_eq!(e.rendered, (2, 4));
    }

    #[test]
    fn jump_inside_coyote_window_succeeds() {
        let c = PhysicsConstants::default();
        let mut e = airborne_with(c.coyote_time - 1e-6);
        assert!(e.try_jump(&c));
        assert_eq!(e.vertical_velocity, c.jump_speed);
        assert_eq!(e.ground, GroundState::Airborne);
    }

    #[test]
    fn jump_after_coyote_window_is_rejected() {
        let c = PhysicsConstants::default();
        let mut e = airborne_with(c.coyote_time + 1e-6);
        let vy = e.vertical_velocity;
        assert!(!e.try_jump(&c));
        assert_eq!(e.vertical_velocity, vy);
    }

    #[test]
    fn grace_window_cannot_be_reused() {
        let c = PhysicsConstants::default();
        let mut e = airborne_with(0.0);
        assert!(e.try_jump(&c));
        assert!(!e.try_jump(&c));
    }

    #[test]
    fn grounded_jump_always_allowed() {
        let c = PhysicsConstants::default();
        let mut e = Entity::new(default_sprite(), 0.0, 3.0);
        e.coyote_counter = 5.0;
        assert!(e.try_jump(&c));
    }

    #[test]
    fn landing_resets_velocity_and_coyote() {
        let mut e = airborne_with(0.07);
        e.vertical_velocity = -250.0;
        e.land();
        assert!(e.is_on_ground());
        assert_eq!(e.vertical_velocity, GROUNDED_VELOCITY);
        assert_eq!(e.coyote_counter, 0.0);
    }

    #[test]
    fn grounded_entity_does_not_accumulate() {
        let c = PhysicsConstants::default();
        let mut e = Entity::new(default_sprite(), 0.0, 3.0);
        e.advance_airborne(0.5, &c);
        assert_eq!(e.vertical_velocity, GROUNDED_VELOCITY);
        assert_eq!(e.coyote_counter, 0.0);
    }

    #[test]
    fn airborne_entity_accelerates_down() {
        let c = PhysicsConstants::default();
        let mut e = airborne_with(0.0);
        e.vertical_velocity = 0.0;
        e.advance_airborne(0.1, &c);
        assert!((e.vertical_velocity - c.gravity * 0.1).abs() < 1e-12);
        assert!((e.coyote_counter - 0.1).abs() < 1e-12);
    }
}
