//! Player controller: turns held keys into body velocity

use glam::Vec3;

use super::physics::PhysicsWorld;
use crate::consts::*;
use crate::platform::input::{Action, KeyState};
use crate::tuning::Tuning;

/// Whether a body at `position` moving at `velocity` stands on the floor
#[inline]
pub fn is_grounded(position: Vec3, velocity: Vec3) -> bool {
    position.y <= GROUND_DETECT_Y && velocity.y.abs() < GROUND_SPEED_EPSILON
}

/// Per-run player state that is not owned by the physics body
#[derive(Debug, Clone, Default)]
pub struct PlayerController {
    jump_count: u8,
}

impl PlayerController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jumps spent since the last landing
    #[inline]
    pub fn jump_count(&self) -> u8 {
        self.jump_count
    }

    pub fn reset(&mut self) {
        self.jump_count = 0;
    }

    /// Apply one frame of control to the body.
    ///
    /// Consumes the latched jump request whether or not the jump is allowed.
    /// Returns whether a jump fired.
    pub fn update<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        keys: &mut KeyState,
        tuning: &Tuning,
    ) -> bool {
        let mut velocity = world.velocity();
        velocity.z = -tuning.forward_speed;
        velocity.x *= tuning.lateral_damping;
        if keys.is_held(Action::Left) {
            velocity.x = -tuning.strafe_speed;
        }
        if keys.is_held(Action::Right) {
            velocity.x = tuning.strafe_speed;
        }

        let mut jumped = false;
        if keys.take_jump() {
            if self.jump_count < tuning.max_jumps {
                velocity.y = tuning.jump_velocity;
                self.jump_count += 1;
                jumped = true;
                log::debug!("Jump {}/{}", self.jump_count, tuning.max_jumps);
            } else {
                log::debug!("Jump rejected, {} already used", self.jump_count);
            }
        }
        world.set_velocity(velocity);

        let mut position = world.position();
        if is_grounded(position, velocity) {
            self.jump_count = 0;
        }

        let limit = tuning.corridor_half_width;
        if position.x.abs() > limit {
            position.x = position.x.clamp(-limit, limit);
            world.set_position(position);
        }
        jumped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::SimpleWorld;

    fn airborne_world() -> SimpleWorld {
        let mut world = SimpleWorld::bottomless(Vec3::new(0.0, 8.0, 0.0));
        world.set_velocity(Vec3::new(0.0, -1.0, 0.0));
        world
    }

    #[test]
    fn test_forward_speed_always_applied() {
        let mut world = SimpleWorld::default();
        let mut keys = KeyState::new();
        PlayerController::new().update(&mut world, &mut keys, &Tuning::default());
        assert_eq!(world.velocity().z, -FORWARD_SPEED);
    }

    #[test]
    fn test_strafe_and_damping() {
        let tuning = Tuning::default();
        let mut world = SimpleWorld::default();
        let mut keys = KeyState::new();
        let mut player = PlayerController::new();

        keys.press(Action::Left);
        player.update(&mut world, &mut keys, &tuning);
        assert_eq!(world.velocity().x, -STRAFE_SPEED);

        // Right wins when both are held
        keys.press(Action::Right);
        player.update(&mut world, &mut keys, &tuning);
        assert_eq!(world.velocity().x, STRAFE_SPEED);

        keys.clear();
        player.update(&mut world, &mut keys, &tuning);
        assert!((world.velocity().x - STRAFE_SPEED * LATERAL_DAMPING).abs() < 1e-6);
    }

    #[test]
    fn test_double_jump_then_rejected() {
        let tuning = Tuning::default();
        let mut world = airborne_world();
        let mut keys = KeyState::new();
        let mut player = PlayerController::new();

        for expected in 1..=2 {
            keys.press(Action::Jump);
            assert!(player.update(&mut world, &mut keys, &tuning));
            keys.release(Action::Jump);
            assert_eq!(player.jump_count(), expected);
            assert_eq!(world.velocity().y, JUMP_VELOCITY);
        }

        world.set_velocity(Vec3::new(0.0, -2.0, 0.0));
        keys.press(Action::Jump);
        assert!(!player.update(&mut world, &mut keys, &tuning));
        assert_eq!(player.jump_count(), 2);
        assert_eq!(world.velocity().y, -2.0);
        // The rejected request does not linger
        assert!(!keys.take_jump());
    }

    #[test]
    fn test_landing_restores_jumps() {
        let tuning = Tuning::default();
        let mut world = airborne_world();
        let mut keys = KeyState::new();
        let mut player = PlayerController::new();

        keys.press(Action::Jump);
        player.update(&mut world, &mut keys, &tuning);
        assert_eq!(player.jump_count(), 1);

        world.set_position(Vec3::new(0.0, 1.1, -10.0));
        world.set_velocity(Vec3::ZERO);
        player.update(&mut world, &mut keys, &tuning);
        assert_eq!(player.jump_count(), 0);
    }

    #[test]
    fn test_lateral_clamp() {
        let mut world = SimpleWorld::default();
        world.set_position(Vec3::new(7.0, 2.0, -5.0));
        PlayerController::new().update(&mut world, &mut KeyState::new(), &Tuning::default());
        assert_eq!(world.position().x, CORRIDOR_HALF_WIDTH);
        world.set_position(Vec3::new(-9.0, 2.0, -5.0));
        PlayerController::new().update(&mut world, &mut KeyState::new(), &Tuning::default());
        assert_eq!(world.position().x, -CORRIDOR_HALF_WIDTH);
    }

    #[test]
    fn test_grounded_thresholds() {
        assert!(is_grounded(Vec3::new(0.0, 1.1, 0.0), Vec3::ZERO));
        assert!(is_grounded(Vec3::new(0.0, 2.01, 0.0), Vec3::new(0.0, 0.04, 0.0)));
        assert!(!is_grounded(Vec3::new(0.0, 2.02, 0.0), Vec3::ZERO));
        assert!(!is_grounded(Vec3::new(0.0, 1.1, 0.0), Vec3::new(0.0, -0.06, 0.0)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn jump_count_never_exceeds_max(
                presses in prop::collection::vec(any::<bool>(), 1..200),
                max_jumps in 1u8..5,
            ) {
                let tuning = Tuning { max_jumps, ..Tuning::default() };
                let mut world = SimpleWorld::bottomless(Vec3::new(0.0, 500.0, 0.0));
                let mut keys = KeyState::new();
                let mut player = PlayerController::new();
                for press in presses {
                    if press {
                        keys.press(Action::Jump);
                    } else {
                        keys.release(Action::Jump);
                    }
                    player.update(&mut world, &mut keys, &tuning);
                    world.step(PHYSICS_DT);
                    prop_assert!(player.jump_count() <= max_jumps);
                }
            }
        }
    }
}
