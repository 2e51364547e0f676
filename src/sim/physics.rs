//! Player body physics
//!
//! The game core only needs a body it can step and whose position and
//! velocity it can read and overwrite. `SimpleWorld` is the built-in
//! implementation: one box body under gravity above an optional floor plane,
//! integrated at a fixed rate from a variable frame delta.

use glam::Vec3;

use crate::consts::*;

/// A steppable world exposing the player body
pub trait PhysicsWorld {
    /// Advance by one frame of real time `dt` (seconds)
    fn step(&mut self, dt: f32);
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn set_velocity(&mut self, velocity: Vec3);
    /// Put the body back at `spawn`, at rest, and forget any pending time
    fn reset(&mut self, spawn: Vec3);
}

/// Gravity + floor plane world with a fixed-step accumulator
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    position: Vec3,
    velocity: Vec3,
    gravity: f32,
    /// Height of the floor plane, `None` for a bottomless world
    floor_y: Option<f32>,
    half_height: f32,
    accumulator: f32,
}

impl SimpleWorld {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            gravity: GRAVITY,
            floor_y: Some(0.0),
            half_height: PLAYER_HALF_EXTENTS.y,
            accumulator: 0.0,
        }
    }

    /// A world with no floor; the body falls forever
    pub fn bottomless(spawn: Vec3) -> Self {
        Self {
            floor_y: None,
            ..Self::new(spawn)
        }
    }

    /// Height the body's center settles at when resting on the floor
    pub fn rest_height(&self) -> Option<f32> {
        self.floor_y.map(|y| y + self.half_height)
    }

    /// One fixed integration step (semi-implicit Euler)
    fn integrate(&mut self, h: f32) {
        self.velocity.y += self.gravity * h;
        self.position += self.velocity * h;

        if let Some(rest) = self.rest_height() {
            if self.position.y < rest {
                self.position.y = rest;
                self.velocity.y = self.velocity.y.max(0.0);
            }
        }
    }
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new(SPAWN_POINT)
    }
}

impl PhysicsWorld for SimpleWorld {
    fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= PHYSICS_DT && substeps < MAX_SUBSTEPS {
            self.integrate(PHYSICS_DT);
            self.accumulator -= PHYSICS_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator %= PHYSICS_DT;
        }
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn reset(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.accumulator = 0.0;
    }
}
