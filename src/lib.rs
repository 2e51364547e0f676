//! Laser Corridor - a 3D auto-runner obstacle minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (layout, laser motion, player physics, game state)
//! - `render`: Frame snapshots and GPU instance packing for the embedding renderer
//! - `platform`: Keyboard state and the browser runtime
//! - `backdrop`: Cosmetic scenery advanced once per frame
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod backdrop;
pub mod error;
pub mod platform;
pub mod render;
pub mod sim;
pub mod tuning;

pub use error::CorridorError;
pub use tuning::Tuning;

use glam::{Quat, Vec3};

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed physics timestep (60 Hz)
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 10;
    /// Longest frame delta fed to the simulation (tab switches, breakpoints)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Gravity (units/s², downward)
    pub const GRAVITY: f32 = -9.82;

    /// Player spawn point
    pub const SPAWN_POINT: Vec3 = Vec3::new(0.0, 2.0, 0.0);
    /// Half extents of the player's box body
    pub const PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.1, 0.5);
    /// Auto-scroll speed along -z
    pub const FORWARD_SPEED: f32 = 36.0;
    /// Lateral speed while strafing
    pub const STRAFE_SPEED: f32 = 5.0;
    /// Lateral velocity multiplier applied every frame
    pub const LATERAL_DAMPING: f32 = 0.9;
    /// Vertical velocity set by a jump
    pub const JUMP_VELOCITY: f32 = 4.5;
    /// Jumps available between landings (double jump)
    pub const MAX_JUMP: u8 = 2;
    /// Player counts as grounded at or below this height...
    pub const GROUND_DETECT_Y: f32 = 2.01;
    /// ...while moving vertically slower than this
    pub const GROUND_SPEED_EPSILON: f32 = 0.05;
    /// Lateral clamp for the player's center
    pub const CORRIDOR_HALF_WIDTH: f32 = 4.5;

    /// Player-to-beam-center distance that counts as a hit
    pub const HIT_RADIUS: f32 = 1.1;
    /// Falling below this height ends the run
    pub const ABYSS_Y: f32 = -10.0;
    /// Passing this z wins the run
    pub const FINISH_Z: f32 = -1080.0;
    /// First laser position for the uniform layout
    pub const FIRST_LASER_Z: f32 = -40.0;
    /// The uniform layout's last laser sits this far beyond the finish
    pub const LASER_OVERRUN: f32 = 10.0;
    pub const LAST_LASER_Z: f32 = FINISH_Z - LASER_OVERRUN;

    /// Countdown length in seconds
    pub const COUNTDOWN_SECS: u32 = 5;

    /// Moving beams never dip below this height
    pub const BEAM_FLOOR_Y: f32 = 1.2;
    /// Beam cylinder radius (also the default pulsing base thickness)
    pub const BEAM_RADIUS: f32 = 0.14;
    /// Glow shell radius
    pub const GLOW_RADIUS: f32 = 0.25;
    /// Extra length of the glow shell over its beam
    pub const GLOW_EXTRA_LENGTH: f32 = 0.2;
    /// End-cap sphere radius
    pub const END_CAP_RADIUS: f32 = 0.28;

    /// Floor tiles that leapfrog the player
    pub const FLOOR_TILE_LENGTH: f32 = 80.0;
    pub const FLOOR_TILE_COUNT: usize = 3;
    pub const FLOOR_WIDTH: f32 = 20.0;

    /// Chase camera offset from the player
    pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 5.0, 8.0);
}

/// Unit axis of a beam rolled `roll` radians about the travel (z) axis.
///
/// An unrolled beam stands upright along +y.
#[inline]
pub fn beam_axis(roll: f32) -> Vec3 {
    Quat::from_rotation_z(roll) * Vec3::Y
}

/// Rectified sine pulse `|sin(freq * t + phase)|` in [0, 1]
#[inline]
pub fn pulse(t: f32, freq: f32, phase: f32) -> f32 {
    (freq * t + phase).sin().abs()
}
