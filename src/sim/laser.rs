//! Laser obstacle catalog and static obstacle records

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::consts::*;

/// The seven animated laser behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaserKind {
    /// Beam across the corridor, bobbing vertically
    Horizontal,
    /// Upright beam sweeping side to side
    Vertical,
    /// Lissajous drift in x and y
    Oscillating,
    /// Spinning about the travel axis
    Rotating,
    /// Hard on/off flashing
    Blinking,
    /// Radius breathes in and out
    PulsingThickness,
    /// Bobbing upright beam plus an independent sweeping cross beam
    CrossingPair,
}

/// Geometry constants for one laser kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSpec {
    /// Beam cylinder length
    pub length: f32,
    /// Beam cylinder radius
    pub radius: f32,
    /// Glow shell radius
    pub glow_radius: f32,
    /// Glow shell length
    pub glow_length: f32,
    /// End-cap sphere radius
    pub cap_radius: f32,
}

impl BeamSpec {
    const fn with_length(length: f32) -> Self {
        Self {
            length,
            radius: BEAM_RADIUS,
            glow_radius: GLOW_RADIUS,
            glow_length: length + GLOW_EXTRA_LENGTH,
            cap_radius: END_CAP_RADIUS,
        }
    }

    #[inline]
    pub fn half_length(&self) -> f32 {
        self.length / 2.0
    }
}

impl LaserKind {
    /// Every kind, in catalog order
    pub const ALL: [LaserKind; 7] = [
        LaserKind::Horizontal,
        LaserKind::Vertical,
        LaserKind::Oscillating,
        LaserKind::Rotating,
        LaserKind::Blinking,
        LaserKind::PulsingThickness,
        LaserKind::CrossingPair,
    ];

    /// Geometry for this kind
    pub const fn spec(self) -> BeamSpec {
        match self {
            LaserKind::Horizontal => BeamSpec::with_length(10.0),
            LaserKind::Vertical => BeamSpec::with_length(6.0),
            LaserKind::Oscillating => BeamSpec::with_length(8.0),
            LaserKind::Rotating => BeamSpec::with_length(9.0),
            LaserKind::Blinking => BeamSpec::with_length(10.0),
            LaserKind::PulsingThickness => BeamSpec::with_length(10.0),
            LaserKind::CrossingPair => BeamSpec::with_length(8.0),
        }
    }

    /// Roll about the travel axis a freshly placed beam starts with
    pub const fn default_roll(self) -> f32 {
        match self {
            LaserKind::Horizontal => FRAC_PI_2,
            _ => 0.0,
        }
    }

    /// Short tag used in logs and by the web renderer
    pub fn tag(self) -> &'static str {
        match self {
            LaserKind::Horizontal => "H",
            LaserKind::Vertical => "V",
            LaserKind::Oscillating => "MOVE",
            LaserKind::Rotating => "ROTATE",
            LaserKind::Blinking => "BLINK",
            LaserKind::PulsingThickness => "THICK",
            LaserKind::CrossingPair => "CROSS",
        }
    }
}

/// Per-obstacle motion parameters, randomized at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Angular speed of the motion (rad/s), always > 0
    pub speed: f32,
    /// Motion amplitude, always >= 0
    pub range: f32,
    /// Phase offset added to the time argument
    pub phase: f32,
}

/// A laser obstacle as laid out at level start.
///
/// Static: the current pose is derived from this and play time by
/// [`crate::sim::animate`], never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: LaserKind,
    /// Anchor position; `base.z` is the obstacle's fixed travel-axis coordinate
    pub base: Vec3,
    /// Initial roll about the travel axis
    pub roll: f32,
    pub motion: MotionParams,
    /// Reference radius for pulsing-thickness beams
    pub base_thickness: f32,
}

impl Obstacle {
    #[inline]
    pub fn z(&self) -> f32 {
        self.base.z
    }

    #[inline]
    pub fn spec(&self) -> BeamSpec {
        self.kind.spec()
    }

    /// Whether the static parameters satisfy the motion invariants
    pub fn is_valid(&self) -> bool {
        self.base.is_finite()
            && self.motion.speed.is_finite()
            && self.motion.speed > 0.0
            && self.motion.range.is_finite()
            && self.motion.range >= 0.0
            && self.motion.phase.is_finite()
            && self.base_thickness > 0.0
    }
}
