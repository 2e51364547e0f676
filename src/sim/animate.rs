//! Per-frame laser motion
//!
//! Every pose is a pure function of the obstacle's static parameters and
//! play time, so restarting a level simply means evaluating at `t = 0` again.
//! End caps are recomputed from the current transform on every call.

use glam::Vec3;
use serde::Serialize;

use super::laser::{LaserKind, Obstacle};
use crate::consts::*;
use crate::{beam_axis, pulse};

/// Lateral sweep amplitude of a crossing pair's second beam
const CROSS_PAIR_RANGE: f32 = 2.5;
/// Bob amplitude of a crossing pair's primary beam
const CROSS_BOB_RANGE: f32 = 0.7;
/// Phase multiplier desynchronizing the cross beam from its primary
const CROSS_PAIR_PHASE_MUL: f32 = 1.5;
/// Blink frequency (rad/s)
const BLINK_FREQ: f32 = 6.0;
/// Extra radius a pulsing beam gains at peak
const THICKNESS_PULSE: f32 = 0.18;

/// Transform of a single beam cylinder
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeamPose {
    pub center: Vec3,
    /// Roll about the travel axis
    pub roll: f32,
    /// Scale in beam-local space; `y` is the length axis
    pub scale: Vec3,
    pub visible: bool,
}

impl BeamPose {
    fn at(center: Vec3, roll: f32) -> Self {
        Self {
            center,
            roll,
            scale: Vec3::ONE,
            visible: true,
        }
    }

    /// Unit vector along the beam's length
    #[inline]
    pub fn axis(&self) -> Vec3 {
        beam_axis(self.roll)
    }

    fn is_finite(&self) -> bool {
        self.center.is_finite() && self.roll.is_finite() && self.scale.is_finite()
    }
}

/// Second beam of a crossing pair with its own end caps
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairPose {
    pub beam: BeamPose,
    pub caps: [Vec3; 2],
}

/// Cosmetic glow levels; never read by collision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlowChannels {
    pub beam_emissive: f32,
    pub beam_opacity: f32,
    pub glow_opacity: f32,
    pub cap_emissive: f32,
}

impl GlowChannels {
    pub fn at(t: f32, phase: f32) -> Self {
        Self {
            beam_emissive: 1.2 + 0.5 * pulse(t, 2.0, phase),
            beam_opacity: 0.7 + 0.2 * pulse(t, 3.0, phase),
            glow_opacity: 0.13 + 0.09 * pulse(t, 2.0, phase),
            cap_emissive: 2.2 + 1.2 * pulse(t, 4.0, phase),
        }
    }
}

/// Full pose of one obstacle at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstaclePose {
    pub beam: BeamPose,
    /// Glow shell; mirrors `beam` exactly
    pub glow: BeamPose,
    pub caps: [Vec3; 2],
    pub pair: Option<PairPose>,
    pub channels: GlowChannels,
}

impl ObstaclePose {
    /// Assemble a pose from the primary beam, deriving glow shell and caps
    fn from_beam(beam: BeamPose, half_len: f32, channels: GlowChannels) -> Self {
        Self {
            beam,
            glow: beam,
            caps: end_caps(beam.center, beam.roll, half_len),
            pair: None,
            channels,
        }
    }

    /// Whether the beam takes part in collision this frame
    #[inline]
    pub fn is_live(&self) -> bool {
        self.beam.visible
    }

    pub fn is_finite(&self) -> bool {
        self.beam.is_finite()
            && self.caps.iter().all(|c| c.is_finite())
            && self
                .pair
                .is_none_or(|p| p.beam.is_finite() && p.caps.iter().all(|c| c.is_finite()))
    }
}

/// End-cap positions `±half_len` along the rolled beam axis from `center`
#[inline]
pub fn end_caps(center: Vec3, roll: f32, half_len: f32) -> [Vec3; 2] {
    let axis = beam_axis(roll);
    [center - axis * half_len, center + axis * half_len]
}

/// Compute an obstacle's pose at play time `t` (seconds)
pub fn animate(obstacle: &Obstacle, t: f32) -> ObstaclePose {
    let channels = GlowChannels::at(t, obstacle.motion.phase);
    let half_len = obstacle.spec().half_length();
    match obstacle.kind {
        LaserKind::Horizontal => horizontal(obstacle, t, half_len, channels),
        LaserKind::Vertical => vertical(obstacle, t, half_len, channels),
        LaserKind::Oscillating => oscillating(obstacle, t, half_len, channels),
        LaserKind::Rotating => rotating(obstacle, t, half_len, channels),
        LaserKind::Blinking => blinking(obstacle, t, half_len, channels),
        LaserKind::PulsingThickness => pulsing(obstacle, t, half_len, channels),
        LaserKind::CrossingPair => crossing(obstacle, t, half_len, channels),
    }
}

#[inline]
fn wave_arg(o: &Obstacle, t: f32) -> f32 {
    t * o.motion.speed + o.motion.phase
}

fn horizontal(o: &Obstacle, t: f32, half_len: f32, channels: GlowChannels) -> ObstaclePose {
    let y = o.base.y + wave_arg(o, t).sin() * o.motion.range * 0.5;
    let center = Vec3::new(o.base.x, y.max(BEAM_FLOOR_Y), o.base.z);
    ObstaclePose::from_beam(BeamPose::at(center, o.roll), half_len, channels)
}

fn vertical(o: &Obstacle, t: f32, half_len: f32, channels: GlowChannels) -> ObstaclePose {
    let x = o.base.x + wave_arg(o, t).sin() * o.motion.range;
    let center = Vec3::new(x, o.base.y, o.base.z);
    ObstaclePose::from_beam(BeamPose::at(center, o.roll), half_len, channels)
}

fn oscillating(o: &Obstacle, t: f32, half_len: f32, channels: GlowChannels) -> ObstaclePose {
    let a = wave_arg(o, t);
    let x = o.base.x + a.sin() * o.motion.range * 0.7;
    let y = o.base.y + a.cos() * o.motion.range * 0.4;
    let center = Vec3::new(x, y.max(BEAM_FLOOR_Y), o.base.z);
    ObstaclePose::from_beam(BeamPose::at(center, o.roll), half_len, channels)
}

fn rotating(o: &Obstacle, t: f32, half_len: f32, channels: GlowChannels) -> ObstaclePose {
    let roll = wave_arg(o, t);
    ObstaclePose::from_beam(BeamPose::at(o.base, roll), half_len, channels)
}

fn blinking(o: &Obstacle, t: f32, half_len: f32, channels: GlowChannels) -> ObstaclePose {
    let mut beam = BeamPose::at(o.base, o.roll);
    beam.visible = (t * BLINK_FREQ + o.motion.phase).sin() >= 0.0;
    ObstaclePose::from_beam(beam, half_len, channels)
}

fn pulsing(o: &Obstacle, t: f32, half_len: f32, channels: GlowChannels) -> ObstaclePose {
    let thickness = o.base_thickness + THICKNESS_PULSE * pulse(t, 2.0, o.motion.phase);
    let radial = thickness / BEAM_RADIUS;
    let mut beam = BeamPose::at(o.base, o.roll);
    beam.scale = Vec3::new(radial, 1.0, radial);
    ObstaclePose::from_beam(beam, half_len, channels)
}

fn crossing(o: &Obstacle, t: f32, half_len: f32, channels: GlowChannels) -> ObstaclePose {
    let y = o.base.y + wave_arg(o, t).sin() * CROSS_BOB_RANGE;
    let center = Vec3::new(o.base.x, y.max(BEAM_FLOOR_Y), o.base.z);
    let mut pose = ObstaclePose::from_beam(BeamPose::at(center, o.roll), half_len, channels);

    let sweep = (t * o.motion.speed + o.motion.phase * CROSS_PAIR_PHASE_MUL).sin();
    let pair_center = Vec3::new(o.base.x + sweep * CROSS_PAIR_RANGE, o.base.y, o.base.z);
    let pair_roll = o.roll + std::f32::consts::FRAC_PI_2;
    pose.pair = Some(PairPose {
        beam: BeamPose::at(pair_center, pair_roll),
        caps: end_caps(pair_center, pair_roll, half_len),
    });
    pose
}
