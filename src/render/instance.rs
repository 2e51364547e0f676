//! GPU instance records for beams and end caps
//!
//! Layouts are `#[repr(C)]` and `Pod` so a renderer can upload a packed
//! slice as-is. Field order must match the consumer's vertex attributes.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::sim::{BeamPose, Obstacle, ObstaclePose};

/// Which mesh an instance draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BeamRole {
    Beam = 0,
    Glow = 1,
    /// Second beam of a crossing pair
    Pair = 2,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct BeamInstance {
    pub center: [f32; 3],   // offset 0
    pub roll: f32,          // offset 12
    pub scale: [f32; 3],    // offset 16
    pub length: f32,        // offset 28
    pub radius: f32,        // offset 32
    pub emissive: f32,      // offset 36
    pub opacity: f32,       // offset 40
    pub role: u32,          // offset 44
    pub color: [f32; 4],    // offset 48
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct CapInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub emissive: f32,
    #[serde(skip)]
    pub _pad: [f32; 3],
    pub color: [f32; 4],
}

impl BeamInstance {
    fn new(
        pose: &BeamPose,
        length: f32,
        radius: f32,
        emissive: f32,
        opacity: f32,
        role: BeamRole,
    ) -> Self {
        let color = match role {
            BeamRole::Glow => colors::LASER_GLOW,
            BeamRole::Beam | BeamRole::Pair => colors::LASER,
        };
        Self {
            center: pose.center.to_array(),
            roll: pose.roll,
            scale: pose.scale.to_array(),
            length,
            radius,
            emissive,
            opacity,
            role: role as u32,
            color,
        }
    }
}

impl CapInstance {
    fn new(position: glam::Vec3, radius: f32, emissive: f32) -> Self {
        Self {
            position: position.to_array(),
            radius,
            emissive,
            _pad: [0.0; 3],
            color: colors::LASER_CAP,
        }
    }
}

/// Packed instances for one frame
#[derive(Debug, Clone, Default)]
pub struct InstanceBatch {
    pub beams: Vec<BeamInstance>,
    pub caps: Vec<CapInstance>,
}

impl InstanceBatch {
    /// Raw bytes of the beam buffer
    pub fn beam_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.beams)
    }

    /// Raw bytes of the cap buffer
    pub fn cap_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.caps)
    }
}

/// Pack the visible beams, glow shells and caps of one frame.
///
/// Hidden (blinked-off) and skipped obstacles emit nothing.
pub fn pack_instances(obstacles: &[Obstacle], poses: &[Option<ObstaclePose>]) -> InstanceBatch {
    let mut batch = InstanceBatch::default();
    for (obstacle, pose) in obstacles.iter().zip(poses) {
        let Some(pose) = pose else { continue };
        if !pose.beam.visible {
            continue;
        }
        let spec = obstacle.spec();
        let ch = pose.channels;

        batch.beams.push(BeamInstance::new(
            &pose.beam,
            spec.length,
            spec.radius,
            ch.beam_emissive,
            ch.beam_opacity,
            BeamRole::Beam,
        ));
        batch.beams.push(BeamInstance::new(
            &pose.glow,
            spec.glow_length,
            spec.glow_radius,
            0.0,
            ch.glow_opacity,
            BeamRole::Glow,
        ));
        for cap in pose.caps {
            batch.caps.push(CapInstance::new(cap, spec.cap_radius, ch.cap_emissive));
        }

        if let Some(pair) = &pose.pair {
            batch.beams.push(BeamInstance::new(
                &pair.beam,
                spec.length,
                spec.radius,
                ch.beam_emissive,
                ch.beam_opacity,
                BeamRole::Pair,
            ));
            for cap in pair.caps {
                batch.caps.push(CapInstance::new(cap, spec.cap_radius, ch.cap_emissive));
            }
        }
    }
    batch
}

/// Colors for scene elements
pub mod colors {
    pub const LASER: [f32; 4] = [1.0, 0.133, 0.133, 1.0];
    pub const LASER_GLOW: [f32; 4] = [1.0, 0.133, 0.133, 0.18];
    pub const LASER_CAP: [f32; 4] = [1.0, 0.333, 0.333, 0.85];
    pub const FINISH_BAR: [f32; 4] = [0.224, 1.0, 0.078, 0.95]; // Neon green
    pub const FLOOR_GLOW: [f32; 4] = [0.224, 1.0, 0.078, 1.0];
    pub const PARTICLE: [f32; 4] = [1.0, 0.878, 0.4, 0.8];
    pub const CITY_NEAR_EMISSIVE: [f32; 4] = [0.0, 1.0, 0.969, 1.0];
    pub const CITY_FAR_EMISSIVE: [f32; 4] = [0.133, 0.133, 0.227, 1.0];

    /// HSL (all in 0..=1) to RGBA
    pub fn hsl(h: f32, s: f32, l: f32) -> [f32; 4] {
        let h = h.rem_euclid(1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h * 6.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        [r + m, g + m, b + m, 1.0]
    }

    /// Blend `a` toward `b` by `t`
    pub fn lerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
    }
}
