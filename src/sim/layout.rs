//! Procedural laser layout
//!
//! The corridor is split into ordered zones along -z. Each zone kind has its
//! own placement rule; instances inside a zone are spaced evenly from
//! `start_z` toward `end_z`. Generation runs once per level.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use super::laser::{LaserKind, MotionParams, Obstacle};
use crate::consts::*;
use crate::error::CorridorError;

/// Placement rule of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Two upright beams flanking the lane plus one across the top
    Gate,
    /// Horizontal beams rippling with staggered phases
    WaveTunnel,
    /// Upright beams sweeping in from alternating sides
    SideCrushers,
    /// Spinning blades on the center line
    RotatingBlades,
    /// Flashing beams cycling through three lateral slots
    BlinkMaze,
    /// Jittered mix of oscillating, crossing and pulsing beams
    FinalGauntlet,
}

/// A contiguous travel-axis region governed by one placement rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub start_z: f32,
    pub end_z: f32,
    pub count: u32,
}

impl Zone {
    pub const fn new(kind: ZoneKind, start_z: f32, end_z: f32, count: u32) -> Self {
        Self { kind, start_z, end_z, count }
    }

    /// Spacing between consecutive instances (negative when the zone runs toward -z)
    ///
    /// `None` for a zero-count zone.
    pub fn step(&self) -> Option<f32> {
        (self.count > 0).then(|| (self.end_z - self.start_z) / self.count as f32)
    }

    /// Whether `z` lies between the zone bounds, whichever way they run
    pub fn contains_z(&self, z: f32) -> bool {
        let (lo, hi) = if self.start_z <= self.end_z {
            (self.start_z, self.end_z)
        } else {
            (self.end_z, self.start_z)
        };
        z >= lo && z <= hi
    }
}

/// The default level, in travel order
pub const DEFAULT_ZONES: [Zone; 6] = [
    Zone::new(ZoneKind::Gate, -40.0, -40.0, 1),
    Zone::new(ZoneKind::WaveTunnel, -100.0, -240.0, 12),
    Zone::new(ZoneKind::SideCrushers, -280.0, -420.0, 6),
    Zone::new(ZoneKind::RotatingBlades, -480.0, -640.0, 8),
    Zone::new(ZoneKind::BlinkMaze, -700.0, -860.0, 18),
    Zone::new(ZoneKind::FinalGauntlet, -920.0, -1060.0, 15),
];

/// What to do with a zone whose `count` is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZeroCountPolicy {
    /// Emit nothing for the zone and log a warning
    #[default]
    Skip,
    /// Fail layout generation
    Reject,
}

/// Values a placement rule pins instead of the random defaults
#[derive(Debug, Clone, Copy, Default)]
struct Overrides {
    roll: Option<f32>,
    speed: Option<f32>,
    range: Option<f32>,
    phase: Option<f32>,
}

/// Seeded layout generator
pub struct LayoutGenerator {
    rng: Pcg32,
    policy: ZeroCountPolicy,
    next_id: u32,
}

impl LayoutGenerator {
    /// Create a generator that skips zero-count zones
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            policy: ZeroCountPolicy::Skip,
            next_id: 1,
        }
    }

    /// Create a generator that rejects zero-count zones
    pub fn strict(seed: u64) -> Self {
        Self::new(seed).with_policy(ZeroCountPolicy::Reject)
    }

    pub fn with_policy(mut self, policy: ZeroCountPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lay out every zone in order.
    ///
    /// Obstacles come out grouped by zone, in within-zone instance order.
    pub fn generate(&mut self, zones: &[Zone]) -> Result<Vec<Obstacle>, CorridorError> {
        let mut obstacles = Vec::new();
        for zone in zones {
            if !zone.start_z.is_finite() || !zone.end_z.is_finite() {
                return Err(CorridorError::InvalidZone {
                    zone: zone.kind,
                    reason: "bounds must be finite".into(),
                });
            }
            let Some(step) = zone.step() else {
                match self.policy {
                    ZeroCountPolicy::Skip => {
                        log::warn!(
                            "{:?} zone at z={} has count 0, skipping",
                            zone.kind,
                            zone.start_z
                        );
                        continue;
                    }
                    ZeroCountPolicy::Reject => {
                        return Err(CorridorError::InvalidZone {
                            zone: zone.kind,
                            reason: "count is zero".into(),
                        });
                    }
                }
            };
            let before = obstacles.len();
            self.fill_zone(zone, step, &mut obstacles);
            log::debug!(
                "{:?} zone: {} instances, {} lasers",
                zone.kind,
                zone.count,
                obstacles.len() - before
            );
        }
        log::info!("Laid out {} lasers across {} zones", obstacles.len(), zones.len());
        Ok(obstacles)
    }

    fn fill_zone(&mut self, zone: &Zone, step: f32, out: &mut Vec<Obstacle>) {
        for i in 0..zone.count {
            let fi = i as f32;
            let z = zone.start_z + fi * step;
            match zone.kind {
                ZoneKind::Gate => {
                    for x in [-3.5, 3.5] {
                        let pos = Vec3::new(x, 3.5, z);
                        self.spawn(out, LaserKind::Vertical, pos, Overrides::default());
                    }
                    self.spawn(
                        out,
                        LaserKind::Horizontal,
                        Vec3::new(0.0, 5.0, z),
                        Overrides { roll: Some(std::f32::consts::FRAC_PI_2), ..Default::default() },
                    );
                }
                ZoneKind::WaveTunnel => {
                    self.spawn(
                        out,
                        LaserKind::Horizontal,
                        Vec3::new(0.0, 3.5, z),
                        Overrides {
                            roll: Some(std::f32::consts::FRAC_PI_2),
                            speed: Some(1.2),
                            range: Some(4.0),
                            phase: Some(fi * 0.8),
                        },
                    );
                }
                ZoneKind::SideCrushers => {
                    let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                    self.spawn(
                        out,
                        LaserKind::Vertical,
                        Vec3::new(side * 6.0, 3.0, z),
                        Overrides {
                            speed: Some(1.5),
                            range: Some(4.0),
                            phase: Some(fi * PI),
                            ..Default::default()
                        },
                    );
                }
                ZoneKind::RotatingBlades => {
                    let speed = 0.6 + self.rng.random::<f32>() * 0.4;
                    self.spawn(
                        out,
                        LaserKind::Rotating,
                        Vec3::new(0.0, 3.0, z),
                        Overrides {
                            speed: Some(speed),
                            phase: Some(fi * PI / 2.0),
                            ..Default::default()
                        },
                    );
                }
                ZoneKind::BlinkMaze => {
                    let x = ((i % 3) as f32 - 1.0) * 3.5;
                    self.spawn(
                        out,
                        LaserKind::Blinking,
                        Vec3::new(x, 3.5, z),
                        Overrides { phase: Some(fi * 0.4), ..Default::default() },
                    );
                }
                ZoneKind::FinalGauntlet => {
                    // Jitter by at most half a step keeps the laser inside the zone
                    let z = z + self.rng.random::<f32>() * step * 0.5;
                    let kind = [
                        LaserKind::Oscillating,
                        LaserKind::CrossingPair,
                        LaserKind::PulsingThickness,
                    ][(i % 3) as usize];
                    let x = (self.rng.random::<f32>() - 0.5) * 6.0;
                    let y = 2.0 + self.rng.random::<f32>() * 2.0;
                    let speed = 1.5 + self.rng.random::<f32>();
                    let range = 3.0 + self.rng.random::<f32>() * 2.0;
                    self.spawn(
                        out,
                        kind,
                        Vec3::new(x, y, z),
                        Overrides {
                            speed: Some(speed),
                            range: Some(range),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }

    /// Evenly spaced lasers cycling through every kind.
    ///
    /// The corridor's first prototype layout: `count` lasers from
    /// `FIRST_LASER_Z` to `LASER_OVERRUN` past `finish_z`, with randomized
    /// heights.
    pub fn uniform(&mut self, count: usize, finish_z: f32) -> Vec<Obstacle> {
        let mut obstacles = Vec::with_capacity(count);
        let span = finish_z - LASER_OVERRUN - FIRST_LASER_Z;
        for i in 0..count {
            let t = if count > 1 { i as f32 / (count - 1) as f32 } else { 0.0 };
            let z = FIRST_LASER_Z + span * t;
            let y = BEAM_FLOOR_Y + self.rng.random::<f32>();
            let kind = LaserKind::ALL[i % LaserKind::ALL.len()];
            let x = match kind {
                LaserKind::Vertical => -4.0 + self.rng.random::<f32>() * 8.0,
                LaserKind::Oscillating => -3.0 + self.rng.random::<f32>() * 6.0,
                _ => 0.0,
            };
            self.spawn(&mut obstacles, kind, Vec3::new(x, y, z), Overrides::default());
        }
        log::info!("Laid out {} lasers uniformly", obstacles.len());
        obstacles
    }

    /// Place one laser. Default motion is always drawn so the RNG stream
    /// does not depend on which values a rule overrides.
    fn spawn(&mut self, out: &mut Vec<Obstacle>, kind: LaserKind, pos: Vec3, overrides: Overrides) {
        let speed = 0.8 + self.rng.random::<f32>() * 0.7;
        let range = 2.0 + self.rng.random::<f32>() * 2.0;
        let phase = self.rng.random::<f32>() * TAU;

        let id = self.next_id;
        self.next_id += 1;
        out.push(Obstacle {
            id,
            kind,
            base: pos,
            roll: overrides.roll.unwrap_or(kind.default_roll()),
            motion: MotionParams {
                speed: overrides.speed.unwrap_or(speed),
                range: overrides.range.unwrap_or(range),
                phase: overrides.phase.unwrap_or(phase),
            },
            base_thickness: BEAM_RADIUS,
        });
    }
}
