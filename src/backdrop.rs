//! Decorative scenery around the corridor
//!
//! Built once from a seed and advanced once per frame. Nothing here feeds
//! back into the simulation.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::consts::*;
use crate::render::colors;

const STRIPE_COUNT: usize = 12;
const PARTICLE_COUNT: usize = 120;
const METEOR_COUNT: usize = 3;

const STRIPE_PALETTE: [[f32; 4]; 8] = [
    [0.0, 1.0, 0.969, 1.0],
    [1.0, 0.0, 0.902, 1.0],
    [1.0, 0.878, 0.4, 1.0],
    [0.0, 1.0, 0.6, 1.0],
    [1.0, 0.302, 0.902, 1.0],
    [0.102, 0.82, 1.0, 1.0],
    [0.224, 1.0, 0.078, 1.0],
    [1.0, 0.133, 0.133, 1.0],
];
const CITY_NEAR: [[f32; 4]; 3] = [
    [0.165, 0.102, 0.302, 0.92],
    [0.102, 0.165, 0.302, 0.92],
    [0.0, 1.0, 0.969, 0.92],
];
const CITY_FAR: [[f32; 4]; 3] = [
    [0.133, 0.133, 0.227, 0.7],
    [0.102, 0.102, 0.165, 0.7],
    [0.102, 0.165, 0.302, 0.7],
];
const WINDOW_WARM: [f32; 4] = [1.0, 0.878, 0.4, 1.0];
const WINDOW_COLD: [f32; 4] = [0.0, 1.0, 0.969, 1.0];

/// Vertical sky gradient, top to bottom (stop, color)
pub const SKY_GRADIENT: [(f32, [f32; 4]); 5] = [
    (0.0, [0.165, 0.102, 0.302, 1.0]),
    (0.25, [0.102, 0.165, 0.302, 1.0]),
    (0.5, [0.102, 0.82, 1.0, 1.0]),
    (0.7, [1.0, 0.302, 0.902, 1.0]),
    (1.0, [0.039, 0.039, 0.102, 1.0]),
];

#[derive(Debug, Clone, Serialize)]
pub struct NeonStripe {
    pub position: Vec3,
    pub size: [f32; 2],
    /// Rotation about the view axis
    pub tilt: f32,
    pub color: [f32; 4],
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meteor {
    pub position: Vec3,
    pub tilt: f32,
    /// Drift per 1/60 s: +x, -y
    pub drift: [f32; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct Building {
    pub position: Vec3,
    pub size: Vec3,
    pub near: bool,
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    /// Glow panel on the facade
    pub halo: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Window {
    pub position: Vec3,
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub opacity: f32,
}

/// Animated values for one frame
#[derive(Debug, Clone, Serialize)]
pub struct BackdropView {
    pub stripe_x: Vec<f32>,
    pub stripe_opacity: Vec<f32>,
    pub particle_opacity: f32,
    pub particle_color: [f32; 4],
    pub meteors: Vec<[f32; 3]>,
    /// (window index, opacity) for every flickering window
    pub windows: Vec<(usize, f32)>,
    pub floor_glow_opacity: f32,
    pub floor_glow_color: [f32; 4],
}

/// Cosmetic scenery: stripes, particles, meteors and a city skyline
#[derive(Debug, Clone, Serialize)]
pub struct Backdrop {
    #[serde(skip)]
    rng: Pcg32,
    #[serde(skip)]
    time: f32,
    pub stripes: Vec<NeonStripe>,
    pub particles: Vec<Vec3>,
    pub particle_opacity: f32,
    pub meteors: Vec<Meteor>,
    pub buildings: Vec<Building>,
    pub windows: Vec<Window>,
    /// Indices into `windows` that flicker
    pub flickering: Vec<usize>,
    pub floor_glow_opacity: f32,
}

impl Backdrop {
    /// Generate scenery for a corridor ending at `end_z`
    pub fn new(seed: u64, end_z: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed_bac0);

        let stripes = (0..STRIPE_COUNT)
            .map(|i| {
                let fi = i as f32;
                let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                NeonStripe {
                    position: Vec3::new(
                        0.0,
                        16.0 + fi * 7.0 + rng.random::<f32>() * 6.0,
                        -89.0 + fi * 0.3,
                    ),
                    size: [60.0 + rng.random::<f32>() * 20.0, 1.2 + rng.random::<f32>() * 1.2],
                    tilt: side * (PI / 16.0 + rng.random::<f32>() * 0.2),
                    color: STRIPE_PALETTE[i % STRIPE_PALETTE.len()],
                    opacity: 0.13 + rng.random::<f32>() * 0.18,
                }
            })
            .collect();

        let particles = (0..PARTICLE_COUNT)
            .map(|_| {
                Vec3::new(
                    (rng.random::<f32>() - 0.5) * 120.0,
                    rng.random::<f32>() * 100.0 + 10.0,
                    -80.0 + rng.random::<f32>() * 80.0,
                )
            })
            .collect();

        let meteors = (0..METEOR_COUNT)
            .map(|i| Meteor {
                position: Vec3::new(
                    -60.0 + rng.random::<f32>() * 120.0,
                    80.0 + rng.random::<f32>() * 40.0,
                    -60.0 + rng.random::<f32>() * 60.0,
                ),
                tilt: FRAC_PI_2 + rng.random::<f32>() * 0.5,
                drift: [0.7 + i as f32 * 0.2, 0.5 + i as f32 * 0.1],
            })
            .collect();

        let mut backdrop = Self {
            rng,
            time: 0.0,
            stripes,
            particles,
            particle_opacity: 0.8,
            meteors,
            buildings: Vec::new(),
            windows: Vec::new(),
            flickering: Vec::new(),
            floor_glow_opacity: 0.08,
        };
        for side in [-1.0, 1.0] {
            backdrop.build_skyline(side, end_z);
        }
        log::debug!(
            "Backdrop: {} buildings, {} windows ({} flickering)",
            backdrop.buildings.len(),
            backdrop.windows.len(),
            backdrop.flickering.len()
        );
        backdrop
    }

    /// Alternate near and far buildings down one side of the corridor
    fn build_skyline(&mut self, side: f32, end_z: f32) {
        let rng = &mut self.rng;
        let mut z = 0.0;
        let mut layer = 0u32;
        while z > end_z - 10.0 {
            let near = layer % 2 == 0;
            let w = 2.5 + rng.random::<f32>() * 3.5;
            let h = 8.0 + rng.random::<f32>() * if near { 18.0 } else { 12.0 };
            let x = side * (10.5 + rng.random::<f32>() * 1.5 + if near { 0.0 } else { 2.0 });
            let y = h / 2.0 + 0.5;
            let zz = z - rng.random::<f32>() * 4.0 + if near { 0.0 } else { -2.0 };
            let palette = if near { &CITY_NEAR } else { &CITY_FAR };
            let color = palette[rng.random_range(0..palette.len())];

            if near {
                for j in 0..(h / 2.0).floor() as u32 {
                    if rng.random::<f32>() < 0.5 {
                        continue;
                    }
                    let size = [0.3 + rng.random::<f32>() * 0.3, 0.5 + rng.random::<f32>() * 0.3];
                    let win_y = y - h / 2.0 + 1.0 + j as f32 * 2.0;
                    let color = if rng.random::<f32>() > 0.5 { WINDOW_WARM } else { WINDOW_COLD };
                    let wx = x + side * 0.7 + (rng.random::<f32>() - 0.5) * 0.5;
                    if rng.random::<f32>() > 0.7 {
                        self.flickering.push(self.windows.len());
                    }
                    self.windows.push(Window {
                        position: Vec3::new(wx, win_y, zz + 0.7),
                        size,
                        color,
                        opacity: 0.7,
                    });
                }
            }

            let halo = near && rng.random::<f32>() > 0.7;
            self.buildings.push(Building {
                position: Vec3::new(x, y, zz),
                size: Vec3::new(w, h, 1.2),
                near,
                color,
                emissive: if near { colors::CITY_NEAR_EMISSIVE } else { colors::CITY_FAR_EMISSIVE },
                halo,
            });

            z -= 10.0 + rng.random::<f32>() * 5.0;
            layer += 1;
        }
    }

    /// Seconds the backdrop has been running
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance every animated element by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(MAX_FRAME_DT);
        self.time += dt;
        let t = self.time;

        for (i, stripe) in self.stripes.iter_mut().enumerate() {
            let fi = i as f32;
            stripe.opacity = 0.13 + 0.18 * (t + fi).sin().abs();
            stripe.position.x = (0.7 * t + fi).sin() * 2.5;
        }
        self.particle_opacity = 0.7 + 0.3 * t.sin().abs();

        // Drift rates are per 60 Hz frame
        let frames = dt * 60.0;
        for meteor in &mut self.meteors {
            meteor.position.x += meteor.drift[0] * frames;
            meteor.position.y -= meteor.drift[1] * frames;
            if meteor.position.x > 70.0 || meteor.position.y < 0.0 {
                meteor.position.x = -60.0 + self.rng.random::<f32>() * 120.0;
                meteor.position.y = 80.0 + self.rng.random::<f32>() * 40.0;
            }
        }

        for &i in &self.flickering {
            let window = &mut self.windows[i];
            window.opacity = 0.4 + 0.6 * (2.0 * t + window.position.y).sin().abs();
        }
        self.floor_glow_opacity = 0.08 + 0.08 * (1.2 * t).sin().abs();
    }

    pub fn view(&self) -> BackdropView {
        BackdropView {
            stripe_x: self.stripes.iter().map(|s| s.position.x).collect(),
            stripe_opacity: self.stripes.iter().map(|s| s.opacity).collect(),
            particle_opacity: self.particle_opacity,
            particle_color: colors::PARTICLE,
            meteors: self.meteors.iter().map(|m| m.position.to_array()).collect(),
            windows: self
                .flickering
                .iter()
                .map(|&i| (i, self.windows[i].opacity))
                .collect(),
            floor_glow_opacity: self.floor_glow_opacity,
            floor_glow_color: colors::FLOOR_GLOW,
        }
    }
}

/// Floor tiles that leapfrog the player so the floor never runs out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorStrip {
    /// Center z of each tile
    pub tiles: [f32; FLOOR_TILE_COUNT],
}

impl Default for FloorStrip {
    fn default() -> Self {
        Self {
            tiles: std::array::from_fn(|i| -(i as f32) * FLOOR_TILE_LENGTH),
        }
    }
}

impl FloorStrip {
    /// Move tiles that fell out of range around `player_z`
    pub fn follow(&mut self, player_z: f32) {
        let span = FLOOR_TILE_COUNT as f32 * FLOOR_TILE_LENGTH;
        for tile in &mut self.tiles {
            if player_z - *tile < -FLOOR_TILE_LENGTH / 2.0 {
                *tile -= span;
            }
            if player_z - *tile > FLOOR_TILE_LENGTH * 1.5 {
                *tile += span;
            }
        }
    }

    /// Whether some tile lies under `z`
    pub fn covers(&self, z: f32) -> bool {
        self.tiles
            .iter()
            .any(|&tile| (z - tile).abs() <= FLOOR_TILE_LENGTH / 2.0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_determinism() {
        let a = Backdrop::new(3, FINISH_Z);
        let b = Backdrop::new(3, FINISH_Z);
        assert_eq!(a.stripes.len(), 12);
        assert_eq!(a.particles.len(), 120);
        assert_eq!(a.meteors.len(), 3);
        assert_eq!(a.buildings.len(), b.buildings.len());
        assert_eq!(a.windows.len(), b.windows.len());
        assert_eq!(a.flickering, b.flickering);
    }

    #[test]
    fn test_skyline_spans_corridor_on_both_sides() {
        let backdrop = Backdrop::new(11, FINISH_Z);
        let left = backdrop.buildings.iter().filter(|b| b.position.x < 0.0).count();
        let right = backdrop.buildings.iter().filter(|b| b.position.x > 0.0).count();
        // Spacing is 10..15 units over ~1090
        assert!(left > 70 && right > 70, "{left} / {right}");
        for b in &backdrop.buildings {
            assert!(b.position.x.abs() >= 10.5);
            assert!(b.position.z > FINISH_Z - 30.0);
        }
        assert!(backdrop.windows.iter().all(|w| w.position.x.abs() > 9.0));
    }

    #[test]
    fn test_flicker_registry_points_at_windows() {
        let mut backdrop = Backdrop::new(5, FINISH_Z);
        assert!(backdrop.flickering.iter().all(|&i| i < backdrop.windows.len()));
        backdrop.advance(0.25);
        for (i, opacity) in backdrop.view().windows {
            assert_eq!(backdrop.windows[i].opacity, opacity);
            assert!((0.4..=1.0 + 1e-5).contains(&opacity));
        }
        // Steady windows keep their opacity
        for (i, w) in backdrop.windows.iter().enumerate() {
            if !backdrop.flickering.contains(&i) {
                assert_eq!(w.opacity, 0.7);
            }
        }
    }

    #[test]
    fn test_animated_channels_in_band() {
        let mut backdrop = Backdrop::new(1, FINISH_Z);
        for _ in 0..600 {
            backdrop.advance(1.0 / 60.0);
            let view = backdrop.view();
            assert!((0.7..=1.0 + 1e-5).contains(&view.particle_opacity));
            assert!((0.08..=0.16 + 1e-5).contains(&view.floor_glow_opacity));
            assert!(view.stripe_opacity.iter().all(|o| (0.13..=0.31 + 1e-5).contains(o)));
            assert!(view.stripe_x.iter().all(|x| x.abs() <= 2.5));
            for m in &view.meteors {
                assert!(m[0] <= 70.0 + 1.2 * 60.0 * MAX_FRAME_DT && m[1] >= -1.0);
            }
        }
        assert!((backdrop.time() - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_meteors_wrap() {
        let mut backdrop = Backdrop::new(9, FINISH_Z);
        backdrop.meteors[0].position = Vec3::new(69.9, 50.0, -10.0);
        backdrop.advance(1.0 / 60.0);
        let m = backdrop.meteors[0].position;
        assert!((-60.0..=60.0).contains(&m.x));
        assert!((80.0..=120.0).contains(&m.y));
    }

    #[test]
    fn test_floor_strip_follows_player() {
        let mut floor = FloorStrip::default();
        assert_eq!(floor.tiles, [0.0, -80.0, -160.0]);
        let mut z = 0.0;
        while z > FINISH_Z {
            floor.follow(z);
            assert!(floor.covers(z), "no floor under z={z}");
            z -= 0.6;
        }
        floor.reset();
        assert_eq!(floor, FloorStrip::default());
    }
}
