//! Game balance knobs
//!
//! Defaults come from [`crate::consts`]. A JSON override can be stored in
//! LocalStorage on the web build; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::CorridorError;
use crate::sim::{OutcomePriority, ZeroCountPolicy};

/// Which layout generator builds the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutStyle {
    /// Themed zones (the default level)
    #[default]
    Zoned,
    /// Evenly spaced lasers cycling through every kind
    Uniform { count: u32 },
}

/// Tunable game parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fixed layout seed; `None` picks one per session
    pub seed: Option<u64>,
    pub layout: LayoutStyle,
    pub zero_count_zones: ZeroCountPolicy,

    // === Player ===
    pub forward_speed: f32,
    pub strafe_speed: f32,
    /// Multiplier applied to lateral velocity every frame (0..=1)
    pub lateral_damping: f32,
    pub jump_velocity: f32,
    pub max_jumps: u8,
    pub corridor_half_width: f32,

    // === Rules ===
    pub hit_radius: f32,
    pub finish_z: f32,
    pub abyss_y: f32,
    pub countdown_secs: u32,
    /// Which outcome wins when a frame both finishes and collides
    pub outcome_priority: OutcomePriority,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: None,
            layout: LayoutStyle::Zoned,
            zero_count_zones: ZeroCountPolicy::Skip,

            forward_speed: FORWARD_SPEED,
            strafe_speed: STRAFE_SPEED,
            lateral_damping: LATERAL_DAMPING,
            jump_velocity: JUMP_VELOCITY,
            max_jumps: MAX_JUMP,
            corridor_half_width: CORRIDOR_HALF_WIDTH,

            hit_radius: HIT_RADIUS,
            finish_z: FINISH_Z,
            abyss_y: ABYSS_Y,
            countdown_secs: COUNTDOWN_SECS,
            outcome_priority: OutcomePriority::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, CorridorError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the game cannot run with
    pub fn validate(&self) -> Result<(), CorridorError> {
        let positive = [
            ("forward_speed", self.forward_speed),
            ("strafe_speed", self.strafe_speed),
            ("jump_velocity", self.jump_velocity),
            ("corridor_half_width", self.corridor_half_width),
            ("hit_radius", self.hit_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CorridorError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.lateral_damping) {
            return Err(CorridorError::Config(format!(
                "lateral_damping must be in [0, 1], got {}",
                self.lateral_damping
            )));
        }
        if self.max_jumps == 0 {
            return Err(CorridorError::Config("max_jumps must be at least 1".into()));
        }
        if !(self.finish_z.is_finite() && self.finish_z < SPAWN_POINT.z) {
            return Err(CorridorError::Config(format!(
                "finish_z must lie ahead of spawn (below {}), got {}",
                SPAWN_POINT.z, self.finish_z
            )));
        }
        if !(self.abyss_y.is_finite() && self.abyss_y < SPAWN_POINT.y) {
            return Err(CorridorError::Config(format!(
                "abyss_y must lie below spawn, got {}",
                self.abyss_y
            )));
        }
        if let LayoutStyle::Uniform { count: 0 } = self.layout {
            return Err(CorridorError::Config("uniform layout needs at least one laser".into()));
        }
        Ok(())
    }

    /// Layout seed, falling back to `fallback` when none is pinned
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "laser_corridor_tuning";

    /// Load a tuning override from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(Ok(Some(json))) = storage.map(|s| s.get_item(Self::STORAGE_KEY)) {
            match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from LocalStorage");
                    return tuning;
                }
                Err(e) => log::warn!("Ignoring stored tuning: {e}"),
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Save tuning to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Tuning saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No {} store on native, using defaults", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
