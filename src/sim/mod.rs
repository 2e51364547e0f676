//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (layout generation happens once per level)
//! - Obstacle poses are pure functions of play time
//! - Stable iteration order (obstacle list order, by id)
//! - No rendering or platform dependencies

pub mod animate;
pub mod collision;
pub mod laser;
pub mod layout;
pub mod physics;
pub mod player;
pub mod state;
pub mod tick;

pub use animate::{BeamPose, GlowChannels, ObstaclePose, PairPose, animate, end_caps};
pub use collision::{FrameOutcome, OutcomePriority, first_hit, resolve_frame};
pub use laser::{BeamSpec, LaserKind, MotionParams, Obstacle};
pub use layout::{DEFAULT_ZONES, LayoutGenerator, ZeroCountPolicy, Zone, ZoneKind};
pub use physics::{PhysicsWorld, SimpleWorld};
pub use player::{PlayerController, is_grounded};
pub use state::{Countdown, GameSession, GameState};
pub use tick::{FrameReport, tick};
