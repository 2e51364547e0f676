//! Hit testing and end-of-run detection
//!
//! A hit is the player's center coming within the hit radius of a live
//! beam's center. Obstacles are tested in list order and the first hit wins.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::animate::ObstaclePose;
use super::laser::Obstacle;
use super::state::GameState;
use crate::tuning::Tuning;

/// Which outcome a frame reports when it both crosses the finish and
/// touches a beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutcomePriority {
    /// Crossing the finish line wins
    #[default]
    FinishFirst,
    /// Hazards are checked before the finish line
    CollisionFirst,
}

/// How a run ended this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Collision { obstacle_id: u32 },
    FellIntoAbyss,
    ReachedFinish,
}

impl FrameOutcome {
    /// The state this outcome moves the session into
    pub fn state(self) -> GameState {
        match self {
            FrameOutcome::Collision { .. } | FrameOutcome::FellIntoAbyss => GameState::GameOver,
            FrameOutcome::ReachedFinish => GameState::Win,
        }
    }
}

/// Id of the first live obstacle whose beam center lies within `hit_radius`
///
/// `poses[i]` belongs to `obstacles[i]`; a `None` pose (skipped this frame)
/// never hits.
pub fn first_hit(
    player: Vec3,
    hit_radius: f32,
    obstacles: &[Obstacle],
    poses: &[Option<ObstaclePose>],
) -> Option<u32> {
    obstacles
        .iter()
        .zip(poses)
        .find_map(|(obstacle, pose)| match pose {
            Some(pose) if pose.is_live() && player.distance(pose.beam.center) < hit_radius => {
                Some(obstacle.id)
            }
            _ => None,
        })
}

/// Decide whether the run ends this frame
pub fn resolve_frame(
    player: Vec3,
    obstacles: &[Obstacle],
    poses: &[Option<ObstaclePose>],
    tuning: &Tuning,
) -> Option<FrameOutcome> {
    let finish = (player.z < tuning.finish_z).then_some(FrameOutcome::ReachedFinish);
    let hazard = || {
        first_hit(player, tuning.hit_radius, obstacles, poses)
            .map(|obstacle_id| FrameOutcome::Collision { obstacle_id })
            .or_else(|| (player.y < tuning.abyss_y).then_some(FrameOutcome::FellIntoAbyss))
    };

    match tuning.outcome_priority {
        OutcomePriority::FinishFirst => finish.or_else(hazard),
        OutcomePriority::CollisionFirst => hazard().or(finish),
    }
}
