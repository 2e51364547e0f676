//! Per-frame update
//!
//! Order within a frame: physics step, player control, obstacle poses,
//! hit testing. Nothing runs outside `Playing`, and a frame that ends the
//! run stops there.

use super::collision::{FrameOutcome, resolve_frame};
use super::physics::PhysicsWorld;
use super::state::{GameSession, GameState};
use crate::consts::MAX_FRAME_DT;

/// What happened during one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// State after the frame
    pub state: GameState,
    /// Set on the frame the run ended
    pub outcome: Option<FrameOutcome>,
    pub jumped: bool,
    /// Whether the simulation advanced at all
    pub advanced: bool,
}

impl FrameReport {
    fn idle(state: GameState) -> Self {
        Self {
            state,
            outcome: None,
            jumped: false,
            advanced: false,
        }
    }
}

/// Advance the session by one rendered frame of `dt` seconds
pub fn tick<W: PhysicsWorld>(session: &mut GameSession<W>, dt: f32) -> FrameReport {
    if session.is_closed() || session.state() != GameState::Playing {
        return FrameReport::idle(session.state());
    }
    let dt = if dt.is_finite() && dt > 0.0 { dt.min(MAX_FRAME_DT) } else { 0.0 };

    session.world_mut().step(dt);
    let jumped = session.control();

    session.advance_clock(dt);
    session.refresh_poses();

    let outcome = resolve_frame(
        session.player_position(),
        session.obstacles(),
        session.poses(),
        &session.tuning,
    );
    if let Some(outcome) = outcome {
        match outcome {
            FrameOutcome::Collision { obstacle_id } => {
                log::info!("Hit obstacle {obstacle_id} at z={:.1}", session.player_position().z)
            }
            FrameOutcome::FellIntoAbyss => log::info!("Fell into the abyss"),
            FrameOutcome::ReachedFinish => {
                log::info!("Finish reached after {:.2}s", session.elapsed())
            }
        }
        session.enter(outcome.state());
    }

    FrameReport {
        state: session.state(),
        outcome,
        jumped,
        advanced: true,
    }
}
