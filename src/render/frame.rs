//! Per-frame snapshot handed to the renderer

use glam::Vec3;
use serde::Serialize;

use super::instance::{InstanceBatch, colors, pack_instances};
use crate::assets::ModelFit;
use crate::backdrop::{Backdrop, BackdropView, FloorStrip};
use crate::consts::*;
use crate::sim::{GameSession, GameState, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerView {
    pub position: Vec3,
    /// Uniform breathing scale
    pub scale: f32,
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    pub jump_count: u8,
}

impl PlayerView {
    /// Player appearance at scene time `t`
    pub fn at(position: Vec3, jump_count: u8, t: f32) -> Self {
        let color = colors::hsl(0.4 + 0.1 * t.sin(), 0.8, 0.6);
        Self {
            position,
            scale: 1.0 + 0.08 * (8.0 * t).sin(),
            color,
            emissive: colors::lerp(color, [1.0; 4], 0.3),
            jump_count,
        }
    }
}

/// Chase camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraView {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraView {
    pub fn follow(player: Vec3) -> Self {
        Self {
            eye: player + CAMERA_OFFSET,
            target: player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinishLine {
    pub z: f32,
    pub width: f32,
    pub color: [f32; 4],
}

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub state: GameState,
    pub countdown: String,
    pub elapsed: f32,
    pub player: PlayerView,
    /// `None` while the placeholder capsule is shown
    pub model: Option<ModelFit>,
    pub camera: CameraView,
    pub floor_tiles: [f32; FLOOR_TILE_COUNT],
    pub finish: FinishLine,
    pub backdrop: BackdropView,
    /// Packed beams and caps; shipped as raw buffers, not JSON
    #[serde(skip)]
    pub instances: InstanceBatch,
}

impl FrameView {
    pub fn capture<W: PhysicsWorld>(
        session: &GameSession<W>,
        backdrop: &Backdrop,
        floor: &FloorStrip,
        model: Option<ModelFit>,
    ) -> Self {
        let position = session.player_position();
        Self {
            state: session.state(),
            countdown: session.countdown_label(),
            elapsed: session.elapsed(),
            player: PlayerView::at(position, session.player().jump_count(), backdrop.time()),
            model,
            camera: CameraView::follow(position),
            floor_tiles: floor.tiles,
            finish: FinishLine {
                z: session.tuning.finish_z,
                width: FLOOR_WIDTH,
                color: colors::FINISH_BAR,
            },
            backdrop: backdrop.view(),
            instances: pack_instances(session.obstacles(), session.poses()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimpleWorld;
    use crate::tuning::Tuning;

    #[test]
    fn test_camera_trails_player() {
        let cam = CameraView::follow(Vec3::new(1.0, 1.1, -300.0));
        assert_eq!(cam.eye, Vec3::new(1.0, 6.1, -292.0));
        assert_eq!(cam.target, Vec3::new(1.0, 1.1, -300.0));
    }

    #[test]
    fn test_player_pulse_band() {
        for i in 0..200 {
            let view = PlayerView::at(Vec3::ZERO, 0, i as f32 * 0.05);
            assert!((0.92 - 1e-5..=1.08 + 1e-5).contains(&view.scale));
            assert!(view.emissive.iter().zip(view.color).all(|(e, c)| *e >= c - 1e-6));
        }
    }

    #[test]
    fn test_capture_serializes() {
        let session = GameSession::new(Tuning::default(), 8).unwrap();
        let backdrop = Backdrop::new(8, FINISH_Z);
        let view = FrameView::capture(&session, &backdrop, &FloorStrip::default(), None);
        assert_eq!(view.state, GameState::Countdown);
        assert_eq!(view.countdown, "5");
        assert!(!view.instances.beams.is_empty());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "Countdown");
        assert_eq!(json["model"], serde_json::Value::Null);
        assert!(json.get("instances").is_none());
        assert_eq!(json["floor_tiles"][1], -80.0);
    }

    #[test]
    fn test_capture_with_custom_world() {
        let world = SimpleWorld::bottomless(SPAWN_POINT);
        let session = GameSession::from_layout(Tuning::default(), 1, Vec::new(), world);
        let backdrop = Backdrop::new(1, FINISH_Z);
        let view = FrameView::capture(&session, &backdrop, &FloorStrip::default(), None);
        assert_eq!(view.player.position, SPAWN_POINT);
        assert!(view.instances.beams.is_empty());
    }
}
