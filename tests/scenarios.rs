//! End-to-end runs through the public API

use glam::Vec3;
use laser_corridor::Tuning;
use laser_corridor::consts::*;
use laser_corridor::platform::{Action, Runtime};
use laser_corridor::render::NullSink;
use laser_corridor::sim::{
    FrameOutcome, GameSession, GameState, LaserKind, MotionParams, Obstacle, OutcomePriority,
    PhysicsWorld, SimpleWorld, tick,
};
use laser_corridor::tuning::LayoutStyle;

const DT: f32 = 1.0 / 60.0;

fn empty_session(tuning: Tuning) -> GameSession {
    GameSession::from_layout(tuning, 1, Vec::new(), SimpleWorld::new(SPAWN_POINT))
}

fn start(session: &mut GameSession) {
    for _ in 0..COUNTDOWN_SECS {
        session.countdown_tick();
    }
    assert_eq!(session.state(), GameState::Playing);
}

fn still_beam(id: u32, base: Vec3) -> Obstacle {
    Obstacle {
        id,
        kind: LaserKind::Horizontal,
        base,
        roll: LaserKind::Horizontal.default_roll(),
        motion: MotionParams {
            speed: 1.0,
            range: 0.0,
            phase: 0.0,
        },
        base_thickness: BEAM_RADIUS,
    }
}

#[test]
fn test_countdown_reaches_go() {
    let mut session = empty_session(Tuning::default());
    assert_eq!(session.countdown_label(), "5");
    for _ in 0..4 {
        session.countdown_tick();
    }
    assert_eq!(session.state(), GameState::Countdown);
    session.countdown_tick();
    assert_eq!(session.state(), GameState::Playing);
    assert_eq!(session.countdown_label(), "GO!");
}

#[test]
fn test_empty_corridor_runs_at_forward_speed() {
    let mut session = empty_session(Tuning::default());
    start(&mut session);
    for _ in 0..120 {
        tick(&mut session, DT);
    }
    let z = session.player_position().z;
    assert!((z + FORWARD_SPEED * 2.0).abs() < 1.0, "z = {z}");
    assert_eq!(session.state(), GameState::Playing);
}

#[test]
fn test_double_jump_then_refused() {
    let mut session = empty_session(Tuning::default());
    start(&mut session);
    // Land first
    for _ in 0..120 {
        tick(&mut session, DT);
    }

    let mut jumped = Vec::new();
    for _ in 0..3 {
        session.keys_mut().press(Action::Jump);
        jumped.push(tick(&mut session, DT).jumped);
        session.keys_mut().release(Action::Jump);
    }
    assert_eq!(jumped, vec![true, true, false]);
    assert_eq!(session.player().jump_count(), 2);
}

#[test]
fn test_jump_tapped_during_countdown_does_not_fire() {
    let mut session = empty_session(Tuning::default());
    session.keys_mut().key_down(" ");
    session.keys_mut().key_up(" ");
    start(&mut session);

    let report = tick(&mut session, DT);
    assert!(!report.jumped);
    assert_eq!(session.player().jump_count(), 0);

    // A fresh press during play still jumps
    for _ in 0..120 {
        tick(&mut session, DT);
    }
    session.keys_mut().key_down(" ");
    assert!(tick(&mut session, DT).jumped);
}

#[test]
fn test_low_beam_ends_run() {
    let obstacles = vec![still_beam(3, Vec3::new(0.0, 1.2, -50.0))];
    let world = SimpleWorld::new(SPAWN_POINT);
    let mut session = GameSession::from_layout(Tuning::default(), 1, obstacles, world);
    start(&mut session);

    let mut outcome = None;
    for _ in 0..180 {
        let report = tick(&mut session, DT);
        if report.outcome.is_some() {
            outcome = report.outcome;
            break;
        }
    }
    assert_eq!(outcome, Some(FrameOutcome::Collision { obstacle_id: 3 }));
    assert_eq!(session.state(), GameState::GameOver);

    // Frozen afterwards
    let z = session.player_position().z;
    tick(&mut session, DT);
    assert_eq!(session.player_position().z, z);
}

fn finish_on_beam(priority: OutcomePriority) -> GameState {
    let tuning = Tuning {
        finish_z: -2.0,
        outcome_priority: priority,
        ..Tuning::default()
    };
    let obstacles = vec![still_beam(1, Vec3::new(0.0, 1.2, -2.1))];
    let world = SimpleWorld::new(SPAWN_POINT);
    let mut session = GameSession::from_layout(tuning, 1, obstacles, world);
    start(&mut session);
    session.world_mut().set_position(Vec3::new(0.0, 1.2, -2.1));
    tick(&mut session, DT).state
}

#[test]
fn test_finish_and_hit_on_same_frame() {
    assert_eq!(finish_on_beam(OutcomePriority::FinishFirst), GameState::Win);
    assert_eq!(finish_on_beam(OutcomePriority::CollisionFirst), GameState::GameOver);
}

#[test]
fn test_restart_restores_poses() {
    let mut session = GameSession::new(Tuning::default(), 99).unwrap();
    let initial = session.poses().to_vec();
    start(&mut session);
    for _ in 0..90 {
        tick(&mut session, DT);
    }
    assert_ne!(session.poses(), initial.as_slice());

    session.restart();
    assert_eq!(session.state(), GameState::Countdown);
    assert_eq!(session.poses(), initial.as_slice());
    assert_eq!(session.player_position(), SPAWN_POINT);
    assert_eq!(session.elapsed(), 0.0);
}

#[test]
fn test_uniform_layout_follows_tuned_finish() {
    let tuning = Tuning {
        layout: LayoutStyle::Uniform { count: 12 },
        finish_z: -300.0,
        ..Tuning::default()
    };
    let session = GameSession::new(tuning, 3).unwrap();
    let last = session.obstacles().iter().map(|o| o.z()).fold(f32::INFINITY, f32::min);
    assert!((last - (-300.0 - LASER_OVERRUN)).abs() < 1e-3, "last laser at {last}");
}

#[test]
fn test_same_seed_same_level() {
    let a = GameSession::new(Tuning::default(), 2024).unwrap();
    let b = GameSession::new(Tuning::default(), 2024).unwrap();
    let c = GameSession::new(Tuning::default(), 2025).unwrap();
    assert_eq!(a.obstacles(), b.obstacles());
    assert_ne!(a.obstacles(), c.obstacles());
}

#[test]
fn test_runtime_close_is_final() {
    let mut rt = Runtime::new(Tuning::default(), 5, NullSink::default()).unwrap();
    for _ in 0..COUNTDOWN_SECS {
        rt.session.countdown_tick();
    }
    rt.frame(DT);
    rt.close();
    rt.restart();
    rt.session.countdown_tick();
    let report = rt.frame(DT);
    assert!(!report.advanced);
    assert!(rt.session.is_closed());
    assert_eq!(rt.sink().frames, 1);
}
