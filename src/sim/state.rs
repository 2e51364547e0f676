//! Game state and session ownership
//!
//! `GameSession` owns every piece of mutable run state: the obstacle layout,
//! the player body, the countdown and the key state. The frame pipeline in
//! [`super::tick`] threads it through each update.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::animate::{ObstaclePose, animate};
use super::laser::Obstacle;
use super::layout::{DEFAULT_ZONES, LayoutGenerator};
use super::physics::{PhysicsWorld, SimpleWorld};
use super::player::PlayerController;
use crate::consts::*;
use crate::error::CorridorError;
use crate::platform::input::KeyState;
use crate::tuning::{LayoutStyle, Tuning};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Counting down before the run starts
    Countdown,
    /// Active gameplay
    Playing,
    /// Hit a beam or fell off
    GameOver,
    /// Crossed the finish line
    Win,
}

impl GameState {
    /// Whether `next` is a legal successor. Restart (to `Countdown`) is
    /// always allowed.
    pub fn can_transition_to(self, next: GameState) -> bool {
        matches!(
            (self, next),
            (_, GameState::Countdown)
                | (GameState::Countdown, GameState::Playing)
                | (GameState::Playing, GameState::GameOver)
                | (GameState::Playing, GameState::Win)
        )
    }

    /// Run has ended and waits for a restart
    pub fn is_finished(self) -> bool {
        matches!(self, GameState::GameOver | GameState::Win)
    }
}

/// Whole-second pre-run countdown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    start: u32,
    remaining: u32,
    /// Fractional seconds carried by `advance`
    carry: f32,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            start: secs,
            remaining: secs,
            carry: 0.0,
        }
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// One second elapsed. Returns true on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    /// Accumulate `dt` seconds and return how many whole seconds passed
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.carry += dt;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as u32
    }

    /// Text shown over the corridor
    pub fn label(&self) -> String {
        match self.remaining {
            0 => "GO!".to_string(),
            n => n.to_string(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.start);
    }
}

/// Complete state of one game screen
pub struct GameSession<W: PhysicsWorld = SimpleWorld> {
    pub tuning: Tuning,
    seed: u64,
    state: GameState,
    countdown: Countdown,
    world: W,
    player: PlayerController,
    keys: KeyState,
    /// Layout as generated; poses are derived from it and play time
    obstacles: Vec<Obstacle>,
    /// Pose of `obstacles[i]` this frame, `None` when skipped
    poses: Vec<Option<ObstaclePose>>,
    /// Seconds of play since the countdown finished
    elapsed: f32,
    closed: bool,
}

impl GameSession<SimpleWorld> {
    /// Generate a level from `seed` and start counting down
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, CorridorError> {
        tuning.validate()?;
        let obstacles = generate_layout(&tuning, seed)?;
        Ok(Self::from_layout(tuning, seed, obstacles, SimpleWorld::new(SPAWN_POINT)))
    }
}

impl<W: PhysicsWorld> GameSession<W> {
    /// Build a session around an existing layout and world
    pub fn from_layout(tuning: Tuning, seed: u64, obstacles: Vec<Obstacle>, mut world: W) -> Self {
        world.reset(SPAWN_POINT);
        let countdown = Countdown::new(tuning.countdown_secs);
        log::info!("Level start: seed={seed}, {} obstacles", obstacles.len());
        let mut session = Self {
            tuning,
            seed,
            state: GameState::Countdown,
            countdown,
            world,
            player: PlayerController::new(),
            keys: KeyState::new(),
            obstacles,
            poses: Vec::new(),
            elapsed: 0.0,
            closed: false,
        };
        session.refresh_poses();
        if session.countdown.remaining() == 0 {
            session.enter(GameState::Playing);
        }
        session
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn countdown_label(&self) -> String {
        self.countdown.label()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn poses(&self) -> &[Option<ObstaclePose>] {
        &self.poses
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn player_position(&self) -> Vec3 {
        self.world.position()
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    /// Seconds of play time
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Move to `next` if the transition is legal
    pub(crate) fn enter(&mut self, next: GameState) -> bool {
        if !self.state.can_transition_to(next) {
            log::warn!("Ignoring transition {:?} -> {:?}", self.state, next);
            return false;
        }
        log::info!("State {:?} -> {:?}", self.state, next);
        if next == GameState::Playing {
            // Presses made before play are stale
            self.keys.take_jump();
        }
        self.state = next;
        true
    }

    /// One second of countdown, driven by an external one-second timer
    pub fn countdown_tick(&mut self) {
        if self.closed || self.state != GameState::Countdown {
            return;
        }
        let done = self.countdown.tick();
        log::debug!("Countdown: {}", self.countdown.label());
        if done {
            self.enter(GameState::Playing);
        }
    }

    /// Drive the countdown from frame time instead of a timer
    pub fn advance_countdown(&mut self, dt: f32) {
        if self.closed || self.state != GameState::Countdown {
            return;
        }
        let secs = self.countdown.advance(dt).min(self.countdown.remaining());
        for _ in 0..secs {
            self.countdown_tick();
        }
    }

    /// Return to the countdown with the original layout, body and timers
    pub fn restart(&mut self) {
        if self.closed {
            log::warn!("Restart ignored, session is closed");
            return;
        }
        self.enter(GameState::Countdown);
        self.countdown.reset();
        self.world.reset(SPAWN_POINT);
        self.player.reset();
        self.keys.clear();
        self.elapsed = 0.0;
        self.refresh_poses();
        if self.countdown.remaining() == 0 {
            self.enter(GameState::Playing);
        }
    }

    /// Tear down: nothing advances after this
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.keys.clear();
        log::info!("Session closed in {:?}", self.state);
    }

    /// Advance play time by `dt` seconds
    pub(crate) fn advance_clock(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Body and controller, borrowed together for the control step
    pub(crate) fn control(&mut self) -> bool {
        self.player.update(&mut self.world, &mut self.keys, &self.tuning)
    }

    /// Recompute every obstacle pose at the current play time.
    ///
    /// A pose that comes out non-finite is dropped for this frame only.
    pub(crate) fn refresh_poses(&mut self) {
        let t = self.elapsed;
        self.poses.clear();
        self.poses.extend(self.obstacles.iter().map(|obstacle| {
            let pose = animate(obstacle, t);
            if pose.is_finite() {
                Some(pose)
            } else {
                log::warn!(
                    "Skipping obstacle {} ({}) with non-finite pose at t={t}",
                    obstacle.id,
                    obstacle.kind.tag()
                );
                None
            }
        }));
    }
}

/// Build the level layout the tuning asks for
pub fn generate_layout(tuning: &Tuning, seed: u64) -> Result<Vec<Obstacle>, CorridorError> {
    let mut generator = LayoutGenerator::new(seed).with_policy(tuning.zero_count_zones);
    match tuning.layout {
        LayoutStyle::Zoned => generator.generate(&DEFAULT_ZONES),
        LayoutStyle::Uniform { count } => {
            Ok(generator.uniform(count as usize, tuning.finish_z))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::laser::{LaserKind, MotionParams};

    fn empty_session() -> GameSession {
        GameSession::from_layout(Tuning::default(), 1, Vec::new(), SimpleWorld::default())
    }

    #[test]
    fn test_transition_table() {
        use GameState as S;
        assert!(S::Countdown.can_transition_to(S::Playing));
        assert!(S::Playing.can_transition_to(S::GameOver));
        assert!(S::Playing.can_transition_to(S::Win));
        for s in [S::Countdown, S::Playing, S::GameOver, S::Win] {
            assert!(s.can_transition_to(S::Countdown));
        }
        assert!(!S::Countdown.can_transition_to(S::GameOver));
        assert!(!S::GameOver.can_transition_to(S::Win));
        assert!(!S::Win.can_transition_to(S::Playing));
        assert!(!S::GameOver.can_transition_to(S::Playing));
        assert!(S::Win.is_finished() && !S::Playing.is_finished());
    }

    #[test]
    fn test_countdown_labels() {
        let mut c = Countdown::new(3);
        assert_eq!(c.label(), "3");
        assert!(!c.tick());
        assert!(!c.tick());
        assert_eq!(c.label(), "1");
        assert!(c.tick());
        assert_eq!(c.label(), "GO!");
        assert!(!c.tick());
        c.reset();
        assert_eq!(c.remaining(), 3);
    }

    #[test]
    fn test_countdown_advance_carries_fraction() {
        let mut c = Countdown::new(5);
        assert_eq!(c.advance(0.6), 0);
        assert_eq!(c.advance(0.6), 1);
        assert_eq!(c.advance(2.0), 2);
        assert_eq!(c.advance(f32::NAN), 0);
    }

    #[test]
    fn test_session_counts_down_into_play() {
        let mut session = empty_session();
        assert_eq!(session.state(), GameState::Countdown);
        for _ in 0..4 {
            session.countdown_tick();
        }
        assert_eq!(session.state(), GameState::Countdown);
        assert_eq!(session.countdown_label(), "1");
        session.countdown_tick();
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.countdown_label(), "GO!");
        // Late timer callbacks are ignored
        session.countdown_tick();
        assert_eq!(session.state(), GameState::Playing);
    }

    #[test]
    fn test_huge_countdown_step_finishes_at_once() {
        let mut session = empty_session();
        session.advance_countdown(1.0e9);
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.countdown().remaining(), 0);
    }

    #[test]
    fn test_jump_latched_before_play_is_dropped() {
        let mut session = empty_session();
        session.keys_mut().key_down(" ");
        session.keys_mut().key_up(" ");
        for _ in 0..COUNTDOWN_SECS {
            session.countdown_tick();
        }
        assert_eq!(session.state(), GameState::Playing);
        assert!(!session.keys_mut().take_jump());
    }

    #[test]
    fn test_zero_second_countdown_starts_playing() {
        let tuning = Tuning { countdown_secs: 0, ..Tuning::default() };
        let session = GameSession::from_layout(tuning, 1, Vec::new(), SimpleWorld::default());
        assert_eq!(session.state(), GameState::Playing);
    }

    #[test]
    fn test_illegal_transition_ignored() {
        let mut session = empty_session();
        assert!(!session.enter(GameState::Win));
        assert_eq!(session.state(), GameState::Countdown);
    }

    #[test]
    fn test_restart_restores_initial_conditions() {
        let obstacle = Obstacle {
            id: 1,
            kind: LaserKind::Vertical,
            base: Vec3::new(0.0, 3.0, -300.0),
            roll: 0.0,
            motion: MotionParams { speed: 1.5, range: 4.0, phase: 0.3 },
            base_thickness: BEAM_RADIUS,
        };
        let mut session =
            GameSession::from_layout(Tuning::default(), 5, vec![obstacle], SimpleWorld::default());
        let initial_poses = session.poses().to_vec();

        for _ in 0..5 {
            session.countdown_tick();
        }
        session.advance_clock(3.7);
        session.refresh_poses();
        session.world_mut().set_position(Vec3::new(2.0, 1.1, -120.0));
        session.keys_mut().key_down(" ");
        assert!(session.enter(GameState::GameOver));
        assert_ne!(session.poses(), initial_poses.as_slice());

        session.restart();
        assert_eq!(session.state(), GameState::Countdown);
        assert_eq!(session.countdown_label(), "5");
        assert_eq!(session.elapsed(), 0.0);
        assert_eq!(session.player_position(), SPAWN_POINT);
        assert_eq!(session.poses(), initial_poses.as_slice());
        assert!(!session.keys_mut().take_jump());
    }

    #[test]
    fn test_closed_session_ignores_timers() {
        let mut session = empty_session();
        session.close();
        session.countdown_tick();
        session.advance_countdown(10.0);
        session.restart();
        assert!(session.is_closed());
        assert_eq!(session.state(), GameState::Countdown);
        assert_eq!(session.countdown_label(), "5");
    }

    #[test]
    fn test_new_generates_default_level() {
        let session = GameSession::new(Tuning::default(), 42).unwrap();
        assert_eq!(session.obstacles().len(), 62);
        assert_eq!(session.poses().len(), 62);
        assert!(session.poses().iter().all(Option::is_some));

        let uniform = Tuning { layout: LayoutStyle::Uniform { count: 40 }, ..Tuning::default() };
        assert_eq!(GameSession::new(uniform, 42).unwrap().obstacles().len(), 40);
    }

    #[test]
    fn test_non_finite_obstacle_skipped() {
        let bad = Obstacle {
            id: 4,
            kind: LaserKind::Vertical,
            base: Vec3::new(0.0, 2.0, -60.0),
            roll: 0.0,
            motion: MotionParams { speed: f32::INFINITY, range: 1.0, phase: 0.0 },
            base_thickness: BEAM_RADIUS,
        };
        // 0 · ∞ is NaN, so the sweep is NaN at t = 0
        let session =
            GameSession::from_layout(Tuning::default(), 1, vec![bad], SimpleWorld::default());
        assert_eq!(session.poses().len(), 1);
        assert!(session.poses()[0].is_none());
    }
}
