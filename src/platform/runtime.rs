//! One game screen: session plus cosmetics plus output
//!
//! `Runtime::frame` is the single per-frame entry point for both the browser
//! loop and the headless runner, so the frame order is fixed in one place:
//! simulation, then scenery, then the render sink.

use std::cell::Cell;
use std::rc::Rc;

use crate::assets::ModelSlot;
use crate::backdrop::{Backdrop, FloorStrip};
use crate::error::CorridorError;
use crate::render::{FrameView, RenderSink};
use crate::sim::{FrameReport, GameSession, tick};
use crate::tuning::Tuning;

/// Close request that can be raised while the runtime is borrowed,
/// e.g. from inside the render sink. Applied when the frame ends.
#[derive(Debug, Clone, Default)]
pub struct CloseSignal(Rc<Cell<bool>>);

impl CloseSignal {
    pub fn raise(&self) {
        self.0.set(true);
    }

    pub fn is_raised(&self) -> bool {
        self.0.get()
    }
}

pub struct Runtime<S: RenderSink> {
    pub session: GameSession,
    pub backdrop: Backdrop,
    pub floor: FloorStrip,
    pub model: ModelSlot,
    close_signal: CloseSignal,
    sink: S,
}

impl<S: RenderSink> Runtime<S> {
    pub fn new(tuning: Tuning, seed: u64, sink: S) -> Result<Self, CorridorError> {
        let end_z = tuning.finish_z;
        let session = GameSession::new(tuning, seed)?;
        Ok(Self {
            session,
            backdrop: Backdrop::new(seed, end_z),
            floor: FloorStrip::default(),
            model: ModelSlot::new(),
            close_signal: CloseSignal::default(),
            sink,
        })
    }

    /// Run one rendered frame of `dt` seconds
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        self.apply_close_request();
        let report = tick(&mut self.session, dt);
        if self.session.is_closed() {
            return report;
        }
        self.backdrop.advance(dt);
        self.floor.follow(self.session.player_position().z);

        let view = FrameView::capture(&self.session, &self.backdrop, &self.floor, self.model.fit());
        self.sink.render(&view);
        self.apply_close_request();
        report
    }

    fn apply_close_request(&mut self) {
        if self.close_signal.is_raised() && !self.session.is_closed() {
            self.close();
        }
    }

    pub fn restart(&mut self) {
        self.session.restart();
        self.floor.reset();
    }

    /// Stop the session and drop any pending model load
    pub fn close(&mut self) {
        self.close_signal.raise();
        self.session.close();
        self.model.cancel();
    }

    /// Handle for requesting a close without borrowing the runtime
    pub fn close_signal(&self) -> CloseSignal {
        self.close_signal.clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ModelState;
    use crate::render::NullSink;
    use crate::sim::GameState;
    use glam::Vec3;

    fn runtime() -> Runtime<NullSink> {
        Runtime::new(Tuning::default(), 21, NullSink::default()).unwrap()
    }

    #[test]
    fn test_frames_render_even_during_countdown() {
        let mut rt = runtime();
        for _ in 0..10 {
            rt.frame(1.0 / 60.0);
        }
        assert_eq!(rt.sink().frames, 10);
        assert_eq!(rt.session.state(), GameState::Countdown);
        assert!(rt.backdrop.time() > 0.0);
    }

    #[test]
    fn test_closed_runtime_stops_rendering() {
        let mut rt = runtime();
        let ticket = rt.model.begin_load("/player.glb");
        rt.frame(1.0 / 60.0);
        rt.close();
        rt.frame(1.0 / 60.0);
        assert_eq!(rt.sink().frames, 1);
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_restart_resets_floor() {
        let mut rt = runtime();
        for _ in 0..5 {
            rt.session.countdown_tick();
        }
        for _ in 0..120 {
            rt.frame(1.0 / 60.0);
        }
        rt.restart();
        assert_eq!(rt.floor, FloorStrip::default());
        assert_eq!(rt.session.state(), GameState::Countdown);
    }

    struct ClosingSink {
        signal: Option<CloseSignal>,
        frames: u32,
    }

    impl RenderSink for ClosingSink {
        fn render(&mut self, _frame: &FrameView) {
            self.frames += 1;
            if let Some(signal) = &self.signal {
                signal.raise();
            }
        }
    }

    #[test]
    fn test_close_raised_during_render_applies_after_frame() {
        let sink = ClosingSink { signal: None, frames: 0 };
        let mut rt = Runtime::new(Tuning::default(), 4, sink).unwrap();
        let ticket = rt.model.begin_load("/late.glb");
        let signal = rt.close_signal();
        rt.sink_mut().signal = Some(signal);

        rt.frame(1.0 / 60.0);
        assert!(rt.session.is_closed());
        // The pending load no longer reaches the slot
        let bounds = Ok((Vec3::ZERO, Vec3::new(1.0, 2.0, 1.0)));
        assert!(!ticket.complete(bounds));
        assert_eq!(rt.model.state(), ModelState::Placeholder);

        rt.frame(1.0 / 60.0);
        assert_eq!(rt.sink().frames, 1);
    }

    #[test]
    fn test_close_signal_before_frame() {
        let mut rt = runtime();
        rt.close_signal().raise();
        let report = rt.frame(1.0 / 60.0);
        assert!(!report.advanced);
        assert!(rt.session.is_closed());
        assert_eq!(rt.sink().frames, 0);
    }

    #[test]
    fn test_closure_sink_sees_frames() {
        let mut seen = Vec::new();
        {
            let sink = |frame: &FrameView| seen.push(frame.countdown.clone());
            let mut rt = Runtime::new(Tuning::default(), 2, sink).unwrap();
            rt.frame(1.0 / 60.0);
            rt.session.countdown_tick();
            rt.frame(1.0 / 60.0);
        }
        assert_eq!(seen, vec!["5".to_string(), "4".to_string()]);
    }
}
