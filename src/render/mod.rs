//! Render-facing output
//!
//! The crate does not draw. Each frame it builds a [`FrameView`] and hands it
//! to a [`RenderSink`]; the web build forwards it to the embedding page.

pub mod frame;
pub mod instance;

pub use frame::{CameraView, FinishLine, FrameView, PlayerView};
pub use instance::{BeamInstance, BeamRole, CapInstance, InstanceBatch, colors, pack_instances};

/// Consumer of finished frames, invoked once per frame after all updates
pub trait RenderSink {
    fn render(&mut self, frame: &FrameView);
}

/// Sink that drops frames (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullSink {
    pub frames: u64,
}

impl RenderSink for NullSink {
    fn render(&mut self, _frame: &FrameView) {
        self.frames += 1;
    }
}

impl<F: FnMut(&FrameView)> RenderSink for F {
    fn render(&mut self, frame: &FrameView) {
        self(frame)
    }
}
