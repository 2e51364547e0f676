//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (raw key state shared by both targets)
//! - The frame runtime shared by the browser loop and the headless runner
//! - The browser bindings: animation frames, countdown timer, listeners

pub mod input;
pub mod runtime;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{Action, KeyState};
pub use runtime::{CloseSignal, Runtime};
