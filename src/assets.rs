//! Player model slot
//!
//! The player is drawn as a placeholder capsule until a model load finishes.
//! A load hands out a [`LoadTicket`]; completing the ticket only touches the
//! slot if the slot still exists and no newer load or cancel has happened
//! since, so a late response after teardown is dropped.

use glam::Vec3;
use serde::Serialize;
use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::{Rc, Weak};

use crate::error::CorridorError;

/// Model fetched for the player by the web build
pub const DEFAULT_PLAYER_MODEL: &str = "/sprites/base_basic_pbr.glb";

/// Height a loaded model is scaled to
pub const PLAYER_MODEL_HEIGHT: f32 = 1.8;

/// Transform that fits a model into the player's body
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelFit {
    pub scale: f32,
    /// Translation that centers the scaled model on the body
    pub offset: Vec3,
    /// Turn to face down the corridor (-z)
    pub yaw: f32,
}

/// Scale a model with bounds `min..max` to player height and center it
pub fn fit_model(min: Vec3, max: Vec3) -> Result<ModelFit, CorridorError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(CorridorError::Asset("model bounds are not finite".into()));
    }
    let height = max.y - min.y;
    if height <= 0.0 {
        return Err(CorridorError::Asset(format!("model has no height ({height})")));
    }
    let scale = PLAYER_MODEL_HEIGHT / height;
    let center = (min + max) * 0.5;
    Ok(ModelFit {
        scale,
        offset: -center * scale,
        yaw: PI,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    Placeholder,
    Loading { url: String },
    Ready { url: String, fit: ModelFit },
}

#[derive(Debug)]
struct SlotInner {
    generation: u64,
    state: ModelState,
}

/// Owner of the player's model state
#[derive(Debug)]
pub struct ModelSlot {
    inner: Rc<RefCell<SlotInner>>,
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSlot {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotInner {
                generation: 0,
                state: ModelState::Placeholder,
            })),
        }
    }

    pub fn state(&self) -> ModelState {
        self.inner.borrow().state.clone()
    }

    /// Fit of the loaded model, `None` while the placeholder shows
    pub fn fit(&self) -> Option<ModelFit> {
        match self.inner.borrow().state {
            ModelState::Ready { fit, .. } => Some(fit),
            _ => None,
        }
    }

    /// Start a load of `url`, superseding any load in flight
    pub fn begin_load(&self, url: &str) -> LoadTicket {
        let mut inner = self.inner.borrow_mut();
        inner.generation += 1;
        if !matches!(inner.state, ModelState::Ready { .. }) {
            inner.state = ModelState::Loading { url: url.to_string() };
        }
        log::info!("Loading player model {url}");
        LoadTicket {
            slot: Rc::downgrade(&self.inner),
            generation: inner.generation,
            url: url.to_string(),
        }
    }

    /// Invalidate every outstanding ticket
    pub fn cancel(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.generation += 1;
        if let ModelState::Loading { .. } = inner.state {
            inner.state = ModelState::Placeholder;
        }
    }
}

/// Handle for one in-flight load
#[derive(Debug)]
pub struct LoadTicket {
    slot: Weak<RefCell<SlotInner>>,
    generation: u64,
    url: String,
}

impl LoadTicket {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether completing now would still reach the slot
    pub fn is_current(&self) -> bool {
        match self.slot.upgrade() {
            Some(inner) => {
                let generation = inner.borrow().generation;
                generation == self.generation
            }
            None => false,
        }
    }

    /// Deliver the load result as model bounds. Returns whether the slot
    /// changed to `Ready`.
    pub fn complete(self, bounds: Result<(Vec3, Vec3), CorridorError>) -> bool {
        let Some(inner) = self.slot.upgrade() else {
            log::debug!("Model {} finished after teardown, dropped", self.url);
            return false;
        };
        let mut inner = inner.borrow_mut();
        if inner.generation != self.generation {
            log::debug!("Model {} superseded, dropped", self.url);
            return false;
        }

        match bounds.and_then(|(min, max)| fit_model(min, max)) {
            Ok(fit) => {
                log::info!("Player model {} ready (scale {:.3})", self.url, fit.scale);
                inner.state = ModelState::Ready { url: self.url, fit };
                true
            }
            Err(e) => {
                log::error!("Error loading player model {}, using placeholder: {e}", self.url);
                if let ModelState::Loading { .. } = inner.state {
                    inner.state = ModelState::Placeholder;
                }
                false
            }
        }
    }
}
