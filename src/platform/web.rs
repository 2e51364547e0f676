//! Browser bindings
//!
//! `LaserCorridorGame` is the handle the embedding page holds. It owns the
//! runtime plus every browser subscription the game makes (animation frame,
//! countdown interval, keyboard listeners) and removes all of them in
//! `close()`. Closures are only dropped with the handle, after they have
//! been unregistered.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::assets::DEFAULT_PLAYER_MODEL;
use crate::backdrop::{Backdrop, SKY_GRADIENT};
use crate::consts::PHYSICS_DT;
use crate::error::CorridorError;
use crate::render::{FrameView, RenderSink};
use crate::sim::{GameState, Obstacle};
use crate::tuning::Tuning;

use super::runtime::{CloseSignal, Runtime};

const COUNTDOWN_INTERVAL_MS: i32 = 1000;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Already set if the module is initialised twice
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn busy() -> JsValue {
    JsValue::from_str("game is busy rendering a frame")
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

/// Forwards frames to a JS callback: `render(frameJson, beams, caps)`.
///
/// `beams` and `caps` are `Float32Array`s over the packed instance records;
/// the `role` field of a beam is a `u32` and must be read through a
/// `Uint32Array` view of the same buffer.
struct JsSink {
    callback: js_sys::Function,
}

impl RenderSink for JsSink {
    fn render(&mut self, frame: &FrameView) {
        let json = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Frame serialization failed: {e}");
                return;
            }
        };
        let beams: &[f32] = bytemuck::cast_slice(&frame.instances.beams);
        let caps: &[f32] = bytemuck::cast_slice(&frame.instances.caps);
        let beams = js_sys::Float32Array::from(beams);
        let caps = js_sys::Float32Array::from(caps);
        if let Err(e) = self
            .callback
            .call3(&JsValue::NULL, &JsValue::from_str(&json), &beams, &caps)
        {
            log::warn!("Render callback threw: {e:?}");
        }
    }
}

#[derive(Default)]
struct Hooks {
    on_restart: Option<js_sys::Function>,
    on_close: Option<js_sys::Function>,
    /// Called with "Win" or "GameOver" when a run ends
    on_outcome: Option<js_sys::Function>,
}

/// Call a hook without holding the borrow, so the hook may re-register
fn call_hook(
    hooks: &RefCell<Hooks>,
    pick: fn(&Hooks) -> &Option<js_sys::Function>,
    arg: &JsValue,
) {
    let hook = pick(&hooks.borrow()).clone();
    if let Some(f) = hook {
        if let Err(e) = f.call1(&JsValue::NULL, arg) {
            log::warn!("Hook threw: {e:?}");
        }
    }
}

/// Every browser registration the game holds
#[derive(Default)]
struct Subscriptions {
    closed: bool,
    raf_id: Option<i32>,
    raf_closure: Option<Closure<dyn FnMut(f64)>>,
    interval_id: Option<i32>,
    interval_closure: Option<Closure<dyn FnMut()>>,
    keydown: Option<Closure<dyn FnMut(web_sys::KeyboardEvent)>>,
    keyup: Option<Closure<dyn FnMut(web_sys::KeyboardEvent)>>,
}

impl Subscriptions {
    /// Unregister everything from the browser; closures stay alive
    fn cancel_all(&mut self, window: &web_sys::Window) {
        if let Some(id) = self.raf_id.take() {
            let _ = window.cancel_animation_frame(id);
        }
        self.stop_countdown(window);
        for (event, closure) in [("keydown", &self.keydown), ("keyup", &self.keyup)] {
            if let Some(closure) = closure {
                let _ = window
                    .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            }
        }
    }

    fn stop_countdown(&mut self, window: &web_sys::Window) {
        if let Some(id) = self.interval_id.take() {
            window.clear_interval_with_handle(id);
        }
    }
}

/// Queue the next animation frame unless the game is closed
fn schedule_frame(subs: &RefCell<Subscriptions>) -> Result<(), JsValue> {
    let window = window()?;
    let mut guard = subs.borrow_mut();
    let s = &mut *guard;
    if s.closed {
        return Ok(());
    }
    if let Some(closure) = &s.raf_closure {
        s.raf_id = Some(window.request_animation_frame(closure.as_ref().unchecked_ref())?);
    }
    Ok(())
}

#[derive(Deserialize)]
struct Bounds {
    min: [f32; 3],
    max: [f32; 3],
}

/// Read `{ min: [x, y, z], max: [x, y, z] }` from a loader result
fn parse_bounds(value: &JsValue) -> Result<(Vec3, Vec3), CorridorError> {
    let json: String = js_sys::JSON::stringify(value)
        .map_err(|e| CorridorError::Asset(format!("{e:?}")))?
        .into();
    let bounds: Bounds = serde_json::from_str(&json)
        .map_err(|e| CorridorError::Asset(format!("bad bounds {json}: {e}")))?;
    Ok((Vec3::from_array(bounds.min), Vec3::from_array(bounds.max)))
}

#[derive(Serialize)]
struct Scenery<'a> {
    sky: &'a [(f32, [f32; 4])],
    backdrop: &'a Backdrop,
    obstacles: &'a [Obstacle],
}

#[wasm_bindgen]
pub struct LaserCorridorGame {
    runtime: Rc<RefCell<Runtime<JsSink>>>,
    close_signal: CloseSignal,
    subs: Rc<RefCell<Subscriptions>>,
    hooks: Rc<RefCell<Hooks>>,
}

#[wasm_bindgen]
impl LaserCorridorGame {
    /// Build a level and start it. `render` receives every frame.
    #[wasm_bindgen(constructor)]
    pub fn new(render: js_sys::Function, seed: Option<f64>) -> Result<LaserCorridorGame, JsValue> {
        let tuning = Tuning::load();
        let seed = tuning.seed_or(seed.map_or_else(|| js_sys::Date::now() as u64, |s| s as u64));
        let runtime = Runtime::new(tuning, seed, JsSink { callback: render }).map_err(js_err)?;
        log::info!("Laser Corridor ready, seed {seed}");

        let game = Self {
            close_signal: runtime.close_signal(),
            runtime: Rc::new(RefCell::new(runtime)),
            subs: Rc::new(RefCell::new(Subscriptions::default())),
            hooks: Rc::new(RefCell::new(Hooks::default())),
        };
        game.arm_keys()?;
        game.arm_countdown()?;
        game.arm_frames()?;
        Ok(game)
    }

    pub fn set_on_restart(&self, f: js_sys::Function) {
        self.hooks.borrow_mut().on_restart = Some(f);
    }

    pub fn set_on_close(&self, f: js_sys::Function) {
        self.hooks.borrow_mut().on_close = Some(f);
    }

    pub fn set_on_outcome(&self, f: js_sys::Function) {
        self.hooks.borrow_mut().on_outcome = Some(f);
    }

    /// Validate and store a tuning override; used by the next game created
    pub fn store_tuning(json: &str) -> Result<(), JsValue> {
        Tuning::from_json(json).map_err(js_err)?.save();
        Ok(())
    }

    /// Current state name. Fails inside the render callback; the frame
    /// JSON carries the state there.
    pub fn state(&self) -> Result<String, JsValue> {
        let runtime = self.runtime.try_borrow().map_err(|_| busy())?;
        Ok(format!("{:?}", runtime.session.state()))
    }

    /// Static scenery and the obstacle layout, as JSON
    pub fn scenery_json(&self) -> Result<String, JsValue> {
        let runtime = self.runtime.try_borrow().map_err(|_| busy())?;
        let scenery = Scenery {
            sky: &SKY_GRADIENT,
            backdrop: &runtime.backdrop,
            obstacles: runtime.session.obstacles(),
        };
        serde_json::to_string(&scenery).map_err(js_err)
    }

    /// Reset the level to its initial conditions and count down again
    pub fn restart(&self) -> Result<(), JsValue> {
        if self.subs.borrow().closed {
            return Ok(());
        }
        self.runtime
            .try_borrow_mut()
            .map_err(|_| busy())?
            .restart();
        self.arm_countdown()?;
        call_hook(&self.hooks, |h| &h.on_restart, &JsValue::UNDEFINED);
        Ok(())
    }

    /// Tear down every subscription and hand control back to the page
    pub fn close(&self) {
        if self.teardown() {
            call_hook(&self.hooks, |h| &h.on_close, &JsValue::UNDEFINED);
        }
    }

    /// Fetch the player model through `loader(url) -> Promise<{min, max}>`.
    ///
    /// The placeholder stays until the promise resolves; a rejection is
    /// logged and the placeholder kept.
    pub fn load_player_model(
        &self,
        loader: js_sys::Function,
        url: Option<String>,
    ) -> Result<(), JsValue> {
        let url = url.unwrap_or_else(|| DEFAULT_PLAYER_MODEL.to_string());
        let ticket = {
            let runtime = self.runtime.try_borrow().map_err(|_| busy())?;
            runtime.model.begin_load(&url)
        };
        spawn_local(async move {
            let bounds = match loader.call1(&JsValue::NULL, &JsValue::from_str(&url)) {
                Ok(result) => match JsFuture::from(js_sys::Promise::resolve(&result)).await {
                    Ok(value) => parse_bounds(&value),
                    Err(e) => Err(CorridorError::Asset(format!("{e:?}"))),
                },
                Err(e) => Err(CorridorError::Asset(format!("{e:?}"))),
            };
            ticket.complete(bounds);
        });
        Ok(())
    }
}

impl LaserCorridorGame {
    fn arm_frames(&self) -> Result<(), JsValue> {
        let subs_weak: Weak<RefCell<Subscriptions>> = Rc::downgrade(&self.subs);
        let runtime = Rc::downgrade(&self.runtime);
        let hooks = Rc::downgrade(&self.hooks);
        let mut last: Option<f64> = None;

        let closure = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            let Some(subs) = subs_weak.upgrade() else { return };
            if subs.borrow().closed {
                return;
            }
            let dt = last.map_or(PHYSICS_DT, |prev| ((now - prev) / 1000.0) as f32);
            last = Some(now);

            let Some(runtime) = runtime.upgrade() else { return };
            let report = match runtime.try_borrow_mut() {
                Ok(mut rt) => Some(rt.frame(dt)),
                Err(_) => None,
            };
            if let (Some(report), Some(hooks)) = (report, hooks.upgrade()) {
                if report.outcome.is_some() {
                    let state = format!("{:?}", report.state);
                    call_hook(&hooks, |h| &h.on_outcome, &JsValue::from_str(&state));
                }
            }
            if let Err(e) = schedule_frame(&subs) {
                log::error!("Could not schedule frame: {e:?}");
            }
        });

        self.subs.borrow_mut().raf_closure = Some(closure);
        schedule_frame(&self.subs)
    }

    /// (Re)start the one-second countdown timer
    fn arm_countdown(&self) -> Result<(), JsValue> {
        let window = window()?;
        let subs_weak = Rc::downgrade(&self.subs);
        let runtime = Rc::downgrade(&self.runtime);

        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(runtime) = runtime.upgrade() else { return };
            let counting = match runtime.try_borrow_mut() {
                Ok(mut rt) => {
                    rt.session.countdown_tick();
                    rt.session.state() == GameState::Countdown
                }
                Err(_) => true,
            };
            if !counting {
                if let (Some(subs), Some(window)) = (subs_weak.upgrade(), web_sys::window()) {
                    if let Ok(mut s) = subs.try_borrow_mut() {
                        s.stop_countdown(&window);
                    }
                }
            }
        });

        let mut guard = self.subs.borrow_mut();
        let s = &mut *guard;
        s.stop_countdown(&window);
        s.interval_id = Some(window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            COUNTDOWN_INTERVAL_MS,
        )?);
        s.interval_closure = Some(closure);
        Ok(())
    }

    fn arm_keys(&self) -> Result<(), JsValue> {
        let window = window()?;

        let runtime = Rc::downgrade(&self.runtime);
        let keydown = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let Some(rt) = runtime.upgrade() else { return };
            let Ok(mut rt) = rt.try_borrow_mut() else { return };
            if rt.session.keys_mut().key_down(&event.key()) {
                event.prevent_default();
            }
        });

        let runtime = Rc::downgrade(&self.runtime);
        let keyup = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let Some(rt) = runtime.upgrade() else { return };
            let Ok(mut rt) = rt.try_borrow_mut() else { return };
            rt.session.keys_mut().key_up(&event.key());
        });

        window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;

        let mut s = self.subs.borrow_mut();
        s.keydown = Some(keydown);
        s.keyup = Some(keyup);
        Ok(())
    }

    /// Returns false if already torn down
    fn teardown(&self) -> bool {
        {
            let mut s = self.subs.borrow_mut();
            if s.closed {
                return false;
            }
            s.closed = true;
            if let Some(window) = web_sys::window() {
                s.cancel_all(&window);
            }
        }
        // Inside the render callback the runtime is borrowed; the signal
        // closes it as soon as the current frame returns.
        self.close_signal.raise();
        match self.runtime.try_borrow_mut() {
            Ok(mut rt) => rt.close(),
            Err(_) => log::debug!("Close deferred to the end of the current frame"),
        }
        log::info!("Laser Corridor closed");
        true
    }
}

impl Drop for LaserCorridorGame {
    fn drop(&mut self) {
        self.teardown();
    }
}
