//! Laser Corridor entry point
//!
//! The browser build is driven from JS through `LaserCorridorGame`. Natively
//! this runs a headless level with a crude autopilot, which is handy for
//! checking a seed's layout and the frame loop without a browser.
//!
//! Usage: `laser-corridor [seed] [max_seconds]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use laser_corridor::consts::*;
    use laser_corridor::platform::{Action, Runtime};
    use laser_corridor::render::NullSink;
    use laser_corridor::sim::{GameSession, GameState, PhysicsWorld, is_grounded};
    use laser_corridor::{CorridorError, Tuning};

    /// How far ahead the autopilot looks for beams
    const LOOKAHEAD: f32 = 8.0;

    /// Pick keys for this frame from the beams just ahead of the player
    fn autopilot(session: &mut GameSession) {
        let player = session.player_position();
        let grounded = is_grounded(player, session.world().velocity());

        let threat = session
            .poses()
            .iter()
            .flatten()
            .filter(|pose| pose.is_live())
            .map(|pose| pose.beam.center)
            .filter(|c| c.z < player.z && c.z > player.z - LOOKAHEAD)
            .min_by(|a, b| b.z.total_cmp(&a.z));

        let keys = session.keys_mut();
        keys.release(Action::Left);
        keys.release(Action::Right);
        keys.release(Action::Jump);
        let Some(center) = threat else { return };

        if center.y < player.y + 1.0 && grounded {
            keys.press(Action::Jump);
        } else if (center.x - player.x).abs() < 1.5 {
            let dodge = if center.x > player.x { Action::Left } else { Action::Right };
            keys.press(dodge);
        }
    }

    pub fn run() -> Result<(), CorridorError> {
        let mut args = std::env::args().skip(1);
        let tuning = Tuning::load();
        let seed = match args.next() {
            Some(s) => s
                .parse()
                .map_err(|_| CorridorError::Config(format!("seed must be a number, got {s}")))?,
            None => tuning.seed_or(
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
            ),
        };
        let max_secs: f32 = match args.next() {
            Some(s) => s.parse().map_err(|_| {
                CorridorError::Config(format!("max_seconds must be a number, got {s}"))
            })?,
            None => 60.0,
        };

        let mut rt = Runtime::new(tuning, seed, NullSink::default())?;
        log::info!("Headless run, seed {seed}, {} obstacles", rt.session.obstacles().len());

        let max_frames = (max_secs / PHYSICS_DT) as u64;
        for _ in 0..max_frames {
            rt.session.advance_countdown(PHYSICS_DT);
            if rt.session.state() == GameState::Playing {
                autopilot(&mut rt.session);
            }
            let report = rt.frame(PHYSICS_DT);
            if let Some(outcome) = report.outcome {
                log::info!(
                    "{:?} after {:.2}s at z={:.1}: {outcome:?}",
                    report.state,
                    rt.session.elapsed(),
                    rt.session.player_position().z
                );
                break;
            }
        }
        if !rt.session.state().is_finished() {
            log::info!("Stopped after {max_secs}s at z={:.1}", rt.session.player_position().z);
        }
        log::info!("Rendered {} frames", rt.sink().frames);
        rt.close();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Laser Corridor (native, headless) starting...");
    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry is LaserCorridorGame, exported from the library
}
