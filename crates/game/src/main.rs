//! planetwalk - walk a sphere-shaped body across a procedurally displaced planet.
//!
//! Runs headless: generates the terrain from `planetwalk.ron`, drops the body
//! onto it, and walks forward for the configured duration while logging.

mod config;
mod player;
mod simulation;
mod spawn;

use anyhow::Result;
use engine_core::{Time, TransformRaw};
use input::{ElementState, KeyCode};
use physics::Contact;
use std::time::Duration;

use config::SimConfig;
use simulation::{Simulation, SimulationHooks};

/// Target pacing of the headless loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Counts ticks and contacts between log lines.
#[derive(Default)]
struct TickStats {
    ticks: u32,
    contacts: u32,
    simulated_seconds: f32,
}

impl SimulationHooks for TickStats {
    fn on_tick(&mut self, delta_time: f32) {
        self.ticks += 1;
        self.simulated_seconds += delta_time;
    }

    fn on_contact(&mut self, _contact: &Contact) {
        self.contacts += 1;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting planetwalk");

    let config = SimConfig::load();
    if !config::config_path().exists() {
        config.save();
    }
    let run_seconds = config.run_seconds;
    let mut time = Time::with_max_frame_delta(config.max_frame_delta);

    let mut simulation = Simulation::new(config)?;
    let dirty = simulation.planet().dirty();
    let vertices = simulation.planet().vertices();
    let (lowest, highest) = simulation.planet().displacement_range();
    log::info!(
        "Terrain ready: {} vertices ({} bytes), displacement {:.3}..{:.3}, dirty {:?}",
        vertices.len(),
        bytemuck::cast_slice::<_, u8>(vertices.as_slice()).len(),
        lowest,
        highest,
        dirty
    );
    simulation.take_dirty();
    let gravity = simulation.gravity();
    log::info!(
        "Gravity {:.2} m/s^2 toward {:?}",
        gravity.strength,
        gravity.center
    );

    simulation
        .input_mut()
        .process_keyboard(KeyCode::KeyW, ElementState::Pressed);

    let mut stats = TickStats::default();
    let mut next_report = 1.0;
    while time.elapsed_seconds() < run_seconds {
        std::thread::sleep(FRAME_INTERVAL);
        time.update();

        simulation.frame(time.clamped_delta_seconds(), &mut stats);

        if time.elapsed_seconds() >= next_report {
            next_report += 1.0;
            let body = simulation.body();
            log::info!(
                "t={:.1}s altitude {:.3} state {:?} speed {:.2} | {} ticks, {} contacts, {:.0} fps",
                time.elapsed_seconds(),
                simulation.altitude(),
                body.state(),
                body.velocity.length(),
                stats.ticks,
                stats.contacts,
                time.fps()
            );
            stats.ticks = 0;
            stats.contacts = 0;
        }
    }

    simulation.input_mut().clear();
    let transform = simulation.transform();
    log::info!(
        "Finished after {} frames ({:.2}s simulated): body at {:?}, up {:?}",
        time.frame_count(),
        stats.simulated_seconds,
        transform.position,
        transform.up()
    );
    let raw = TransformRaw::from(&transform);
    log::debug!(
        "Final model matrix ({} bytes): {:?}",
        bytemuck::bytes_of(&raw).len(),
        raw.model
    );

    Ok(())
}
