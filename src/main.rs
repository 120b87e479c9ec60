//! Initialises the show engine and its worker threads, then runs the
//! real-time loop that feeds the scanners.

use anyhow::Result;
use config::{Config, ConfigError};
use lazy_static::lazy_static;
use log::{info, warn};
use std::sync::Arc;
use std::thread;
use std::time;

use sierpinski::common_structs::Sample3;
use sierpinski::inputs::{SharedInputs, RAW_IDENTITY};
use sierpinski::laser_generator::LaserGenerator;
use sierpinski::laser_output::LaserOutput;
use sierpinski::show_manager::ShowManager;
use sierpinski::sim_inputs::SimInputs;
use sierpinski::tuning::ShowTuning;
use sierpinski::ws_server;

lazy_static! {
    static ref SETTINGS: Config = Config::builder()
        .add_source(config::File::with_name("settings"))
        .build()
        .unwrap();
}

/// Port the simulator websocket listens on
const WS_PORT: u16 = 3030;

/// Look up an optional setting, treating a missing key as None
fn optional<'de, T: serde::Deserialize<'de>>(key: &str) -> Result<Option<T>> {
    match SETTINGS.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    info!("Hello, world!");

    let tick_rate: u64 = SETTINGS.get("tick_rate")?;
    let fps: u64 = SETTINGS.get::<u64>("fps")?.max(1);
    let samples_per_frame = (tick_rate / fps).max(1) as usize;
    let tuning = ShowTuning::from_settings(&SETTINGS)?;

    info!("Setting up shared inputs...");
    let inputs = Arc::new(SharedInputs::new());
    let mut generator = LaserGenerator::with_tuning(inputs.clone(), tuning);
    let mut manager = ShowManager::from_settings(&SETTINGS)?;

    let mut output = match optional::<String>("laser_output")? {
        Some(path) => Some(LaserOutput::to_file(&path)?),
        None => {
            warn!("No laser_output set, frames will only go to the simulator.");
            None
        }
    };

    if SETTINGS.get("do_startup_tests")? {
        info!("Doing start-up tests...");
        generator.self_test()?;
        if let Some(output) = output.as_mut() {
            output.test()?;
        }
        info!("Start-up tests look good!");
    } else {
        info!("Skipping start-up tests.");
    }

    info!("Starting worker threads...");
    if SETTINGS.get("simulate_inputs")? {
        Arc::new(SimInputs::new(inputs.clone())).start_thread()?;
    }
    if let Some(output) = output.as_mut() {
        output.start_thread()?;
    }
    let ws = if SETTINGS.get("ws_server")? {
        Some(ws_server::start_server(WS_PORT)?)
    } else {
        info!("Websocket server disabled.");
        None
    };
    info!("Worker threads started.");

    if SETTINGS.get("calibrate_on_start")? {
        // Give the wand a moment to report in
        thread::sleep(time::Duration::from_millis(500));
        let wands = inputs.snapshot();
        let [x, y, z, w] = if wands.connected > 0 {
            wands.raw[0]
        } else {
            warn!("No wand connected, calibrating against the rest pose");
            RAW_IDENTITY
        };
        generator.calibrate_wand(x, y, z, w);
    }

    let frame_time = time::Duration::from_micros(1_000_000 / fps);
    info!(
        "Running {} at {} samples per frame, {} fps",
        manager.current().name(),
        samples_per_frame,
        fps
    );

    loop {
        let frame_start = time::Instant::now();

        let mut frame: Vec<Sample3> = Vec::with_capacity(samples_per_frame);
        for _ in 0..samples_per_frame {
            frame.push(manager.step(&mut generator));
            let effect = generator.take_sound_effect();
            if effect >= 0 {
                info!("Sound effect {}", effect);
            }
        }

        if let Some(ref ws) = ws {
            ws_server::laser_update(ws, &frame)?;
        }
        if let Some(ref output) = output {
            output.laser_update(frame)?;
        }

        // Sleep until time for the next frame
        if let Some(remaining) = frame_time.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}
