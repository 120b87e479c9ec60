//! Stand-ins for the wand and audio hardware so the engine can run on a
//! desktop.  One thread sweeps a wand around the sculpture, another writes a
//! warbling tone into the audio ring.

use crate::geometry::{Quaternion, Vector3d};
use crate::inputs::{SharedInputs, AUDIO_SILENCE};

use anyhow::Result;
use log::info;
use rand::Rng;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Wand updates per second
const WAND_RATE: u64 = 50;

/// Audio samples per second, written in blocks of `AUDIO_BLOCK`
const AUDIO_RATE: u64 = 8000;
const AUDIO_BLOCK: usize = 80;

/// Widest the simulated wand swings either side of centre, degrees
const YAW_SWING: f64 = 30.0;
const PITCH_SWING: f64 = 3.0;

/// Orientation of the simulated wand `t` seconds into the sweep
pub fn wand_pose(t: f64) -> Quaternion {
    let yaw = YAW_SWING * (t * TAU / 20.0).sin();
    let pitch = PITCH_SWING * (t * TAU / 7.0).sin();
    let roll = (t * 18.0) % 360.0;
    let yaw = Quaternion::from_axis_angle(&Vector3d::new(0.0, 0.0, 1.0), yaw.to_radians());
    let pitch = Quaternion::from_axis_angle(&Vector3d::new(1.0, 0.0, 0.0), pitch.to_radians());
    let roll = Quaternion::from_axis_angle(&Vector3d::new(0.0, -1.0, 0.0), roll.to_radians());
    yaw * pitch * roll
}

/// Audio level `t` seconds in: a tone whose loudness swells and fades
pub fn audio_level(t: f64, noise: f64) -> u8 {
    let envelope = 0.5 + 0.5 * (t * TAU / 4.0).sin();
    let tone = (t * TAU * 220.0).sin();
    let level = AUDIO_SILENCE as f64 + 100.0 * envelope * tone + noise;
    level.round().clamp(0.0, u8::MAX as f64) as u8
}

pub struct SimInputs {
    inputs: Arc<SharedInputs>,
    thread_started: AtomicBool,
}

impl SimInputs {
    pub fn new(inputs: Arc<SharedInputs>) -> Self {
        Self {
            inputs,
            thread_started: AtomicBool::new(false),
        }
    }

    /// Start the wand and audio threads
    pub fn start_thread(self: Arc<Self>) -> Result<()> {
        if self.thread_started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let wand = self.clone();
        thread::Builder::new()
            .name("SIERPINSKI SIM WAND".into())
            .spawn(move || wand.wand_thread())?;
        thread::Builder::new()
            .name("SIERPINSKI SIM AUDIO".into())
            .spawn(move || self.audio_thread())?;
        Ok(())
    }

    fn wand_thread(&self) -> ! {
        info!("Simulated wand thread running.");
        self.inputs.set_wands_connected(1);
        let mut tick: u64 = 0;
        loop {
            let t = tick as f64 / WAND_RATE as f64;
            self.inputs.set_wand(0, wand_pose(t).to_raw());
            tick += 1;
            thread::sleep(Duration::from_millis(1000 / WAND_RATE));
        }
    }

    fn audio_thread(&self) -> ! {
        info!("Simulated audio thread running.");
        let mut rng = rand::thread_rng();
        let mut sample: u64 = 0;
        loop {
            for _ in 0..AUDIO_BLOCK {
                let t = sample as f64 / AUDIO_RATE as f64;
                self.inputs.push_audio(audio_level(t, rng.gen_range(-4.0..4.0)));
                sample += 1;
            }
            thread::sleep(Duration::from_micros(
                1_000_000 * AUDIO_BLOCK as u64 / AUDIO_RATE,
            ));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sierpinski::Sierpinski;

    #[test]
    fn test_wand_stays_on_sculpture() {
        let sierpinski = Sierpinski::new();
        for i in 0..400 {
            let t = i as f64 * 0.1;
            let q = Quaternion::from_raw(wand_pose(t).to_raw());
            assert!(sierpinski.get_wand_projection(&q).is_some(), "t = {}", t);
        }
    }

    #[test]
    fn test_audio_level() {
        assert_eq!(audio_level(0.0, 0.0), AUDIO_SILENCE);
        for i in 0..8000 {
            let level = audio_level(i as f64 / 8000.0, 4.0);
            assert!((20..=240).contains(&level));
        }
    }
}
