//! The show engine.  Owns the tetrahedron model and the state of every show,
//! and turns a mode selection into three laser points per tick.

use crate::common_structs::Sample3;
use crate::common_structs::SoundEffect;
use crate::geometry::Quaternion;
use crate::inputs::{AudioCursor, SharedInputs};
use crate::shows::{Show, ShowContext, ShowMode, SHOW_COUNT};
use crate::sierpinski::{Sierpinski, FACE_COUNT};
use crate::tuning::ShowTuning;

use anyhow::{anyhow, Result};
use log::{info, trace};
use std::sync::Arc;

/// How far a face corner may drift through a forward then inverse transform,
/// in DAC units
const ROUND_TRIP_TOLERANCE: f64 = 1.0;

pub struct LaserGenerator {
    sierpinski: Sierpinski,
    inputs: Arc<SharedInputs>,
    audio: AudioCursor,
    tuning: ShowTuning,

    /// Show state, created the first time each mode is selected
    shows: [Option<Box<dyn Show>>; SHOW_COUNT],

    /// Most recent sound effect not yet collected
    sound_effect: Option<SoundEffect>,
}

impl LaserGenerator {
    pub fn new(inputs: Arc<SharedInputs>) -> Self {
        Self::with_tuning(inputs, ShowTuning::default())
    }

    pub fn with_tuning(inputs: Arc<SharedInputs>, tuning: ShowTuning) -> Self {
        info!("Initialising laser generator");
        Self {
            sierpinski: Sierpinski::new(),
            inputs,
            audio: AudioCursor::default(),
            tuning,
            shows: Default::default(),
            sound_effect: None,
        }
    }

    pub fn sierpinski(&self) -> &Sierpinski {
        &self.sierpinski
    }

    /// Produce the next sample of `mode`
    pub fn get_point(&mut self, mode: ShowMode) -> Sample3 {
        let show = self.shows[mode.index()].get_or_insert_with(|| {
            info!("Starting show {}", mode.name());
            mode.create(&self.sierpinski, &self.tuning)
        });

        let mut ctx = ShowContext {
            sierpinski: &self.sierpinski,
            wands: self.inputs.snapshot(),
            inputs: &self.inputs,
            audio: &mut self.audio,
            tuning: &self.tuning,
            sound_effect: &mut self.sound_effect,
        };
        let sample = show.step(&mut ctx);
        trace!("{}: {:?}", mode.name(), sample);
        sample
    }

    /// Produce the next sample of the mode with wire code `code`.  Unknown
    /// codes produce an all-zero sample.
    pub fn get_point_code(&mut self, code: u8) -> Sample3 {
        match ShowMode::from_code(code) {
            Some(mode) => self.get_point(mode),
            None => Sample3::default(),
        }
    }

    /// Collect the pending sound effect code, or -1 if there isn't one
    pub fn take_sound_effect(&mut self) -> i8 {
        self.sound_effect.take().map_or(-1, |effect| effect.code())
    }

    /// Re-zero the wand tracking so the given raw reading points at the
    /// centre of the sculpture
    pub fn calibrate_wand(&mut self, x: u16, y: u16, z: u16, w: u16) {
        let q = Quaternion::from_raw([x, y, z, w]);
        self.sierpinski.calibrate_wand_position(&q);
    }

    /// Check the face transforms are sane and that the calibrated rest pose
    /// lands on a face
    pub fn self_test(&self) -> Result<()> {
        for face in 0..FACE_COUNT {
            let f = self.sierpinski.face(face);
            for corner in f.corners.iter() {
                let (x, y) = f.to_laser_plane(corner);
                let back = f.to_laser_plane(&f.to_sierpinski(x, y));
                if (back.0 - x).abs() > ROUND_TRIP_TOLERANCE
                    || (back.1 - y).abs() > ROUND_TRIP_TOLERANCE
                {
                    return Err(anyhow!(
                        "Face {} transform doesn't round trip: ({}, {}) came back as ({}, {})",
                        face,
                        x,
                        y,
                        back.0,
                        back.1
                    ));
                }
            }

            let bounds = self.sierpinski.laser_bounds(face);
            if bounds.width() <= 0 || bounds.height() <= 0 {
                return Err(anyhow!("Face {} has empty laser bounds {:?}", face, bounds));
            }
        }

        match self.sierpinski.get_wand_projection(&Quaternion::IDENTITY) {
            Some((face, point)) => {
                info!("Rest pose projects to face {} at {:?}", face, point);
                Ok(())
            }
            None => Err(anyhow!("Rest pose doesn't project onto any face")),
        }
    }
}
