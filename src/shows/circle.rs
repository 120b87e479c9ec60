//! Circle show: one point sweeping round a circle whose radius follows the
//! audio, drawn identically on all three faces.

use crate::common_structs::{LaserPoint, Rgb, Sample3};
use crate::inputs::AUDIO_SILENCE;
use crate::shows::{Show, ShowContext};
use crate::sierpinski::Sierpinski;
use crate::tuning::ShowTuning;

pub struct Circle {
    /// Current angle in whole degrees
    angle: i32,

    /// Centre of the circle in DAC space
    centre: (i32, i32),
}

impl Circle {
    pub const NAME: &'static str = "circle";
}

/// Red, green or blue depending on which third of the circle we're in
fn colour_for_angle(angle: i32) -> Rgb {
    if angle < 120 {
        Rgb::RED
    } else if angle < 240 {
        Rgb::GREEN
    } else {
        Rgb::BLUE
    }
}

impl Show for Circle {
    fn new(sierpinski: &Sierpinski, _tuning: &ShowTuning) -> Box<dyn Show> {
        Box::new(Self {
            angle: 0,
            centre: sierpinski.laser_bounds(0).midpoint(),
        })
    }

    fn step(&mut self, ctx: &mut ShowContext) -> Sample3 {
        self.angle = (self.angle + ctx.tuning.circle_step_deg).rem_euclid(360);

        let level = ctx.next_audio() as f64 - AUDIO_SILENCE as f64;
        let radius = (ctx.tuning.circle_radius + level * ctx.tuning.circle_audio_gain).max(0.0);
        let (sin, cos) = (self.angle as f64).to_radians().sin_cos();

        Sample3::uniform(LaserPoint::new(
            self.centre.0 + (sin * radius) as i32,
            self.centre.1 + (cos * radius) as i32,
            colour_for_angle(self.angle),
        ))
    }

    fn get_name(&self) -> &'static str {
        Self::NAME
    }
}
