//! Spirograph show: three spirographs, one per face, each with parameters
//! slowly drifting so the figures morph.  Every so often the show swaps
//! between drawing the curves as lines and as a stuttering dot.

use crate::common_structs::{LaserPoint, Sample3};
use crate::laser_objects::colour_from_angle;
use crate::shows::{Show, ShowContext};
use crate::sierpinski::{LaserBounds, Sierpinski, FACE_COUNT};
use crate::spirograph::{DeltaTarget, SpiroDelta, Spirograph};
use crate::tuning::ShowTuning;

use log::debug;

/// Largest extent of any of the curves below, in curve units, allowing for
/// the drift.  `r1 + 2 * a * r2` with every parameter at its upper limit.
const CURVE_EXTENT: f64 = 2.0;

/// Ticks per degree of hue drift
const HUE_DIVIDER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawMode {
    Line,
    Point,
}

pub struct SpirographShow {
    curves: [Spirograph; FACE_COUNT],
    bounds: [LaserBounds; FACE_COUNT],
    mode: DrawMode,
    tick: usize,
}

impl SpirographShow {
    pub const NAME: &'static str = "spirograph";

    fn curves() -> [Spirograph; FACE_COUNT] {
        let mut first = Spirograph::new(1.0, 0.3, 0.8, 0.05);
        first.add_delta(SpiroDelta::new(DeltaTarget::R2, 0.0001, 0.2, 0.5));
        first.add_delta(SpiroDelta::new(DeltaTarget::A, 0.0002, 0.4, 1.0));

        let mut second = Spirograph::new(1.0, 0.45, 0.6, 0.04);
        second.add_delta(SpiroDelta::new(DeltaTarget::R2, -0.00015, 0.25, 0.5));

        let mut third = Spirograph::new(1.0, 0.2, 0.9, 0.06);
        third.add_delta(SpiroDelta::new(DeltaTarget::A, 0.0003, 0.3, 1.0));
        third.add_delta(SpiroDelta::new(DeltaTarget::R1, 0.0001, 0.9, 1.0));

        [first, second, third]
    }
}

impl Show for SpirographShow {
    fn new(sierpinski: &Sierpinski, _tuning: &ShowTuning) -> Box<dyn Show> {
        Box::new(Self {
            curves: Self::curves(),
            bounds: std::array::from_fn(|face| sierpinski.laser_bounds(face)),
            mode: DrawMode::Line,
            tick: 0,
        })
    }

    fn step(&mut self, ctx: &mut ShowContext) -> Sample3 {
        let period = ctx.tuning.spirograph_mode_period.max(1);
        let hold = ctx.tuning.spirograph_point_hold.max(1);
        self.tick = self.tick.wrapping_add(1);
        if self.tick % period == 0 {
            self.mode = match self.mode {
                DrawMode::Line => DrawMode::Point,
                DrawMode::Point => DrawMode::Line,
            };
            debug!("Spirograph switching to {:?} mode", self.mode);
        }

        let advance = self.mode == DrawMode::Line || self.tick % hold == 0;
        let hue = (self.tick / HUE_DIVIDER) as i32;

        let mut sample = Sample3::default();
        for face in 0..FACE_COUNT {
            let bounds = &self.bounds[face];
            let curve = &mut self.curves[face];
            if advance {
                let (cx, cy) = bounds.midpoint();
                let scale = bounds.width().min(bounds.height()) as f64 / 2.0 / CURVE_EXTENT;
                curve.update(scale, scale, cx as f64, cy as f64);
            }
            let x = (curve.x as i32).clamp(bounds.min_x as i32, bounds.max_x as i32);
            let y = (curve.y as i32).clamp(bounds.min_y as i32, bounds.max_y as i32);
            sample.0[face] = LaserPoint::new(x, y, colour_from_angle(hue + 120 * face as i32));
        }
        sample
    }

    fn get_name(&self) -> &'static str {
        Self::NAME
    }
}
