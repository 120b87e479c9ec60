//! Calibration show: walks the outline of face 0 over and over so the
//! projected trapezoid can be checked against the physical face.

use crate::common_structs::{LaserPoint, Rgb, Sample3};
use crate::laser_objects::{get_interpolated_size, interpolate_objects, XyPoint};
use crate::shows::{Show, ShowContext};
use crate::sierpinski::Sierpinski;
use crate::tuning::ShowTuning;

pub struct Calibration {
    path: Vec<XyPoint>,
    index: usize,
}

impl Calibration {
    pub const NAME: &'static str = "calibration";

    fn build(sierpinski: &Sierpinski, segment_distance: i32) -> Self {
        let corners = sierpinski.laser_coordinate_bounds(0);
        let mut outline = corners.to_vec();
        outline.push(corners[0]);

        let mut path = Vec::with_capacity(get_interpolated_size(&outline, segment_distance));
        interpolate_objects(&outline, segment_distance, &mut path);
        Self { path, index: 0 }
    }

    /// Red for the first third of the path, then green, then blue
    fn colour_at(&self, index: usize) -> Rgb {
        let third = self.path.len() / 3;
        if index < third {
            Rgb::RED
        } else if index < 2 * third {
            Rgb::GREEN
        } else {
            Rgb::BLUE
        }
    }
}

impl Show for Calibration {
    fn new(sierpinski: &Sierpinski, tuning: &ShowTuning) -> Box<dyn Show> {
        Box::new(Self::build(sierpinski, tuning.calibration_segment_distance))
    }

    fn step(&mut self, _ctx: &mut ShowContext) -> Sample3 {
        let point = match self.path.get(self.index) {
            Some(point) => *point,
            None => return Sample3::default(),
        };
        let colour = self.colour_at(self.index);
        let sample = Sample3::uniform(LaserPoint::new(point.x, point.y, colour));
        self.index = (self.index + 1) % self.path.len();
        sample
    }

    fn get_name(&self) -> &'static str {
        Self::NAME
    }
}
