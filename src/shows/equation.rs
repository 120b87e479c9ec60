//! Equation show: plays back the shape catalog one shape at a time.  Each
//! shape is traced as a closed polyline which drifts across the face after
//! every trace and bounces off the edges.

use crate::common_structs::{LaserPoint, Sample3};
use crate::equations::{EQUATIONS, EQUATION_COUNT, EQUATION_TABLE_MAX};
use crate::laser_objects::{
    colour_from_angle, convert_to_xy, get_interpolated_size, get_laser_obj_bounds,
    interpolate_objects, ObjBounds, XyPoint,
};
use crate::shows::{Show, ShowContext};
use crate::sierpinski::{LaserBounds, Sierpinski, FACE_COUNT};
use crate::tuning::ShowTuning;

use log::{debug, warn};
use rand::Rng;

/// Most points an interpolated shape may occupy
pub const EQUATION_MAX_POINTS: usize = 2500;

/// Hue change per completed trace
const HUE_STEP: i32 = 7;

pub struct Equation {
    rng: rand::rngs::ThreadRng,
    bounds: LaserBounds,

    /// Index into the catalog of the shape being played
    shape: usize,

    /// Decoded but not yet interpolated shape
    outline: Vec<XyPoint>,

    /// The interpolated shape, centred on the origin
    points: Vec<XyPoint>,
    max_points: usize,

    /// Bounding box of `points`
    extent: ObjBounds,

    index: usize,
    traces: usize,
    offset: (i32, i32),
    velocity: (i32, i32),
    hue: i32,

    scale: f64,
    segment_distance: i32,
    traces_per_shape: usize,
}

impl Equation {
    pub const NAME: &'static str = "equation";

    fn with_limit(sierpinski: &Sierpinski, tuning: &ShowTuning, max_points: usize) -> Self {
        let longest_table = EQUATIONS.iter().map(Vec::len).max().unwrap_or(0);
        let bounds = sierpinski.laser_bounds(0);
        let mut show = Self {
            rng: rand::thread_rng(),
            bounds,
            shape: EQUATION_COUNT - 1,
            outline: Vec::with_capacity(longest_table / 2 + 1),
            points: Vec::with_capacity(max_points),
            max_points,
            extent: ObjBounds {
                min_x: 0,
                max_x: 0,
                min_y: 0,
                max_y: 0,
            },
            index: 0,
            traces: 0,
            offset: bounds.midpoint(),
            velocity: (tuning.equation_speed, tuning.equation_speed),
            hue: 0,
            scale: tuning.equation_size / EQUATION_TABLE_MAX as f64,
            segment_distance: tuning.equation_segment_distance,
            traces_per_shape: tuning.equation_traces_per_shape.max(1),
        };
        show.next_shape();
        show
    }

    /// Decode and interpolate shape `shape`.  Fails if the interpolated
    /// shape would not fit in the point buffer.
    fn load_shape(&mut self, shape: usize) -> bool {
        self.outline.clear();
        convert_to_xy(&EQUATIONS[shape], self.scale, self.scale, &mut self.outline);
        let size = get_interpolated_size(&self.outline, self.segment_distance);
        if size > self.max_points {
            warn!(
                "Equation {} needs {} points, more than the {} available; skipping",
                shape, size, self.max_points
            );
            return false;
        }

        self.points.clear();
        interpolate_objects(&self.outline, self.segment_distance, &mut self.points);
        match get_laser_obj_bounds(&self.points) {
            Some(extent) => self.extent = extent,
            None => return false,
        }
        self.shape = shape;
        self.index = 0;
        self.traces = 0;
        debug!("Equation {} loaded with {} points", shape, self.points.len());
        true
    }

    /// Move on to the next shape in the catalog which fits.  If none do, the
    /// show is left empty and draws nothing.
    fn next_shape(&mut self) {
        for i in 1..=EQUATION_COUNT {
            if self.load_shape((self.shape + i) % EQUATION_COUNT) {
                self.offset = self.bounds.midpoint();
                let (vx, vy) = self.velocity;
                self.velocity = (
                    if self.rng.gen() { vx.abs() } else { -vx.abs() },
                    if self.rng.gen() { vy.abs() } else { -vy.abs() },
                );
                return;
            }
        }
        self.points.clear();
    }

    /// Move the shape along, reversing on each axis where the move would take
    /// the shape's bounding box over the edge of the face
    fn advance_position(&mut self) {
        let b = &self.bounds;
        let (vx, vy) = self.velocity;
        let (ox, oy) = self.offset;
        if ox + vx + self.extent.min_x < b.min_x as i32
            || ox + vx + self.extent.max_x > b.max_x as i32
        {
            self.velocity.0 = -vx;
        }
        if oy + vy + self.extent.min_y < b.min_y as i32
            || oy + vy + self.extent.max_y > b.max_y as i32
        {
            self.velocity.1 = -vy;
        }
        self.offset.0 += self.velocity.0;
        self.offset.1 += self.velocity.1;
    }
}

impl Show for Equation {
    fn new(sierpinski: &Sierpinski, tuning: &ShowTuning) -> Box<dyn Show> {
        Box::new(Self::with_limit(sierpinski, tuning, EQUATION_MAX_POINTS))
    }

    fn step(&mut self, _ctx: &mut ShowContext) -> Sample3 {
        let point = match self.points.get(self.index) {
            Some(point) => *point,
            None => return Sample3::default(),
        };

        let x = point.x + self.offset.0;
        let y = point.y + self.offset.1;
        let mut sample = Sample3::default();
        for face in 0..FACE_COUNT {
            sample.0[face] = if point.on {
                LaserPoint::new(x, y, colour_from_angle(self.hue + 120 * face as i32))
            } else {
                LaserPoint::blank(x, y)
            };
        }

        self.index += 1;
        if self.index >= self.points.len() {
            self.index = 0;
            self.traces += 1;
            self.hue = (self.hue + HUE_STEP) % 360;
            if self.traces >= self.traces_per_shape {
                self.next_shape();
            } else {
                self.advance_position();
            }
        }

        sample
    }

    fn get_name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shows::TestRig;

    #[test]
    fn test_first_shape_loads() {
        let rig = TestRig::new();
        let show = Equation::with_limit(&rig.sierpinski, &rig.tuning, EQUATION_MAX_POINTS);
        assert_eq!(show.shape, 0);
        assert!(!show.points.is_empty());
        assert!(show.points.len() <= EQUATION_MAX_POINTS);
    }

    #[test]
    fn test_oversized_shapes_are_skipped() {
        let rig = TestRig::new();
        // Only the plain polygons are small enough
        let show = Equation::with_limit(&rig.sierpinski, &rig.tuning, 100);
        assert_eq!(show.shape, 14);
        assert!(show.points.len() <= 100);

        // Nothing fits at all, so nothing is drawn
        let mut rig = TestRig::new();
        let mut empty = Equation::with_limit(&rig.sierpinski, &rig.tuning, 2);
        assert!(empty.points.is_empty());
        assert_eq!(rig.step(&mut empty), Sample3::default());
    }

    #[test]
    fn test_buffer_never_grows() {
        let mut rig = TestRig::new();
        rig.tuning.equation_traces_per_shape = 1;
        let mut show = Equation::with_limit(&rig.sierpinski, &rig.tuning, EQUATION_MAX_POINTS);
        let capacity = show.points.capacity();
        let mut shapes_seen = vec![];
        for _ in 0..20000 {
            rig.step(&mut show);
            if !shapes_seen.contains(&show.shape) {
                shapes_seen.push(show.shape);
            }
        }
        assert_eq!(show.points.capacity(), capacity);
        assert!(shapes_seen.len() > 1);
    }

    #[test]
    fn test_bounce() {
        let rig = TestRig::new();
        let mut show = Equation::with_limit(&rig.sierpinski, &rig.tuning, EQUATION_MAX_POINTS);
        let bounds = show.bounds;
        show.velocity = (4, 4);
        // Push the shape's right hand edge up against the face edge
        show.offset.0 = bounds.max_x as i32 - show.extent.max_x - 2;
        show.advance_position();
        assert_eq!(show.velocity.0, -4);
        assert_eq!(show.velocity.1, 4);
        assert!(show.offset.0 + show.extent.max_x <= bounds.max_x as i32);
    }

    #[test]
    fn test_points_stay_on_face() {
        let mut rig = TestRig::new();
        let mut show = Equation::with_limit(&rig.sierpinski, &rig.tuning, EQUATION_MAX_POINTS);
        let bounds = show.bounds;
        for _ in 0..50000 {
            let sample = rig.step(&mut show);
            for point in sample.0.iter() {
                assert!(bounds.contains(point.x as i32, point.y as i32), "{:?}", point);
            }
        }
    }
}
