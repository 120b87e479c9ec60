//! Audio visualizer show: each face has a cluster of randomly placed
//! circles which swell and shrink with the music.  The beam traces round one
//! circle at a time, blanking wherever another circle in the cluster
//! overlaps it, so the cluster reads as a group of overlapping bubbles.

use crate::common_structs::{LaserPoint, Sample3};
use crate::inputs::AUDIO_SILENCE;
use crate::laser_objects::colour_from_angle;
use crate::shows::{Show, ShowContext};
use crate::sierpinski::{LaserBounds, Sierpinski, FACE_COUNT};
use crate::tuning::ShowTuning;

use rand::Rng;
use std::f64::consts::TAU;

/// Slowest and fastest base growth rates, DAC units per tick
const MIN_GROWTH: f64 = 0.2;
const MAX_GROWTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct VisCircle {
    x: f64,
    y: f64,
    r: f64,
    /// Radius change per tick before audio scaling
    d_r: f64,
    hue: i32,
}

impl VisCircle {
    fn contains(&self, x: f64, y: f64) -> bool {
        let (dx, dy) = (x - self.x, y - self.y);
        dx * dx + dy * dy < self.r * self.r
    }
}

pub struct AudioVisualizer {
    rng: rand::rngs::ThreadRng,
    bounds: [LaserBounds; FACE_COUNT],
    clusters: [Vec<VisCircle>; FACE_COUNT],

    /// Which circle of each cluster is being traced
    active: [usize; FACE_COUNT],

    /// How far round the active circles we are
    point: usize,

    min_radius: f64,
    max_radius: f64,
}

impl AudioVisualizer {
    pub const NAME: &'static str = "audio_visualizer";

    fn random_circle(&mut self, face: usize) -> VisCircle {
        let bounds = self.bounds[face];
        VisCircle {
            x: self.rng.gen_range(bounds.min_x as f64..=bounds.max_x as f64),
            y: self.rng.gen_range(bounds.min_y as f64..=bounds.max_y as f64),
            r: self.min_radius,
            d_r: self.rng.gen_range(MIN_GROWTH..MAX_GROWTH),
            hue: self.rng.gen_range(0..360),
        }
    }

    /// Grow or shrink every circle.  A circle that reaches full size starts
    /// shrinking; one that shrinks away is replaced somewhere else.
    fn update_radii(&mut self, amplitude: f64, gain: f64) {
        let scale = 1.0 + amplitude * gain;
        for face in 0..FACE_COUNT {
            for i in 0..self.clusters[face].len() {
                let circle = &mut self.clusters[face][i];
                circle.r += circle.d_r * scale;
                if circle.r >= self.max_radius {
                    circle.r = self.max_radius;
                    circle.d_r = -circle.d_r.abs();
                } else if circle.r <= self.min_radius && circle.d_r < 0.0 {
                    let replacement = self.random_circle(face);
                    self.clusters[face][i] = replacement;
                }
            }
        }
    }
}

/// The point `angle` radians round the active circle, or None if it's hidden
/// behind another circle of the cluster or falls off the face
fn perimeter_point(
    cluster: &[VisCircle],
    active: usize,
    angle: f64,
    bounds: &LaserBounds,
) -> Option<(i32, i32)> {
    let circle = cluster.get(active)?;
    let x = circle.x + circle.r * angle.cos();
    let y = circle.y + circle.r * angle.sin();

    let occluded = cluster
        .iter()
        .enumerate()
        .any(|(i, other)| i != active && other.contains(x, y));
    if occluded || !bounds.contains(x as i32, y as i32) {
        return None;
    }
    Some((x as i32, y as i32))
}

impl Show for AudioVisualizer {
    fn new(sierpinski: &Sierpinski, tuning: &ShowTuning) -> Box<dyn Show> {
        let mut show = Self {
            rng: rand::thread_rng(),
            bounds: std::array::from_fn(|face| sierpinski.laser_bounds(face)),
            clusters: std::array::from_fn(|_| Vec::with_capacity(tuning.visualizer_circles)),
            active: [0; FACE_COUNT],
            point: 0,
            min_radius: tuning.visualizer_min_radius,
            max_radius: tuning.visualizer_max_radius.max(tuning.visualizer_min_radius),
        };
        for face in 0..FACE_COUNT {
            for _ in 0..tuning.visualizer_circles {
                let mut circle = show.random_circle(face);
                // Stagger the starting sizes so the cluster doesn't pulse in step
                circle.r = show.rng.gen_range(show.min_radius..=show.max_radius);
                show.clusters[face].push(circle);
            }
        }
        Box::new(show)
    }

    fn step(&mut self, ctx: &mut ShowContext) -> Sample3 {
        let points_per_circle = ctx.tuning.visualizer_points_per_circle.max(1);
        let angle = TAU * self.point as f64 / points_per_circle as f64;

        let mut sample = Sample3::default();
        for face in 0..FACE_COUNT {
            let bounds = &self.bounds[face];
            let cluster = &self.clusters[face];
            let active = self.active[face];
            sample.0[face] = match perimeter_point(cluster, active, angle, bounds) {
                Some((x, y)) => LaserPoint::new(x, y, colour_from_angle(cluster[active].hue)),
                None => {
                    // Park the blanked beam on the circle anyway so the next
                    // lit point doesn't need a long jump
                    match cluster.get(active) {
                        Some(circle) => LaserPoint::blank(
                            (circle.x + circle.r * angle.cos()) as i32,
                            (circle.y + circle.r * angle.sin()) as i32,
                        ),
                        None => LaserPoint::default(),
                    }
                }
            };
        }

        self.point += 1;
        if self.point >= points_per_circle {
            self.point = 0;
            for face in 0..FACE_COUNT {
                let len = self.clusters[face].len().max(1);
                self.active[face] = (self.active[face] + 1) % len;
            }
        }

        let amplitude = (ctx.next_audio() as f64 - AUDIO_SILENCE as f64).abs();
        self.update_radii(amplitude, ctx.tuning.visualizer_audio_gain);

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

    fn circle(x: f64, y: f64, r: f64) -> VisCircle {
        VisCircle {
            x,
            y,
            r,
            d_r: 1.0,
            hue: 0,
        }
    }

    #[test]
    fn test_occlusion() {
        let bounds = LaserBounds {
            min_x: 0,
            max_x: 4095,
            min_y: 0,
            max_y: 4095,
        };
        let cluster = [circle(1000.0, 1000.0, 100.0), circle(1150.0, 1000.0, 100.0)];

        // The right hand side of circle 0 is inside circle 1
        assert_eq!(perimeter_point(&cluster, 0, 0.0, &bounds), None);
        assert_eq!(perimeter_point(&cluster, 0, TAU / 2.0, &bounds), Some((900, 1000)));

        // Off the face counts as hidden too
        let small = LaserBounds {
            min_x: 950,
            max_x: 1050,
            min_y: 950,
            max_y: 1050,
        };
        assert_eq!(perimeter_point(&cluster, 0, TAU / 2.0, &small), None);
    }

    #[test]
    fn test_lit_points_stay_on_face() {
        let mut rig = TestRig::new();
        let mut show = AudioVisualizer::new(&rig.sierpinski, &rig.tuning);
        let bounds = rig.sierpinski.laser_bounds(0);
        for _ in 0..2000 {
            let sample = rig.step(show.as_mut());
            for point in sample.0.iter() {
                if !point.is_blank() {
                    assert!(bounds.contains(point.x as i32, point.y as i32));
                }
            }
        }
    }

    #[test]
    fn test_radii_stay_in_range() {
        let rig = TestRig::new();
        let mut show = AudioVisualizer {
            rng: rand::thread_rng(),
            bounds: std::array::from_fn(|face| rig.sierpinski.laser_bounds(face)),
            clusters: std::array::from_fn(|_| vec![circle(2000.0, 1800.0, 30.0)]),
            active: [0; FACE_COUNT],
            point: 0,
            min_radius: 20.0,
            max_radius: 40.0,
        };
        for _ in 0..1000 {
            show.update_radii(127.0, 0.05);
            for cluster in show.clusters.iter() {
                assert!(cluster[0].r >= 20.0 && cluster[0].r <= 40.0);
            }
        }
    }
}
