//! Wand trail show: draws the recent path of the wand's spot on whichever
//! face it's pointing at, with mirrored copies on the other two faces.  The
//! colour follows the roll of the wand.

use crate::circular_buffer::CircularBuffer;
use crate::common_structs::{LaserPoint, Sample3};
use crate::laser_objects::XyPoint;
use crate::shows::{Show, ShowContext};
use crate::sierpinski::{LaserBounds, Sierpinski, FACE_COUNT};
use crate::tuning::ShowTuning;

use log::debug;

pub struct WandTrail {
    trail: CircularBuffer<XyPoint>,
    bounds: [LaserBounds; FACE_COUNT],

    /// Face the trail is on
    face: Option<usize>,

    /// Last raw wand reading, so points are only added when the wand moves
    last_raw: Option<[u16; 4]>,

    /// Playback position in the trail, 0 being the oldest point
    play_index: usize,
    forward: bool,
}

impl WandTrail {
    pub const NAME: &'static str = "wand_trail";

    /// Follow the trail one step, bouncing back at either end
    fn next_index(&mut self) -> usize {
        let len = self.trail.len();
        if self.play_index >= len {
            self.play_index = 0;
            self.forward = true;
        }
        let current = self.play_index;
        if len > 1 {
            if self.forward && self.play_index + 1 >= len {
                self.forward = false;
            } else if !self.forward && self.play_index == 0 {
                self.forward = true;
            }
            if self.forward {
                self.play_index += 1;
            } else {
                self.play_index -= 1;
            }
        }
        current
    }
}

impl Show for WandTrail {
    fn new(sierpinski: &Sierpinski, tuning: &ShowTuning) -> Box<dyn Show> {
        Box::new(Self {
            trail: CircularBuffer::new(tuning.wand_trail_length.max(1)),
            bounds: std::array::from_fn(|face| sierpinski.laser_bounds(face)),
            face: None,
            last_raw: None,
            play_index: 0,
            forward: true,
        })
    }

    fn step(&mut self, ctx: &mut ShowContext) -> Sample3 {
        let q = match ctx.wands.quaternion(0) {
            Some(q) => q,
            None => return Sample3::default(),
        };

        let raw = ctx.wands.raw[0];
        if self.last_raw != Some(raw) {
            self.last_raw = Some(raw);
            if let Some((face, point)) = ctx.sierpinski.get_wand_projection(&q) {
                if self.face != Some(face) {
                    debug!("Wand trail moved to face {}", face);
                    self.trail.clear();
                    self.face = Some(face);
                    self.play_index = 0;
                    self.forward = true;
                }
                self.trail.push(ctx.sierpinski.sierpinski_to_laser_coords(face, &point));
            }
        }

        let face = match self.face {
            Some(face) if !self.trail.is_empty() => face,
            _ => return Sample3::default(),
        };
        let index = self.next_index();
        let point = match self.trail.get(index) {
            Some(point) => *point,
            None => return Sample3::default(),
        };

        let mut sample = Sample3::default();
        for offset in 0..FACE_COUNT {
            let target = (face + offset) % FACE_COUNT;
            let colour = ctx.sierpinski.wand_rotation_colour(&q, 120 * offset as i32);
            let x = if offset == 0 {
                point.x
            } else {
                // Reflect across the middle of the face
                let b = &self.bounds[target];
                b.min_x as i32 + b.max_x as i32 - point.x
            };
            sample.0[target] = LaserPoint::new(x, point.y, colour);
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
    use crate::geometry::{Quaternion, Vector3d};
    use crate::laser_objects::colour_from_angle;
    use crate::shows::TestRig;

    fn yaw_pitch(yaw: f64, pitch: f64) -> Quaternion {
        let yaw = Quaternion::from_axis_angle(&Vector3d::new(0.0, 0.0, 1.0), yaw.to_radians());
        let pitch = Quaternion::from_axis_angle(&Vector3d::new(1.0, 0.0, 0.0), pitch.to_radians());
        // Pitch in the wand frame, then yaw
        yaw * pitch
    }

    fn trail(rig: &TestRig) -> WandTrail {
        WandTrail {
            trail: CircularBuffer::new(rig.tuning.wand_trail_length),
            bounds: std::array::from_fn(|face| rig.sierpinski.laser_bounds(face)),
            face: None,
            last_raw: None,
            play_index: 0,
            forward: true,
        }
    }

    #[test]
    fn test_no_wand_is_blank() {
        let mut rig = TestRig::new();
        let mut show = trail(&rig);
        assert_eq!(rig.step(&mut show), Sample3::default());
        assert!(show.trail.is_empty());
    }

    #[test]
    fn test_trail_and_mirrors() {
        let mut rig = TestRig::new();
        let mut show = trail(&rig);
        rig.inputs.set_wands_connected(1);
        rig.inputs.set_wand(0, Quaternion::IDENTITY.to_raw());

        let sample = rig.step(&mut show);
        assert_eq!(show.face, Some(0));
        assert_eq!(show.trail.len(), 1);

        let spot = show.trail.get(0).copied().unwrap();
        assert_eq!((sample.0[0].x as i32, sample.0[0].y as i32), (spot.x, spot.y));
        let b = rig.sierpinski.laser_bounds(1);
        assert_eq!(sample.0[1].x as i32, b.min_x as i32 + b.max_x as i32 - spot.x);
        assert_eq!(sample.0[1].y, sample.0[0].y);

        // Hues are spread round the wheel from the wand roll
        assert_eq!(sample.0[0].colour(), colour_from_angle(0));
        assert_eq!(sample.0[1].colour(), colour_from_angle(120));
        assert_eq!(sample.0[2].colour(), colour_from_angle(240));

        // A still wand doesn't grow the trail
        rig.step(&mut show);
        assert_eq!(show.trail.len(), 1);
    }

    #[test]
    fn test_face_change_resets() {
        let mut rig = TestRig::new();
        let mut show = trail(&rig);
        rig.inputs.set_wands_connected(1);
        for pitch in 0..5 {
            rig.inputs.set_wand(0, yaw_pitch(0.0, -(pitch as f64)).to_raw());
            rig.step(&mut show);
        }
        assert_eq!(show.face, Some(0));
        assert_eq!(show.trail.len(), 5);

        rig.inputs.set_wand(0, yaw_pitch(120.0, 0.0).to_raw());
        rig.step(&mut show);
        assert_eq!(show.face, Some(2));
        assert_eq!(show.trail.len(), 1);
    }

    #[test]
    fn test_ping_pong_playback() {
        let rig = TestRig::new();
        let mut show = trail(&rig);
        for i in 0..4 {
            show.trail.push(XyPoint::new(i, 0, true));
        }
        let order: Vec<usize> = (0..10).map(|_| show.next_index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 2, 1, 0, 1, 2, 3]);

        // Shrinking the trail under the playhead restarts playback
        show.trail.clear();
        show.trail.push(XyPoint::new(0, 0, true));
        assert_eq!(show.next_index(), 0);
        assert_eq!(show.next_index(), 0);
    }
}
