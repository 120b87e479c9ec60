//! Pong, played across all three faces.
//!
//! The faces are laid side by side to make one long court: face 0 on the
//! left, face 2 on the right.  The left paddle guards the outer edge of face
//! 0 and the right paddle guards the outer edge of face 2.  A ball crossing
//! one of the inner edges is handed over to the neighbouring face.  Each
//! paddle is steered by its wand, or by the computer when that wand isn't
//! connected.
//!
//! Drawing is split over ticks since only one point per face can be output
//! per tick: the ball marker is held for a few ticks, then the paddles are
//! traced one point per tick, then the physics is stepped once.

use crate::common_structs::{LaserPoint, Rgb, Sample3, SoundEffect};
use crate::laser_objects::{get_interpolated_size, interpolate_objects, XyPoint};
use crate::shows::{Show, ShowContext};
use crate::sierpinski::{LaserBounds, Sierpinski, FACE_COUNT};
use crate::tuning::ShowTuning;

use log::debug;
use rand::Rng;

/// Face the ball is served on
pub const INITIAL_FACE: usize = 1;

const BALL_COLOUR: Rgb = Rgb::WHITE;
const PADDLE_COLOURS: [Rgb; 2] = [Rgb::RED, Rgb::BLUE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Hold the beam on the ball
    Ball,
    /// Trace the paddle outlines
    Paddles,
    /// Move everything
    Physics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Paddle {
    face: usize,
    x: i32,
    /// Centre of the paddle
    y: i32,
    wand_slot: usize,
    score: u32,
}

pub struct Pong {
    rng: rand::rngs::ThreadRng,
    bounds: LaserBounds,

    phase: Phase,
    phase_ticks: usize,

    ball_laser: usize,
    ball: (i32, i32),
    velocity: (i32, i32),

    /// Physics steps left until the next serve.  Non-zero means a point has
    /// just been scored and the ball is out of play.
    score_timeout: usize,

    paddles: [Paddle; 2],

    /// Interpolated paddle outlines, rebuilt before each trace
    paddle_points: [Vec<XyPoint>; 2],
    paddle_index: usize,

    ball_speed: i32,
    paddle_length: i32,
    reset_delay: usize,
    ai_speed: i32,
    ball_dwell: usize,
    segment_distance: i32,
}

impl Pong {
    pub const NAME: &'static str = "pong";

    fn build(sierpinski: &Sierpinski, tuning: &ShowTuning) -> Self {
        let bounds = sierpinski.laser_bounds(0);
        let (_, mid_y) = bounds.midpoint();
        let paddle_length = tuning.pong_paddle_length.max(1);
        let segment_distance = tuning.pong_segment_distance.max(1);

        // A paddle outline is always two vertices the same distance apart, so
        // its interpolated size never changes
        let outline = [XyPoint::new(0, 0, false), XyPoint::new(0, paddle_length, true)];
        let paddle_capacity = get_interpolated_size(&outline, segment_distance);

        let mut pong = Self {
            rng: rand::thread_rng(),
            bounds,
            phase: Phase::Ball,
            phase_ticks: 0,
            ball_laser: INITIAL_FACE,
            ball: bounds.midpoint(),
            velocity: (0, 0),
            score_timeout: 0,
            paddles: [
                Paddle {
                    face: 0,
                    x: bounds.min_x as i32,
                    y: mid_y,
                    wand_slot: 0,
                    score: 0,
                },
                Paddle {
                    face: FACE_COUNT - 1,
                    x: bounds.max_x as i32,
                    y: mid_y,
                    wand_slot: 1,
                    score: 0,
                },
            ],
            paddle_points: std::array::from_fn(|_| Vec::with_capacity(paddle_capacity)),
            paddle_index: 0,
            ball_speed: tuning.pong_ball_speed,
            paddle_length,
            reset_delay: tuning.pong_reset_delay.max(1),
            ai_speed: tuning.pong_ai_speed,
            ball_dwell: tuning.pong_ball_dwell.max(1),
            segment_distance,
        };
        pong.serve();
        pong
    }

    /// Put a new ball in play from the middle of the initial face
    fn serve(&mut self) {
        self.ball_laser = INITIAL_FACE;
        self.ball = self.bounds.midpoint();
        let vx = if self.rng.gen() { self.ball_speed } else { -self.ball_speed };
        let vy = if self.rng.gen() { self.ball_speed / 2 } else { -self.ball_speed / 2 };
        self.velocity = (vx, vy);
    }

    /// Where a paddle may be centred without sticking off the face
    fn clamp_paddle(&self, y: i32) -> i32 {
        let half = self.paddle_length / 2;
        let low = self.bounds.min_y as i32 + half;
        let high = (self.bounds.max_y as i32 - half).max(low);
        y.clamp(low, high)
    }

    fn move_paddles(&mut self, ctx: &ShowContext) {
        for i in 0..self.paddles.len() {
            let paddle = self.paddles[i];
            let target = match ctx.wands.quaternion(paddle.wand_slot) {
                // Follow the wand, holding still while it points off the faces
                Some(q) => match ctx.sierpinski.get_wand_projection(&q) {
                    Some((face, point)) => {
                        ctx.sierpinski.sierpinski_to_laser_coords(face, &point).y
                    }
                    None => paddle.y,
                },
                // Chase the ball, but no faster than the computer is allowed
                None => paddle.y + (self.ball.1 - paddle.y).clamp(-self.ai_speed, self.ai_speed),
            };
            self.paddles[i].y = self.clamp_paddle(target);
        }
    }

    fn paddle_hit(&self, paddle: usize, y: i32) -> bool {
        (y - self.paddles[paddle].y).abs() <= self.paddle_length / 2
    }

    /// The ball got past `paddle`, so the other side scores
    fn goal(&mut self, ctx: &mut ShowContext, paddle: usize) {
        let scorer = 1 - paddle;
        self.paddles[scorer].score += 1;
        self.score_timeout = self.reset_delay;
        ctx.raise(SoundEffect::GameOver);
        debug!(
            "Pong: point to player {}, score {}-{}",
            scorer + 1,
            self.paddles[0].score,
            self.paddles[1].score
        );
    }

    fn physics(&mut self, ctx: &mut ShowContext) {
        if self.score_timeout > 0 {
            self.score_timeout -= 1;
            if self.score_timeout == 0 {
                self.serve();
            }
            return;
        }

        self.move_paddles(ctx);

        let b = self.bounds;
        let (min_x, max_x) = (b.min_x as i32, b.max_x as i32);
        let (min_y, max_y) = (b.min_y as i32, b.max_y as i32);
        let mut x = self.ball.0 + self.velocity.0;
        let mut y = self.ball.1 + self.velocity.1;

        if y < min_y {
            y = 2 * min_y - y;
            self.velocity.1 = self.velocity.1.abs();
            ctx.raise(SoundEffect::Wall);
        } else if y > max_y {
            y = 2 * max_y - y;
            self.velocity.1 = -self.velocity.1.abs();
            ctx.raise(SoundEffect::Wall);
        }

        if x < min_x {
            if self.ball_laser == self.paddles[0].face {
                if !self.paddle_hit(0, y) {
                    self.goal(ctx, 0);
                    return;
                }
                x = 2 * min_x - x;
                self.velocity.0 = self.velocity.0.abs();
                ctx.raise(SoundEffect::Paddle);
            } else {
                self.ball_laser -= 1;
                x += max_x - min_x;
            }
        } else if x > max_x {
            if self.ball_laser == self.paddles[1].face {
                if !self.paddle_hit(1, y) {
                    self.goal(ctx, 1);
                    return;
                }
                x = 2 * max_x - x;
                self.velocity.0 = -self.velocity.0.abs();
                ctx.raise(SoundEffect::Paddle);
            } else {
                self.ball_laser += 1;
                x -= max_x - min_x;
            }
        }

        self.ball = (x, y);
    }

    /// Rebuild the paddle outlines for the current paddle positions: a
    /// blanked jump to the top of the paddle then a lit stroke down it
    fn build_paddles(&mut self) {
        let half = self.paddle_length / 2;
        for (paddle, points) in self.paddles.iter().zip(self.paddle_points.iter_mut()) {
            let outline = [
                XyPoint::new(paddle.x, paddle.y + half, false),
                XyPoint::new(paddle.x, paddle.y + half - self.paddle_length, true),
            ];
            points.clear();
            interpolate_objects(&outline, self.segment_distance, points);
        }
    }

    /// Every face parks its beam blanked on the ball, apart from the face
    /// the ball is on while it's in play
    fn ball_sample(&self) -> Sample3 {
        let mut sample = Sample3::uniform(LaserPoint::blank(self.ball.0, self.ball.1));
        if self.score_timeout == 0 {
            sample.0[self.ball_laser] = LaserPoint::new(self.ball.0, self.ball.1, BALL_COLOUR);
        }
        sample
    }

    fn paddle_sample(&self) -> Sample3 {
        let mut sample = Sample3::uniform(LaserPoint::blank(self.ball.0, self.ball.1));
        let paddles = self.paddles.iter().zip(self.paddle_points.iter());
        for (i, (paddle, points)) in paddles.enumerate() {
            // The shorter outline waits blanked on its last point
            let (point, lit) = match points.get(self.paddle_index) {
                Some(p) => (*p, p.on),
                None => match points.last() {
                    Some(p) => (*p, false),
                    None => continue,
                },
            };
            sample.0[paddle.face] = if lit {
                LaserPoint::new(point.x, point.y, PADDLE_COLOURS[i])
            } else {
                LaserPoint::blank(point.x, point.y)
            };
        }
        sample
    }
}

impl Show for Pong {
    fn new(sierpinski: &Sierpinski, tuning: &ShowTuning) -> Box<dyn Show> {
        Box::new(Self::build(sierpinski, tuning))
    }

    fn step(&mut self, ctx: &mut ShowContext) -> Sample3 {
        match self.phase {
            Phase::Ball => {
                let sample = self.ball_sample();
                self.phase_ticks += 1;
                if self.phase_ticks >= self.ball_dwell {
                    self.phase_ticks = 0;
                    self.build_paddles();
                    self.paddle_index = 0;
                    self.phase = Phase::Paddles;
                }
                sample
            }
            Phase::Paddles => {
                let sample = self.paddle_sample();
                self.paddle_index += 1;
                let longest = self.paddle_points.iter().map(Vec::len).max().unwrap_or(0);
                if self.paddle_index >= longest {
                    self.phase = Phase::Physics;
                }
                sample
            }
            Phase::Physics => {
                self.physics(ctx);
                self.phase = Phase::Ball;
                self.ball_sample()
            }
        }
    }

    fn get_name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Quaternion, Vector3d};
    use crate::shows::TestRig;

    fn physics(rig: &mut TestRig, pong: &mut Pong) {
        let mut ctx = rig.ctx();
        pong.physics(&mut ctx);
    }

    fn quiet_rig() -> TestRig {
        let mut rig = TestRig::new();
        rig.tuning.pong_ai_speed = 0;
        rig.tuning.pong_reset_delay = 5;
        rig
    }

    #[test]
    fn test_goal_and_reset() {
        let mut rig = quiet_rig();
        let mut pong = Pong::build(&rig.sierpinski, &rig.tuning);
        let b = pong.bounds;
        let (_, mid_y) = b.midpoint();

        pong.ball_laser = 0;
        pong.ball = (b.min_x as i32 + 5, mid_y);
        pong.velocity = (-12, 0);
        pong.paddles[0].y = pong.clamp_paddle(b.min_y as i32);

        physics(&mut rig, &mut pong);
        assert_eq!(rig.sound_effect.take(), Some(SoundEffect::GameOver));
        assert_eq!(pong.score_timeout, 5);
        assert_eq!(pong.paddles[1].score, 1);
        assert_eq!(pong.paddles[0].score, 0);
        // The ball goes dark while out of play
        assert!(pong.ball_sample().is_blank());

        // Only one game over per goal
        for _ in 0..4 {
            physics(&mut rig, &mut pong);
            assert_eq!(rig.sound_effect.take(), None);
            assert!(pong.score_timeout > 0);
        }

        physics(&mut rig, &mut pong);
        assert_eq!(pong.score_timeout, 0);
        assert_eq!(pong.ball_laser, INITIAL_FACE);
        assert_eq!(pong.ball, b.midpoint());
        assert_eq!(pong.velocity.0.abs(), rig.tuning.pong_ball_speed);
        assert_eq!(rig.sound_effect.take(), None);
        assert!(!pong.ball_sample().is_blank());
    }

    #[test]
    fn test_paddle_return() {
        let mut rig = quiet_rig();
        let mut pong = Pong::build(&rig.sierpinski, &rig.tuning);
        let b = pong.bounds;
        let (_, mid_y) = b.midpoint();

        pong.ball_laser = FACE_COUNT - 1;
        pong.ball = (b.max_x as i32 - 5, mid_y);
        pong.velocity = (12, 0);
        pong.paddles[1].y = mid_y;

        physics(&mut rig, &mut pong);
        assert_eq!(rig.sound_effect.take(), Some(SoundEffect::Paddle));
        assert_eq!(pong.ball, (b.max_x as i32 - 7, mid_y));
        assert_eq!(pong.velocity, (-12, 0));
        assert_eq!(pong.score_timeout, 0);
    }

    #[test]
    fn test_wall_bounce() {
        let mut rig = quiet_rig();
        let mut pong = Pong::build(&rig.sierpinski, &rig.tuning);
        let b = pong.bounds;
        let (mid_x, _) = b.midpoint();

        pong.ball = (mid_x, b.max_y as i32 - 2);
        pong.velocity = (6, 6);
        physics(&mut rig, &mut pong);
        assert_eq!(rig.sound_effect.take(), Some(SoundEffect::Wall));
        assert_eq!(pong.ball, (mid_x + 6, b.max_y as i32 - 4));
        assert_eq!(pong.velocity, (6, -6));
    }

    #[test]
    fn test_handoff_between_faces() {
        let mut rig = quiet_rig();
        let mut pong = Pong::build(&rig.sierpinski, &rig.tuning);
        let b = pong.bounds;
        let (_, mid_y) = b.midpoint();

        pong.ball_laser = 1;
        pong.ball = (b.min_x as i32 + 5, mid_y);
        pong.velocity = (-12, 0);
        physics(&mut rig, &mut pong);
        assert_eq!(pong.ball_laser, 0);
        assert_eq!(pong.ball, (b.max_x as i32 - 7, mid_y));
        assert_eq!(rig.sound_effect.take(), None);

        pong.velocity = (12, 0);
        physics(&mut rig, &mut pong);
        physics(&mut rig, &mut pong);
        assert_eq!(pong.ball_laser, 1);
        assert_eq!(pong.ball, (b.min_x as i32 + 5 + 12, mid_y));
    }

    #[test]
    fn test_ai_and_wand_paddles() {
        let mut rig = TestRig::new();
        rig.tuning.pong_ai_speed = 6;
        let mut pong = Pong::build(&rig.sierpinski, &rig.tuning);
        let b = pong.bounds;
        let start = pong.paddles[0].y;
        pong.ball.1 = b.max_y as i32;
        pong.velocity = (0, 0);

        // No wands, so both paddles creep towards the ball
        physics(&mut rig, &mut pong);
        assert_eq!(pong.paddles[0].y, pong.clamp_paddle(start + 6));
        assert_eq!(pong.paddles[1].y, pong.clamp_paddle(start + 6));

        // Wand 1 takes over the left paddle
        let pose = Quaternion::from_axis_angle(&Vector3d::new(1.0, 0.0, 0.0), -4f64.to_radians());
        rig.inputs.set_wand(0, pose.to_raw());
        rig.inputs.set_wands_connected(1);
        physics(&mut rig, &mut pong);
        let q = Quaternion::from_raw(pose.to_raw());
        let (face, point) = rig.sierpinski.get_wand_projection(&q).unwrap();
        let expected = rig.sierpinski.sierpinski_to_laser_coords(face, &point).y;
        assert_eq!(pong.paddles[0].y, pong.clamp_paddle(expected));
        assert_eq!(pong.paddles[1].y, pong.clamp_paddle(start + 12));
    }

    #[test]
    fn test_phase_cycle() {
        let mut rig = quiet_rig();
        let mut pong = Pong::build(&rig.sierpinski, &rig.tuning);
        let start = pong.ball;
        let dwell = rig.tuning.pong_ball_dwell;

        for _ in 0..dwell {
            let sample = rig.step(&mut pong);
            assert_eq!(sample.0[pong.ball_laser].colour(), BALL_COLOUR);
        }
        assert_eq!(pong.phase, Phase::Paddles);
        let paddle_len = pong.paddle_points[0].len();
        assert_eq!(paddle_len, 2 + rig.tuning.pong_paddle_length as usize / 16);

        for i in 0..paddle_len {
            let sample = rig.step(&mut pong);
            // The first point of each outline is the blanked jump
            assert_eq!(sample.0[0].is_blank(), i == 0);
            assert_eq!(sample.0[FACE_COUNT - 1].is_blank(), i == 0);
            assert_eq!(sample.0[0].x, pong.bounds.min_x);
        }
        assert_eq!(pong.ball, start);
        assert_eq!(pong.phase, Phase::Physics);

        rig.step(&mut pong);
        assert_eq!(pong.phase, Phase::Ball);
        assert_eq!(pong.ball, (start.0 + pong.velocity.0, start.1 + pong.velocity.1));
    }
}
