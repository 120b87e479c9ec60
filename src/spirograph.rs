//! A spirograph: a pen at distance `a * r2` from the centre of a wheel of
//! radius `r2` rolling around a ring of radius `r1`.  Any of the three
//! parameters can be set drifting back and forth between limits so the
//! figure slowly morphs while it is being drawn.

use log::warn;

/// Most drifting parameters one curve can carry
pub const MAX_DELTAS: usize = 10;

/// Which parameter a delta drifts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaTarget {
    R1,
    R2,
    A,
}

/// Moves one parameter by `d` every update, reversing direction whenever
/// the parameter leaves `[ll, ul]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiroDelta {
    pub target: DeltaTarget,
    pub d: f64,
    pub ll: f64,
    pub ul: f64,
}

impl SpiroDelta {
    pub fn new(target: DeltaTarget, d: f64, ll: f64, ul: f64) -> Self {
        Self { target, d, ll, ul }
    }
}

#[derive(Clone, Debug)]
pub struct Spirograph {
    r1: f64,
    r2: f64,
    a: f64,
    t_d: f64,
    t: f64,
    deltas: Vec<SpiroDelta>,

    /// Latest pen position, already scaled and offset
    pub x: f64,
    pub y: f64,
}

impl Spirograph {
    /// `t_d` is how far the wheel turns per update, in radians
    pub fn new(r1: f64, r2: f64, a: f64, t_d: f64) -> Self {
        Self {
            r1,
            r2,
            a,
            t_d,
            t: 0.0,
            deltas: Vec::with_capacity(MAX_DELTAS),
            x: 0.0,
            y: 0.0,
        }
    }

    /// Add a drifting parameter.  Extra deltas past `MAX_DELTAS` are dropped.
    pub fn add_delta(&mut self, delta: SpiroDelta) {
        if self.deltas.len() < MAX_DELTAS {
            self.deltas.push(delta);
        } else {
            warn!("Spirograph already has {} deltas, ignoring {:?}", MAX_DELTAS, delta);
        }
    }

    #[cfg(test)]
    fn params(&self) -> (f64, f64, f64) {
        (self.r1, self.r2, self.a)
    }

    /// Advance the wheel one step, drift the parameters, and work out the new
    /// pen position as `curve * scale + offset` on each axis
    pub fn update(&mut self, x_scale: f64, y_scale: f64, x_offset: f64, y_offset: f64) {
        self.t += self.t_d;
        for delta in self.deltas.iter_mut() {
            let param = match delta.target {
                DeltaTarget::R1 => &mut self.r1,
                DeltaTarget::R2 => &mut self.r2,
                DeltaTarget::A => &mut self.a,
            };
            *param += delta.d;
            if *param < delta.ll || *param > delta.ul {
                delta.d = -delta.d;
            }
        }

        let (s1, c1) = self.t.sin_cos();
        let (s2, c2) = (self.t * self.r1 / self.r2).sin_cos();
        let x = self.r1 * s1 + self.a * self.r2 * (-s1 + c2 * s1 - c1 * s2);
        let y = -self.r1 * c1 + self.a * self.r2 * (c1 - c1 * c2 - s1 * s2);
        self.x = x * x_scale + x_offset;
        self.y = y * y_scale + y_offset;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_plain_circle() {
        // With no pen offset the curve is just the ring
        let mut spiro = Spirograph::new(2.0, 1.0, 0.0, FRAC_PI_2);
        spiro.update(10.0, 10.0, 100.0, 200.0);
        assert!((spiro.x - 120.0).abs() < 1e-9);
        assert!((spiro.y - 200.0).abs() < 1e-9);
        spiro.update(10.0, 10.0, 100.0, 200.0);
        assert!((spiro.x - 100.0).abs() < 1e-9);
        assert!((spiro.y - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_delta_bounces() {
        let mut spiro = Spirograph::new(1.0, 1.0, 0.5, 0.1);
        spiro.add_delta(SpiroDelta::new(DeltaTarget::A, 0.25, 0.0, 1.0));
        let mut seen = vec![];
        for _ in 0..8 {
            spiro.update(1.0, 1.0, 0.0, 0.0);
            seen.push(spiro.params().2);
        }
        assert_eq!(seen, vec![0.75, 1.0, 1.25, 1.0, 0.75, 0.5, 0.25, 0.0]);
        assert_eq!(spiro.params().0, 1.0);
    }

    #[test]
    fn test_delta_limit() {
        let mut spiro = Spirograph::new(1.0, 1.0, 0.5, 0.1);
        for _ in 0..MAX_DELTAS + 3 {
            spiro.add_delta(SpiroDelta::new(DeltaTarget::R1, 0.0, 0.0, 2.0));
        }
        assert_eq!(spiro.deltas.len(), MAX_DELTAS);
    }
}
