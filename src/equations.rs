//! The catalog of shapes played back by the equation show.
//!
//! Every shape is a closed parametric curve which is sampled once, on first
//! use, into the same packed table format the scanners' shape tables use:
//! pairs of `(x, y)` words where `x` carries a "lit" flag in bit 15 and a
//! 15-bit magnitude, and `y` a 16-bit magnitude.  Both axes share one scale
//! so shapes keep their aspect ratio.

use lazy_static::lazy_static;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// Number of shapes in the catalog
pub const EQUATION_COUNT: usize = 36;

/// Largest magnitude either axis is packed to
pub const EQUATION_TABLE_MAX: u16 = 0x7fff;

/// Samples taken from each smooth curve
const CURVE_SAMPLES: usize = 160;

/// Samples taken from curves with many laps
const DENSE_CURVE_SAMPLES: usize = 320;

/// The parametric definitions behind the packed tables
#[derive(Debug, Clone, Copy)]
enum Equation {
    /// Rose curve r = cos(n/d θ)
    Rose { n: u32, d: u32 },
    /// x = sin(aθ + δ), y = sin(bθ)
    Lissajous { a: u32, b: u32, phase: f64 },
    /// Regular polygon, vertices only
    Polygon { sides: u32 },
    /// Star polygon {points/step}, vertices only
    Star { points: u32, step: u32 },
    /// Point at distance `d` from the centre of a circle of radius `r`
    /// rolling inside a circle of radius `big_r`
    Hypotrochoid { big_r: u32, r: u32, d: f64 },
    /// As above but rolling around the outside
    Epitrochoid { big_r: u32, r: u32, d: f64 },
    Heart,
    Lemniscate,
    Astroid,
    Deltoid,
    /// Archimedean spiral with a blanked return stroke to the centre
    Spiral { turns: u32 },
}

const CATALOG: [Equation; EQUATION_COUNT] = [
    Equation::Rose { n: 2, d: 1 },
    Equation::Rose { n: 3, d: 1 },
    Equation::Rose { n: 4, d: 1 },
    Equation::Rose { n: 5, d: 1 },
    Equation::Rose { n: 6, d: 1 },
    Equation::Rose { n: 7, d: 1 },
    Equation::Rose { n: 3, d: 2 },
    Equation::Rose { n: 5, d: 2 },
    Equation::Lissajous { a: 1, b: 2, phase: FRAC_PI_2 },
    Equation::Lissajous { a: 3, b: 2, phase: FRAC_PI_2 },
    Equation::Lissajous { a: 3, b: 4, phase: FRAC_PI_2 },
    Equation::Lissajous { a: 5, b: 4, phase: FRAC_PI_2 },
    Equation::Lissajous { a: 1, b: 3, phase: FRAC_PI_4 },
    Equation::Lissajous { a: 5, b: 6, phase: FRAC_PI_2 },
    Equation::Polygon { sides: 3 },
    Equation::Polygon { sides: 4 },
    Equation::Polygon { sides: 5 },
    Equation::Polygon { sides: 6 },
    Equation::Polygon { sides: 8 },
    Equation::Star { points: 5, step: 2 },
    Equation::Star { points: 7, step: 2 },
    Equation::Star { points: 7, step: 3 },
    Equation::Star { points: 8, step: 3 },
    Equation::Star { points: 9, step: 4 },
    Equation::Hypotrochoid { big_r: 5, r: 3, d: 5.0 },
    Equation::Hypotrochoid { big_r: 8, r: 5, d: 3.0 },
    Equation::Hypotrochoid { big_r: 7, r: 2, d: 4.0 },
    Equation::Hypotrochoid { big_r: 9, r: 4, d: 2.0 },
    Equation::Epitrochoid { big_r: 3, r: 1, d: 1.0 },
    Equation::Epitrochoid { big_r: 4, r: 1, d: 2.0 },
    Equation::Epitrochoid { big_r: 5, r: 2, d: 1.5 },
    Equation::Heart,
    Equation::Lemniscate,
    Equation::Astroid,
    Equation::Deltoid,
    Equation::Spiral { turns: 4 },
];

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

impl Equation {
    /// Sample the curve.  Returns `(x, y, lit)` triples in arbitrary units.
    fn sample(&self) -> Vec<(f64, f64, bool)> {
        let curve = |samples: usize, period: f64, f: &dyn Fn(f64) -> (f64, f64)| {
            (0..samples)
                .map(|i| {
                    let (x, y) = f(period * i as f64 / samples as f64);
                    (x, y, true)
                })
                .collect::<Vec<_>>()
        };

        match *self {
            Equation::Rose { n, d } => {
                let k = n as f64 / d as f64;
                let period = PI * d as f64 * if (n * d) % 2 == 0 { 2.0 } else { 1.0 };
                curve(DENSE_CURVE_SAMPLES, period, &|t| {
                    let r = (k * t).cos();
                    (r * t.cos(), r * t.sin())
                })
            }
            Equation::Lissajous { a, b, phase } => curve(DENSE_CURVE_SAMPLES, TAU, &|t| {
                ((a as f64 * t + phase).sin(), (b as f64 * t).sin())
            }),
            Equation::Polygon { sides } => curve(sides as usize, TAU, &|t| {
                ((t + FRAC_PI_2).cos(), (t + FRAC_PI_2).sin())
            }),
            Equation::Star { points, step } => {
                let step_angle = TAU * step as f64 / points as f64;
                (0..points)
                    .map(|i| {
                        let t = FRAC_PI_2 + step_angle * i as f64;
                        (t.cos(), t.sin(), true)
                    })
                    .collect()
            }
            Equation::Hypotrochoid { big_r, r, d } => {
                let laps = (r / gcd(big_r, r)) as f64;
                let (big_r, r) = (big_r as f64, r as f64);
                curve(DENSE_CURVE_SAMPLES, TAU * laps, &|t| {
                    let k = (big_r - r) / r;
                    (
                        (big_r - r) * t.cos() + d * (k * t).cos(),
                        (big_r - r) * t.sin() - d * (k * t).sin(),
                    )
                })
            }
            Equation::Epitrochoid { big_r, r, d } => {
                let laps = (r / gcd(big_r, r)) as f64;
                let (big_r, r) = (big_r as f64, r as f64);
                curve(DENSE_CURVE_SAMPLES, TAU * laps, &|t| {
                    let k = (big_r + r) / r;
                    (
                        (big_r + r) * t.cos() - d * (k * t).cos(),
                        (big_r + r) * t.sin() - d * (k * t).sin(),
                    )
                })
            }
            Equation::Heart => curve(CURVE_SAMPLES, TAU, &|t| {
                (
                    16.0 * t.sin().powi(3),
                    13.0 * t.cos()
                        - 5.0 * (2.0 * t).cos()
                        - 2.0 * (3.0 * t).cos()
                        - (4.0 * t).cos(),
                )
            }),
            Equation::Lemniscate => curve(CURVE_SAMPLES, TAU, &|t| {
                let denominator = 1.0 + t.sin() * t.sin();
                (t.cos() / denominator, t.sin() * t.cos() / denominator)
            }),
            Equation::Astroid => curve(CURVE_SAMPLES, TAU, &|t| (t.cos().powi(3), t.sin().powi(3))),
            Equation::Deltoid => curve(CURVE_SAMPLES, TAU, &|t| {
                (2.0 * t.cos() + (2.0 * t).cos(), 2.0 * t.sin() - (2.0 * t).sin())
            }),
            Equation::Spiral { turns } => {
                let period = TAU * turns as f64;
                let mut points = curve(CURVE_SAMPLES, period, &|t| (t * t.cos(), t * t.sin()));
                // The table is closed back onto the first point, so mark the
                // first point unlit to blank the jump from the outside back
                // to the centre
                points[0].2 = false;
                points
            }
        }
    }

    /// Sample and pack into the table format
    fn bake(&self) -> Vec<u16> {
        let points = self.sample();
        let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
        let scale = EQUATION_TABLE_MAX as f64 / span;

        // Magnitudes must leave the top bit free for the lit flag
        static_assertions::const_assert!(EQUATION_TABLE_MAX < 0x8000);

        let mut table = Vec::with_capacity(points.len() * 2);
        for (x, y, lit) in points {
            let x_word = (((x - min_x) * scale).round() as u16).min(EQUATION_TABLE_MAX);
            let y_word = (((y - min_y) * scale).round() as u16).min(EQUATION_TABLE_MAX);
            table.push(if lit { x_word | 0x8000 } else { x_word });
            table.push(y_word);
        }
        table
    }
}

lazy_static! {
    /// Packed tables for every shape in the catalog, baked on first use
    pub static ref EQUATIONS: Vec<Vec<u16>> = CATALOG.iter().map(Equation::bake).collect();
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::laser_objects::{convert_equation_to_points, get_laser_obj_midpoint};

    #[test]
    fn test_catalog_tables() {
        assert_eq!(EQUATIONS.len(), EQUATION_COUNT);
        for table in EQUATIONS.iter() {
            assert!(table.len() >= 6);
            assert_eq!(table.len() % 2, 0);
            // The longest axis always fills the table range
            let max_x = table.iter().step_by(2).map(|x| x & 0x7fff).max().unwrap();
            let max_y = table.iter().skip(1).step_by(2).max().unwrap();
            assert!(max_x == EQUATION_TABLE_MAX || *max_y == EQUATION_TABLE_MAX);
        }
    }

    #[test]
    fn test_tables_decode_to_centred_shapes() {
        let scale = 300.0 / EQUATION_TABLE_MAX as f64;
        for table in EQUATIONS.iter() {
            let points = convert_equation_to_points(table, scale, scale);
            assert_eq!(points.len(), table.len() / 2 + 1);
            let (mid_x, mid_y) = get_laser_obj_midpoint(&points);
            assert!(mid_x.abs() <= 1 && mid_y.abs() <= 1);
            assert!(points.iter().all(|p| p.x.abs() <= 151 && p.y.abs() <= 151));
        }
    }

    #[test]
    fn test_spiral_return_is_blank() {
        let spiral = EQUATIONS.last().unwrap();
        assert_eq!(spiral[0] & 0x8000, 0);
        assert_ne!(spiral[2] & 0x8000, 0);
    }
}
