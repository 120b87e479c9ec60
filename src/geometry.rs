//! This file defines various types, constants, and functions related to 3d
//! geometry which are needed to model the sculpture and the wand ray

use crate::linalg;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// General purpose 3d vector type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_slice(slice: [f64; 3]) -> Self {
        Self {
            x: slice[0],
            y: slice[1],
            z: slice[2],
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Calculate the magnitude of this vector
    pub fn magnitude(&self) -> f64 {
        linalg::mag(&self.as_array())
    }

    /// Return a new vector scaled by the desired amount
    pub fn scale(&self, scale_amount: f64) -> Vector3d {
        *self * scale_amount
    }

    /// Scale to unit magnitude.  Produces NaNs if the magnitude is zero, so
    /// only call this on vectors known to be non-degenerate.
    pub fn normalise(&self) -> Vector3d {
        Self::from_slice(linalg::norm(&self.as_array()))
    }
}

impl Add for Vector3d {
    type Output = Vector3d;
    fn add(self, other: Vector3d) -> Vector3d {
        Self::from_slice(linalg::add_vv(&self.as_array(), &other.as_array()))
    }
}

impl Sub for Vector3d {
    type Output = Vector3d;
    fn sub(self, other: Vector3d) -> Vector3d {
        Self::from_slice(linalg::sub_vv(&self.as_array(), &other.as_array()))
    }
}

impl Mul<f64> for Vector3d {
    type Output = Vector3d;
    fn mul(self, other: f64) -> Vector3d {
        Self::from_slice(linalg::mul_vf(&self.as_array(), other))
    }
}

impl Div<f64> for Vector3d {
    type Output = Vector3d;
    fn div(self, other: f64) -> Vector3d {
        Self::from_slice(linalg::div_vf(&self.as_array(), other))
    }
}

impl Neg for Vector3d {
    type Output = Vector3d;
    fn neg(self) -> Vector3d {
        self * -1.0
    }
}

/// Find the dot product of two vectors
pub fn dot(a: &Vector3d, b: &Vector3d) -> f64 {
    linalg::dot_vv(&a.as_array(), &b.as_array())
}

/// Find the cross product of two vectors
pub fn cross(a: &Vector3d, b: &Vector3d) -> Vector3d {
    Vector3d {
        x: a.y * b.z - a.z * b.y,
        y: a.z * b.x - a.x * b.z,
        z: a.x * b.y - a.y * b.x,
    }
}

/// An orientation quaternion, with the scalar part last
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Offset and scale of the raw unsigned 16-bit sensor units
    pub const RAW_OFFSET: f64 = 16384.0;
    pub const RAW_SCALE: f64 = 16384.0;

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Convert raw sensor units (`x, y, z, w` order) into a unit quaternion.
    /// Readings too close to zero to normalise come back as the identity.
    pub fn from_raw(raw: [u16; 4]) -> Self {
        let component = |v: u16| (v as f64 - Self::RAW_OFFSET) / Self::RAW_SCALE;
        let q = [
            component(raw[0]),
            component(raw[1]),
            component(raw[2]),
            component(raw[3]),
        ];
        let magnitude = linalg::mag(&q);
        if magnitude < 1e-6 {
            return Self::IDENTITY;
        }
        let q = linalg::div_vf(&q, magnitude);
        Self::new(q[0], q[1], q[2], q[3])
    }

    /// Inverse of `from_raw`, mainly useful to feed test poses and simulated
    /// wands through the same path as real sensor data
    pub fn to_raw(&self) -> [u16; 4] {
        let raw = |v: f64| {
            (v * Self::RAW_SCALE + Self::RAW_OFFSET)
                .round()
                .clamp(0.0, 65535.0) as u16
        };
        [raw(self.x), raw(self.y), raw(self.z), raw(self.w)]
    }

    /// Build a rotation of `angle` radians about `axis`
    pub fn from_axis_angle(axis: &Vector3d, angle: f64) -> Self {
        let axis = axis.normalise();
        let (s, c) = (angle / 2.0).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate `v` by this quaternion, `q * v * conj(q)`
    pub fn rotate(&self, v: &Vector3d) -> Vector3d {
        let q = self;
        let conj = self.conjugate();
        // q * (v, 0)
        let qv = [
            q.w * v.x + q.y * v.z - q.z * v.y,
            q.w * v.y + q.z * v.x - q.x * v.z,
            q.w * v.z + q.x * v.y - q.y * v.x,
            -q.x * v.x - q.y * v.y - q.z * v.z,
        ];
        // ... * conj(q), keeping only the vector part
        Vector3d {
            x: qv[3] * conj.x + qv[0] * conj.w + qv[1] * conj.z - qv[2] * conj.y,
            y: qv[3] * conj.y + qv[1] * conj.w + qv[2] * conj.x - qv[0] * conj.z,
            z: qv[3] * conj.z + qv[2] * conj.w + qv[0] * conj.y - qv[1] * conj.x,
        }
    }
}

/// Hamilton product: the rotation `other` followed by `self`
impl Mul for Quaternion {
    type Output = Quaternion;
    fn mul(self, other: Quaternion) -> Quaternion {
        let (a, b) = (self, other);
        Quaternion {
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        }
    }
}

/// Find the point at height `z` on the line through `p1` and `p2`.  The line
/// must not be horizontal.
pub fn find_edge_pos(p1: &Vector3d, p2: &Vector3d, z: f64) -> Vector3d {
    Vector3d {
        x: p1.x + (z - p1.z) * (p2.x - p1.x) / (p2.z - p1.z),
        y: p1.y + (z - p1.z) * (p2.y - p1.y) / (p2.z - p1.z),
        z,
    }
}

/// Unit normal of the plane through the first three corners of `surface`.
/// The sign is chosen so the normal never points downwards, which for the
/// upper faces of the tetrahedron means it points out of the sculpture.
pub fn find_surface_normal(surface: &[Vector3d; 4]) -> Vector3d {
    let mut normal = cross(&(surface[1] - surface[0]), &(surface[2] - surface[0]));
    if normal.z < 0.0 {
        normal = -normal;
    }
    normal.normalise()
}

/// Are `p1` and `p2` on the same side of the line through `a` and `b`?
/// Points exactly on the line count as being on both sides.
pub fn same_side(p1: &Vector3d, p2: &Vector3d, a: &Vector3d, b: &Vector3d) -> bool {
    let edge = *b - *a;
    let cross1 = cross(&edge, &(*p1 - *a));
    let cross2 = cross(&edge, &(*p2 - *a));
    dot(&cross1, &cross2) >= 0.0
}

pub fn point_in_triangle(a: &Vector3d, b: &Vector3d, c: &Vector3d, p: &Vector3d) -> bool {
    same_side(p, a, b, c) && same_side(p, b, a, c) && same_side(p, c, a, b)
}

/// Is `p` inside the quadrilateral `corners`?  The quad is split along the
/// diagonal from corner 0 to corner 2.  `p` is assumed to already lie in the
/// plane of the quad.
pub fn point_in_surface(corners: &[Vector3d; 4], p: &Vector3d) -> bool {
    point_in_triangle(&corners[0], &corners[1], &corners[2], p)
        || point_in_triangle(&corners[2], &corners[3], &corners[0], p)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_close(a: &Vector3d, b: &Vector3d) {
        assert!((*a - *b).magnitude() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_cross_and_dot() {
        let x = Vector3d::new(1.0, 0.0, 0.0);
        let y = Vector3d::new(0.0, 1.0, 0.0);
        assert_eq!(cross(&x, &y), Vector3d::new(0.0, 0.0, 1.0));
        assert_eq!(dot(&x, &y), 0.0);
        assert_eq!(Vector3d::new(3.0, 0.0, 4.0).magnitude(), 5.0);
    }

    #[test]
    fn test_quaternion_rotation() {
        let quarter_turn = Quaternion::from_axis_angle(&Vector3d::new(0.0, 0.0, 1.0), FRAC_PI_2);
        let rotated = quarter_turn.rotate(&Vector3d::new(1.0, 0.0, 0.0));
        assert_vec_close(&rotated, &Vector3d::new(0.0, 1.0, 0.0));

        let v = Vector3d::new(0.3, -1.0, 2.0);
        assert_vec_close(&Quaternion::IDENTITY.rotate(&v), &v);

        // Two quarter turns make a half turn
        let half_turn = quarter_turn * quarter_turn;
        assert_vec_close(
            &half_turn.rotate(&Vector3d::new(1.0, 0.0, 0.0)),
            &Vector3d::new(-1.0, 0.0, 0.0),
        );
        let tilt = Quaternion::from_axis_angle(&Vector3d::new(1.0, 0.0, 0.0), 0.3);
        assert_vec_close(
            &(quarter_turn * tilt).rotate(&v),
            &quarter_turn.rotate(&tilt.rotate(&v)),
        );
    }

    #[test]
    fn test_raw_quaternion() {
        let identity = Quaternion::from_raw([16384, 16384, 16384, 32768]);
        assert_eq!(identity, Quaternion::IDENTITY);

        // All-zero readings are nonsense but must not produce NaNs
        let degenerate = Quaternion::from_raw([16384, 16384, 16384, 16384]);
        assert_eq!(degenerate, Quaternion::IDENTITY);

        let q = Quaternion::from_axis_angle(&Vector3d::new(0.0, 1.0, 1.0), 1.0);
        let round_trip = Quaternion::from_raw(q.to_raw());
        assert!((round_trip.w - q.w).abs() < 1e-3);
        assert!((round_trip.y - q.y).abs() < 1e-3);
    }

    #[test]
    fn test_find_edge_pos() {
        let p1 = Vector3d::new(0.0, 0.0, 0.0);
        let p2 = Vector3d::new(10.0, -10.0, 10.0);
        assert_vec_close(&find_edge_pos(&p1, &p2, 5.0), &Vector3d::new(5.0, -5.0, 5.0));
    }

    #[test]
    fn test_point_in_surface() {
        let square = [
            Vector3d::new(0.0, 0.0, 0.0),
            Vector3d::new(0.0, 0.0, 1.0),
            Vector3d::new(1.0, 0.0, 1.0),
            Vector3d::new(1.0, 0.0, 0.0),
        ];
        assert!(point_in_surface(&square, &Vector3d::new(0.5, 0.0, 0.5)));
        assert!(point_in_surface(&square, &Vector3d::new(0.9, 0.0, 0.1)));
        assert!(!point_in_surface(&square, &Vector3d::new(1.5, 0.0, 0.5)));
        assert!(!point_in_surface(&square, &Vector3d::new(0.5, 0.0, -0.1)));

        let normal = find_surface_normal(&square);
        assert_vec_close(&normal.scale(normal.y.signum()), &Vector3d::new(0.0, 1.0, 0.0));
    }
}
