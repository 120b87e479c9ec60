//! Geometric model of the sculpture: a regular tetrahedron with three
//! laser-visible trapezoidal faces cut out of its upper walls, one scanner
//! per face, and a handheld wand that points at them.
//!
//! Tetrahedron space has its origin in the middle of the base triangle with
//! z pointing up.  Each face has a pair of affine transforms between the
//! scanner's DAC plane and tetrahedron space, fitted once by least squares
//! when the model is built.

use crate::common_structs::{Rgb, LASER_CENTER, LASER_MAX};
use crate::geometry::{
    cross, dot, find_edge_pos, find_surface_normal, point_in_surface, Quaternion, Vector3d,
};
use crate::laser_objects::{colour_from_angle, XyPoint};
use crate::linalg;
use log::{debug, info};

/// Length of each edge of the sculpture
pub const SIDE_LENGTH: f64 = 39.0;

/// Height above the floor at which the wand is assumed to be held
pub const WAND_HEIGHT: f64 = 5.0;

/// Half of the angle the scanners can deflect the beam through
pub const LASER_PROJECTION_RANGE_DEG: f64 = 55.0;

/// Number of laser-visible faces, and therefore scanners
pub const FACE_COUNT: usize = 3;

/// Rays which graze a face plane more shallowly than this are ignored
const MIN_RAY_FACE_DOT: f64 = 0.01;

/// Direction the wand points in its own frame
const WAND_VECTOR: Vector3d = Vector3d::new(0.0, -1.0, 0.0);

/// Direction of the top of the wand in its own frame, used for roll
const WAND_UP_VECTOR: Vector3d = Vector3d::new(0.0, 0.0, 1.0);

const WORLD_UP: Vector3d = Vector3d::new(0.0, 0.0, 1.0);

/// The usable rectangle of a face in DAC coordinates, all bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaserBounds {
    pub min_x: u16,
    pub max_x: u16,
    pub min_y: u16,
    pub max_y: u16,
}

impl LaserBounds {
    pub fn width(&self) -> i32 {
        self.max_x as i32 - self.min_x as i32
    }

    pub fn height(&self) -> i32 {
        self.max_y as i32 - self.min_y as i32
    }

    pub fn midpoint(&self) -> (i32, i32) {
        (
            (self.min_x as i32 + self.max_x as i32) / 2,
            (self.min_y as i32 + self.max_y as i32) / 2,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x as i32
            && x <= self.max_x as i32
            && y >= self.min_y as i32
            && y <= self.max_y as i32
    }
}

/// One laser-visible face of the sculpture
#[derive(Debug, Clone)]
pub struct Face {
    /// Bottom then top corner on the first edge, top then bottom corner on
    /// the second edge
    pub corners: [Vector3d; 4],

    /// Unit normal, pointing out of the sculpture
    pub normal: Vector3d,

    /// Position of the scanner which draws on this face
    pub laser: Vector3d,

    /// Maps `[x, y, 0, 1]` in DAC space to tetrahedron space
    to_sierpinski: [[f64; 4]; 4],

    /// Maps `[x, y, z, 1]` in tetrahedron space to DAC space
    to_laser: [[f64; 4]; 4],
}

impl Face {
    /// Build a face from its corners and the position of its scanner, fitting
    /// the DAC transforms from three correspondences: the left edge and top
    /// edge of the scanner's range and the scanner's centre.
    fn new(corners: [Vector3d; 4], laser: Vector3d) -> Self {
        let normal = find_surface_normal(&corners);

        // Foot of the perpendicular from the scanner onto the face plane
        let distance = dot(&(laser - corners[0]), &normal);
        let laser_center = laser - normal.scale(distance);
        let half_width =
            (laser_center - laser).magnitude() * LASER_PROJECTION_RANGE_DEG.to_radians().tan();

        let v1 = Vector3d::new(-normal.y, normal.x, 0.0).normalise();
        let v2 = cross(&normal, &v1);

        let center = LASER_CENTER as f64;
        let max = LASER_MAX as f64;
        let dac_points = [
            [0.0, center, 0.0, 1.0],
            [center, max, 0.0, 1.0],
            [center, center, 0.0, 1.0],
        ];
        let homogeneous = |v: Vector3d| [v.x, v.y, v.z, 1.0];
        let face_points = [
            homogeneous(laser_center + v1.scale(half_width)),
            homogeneous(laser_center + v2.scale(half_width)),
            homogeneous(laser_center),
        ];

        Self {
            corners,
            normal,
            laser,
            to_sierpinski: linalg::transpose(&linalg::lstsq(&dac_points, &face_points)),
            to_laser: linalg::transpose(&linalg::lstsq(&face_points, &dac_points)),
        }
    }

    /// Unrounded DAC coordinates of a point on this face
    pub fn to_laser_plane(&self, p: &Vector3d) -> (f64, f64) {
        let result = linalg::dot_mv(&self.to_laser, &[p.x, p.y, p.z, 1.0]);
        (result[0], result[1])
    }

    pub fn to_sierpinski(&self, x: f64, y: f64) -> Vector3d {
        let result = linalg::dot_mv(&self.to_sierpinski, &[x, y, 0.0, 1.0]);
        Vector3d::new(result[0], result[1], result[2])
    }
}

pub struct Sierpinski {
    faces: [Face; FACE_COUNT],
    wand_height: f64,

    /// The point a calibrated wand at rest is taken to be aiming at
    center_point: Vector3d,

    /// Unit vector from the wand towards `center_point`
    target_vector: Vector3d,

    pitch_diff: f64,
    yaw_diff: f64,
}

impl Default for Sierpinski {
    fn default() -> Self {
        Self::new()
    }
}

impl Sierpinski {
    /// Build the model of the real sculpture
    pub fn new() -> Self {
        Self::with_dimensions(SIDE_LENGTH, WAND_HEIGHT)
    }

    /// Build a model, fit the face transforms and calibrate against a wand
    /// held at the identity orientation
    pub fn with_dimensions(side_length: f64, wand_height: f64) -> Self {
        let triangle_height = (side_length * side_length - (side_length / 2.0).powi(2)).sqrt();
        let tetra_height = side_length * (2.0f64 / 3.0).sqrt();
        let apex = Vector3d::new(0.0, 0.0, tetra_height);

        let vertices = [
            Vector3d::new(-side_length / 2.0, -triangle_height / 3.0, 0.0),
            Vector3d::new(side_length / 2.0, -triangle_height / 3.0, 0.0),
            Vector3d::new(0.0, triangle_height * 2.0 / 3.0, 0.0),
            apex,
        ];

        // The visible faces are bands across the three upper walls, between
        // a quarter and half of the height of the sculpture.  Edges are
        // named after the base vertex each one rises from.
        let projection_bottom = tetra_height / 4.0;
        let projection_top = tetra_height / 2.0;
        let edge = |base: usize, z: f64| find_edge_pos(&vertices[base], &apex, z);
        let band = |a: usize, b: usize| {
            [
                edge(a, projection_bottom),
                edge(a, projection_top),
                edge(b, projection_top),
                edge(b, projection_bottom),
            ]
        };

        // Each scanner sits on the edge opposite its face
        let faces = [
            Face::new(band(0, 2), edge(1, projection_bottom)),
            Face::new(band(1, 2), edge(0, projection_bottom)),
            Face::new(band(1, 0), edge(2, projection_bottom)),
        ];

        let center_point = find_edge_pos(
            &((vertices[0] + vertices[2]) / 2.0),
            &apex,
            (projection_top + projection_bottom) / 2.0,
        );
        let target_vector = (center_point - Vector3d::new(0.0, 0.0, wand_height)).normalise();

        let mut sierpinski = Self {
            faces,
            wand_height,
            center_point,
            target_vector,
            pitch_diff: 0.0,
            yaw_diff: 0.0,
        };
        info!(
            "Sierpinski model built, side {} wand height {}",
            side_length, wand_height
        );
        sierpinski.calibrate_wand_position(&Quaternion::IDENTITY);
        sierpinski
    }

    /// Face `face`, which must be less than `FACE_COUNT`.  Every method
    /// taking a face index panics if it's out of range.
    pub fn face(&self, face: usize) -> &Face {
        debug_assert!(face < FACE_COUNT, "face {} out of range", face);
        &self.faces[face]
    }

    pub fn center_point(&self) -> Vector3d {
        self.center_point
    }

    pub fn wand_origin(&self) -> Vector3d {
        Vector3d::new(0.0, 0.0, self.wand_height)
    }

    /// Treat `q` as the wand aiming at the centre point of face 0 from now on
    pub fn calibrate_wand_position(&mut self, q: &Quaternion) {
        let wand = q.rotate(&WAND_VECTOR);
        self.pitch_diff = self.target_vector.z.asin() - wand.z.clamp(-1.0, 1.0).asin();
        self.yaw_diff = self.target_vector.y.atan2(self.target_vector.x) - wand.y.atan2(wand.x);
        info!(
            "Wand calibrated, pitch offset {:.3} yaw offset {:.3}",
            self.pitch_diff, self.yaw_diff
        );
    }

    /// Direction the wand is pointing in tetrahedron space once the
    /// calibration offsets are applied
    pub fn apply_quaternion(&self, q: &Quaternion) -> Vector3d {
        let wand = q.rotate(&WAND_VECTOR);
        let pitch = wand.z.clamp(-1.0, 1.0).asin() + self.pitch_diff;
        let yaw = wand.y.atan2(wand.x) + self.yaw_diff;
        Vector3d::new(pitch.cos() * yaw.cos(), pitch.cos() * yaw.sin(), pitch.sin())
    }

    /// Which face, if any, the wand is pointing at, and where on it
    pub fn get_wand_projection(&self, q: &Quaternion) -> Option<(usize, Vector3d)> {
        let direction = self.apply_quaternion(q);
        if direction.z < 0.0 {
            return None;
        }
        let end = direction + self.wand_origin();

        for (i, face) in self.faces.iter().enumerate() {
            let denominator = dot(&direction, &face.normal);
            if denominator < MIN_RAY_FACE_DOT {
                continue;
            }
            let distance = dot(&(face.corners[0] - end), &face.normal) / denominator;
            let intersection = end + direction.scale(distance);
            if point_in_surface(&face.corners, &intersection) {
                return Some((i, intersection));
            }
        }
        None
    }

    pub fn laser_to_sierpinski_coords(&self, face: usize, x: f64, y: f64) -> Vector3d {
        self.face(face).to_sierpinski(x, y)
    }

    /// DAC coordinates of a point on `face`, truncated towards zero
    pub fn sierpinski_to_laser_coords(&self, face: usize, p: &Vector3d) -> XyPoint {
        let (x, y) = self.face(face).to_laser_plane(p);
        XyPoint::new(x as i32, y as i32, true)
    }

    /// The corners of `face` in DAC coordinates, in the same order as
    /// `Face::corners`
    pub fn laser_coordinate_bounds(&self, face: usize) -> [XyPoint; 4] {
        let corners = &self.face(face).corners;
        std::array::from_fn(|i| self.sierpinski_to_laser_coords(face, &corners[i]))
    }

    /// The largest axis-aligned rectangle of DAC space which lands inside
    /// `face`.  The top edge of each face is its narrowest, so the top
    /// corners bound x and the full corner set bounds y.  Bounds are rounded
    /// inwards.  `face` must be less than `FACE_COUNT`.
    pub fn laser_bounds(&self, face: usize) -> LaserBounds {
        let f = self.face(face);
        let corners: [(f64, f64); 4] = std::array::from_fn(|i| f.to_laser_plane(&f.corners[i]));
        let clamp = |v: f64| v.clamp(0.0, LASER_MAX as f64) as u16;
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);
        let bounds = LaserBounds {
            min_x: clamp(corners[1].0.min(corners[2].0).ceil()),
            max_x: clamp(corners[1].0.max(corners[2].0).floor()),
            min_y: clamp(min_y.ceil()),
            max_y: clamp(max_y.floor()),
        };
        debug!("Face {} laser bounds {:?}", face, bounds);
        bounds
    }

    /// Roll of the wand about its own pointing axis in whole degrees,
    /// `[0, 360)`, measured from world up.  A wand pointing straight up or
    /// down has no defined roll and reports 0.
    pub fn wand_rotation(&self, q: &Quaternion) -> i32 {
        let direction = q.rotate(&WAND_VECTOR);
        let up = q.rotate(&WAND_UP_VECTOR);
        let reference = WORLD_UP - direction.scale(dot(&WORLD_UP, &direction));
        if reference.magnitude() < 1e-6 {
            return 0;
        }
        let angle = dot(&direction, &cross(&reference, &up)).atan2(dot(&reference, &up));
        (angle.to_degrees().round() as i32).rem_euclid(360)
    }

    /// Saturated colour picked by the wand roll, offset by `degree_offset`
    pub fn wand_rotation_colour(&self, q: &Quaternion, degree_offset: i32) -> Rgb {
        colour_from_angle(self.wand_rotation(q) + degree_offset)
    }
}
