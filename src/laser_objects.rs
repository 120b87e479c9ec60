//! Utilities for working with polylines in scanner DAC space: bounds,
//! subdivision into evenly spaced draw points, decoding of the packed
//! equation tables, and colour helpers.

use crate::common_structs::Rgb;

/// Bit of a packed equation x word which marks the segment as lit
const EQUATION_LIT_BIT: u16 = 0x8000;

/// Mask for the 15-bit x magnitude of a packed equation x word
const EQUATION_X_MASK: u16 = 0x7fff;

/// One polyline vertex.  `on` says whether the segment leading *to* this
/// vertex is drawn lit or blanked.  Coordinates are signed so that shapes
/// can be centred on the origin and translated later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XyPoint {
    pub x: i32,
    pub y: i32,
    pub on: bool,
}

impl XyPoint {
    pub const fn new(x: i32, y: i32, on: bool) -> Self {
        Self { x, y, on }
    }
}

/// Axis aligned bounding box of a polyline, all bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

/// Bounding box of `obj`, or None for an empty polyline
pub fn get_laser_obj_bounds(obj: &[XyPoint]) -> Option<ObjBounds> {
    let first = obj.first()?;
    let mut bounds = ObjBounds {
        min_x: first.x,
        max_x: first.x,
        min_y: first.y,
        max_y: first.y,
    };
    for p in obj.iter().skip(1) {
        bounds.min_x = bounds.min_x.min(p.x);
        bounds.max_x = bounds.max_x.max(p.x);
        bounds.min_y = bounds.min_y.min(p.y);
        bounds.max_y = bounds.max_y.max(p.y);
    }
    Some(bounds)
}

/// Width and height of `obj`.  An empty polyline has zero size.
pub fn get_laser_obj_size(obj: &[XyPoint]) -> (i32, i32) {
    match get_laser_obj_bounds(obj) {
        Some(b) => (b.max_x - b.min_x, b.max_y - b.min_y),
        None => (0, 0),
    }
}

/// Centre of the bounding box of `obj`, rounded towards zero.  An empty
/// polyline is centred on the origin.
pub fn get_laser_obj_midpoint(obj: &[XyPoint]) -> (i32, i32) {
    match get_laser_obj_bounds(obj) {
        Some(b) => ((b.min_x + b.max_x) / 2, (b.min_y + b.max_y) / 2),
        None => (0, 0),
    }
}

/// Number of extra points needed to split a segment so that no step is
/// longer than `seg_dist` on either axis
fn segment_splits(a: &XyPoint, b: &XyPoint, seg_dist: i32) -> usize {
    let x_seg = (a.x - b.x).abs() / seg_dist;
    let y_seg = (a.y - b.y).abs() / seg_dist;
    x_seg.max(y_seg) as usize
}

/// The exact length of the output `interpolate_objects` will produce for the
/// same arguments, so buffers can be sized up front.
pub fn get_interpolated_size(obj: &[XyPoint], seg_dist: i32) -> usize {
    let seg_dist = seg_dist.max(1);
    obj.len()
        + obj
            .windows(2)
            .map(|pair| segment_splits(&pair[0], &pair[1], seg_dist))
            .sum::<usize>()
}

/// Subdivide `obj` so that consecutive output points are never more than
/// `seg_dist` apart on either axis.  The first vertex is emitted as-is; every
/// later vertex is reached through evenly spaced intermediate points which
/// carry that vertex's `on` flag.  Output is appended to `result`, which
/// will not reallocate if it already has `get_interpolated_size` spare
/// capacity.
pub fn interpolate_objects(obj: &[XyPoint], seg_dist: i32, result: &mut Vec<XyPoint>) {
    let seg_dist = seg_dist.max(1);
    let first = match obj.first() {
        Some(first) => first,
        None => return,
    };
    result.push(*first);
    for pair in obj.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let num_segs = 1 + segment_splits(from, to, seg_dist) as i32;
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        // Integer division keeps every step within seg_dist and lands the
        // last point exactly on the vertex
        for j in 1..=num_segs {
            result.push(XyPoint::new(
                from.x + dx * j / num_segs,
                from.y + dy * j / num_segs,
                to.on,
            ));
        }
    }
}

/// Unpack a raw equation table into a closed, centred polyline.
///
/// The table is a flat list of `(x, y)` word pairs.  `x` holds the "lit"
/// flag in bit 15 and a 15-bit magnitude, `y` a 16-bit magnitude.  The first
/// point is repeated at the end to close the shape, then every point is
/// shifted so the shape's own midpoint sits on the origin.  Any odd trailing
/// word is ignored.  Output is appended to `result`.
pub fn convert_to_xy(obj: &[u16], x_scale: f64, y_scale: f64, result: &mut Vec<XyPoint>) {
    let start = result.len();
    for pair in obj.chunks_exact(2) {
        result.push(XyPoint::new(
            ((pair[0] & EQUATION_X_MASK) as f64 * x_scale) as i32,
            (pair[1] as f64 * y_scale) as i32,
            pair[0] & EQUATION_LIT_BIT != 0,
        ));
    }
    if result.len() == start {
        return;
    }
    result.push(result[start]);

    let shape = &mut result[start..];
    let (mid_x, mid_y) = get_laser_obj_midpoint(shape);
    for p in shape.iter_mut() {
        p.x -= mid_x;
        p.y -= mid_y;
    }
}

/// Convenience wrapper around `convert_to_xy` for setup code
pub fn convert_equation_to_points(obj: &[u16], x_scale: f64, y_scale: f64) -> Vec<XyPoint> {
    let mut result = Vec::with_capacity(obj.len() / 2 + 1);
    convert_to_xy(obj, x_scale, y_scale, &mut result);
    result
}

/// Convert a colour from HSV to RGB.  All of `h`, `s` and `v` are in the
/// range 0-1.  Channels are truncated, not rounded.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let channel = |c: f64| (c * 255.0) as u8;
    if s < 0.01 {
        return Rgb::new(channel(v), channel(v), channel(v));
    }

    let i = (h * 6.0) as i32;
    let f = h * 6.0 - i as f64;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb::new(channel(r), channel(g), channel(b))
}

/// Fully saturated colour for a hue given in whole degrees.  Any angle is
/// accepted and wrapped into 0-359.
pub fn colour_from_angle(angle: i32) -> Rgb {
    hsv_to_rgb(angle.rem_euclid(360) as f64 / 360.0, 1.0, 1.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use color_space::{Hsv, Rgb as CsRgb};

    fn square() -> Vec<XyPoint> {
        vec![
            XyPoint::new(0, 0, true),
            XyPoint::new(1000, 0, true),
            XyPoint::new(1000, 1000, false),
            XyPoint::new(0, 1000, true),
        ]
    }

    #[test]
    fn test_bounds_size_midpoint() {
        let obj = vec![
            XyPoint::new(-10, 5, true),
            XyPoint::new(30, -7, true),
            XyPoint::new(4, 9, false),
        ];
        let bounds = get_laser_obj_bounds(&obj).unwrap();
        assert_eq!(
            bounds,
            ObjBounds {
                min_x: -10,
                max_x: 30,
                min_y: -7,
                max_y: 9
            }
        );
        assert_eq!(get_laser_obj_size(&obj), (40, 16));
        assert_eq!(get_laser_obj_midpoint(&obj), (10, 1));
        assert_eq!(get_laser_obj_bounds(&[]), None);
        assert_eq!(get_laser_obj_size(&[]), (0, 0));
    }

    #[test]
    fn test_interpolated_size_matches_output() {
        let mut shapes = vec![square()];
        shapes.push(vec![XyPoint::new(17, 3, true)]);
        shapes.push(vec![]);
        shapes.push(vec![
            XyPoint::new(2000, 2000, true),
            XyPoint::new(1500, 2900, true),
            XyPoint::new(1501, 2899, true),
            XyPoint::new(3000, 100, false),
        ]);

        for shape in shapes.iter() {
            for seg_dist in [1, 7, 8, 50, 4096] {
                let mut out = vec![];
                interpolate_objects(shape, seg_dist, &mut out);
                assert_eq!(out.len(), get_interpolated_size(shape, seg_dist));
            }
        }
    }

    #[test]
    fn test_interpolation_gaps() {
        let shape = vec![
            XyPoint::new(2000, 2000, true),
            XyPoint::new(1500, 2913, true),
            XyPoint::new(3001, 100, false),
            XyPoint::new(2000, 2000, true),
        ];
        let seg_dist = 16;
        let mut out = Vec::with_capacity(get_interpolated_size(&shape, seg_dist));
        let capacity = out.capacity();
        interpolate_objects(&shape, seg_dist, &mut out);
        assert_eq!(out.capacity(), capacity);

        for pair in out.windows(2) {
            assert!((pair[0].x - pair[1].x).abs() <= seg_dist);
            assert!((pair[0].y - pair[1].y).abs() <= seg_dist);
        }
        // Input vertices are all hit exactly
        for vertex in shape.iter() {
            assert!(out.iter().any(|p| p.x == vertex.x && p.y == vertex.y));
        }
        // The blanked vertex's flag lands on its leading segment
        assert!(out.iter().any(|p| !p.on));
        assert_eq!(out.last().unwrap(), &shape[3]);
    }

    #[test]
    fn test_convert_square_table() {
        let lit = EQUATION_LIT_BIT;
        let table = [lit, 0, lit | 100, 0, lit | 100, 100, 0, 100];
        let points = convert_equation_to_points(&table, 2.0, 2.0);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], points[4]);
        assert_eq!(get_laser_obj_midpoint(&points), (0, 0));
        assert_eq!(points[0], XyPoint::new(-100, -100, true));
        assert_eq!(points[2], XyPoint::new(100, 100, true));
        assert!(!points[3].on);
    }

    #[test]
    fn test_convert_ignores_trailing_word() {
        let points = convert_equation_to_points(&[0x8001, 2, 7], 1.0, 1.0);
        assert_eq!(points.len(), 2);
        assert!(convert_equation_to_points(&[], 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_hsv_achromatic() {
        for h in [0.0, 0.2, 0.5, 0.99] {
            for v in [0.0, 0.5, 1.0] {
                let c = hsv_to_rgb(h, 0.0, v);
                let expected = (255.0 * v) as u8;
                assert_eq!(c, Rgb::new(expected, expected, expected));
            }
        }
    }

    #[test]
    fn test_hsv_matches_colour_library() {
        for step in 0..36 {
            let h = step as f64 / 36.0;
            for s in [0.3, 1.0] {
                let ours = hsv_to_rgb(h, s, 1.0);
                let theirs = CsRgb::from(Hsv::new(h * 360.0, s, 1.0));
                assert!((ours.r as f64 - theirs.r).abs() <= 1.5, "h {} s {}", h, s);
                assert!((ours.g as f64 - theirs.g).abs() <= 1.5, "h {} s {}", h, s);
                assert!((ours.b as f64 - theirs.b).abs() <= 1.5, "h {} s {}", h, s);
            }
        }
    }

    #[test]
    fn test_colour_from_angle() {
        assert_eq!(colour_from_angle(0), Rgb::RED);
        assert_eq!(colour_from_angle(360), Rgb::RED);
        assert_eq!(colour_from_angle(-240), Rgb::GREEN);
        assert_eq!(colour_from_angle(240), Rgb::BLUE);
    }
}
