//! Wire curve construction and distance queries.

use kurbo::{CubicBez, ParamCurve, Point};

/// Cubic bezier with horizontal tangents at both ends.
///
/// Control points sit `|dx| / 2` along x from each endpoint, giving the
/// S-shaped dataflow wire regardless of vertical offset.
pub fn edge_curve(start: Point, end: Point) -> CubicBez {
    let handle = (end.x - start.x).abs() / 2.0;
    CubicBez::new(
        start,
        Point::new(start.x + handle, start.y),
        Point::new(end.x - handle, end.y),
        end,
    )
}

/// Evaluate `curve` at `segments + 1` evenly spaced parameters.
pub fn sample_curve(curve: &CubicBez, segments: usize) -> Vec<Point> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| curve.eval(i as f64 / segments as f64))
        .collect()
}

/// Euclidean distance from `p` to segment `a..b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Minimum distance from `p` to the polyline approximation of `curve`.
pub fn distance_to_curve(p: Point, curve: &CubicBez, segments: usize) -> f64 {
    sample_curve(curve, segments)
        .windows(2)
        .map(|w| point_segment_distance(p, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_has_horizontal_tangents() {
        let c = edge_curve(Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert_eq!(c.p1, Point::new(50.0, 0.0));
        assert_eq!(c.p2, Point::new(50.0, 50.0));

        // Backwards wire still pushes handles outward from each endpoint.
        let c = edge_curve(Point::new(100.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(c.p1, Point::new(150.0, 0.0));
        assert_eq!(c.p2, Point::new(-50.0, 0.0));
    }

    #[test]
    fn samples_include_endpoints() {
        let c = edge_curve(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let pts = sample_curve(&c, 8);
        assert_eq!(pts.len(), 9);
        assert_eq!(pts[0], Point::new(0.0, 0.0));
        assert_eq!(pts[8], Point::new(10.0, 10.0));
    }

    #[test]
    fn segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(point_segment_distance(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(point_segment_distance(Point::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(point_segment_distance(Point::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn curve_distance_on_straight_wire() {
        let c = edge_curve(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(distance_to_curve(Point::new(50.0, 2.0), &c, 16) < 2.0 + 1e-9);
    }
}
