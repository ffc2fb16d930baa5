//! Contour geometry primitives used by the detection pipeline.
//!
//! All operations treat a contour as a closed polygon whose vertices are
//! the traced border points in order.

/// Integer pixel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding rectangle of a contour, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Ratio of the longer side to the shorter side; at least 1.0.
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width.max(self.height) as f64;
        let short = self.width.min(self.height) as f64;
        if short == 0.0 {
            return f64::INFINITY;
        }
        long / short
    }
}

/// Absolute area of the closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc: i64 = 0;
    let n = points.len();
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (acc.abs() as f64) / 2.0
}

/// Perimeter of the closed polygon.
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            let dx = (q.x - p.x) as f64;
            let dy = (q.y - p.y) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

pub fn bounding_rect(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(Rect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Contour centroid, rounded toward zero.
///
/// Uses the polygon area centroid; degenerate (zero-area) contours fall
/// back to the vertex mean so small traced specks still get a center.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len();
    let mut cross_sum = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        cross_sum += cross;
        cx += (p.x + q.x) as f64 * cross;
        cy += (p.y + q.y) as f64 * cross;
    }
    if cross_sum.abs() < f64::EPSILON {
        let sx: i64 = points.iter().map(|p| p.x as i64).sum();
        let sy: i64 = points.iter().map(|p| p.y as i64).sum();
        return Some(Point::new(
            (sx / n as i64) as i32,
            (sy / n as i64) as i32,
        ));
    }
    let area6 = 3.0 * cross_sum;
    Some(Point::new((cx / area6) as i32, (cy / area6) as i32))
}

/// Closed-polygon simplification (Ramer-Douglas-Peucker).
///
/// The curve is split at the vertex farthest from the first vertex and
/// each half is simplified independently, so a closed contour cannot
/// collapse onto a single chord.
pub fn approx_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let start = points[0];
    let mut split = 0;
    let mut best = -1.0;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - start.x) as f64;
        let dy = (p.y - start.y) as f64;
        let d = dx * dx + dy * dy;
        if d > best {
            best = d;
            split = i;
        }
    }
    if split == 0 {
        // All points coincide
        return vec![start];
    }

    let mut first_half = Vec::new();
    rdp(&points[..=split], epsilon, &mut first_half);

    let mut second: Vec<Point> = points[split..].to_vec();
    second.push(start);
    let mut second_half = Vec::new();
    rdp(&second, epsilon, &mut second_half);

    // Each half includes both endpoints; drop the duplicated join points.
    let mut out = first_half;
    out.extend_from_slice(&second_half[1..second_half.len() - 1]);
    out
}

/// Recursive Douglas-Peucker over an open polyline; output includes both
/// endpoints.
fn rdp(points: &[Point], epsilon: f64, out: &mut Vec<Point>) {
    debug_assert!(points.len() >= 2);
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut index = 0;
    for (i, p) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let d = segment_distance(*p, first, last);
        if d > max_dist {
            max_dist = d;
            index = i;
        }
    }

    if max_dist > epsilon {
        rdp(&points[..=index], epsilon, out);
        out.pop(); // avoid duplicating the split point
        rdp(&points[index..], epsilon, out);
    } else {
        out.push(first);
        out.push(last);
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let abx = (b.x - a.x) as f64;
    let aby = (b.y - a.y) as f64;
    let apx = (p.x - a.x) as f64;
    let apy = (p.y - a.y) as f64;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return (apx * apx + apy * apy).sqrt();
    }
    (abx * apy - aby * apx).abs() / len_sq.sqrt()
}

/// Convex hull (Andrew monotone chain), counter-clockwise, no repeated
/// endpoint.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    pts.dedup();
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let cross = |o: Point, a: Point, b: Point| -> i64 {
        (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
    };

    let mut hull: Vec<Point> = Vec::with_capacity(2 * n);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev() {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Moves a point relative to a center: negative factors shrink toward the
/// center, positive factors push away from it.
///
/// Matches the detection tuning done against `x' = x - (cx - x) * s` with
/// truncation toward zero.
pub fn scale_point(p: Point, cx: i32, cy: i32, factor: f32) -> Point {
    let x = p.x as f32 - ((cx - p.x) as f32 * factor);
    let y = p.y as f32 - ((cy - p.y) as f32 * factor);
    Point::new(x as i32, y as i32)
}

/// Scales every contour point about the contour centroid.
pub fn scale_polygon(points: &[Point], factor: f32) -> Vec<Point> {
    let Some(c) = centroid(points) else {
        return Vec::new();
    };
    points
        .iter()
        .map(|&p| scale_point(p, c.x, c.y, factor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn square(size: i32) -> Vec<Point> {
        vec![
            Point::new(0, 0),
            Point::new(size, 0),
            Point::new(size, size),
            Point::new(0, size),
        ]
    }

    #[test]
    fn test_polygon_area_square() {
        assert_relative_eq!(polygon_area(&square(10)), 100.0);
    }

    #[test]
    fn test_polygon_area_triangle() {
        let tri = vec![Point::new(0, 0), Point::new(10, 0), Point::new(0, 10)];
        assert_relative_eq!(polygon_area(&tri), 50.0);
    }

    #[test]
    fn test_polygon_area_orientation_independent() {
        let mut sq = square(10);
        sq.reverse();
        assert_relative_eq!(polygon_area(&sq), 100.0);
    }

    #[test]
    fn test_polygon_area_degenerate() {
        assert_relative_eq!(polygon_area(&[Point::new(1, 1), Point::new(2, 2)]), 0.0);
    }

    #[test]
    fn test_perimeter_square() {
        assert_relative_eq!(perimeter(&square(10)), 40.0);
    }

    #[test]
    fn test_bounding_rect() {
        let pts = vec![Point::new(2, 3), Point::new(7, 3), Point::new(5, 9)];
        let r = bounding_rect(&pts).unwrap();
        assert_eq!(r, Rect { x: 2, y: 3, width: 6, height: 7 });
    }

    #[test]
    fn test_bounding_rect_empty() {
        assert!(bounding_rect(&[]).is_none());
    }

    #[rstest]
    #[case(Rect { x: 0, y: 0, width: 30, height: 20 }, 1.5)]
    #[case(Rect { x: 0, y: 0, width: 20, height: 30 }, 1.5)]
    #[case(Rect { x: 5, y: 5, width: 10, height: 10 }, 1.0)]
    fn test_aspect_ratio(#[case] rect: Rect, #[case] expected: f64) {
        assert_relative_eq!(rect.aspect_ratio(), expected);
    }

    #[test]
    fn test_centroid_square() {
        let c = centroid(&square(10)).unwrap();
        assert_eq!(c, Point::new(5, 5));
    }

    #[test]
    fn test_centroid_degenerate_uses_vertex_mean() {
        let line = vec![Point::new(0, 0), Point::new(4, 0)];
        assert_eq!(centroid(&line).unwrap(), Point::new(2, 0));
    }

    #[test]
    fn test_approx_polygon_square_border_to_four_corners() {
        // Dense border of a 20x20 square
        let mut pts = Vec::new();
        for x in 0..20 {
            pts.push(Point::new(x, 0));
        }
        for y in 0..20 {
            pts.push(Point::new(20, y));
        }
        for x in (1..=20).rev() {
            pts.push(Point::new(x, 20));
        }
        for y in (1..=20).rev() {
            pts.push(Point::new(0, y));
        }
        let eps = perimeter(&pts) * 0.04;
        let approx = approx_polygon(&pts, eps);
        assert_eq!(approx.len(), 4);
    }

    #[test]
    fn test_approx_polygon_keeps_diamond_corners() {
        // Dense diamond border
        let mut pts = Vec::new();
        for i in 0..20 {
            pts.push(Point::new(20 + i, i));
        }
        for i in 0..20 {
            pts.push(Point::new(40 - i, 20 + i));
        }
        for i in 0..20 {
            pts.push(Point::new(20 - i, 40 - i));
        }
        for i in 0..20 {
            pts.push(Point::new(i, 20 - i));
        }
        let eps = perimeter(&pts) * 0.08;
        let approx = approx_polygon(&pts, eps);
        assert_eq!(approx.len(), 4);
    }

    #[test]
    fn test_approx_polygon_short_input_passthrough() {
        let pts = vec![Point::new(0, 0), Point::new(5, 5)];
        assert_eq!(approx_polygon(&pts, 1.0), pts);
    }

    #[test]
    fn test_convex_hull_square_with_interior_point() {
        let mut pts = square(10);
        pts.push(Point::new(5, 5));
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point::new(5, 5)));
    }

    #[test]
    fn test_convex_hull_area_of_concave_shape_exceeds_contour_area() {
        // Arrowhead: concave quadrilateral
        let pts = vec![
            Point::new(0, 0),
            Point::new(20, 10),
            Point::new(0, 20),
            Point::new(6, 10),
        ];
        let hull = convex_hull(&pts);
        assert!(polygon_area(&hull) > polygon_area(&pts));
    }

    #[test]
    fn test_scale_point_shrinks_with_negative_factor() {
        // 20% toward center (10, 10)
        let p = scale_point(Point::new(20, 10), 10, 10, -0.2);
        assert_eq!(p, Point::new(18, 10));
    }

    #[test]
    fn test_scale_point_expands_with_positive_factor() {
        let p = scale_point(Point::new(20, 10), 10, 10, 0.3);
        assert_eq!(p, Point::new(23, 10));
    }

    #[test]
    fn test_scale_polygon_preserves_point_count() {
        let sq = square(10);
        assert_eq!(scale_polygon(&sq, -0.4).len(), 4);
    }

    #[test]
    fn test_scale_polygon_shrink_reduces_area() {
        let sq = square(100);
        let shrunk = scale_polygon(&sq, -0.4);
        assert!(polygon_area(&shrunk) < polygon_area(&sq));
    }
}
