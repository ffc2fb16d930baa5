//! Numeric helpers for shape classification: polygon moments, Hu
//! invariants, shape matching, and color-space math.

/// Spatial and central moments of a closed polygon, computed with Green's
/// theorem over the boundary (the same formulation OpenCV uses for
/// contours, so tuned thresholds carry over).
#[derive(Clone, Copy, Debug, Default)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
    pub mu30: f64,
    pub mu21: f64,
    pub mu12: f64,
    pub mu03: f64,
}

use crate::shared::geometry::Point;

pub fn polygon_moments(points: &[Point]) -> PolygonMoments {
    if points.len() < 3 {
        return PolygonMoments::default();
    }

    let (mut a00, mut a10, mut a01) = (0.0f64, 0.0f64, 0.0f64);
    let (mut a20, mut a11, mut a02) = (0.0f64, 0.0f64, 0.0f64);
    let (mut a30, mut a21, mut a12, mut a03) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);

    let n = points.len();
    let mut xi_1 = points[n - 1].x as f64;
    let mut yi_1 = points[n - 1].y as f64;

    for p in points {
        let xi = p.x as f64;
        let yi = p.y as f64;

        let xi2 = xi * xi;
        let yi2 = yi * yi;
        let xi_12 = xi_1 * xi_1;
        let yi_12 = yi_1 * yi_1;
        let dxy = xi_1 * yi - xi * yi_1;
        let xii_1 = xi_1 + xi;
        let yii_1 = yi_1 + yi;

        a00 += dxy;
        a10 += dxy * xii_1;
        a01 += dxy * yii_1;
        a20 += dxy * (xi_1 * xii_1 + xi2);
        a11 += dxy * (xi_1 * (yii_1 + yi_1) + xi * (yii_1 + yi));
        a02 += dxy * (yi_1 * yii_1 + yi2);
        a30 += dxy * xii_1 * (xi_12 + xi2);
        a03 += dxy * yii_1 * (yi_12 + yi2);
        a21 += dxy * (xi_12 * (3.0 * yi_1 + yi) + 2.0 * xi * xi_1 * yii_1 + xi2 * (yi_1 + 3.0 * yi));
        a12 += dxy * (yi_12 * (3.0 * xi_1 + xi) + 2.0 * yi * yi_1 * xii_1 + yi2 * (xi_1 + 3.0 * xi));

        xi_1 = xi;
        yi_1 = yi;
    }

    if a00.abs() < f64::EPSILON {
        return PolygonMoments::default();
    }

    // Normalize orientation so moments are independent of winding.
    let sign = if a00 > 0.0 { 1.0 } else { -1.0 };
    let m00 = a00 * sign / 2.0;
    let m10 = a10 * sign / 6.0;
    let m01 = a01 * sign / 6.0;
    let m20 = a20 * sign / 12.0;
    let m11 = a11 * sign / 24.0;
    let m02 = a02 * sign / 12.0;
    let m30 = a30 * sign / 20.0;
    let m21 = a21 * sign / 60.0;
    let m12 = a12 * sign / 60.0;
    let m03 = a03 * sign / 20.0;

    let cx = m10 / m00;
    let cy = m01 / m00;

    PolygonMoments {
        m00,
        m10,
        m01,
        mu20: m20 - cx * m10,
        mu11: m11 - cx * m01,
        mu02: m02 - cy * m01,
        mu30: m30 - 3.0 * cx * m20 + 2.0 * cx * cx * m10,
        mu21: m21 - 2.0 * cx * m11 - cy * m20 + 2.0 * cx * cx * m01,
        mu12: m12 - 2.0 * cy * m11 - cx * m02 + 2.0 * cy * cy * m10,
        mu03: m03 - 3.0 * cy * m02 + 2.0 * cy * cy * m01,
    }
}

/// The seven Hu moment invariants of a polygon.
pub fn hu_moments(m: &PolygonMoments) -> [f64; 7] {
    if m.m00.abs() < f64::EPSILON {
        return [0.0; 7];
    }

    let inv2 = 1.0 / (m.m00 * m.m00);
    let inv3 = inv2 / m.m00.sqrt();

    let n20 = m.mu20 * inv2;
    let n11 = m.mu11 * inv2;
    let n02 = m.mu02 * inv2;
    let n30 = m.mu30 * inv3;
    let n21 = m.mu21 * inv3;
    let n12 = m.mu12 * inv3;
    let n03 = m.mu03 * inv3;

    let t0 = n30 + n12;
    let t1 = n21 + n03;
    let q0 = t0 * t0;
    let q1 = t1 * t1;
    let s0 = n30 - 3.0 * n12;
    let s1 = 3.0 * n21 - n03;

    [
        n20 + n02,
        (n20 - n02) * (n20 - n02) + 4.0 * n11 * n11,
        s0 * s0 + s1 * s1,
        q0 + q1,
        s0 * t0 * (q0 - 3.0 * q1) + s1 * t1 * (3.0 * q0 - q1),
        (n20 - n02) * (q0 - q1) + 4.0 * n11 * t0 * t1,
        s1 * t0 * (q0 - 3.0 * q1) - s0 * t1 * (3.0 * q0 - q1),
    ]
}

const HU_EPS: f64 = 1e-5;

/// Hu-moment shape distance (the `CONTOURS_MATCH_I1` metric): sum of
/// reciprocal differences of signed log-magnitudes, skipping invariants
/// too small to be meaningful. Zero for identical shapes.
pub fn match_shapes(a: &[Point], b: &[Point]) -> f64 {
    let hu_a = hu_moments(&polygon_moments(a));
    let hu_b = hu_moments(&polygon_moments(b));

    let mut result = 0.0;
    for i in 0..7 {
        let (ha, hb) = (hu_a[i], hu_b[i]);
        if ha.abs() > HU_EPS && hb.abs() > HU_EPS {
            let ma = ha.signum() * ha.abs().log10();
            let mb = hb.signum() * hb.abs().log10();
            result += (1.0 / ma - 1.0 / mb).abs();
        }
    }
    result
}

/// Ratio of contour area to convex hull area; 1.0 for convex shapes.
pub fn solidity(points: &[Point]) -> f64 {
    use crate::shared::geometry::{convex_hull, polygon_area};
    let hull = convex_hull(points);
    let hull_area = polygon_area(&hull);
    if hull_area == 0.0 {
        return 0.0;
    }
    polygon_area(points) / hull_area
}

/// Integer BGR to HSV: hue in [0, 360), saturation and value in [0, 100].
///
/// Rounding mirrors the reference classifier the hue bands were tuned
/// against, so keep the truncating casts.
pub fn bgr_to_hsv(b: u8, g: u8, r: u8) -> (i32, i32, i32) {
    let blue = b as f64 / 255.0;
    let green = g as f64 / 255.0;
    let red = r as f64 / 255.0;

    let c_max = blue.max(green).max(red);
    let c_min = blue.min(green).min(red);
    let c_diff = c_max - c_min;

    let hue = if c_diff == 0.0 {
        0
    } else if c_max == red {
        ((60.0 * ((green - blue) / c_diff) + 360.0) as i32) % 360
    } else if c_max == green {
        ((60.0 * ((blue - red) / c_diff) + 120.0) as i32) % 360
    } else {
        ((60.0 * ((red - green) / c_diff) + 240.0) as i32) % 360
    };

    let saturation = if c_max == 0.0 {
        0
    } else {
        (c_diff / c_max * 100.0).round() as i32
    };
    let value = (c_max * 100.0).round() as i32;

    (hue, saturation, value)
}

/// Perceptual distance between two mean BGR samples ("redmean" formula).
///
/// The red-weighted terms assume the inputs are ordered B, G, R. The
/// 25/125 shading contrast thresholds in the classifier were validated
/// against this ordering; the formula is near-symmetric in red and blue,
/// so card ink contrasts land in the same band either way.
pub fn color_difference(bgr1: [f64; 3], bgr2: [f64; 3]) -> f64 {
    let [b1, g1, r1] = bgr1;
    let [b2, g2, r2] = bgr2;

    let red_avg = (r1 + r2) / 2.0;
    let red_delta = r1 - r2;
    let green_delta = g1 - g2;
    let blue_delta = b1 - b2;

    let red_diff = (red_avg / 256.0 + 2.0) * red_delta * red_delta;
    let green_diff = 4.0 * green_delta * green_delta;
    let blue_diff = ((255.0 - red_avg) / 256.0 + 2.0) * blue_delta * blue_delta;

    (red_diff + green_diff + blue_diff).sqrt()
}
