//! Mean-color sampling over contour-derived regions.
//!
//! The classifier probes three regions per symbol: a band along the
//! symbol border, the interior fill, and a band just outside the symbol.
//! Regions are expressed as one polygon minus an optional inner polygon
//! and rasterized with an even-odd scanline.

use crate::shared::frame::Frame;
use crate::shared::geometry::{bounding_rect, Point};

/// Mean BGR over the pixels inside `include` but outside `exclude`.
///
/// Pixels falling off the frame are skipped. Returns `None` when the
/// region covers no pixels.
pub fn mean_bgr(frame: &Frame, include: &[Point], exclude: Option<&[Point]>) -> Option<[f64; 3]> {
    let rect = bounding_rect(include)?;
    let width = frame.width() as i32;
    let height = frame.height() as i32;

    let y_start = rect.y.max(0);
    let y_end = (rect.y + rect.height).min(height);

    let mut sums = [0.0f64; 3];
    let mut count = 0u64;

    for y in y_start..y_end {
        for (x_start, x_end) in row_spans(include, y) {
            for x in x_start.max(0)..x_end.min(width) {
                if let Some(inner) = exclude {
                    if contains(inner, x, y) {
                        continue;
                    }
                }
                let [b, g, r] = frame.bgr_at(x as u32, y as u32);
                sums[0] += b as f64;
                sums[1] += g as f64;
                sums[2] += r as f64;
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some([
        sums[0] / count as f64,
        sums[1] / count as f64,
        sums[2] / count as f64,
    ])
}

/// Half-open pixel spans `[start, end)` covered by the polygon on row `y`.
///
/// Intersections are taken at the pixel-center line `y + 0.5` so vertices
/// never produce degenerate crossings.
fn row_spans(polygon: &[Point], y: i32) -> Vec<(i32, i32)> {
    let scan = y as f64 + 0.5;
    let n = polygon.len();
    if n < 3 {
        return Vec::new();
    }

    let mut crossings = Vec::new();
    for i in 0..n {
        let p = polygon[i];
        let q = polygon[(i + 1) % n];
        let (py, qy) = (p.y as f64, q.y as f64);
        if (py <= scan && qy > scan) || (qy <= scan && py > scan) {
            let t = (scan - py) / (qy - py);
            crossings.push(p.x as f64 + t * (q.x - p.x) as f64);
        }
    }
    crossings.sort_by(|a, b| a.partial_cmp(b).expect("crossings are finite"));

    crossings
        .chunks_exact(2)
        .map(|pair| {
            // Pixel x is covered when its center x + 0.5 lies in [a, b)
            let start = (pair[0] - 0.5).ceil() as i32;
            let end = (pair[1] - 0.5).ceil() as i32;
            (start, end)
        })
        .filter(|(start, end)| start < end)
        .collect()
}

/// Even-odd point-in-polygon test against the pixel center.
fn contains(polygon: &[Point], x: i32, y: i32) -> bool {
    row_spans(polygon, y)
        .iter()
        .any(|&(start, end)| (start..end).contains(&x))
}
