//! Adaptive mean thresholding of a BGR(A) frame.
//!
//! Card candidates are found on a binary image where a pixel is foreground
//! when it is brighter than the mean of its neighborhood minus a small
//! offset. The neighborhood size and offset were tuned empirically for
//! card tables under varied lighting; changing them shifts which borders
//! survive into contour tracing.

use image::GrayImage;

use crate::shared::frame::Frame;

/// Side length of the square neighborhood used for the local mean.
pub const BLOCK_SIZE: u32 = 93;

/// Offset subtracted from the local mean before comparison.
pub const MEAN_OFFSET: i32 = 11;

/// Converts the frame to luma and applies adaptive mean thresholding.
///
/// Output pixels are 255 (foreground) or 0. Neighborhoods are clamped at
/// the frame edges.
pub fn binarize(frame: &Frame) -> GrayImage {
    let width = frame.width() as usize;
    let height = frame.height() as usize;

    let luma = to_luma(frame);
    let integral = integral_image(&luma, width, height);

    let half = (BLOCK_SIZE / 2) as i64;
    let mut out = vec![0u8; width * height];

    for y in 0..height {
        let y0 = (y as i64 - half).max(0) as usize;
        let y1 = ((y as i64 + half) as usize).min(height - 1);
        for x in 0..width {
            let x0 = (x as i64 - half).max(0) as usize;
            let x1 = ((x as i64 + half) as usize).min(width - 1);

            let count = ((y1 - y0 + 1) * (x1 - x0 + 1)) as u64;
            let sum = window_sum(&integral, width, x0, y0, x1, y1);
            let mean = (sum / count) as i32;

            if luma[y * width + x] as i32 > mean - MEAN_OFFSET {
                out[y * width + x] = 255;
            }
        }
    }

    GrayImage::from_raw(width as u32, height as u32, out)
        .expect("buffer length matches frame dimensions")
}

/// BT.601 luma from the blue/green/red channels.
fn to_luma(frame: &Frame) -> Vec<u8> {
    let width = frame.width();
    let height = frame.height();
    let mut luma = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let [b, g, r] = frame.bgr_at(x, y);
            let value = 0.114 * b as f32 + 0.587 * g as f32 + 0.299 * r as f32;
            luma.push(value.round().min(255.0) as u8);
        }
    }
    luma
}

/// Summed-area table with a zero row/column of padding.
fn integral_image(luma: &[u8], width: usize, height: usize) -> Vec<u64> {
    let stride = width + 1;
    let mut table = vec![0u64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += luma[y * width + x] as u64;
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }
    table
}

fn window_sum(integral: &[u64], width: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
    let stride = width + 1;
    integral[(y1 + 1) * stride + x1 + 1] + integral[y0 * stride + x0]
        - integral[y0 * stride + x1 + 1]
        - integral[(y1 + 1) * stride + x0]
}
