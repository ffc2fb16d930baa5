//! Per-symbol classification: outline symbol, ink color, and shading.
//!
//! Works directly on the traced symbol border and the source frame; no
//! per-symbol image crops are made. Thresholds were tuned against real
//! card-table footage and are shared with the area filters in the card
//! detector.

use crate::detection::domain::card::{Color, Shading, Shape, Symbol};
use crate::detection::infrastructure::contour_sampler::mean_bgr;
use crate::detection::infrastructure::math::{
    bgr_to_hsv, color_difference, match_shapes, solidity,
};
use crate::shared::frame::Frame;
use crate::shared::geometry::{approx_polygon, perimeter, scale_polygon, Point};

/// Polygon-approximation accuracy for symbol outlines, as a fraction of
/// the perimeter.
pub const SHAPE_APPROX_ACCURACY: f64 = 0.08;

/// A symbol matching its own 4-point approximation this closely is a
/// diamond.
const DIAMOND_MATCH_THRESHOLD: f64 = 0.065;

/// Below this solidity a non-diamond symbol is a squiggle, otherwise an
/// oval.
const SQUIGGLE_SOLIDITY_THRESHOLD: f64 = 0.9;

/// Hue bands (degrees) for the three ink colors. Red wraps around zero.
const RED_MIN: i32 = 340;
const RED_MAX: i32 = 65;
const PURPLE_MIN: i32 = 260;
const PURPLE_MAX: i32 = 340;
const GREEN_MIN: i32 = 65;
const GREEN_MAX: i32 = 180;

/// Contour scale factors for the sampled regions: the border ring, the
/// interior fill, and the band just outside the symbol.
const BORDER_RING_SCALAR: f32 = -0.2;
const FILL_SCALAR: f32 = -0.4;
const OUTSIDE_BAND_OUTER_SCALAR: f32 = 0.3;
const OUTSIDE_BAND_INNER_SCALAR: f32 = 0.1;

/// Contrast thresholds between the outside band and the symbol fill.
const OPEN_SHADING_CONTRAST: f64 = 25.0;
const STRIPED_SHADING_CONTRAST: f64 = 125.0;

/// Classifies one symbol border into its (color, symbol, shading) triple.
pub fn classify(frame: &Frame, outline: &[Point]) -> Shape {
    Shape::new(
        classify_color(frame, outline),
        classify_symbol(outline),
        classify_shading(frame, outline),
    )
}

/// Diamonds are near-identical to their own quadrilateral approximation;
/// squiggles are the only concave symbol.
pub fn classify_symbol(outline: &[Point]) -> Symbol {
    let epsilon = perimeter(outline) * SHAPE_APPROX_ACCURACY;
    let approx = approx_polygon(outline, epsilon);

    if match_shapes(outline, &approx) < DIAMOND_MATCH_THRESHOLD {
        return Symbol::Diamond;
    }
    if solidity(outline) < SQUIGGLE_SOLIDITY_THRESHOLD {
        Symbol::Squiggle
    } else {
        Symbol::Oval
    }
}

/// Mean hue of the ring along the symbol border.
pub fn classify_color(frame: &Frame, outline: &[Point]) -> Color {
    let inner = scale_polygon(outline, BORDER_RING_SCALAR);
    let Some([b, g, r]) = mean_bgr(frame, outline, Some(&inner)) else {
        return Color::Unknown;
    };

    let (hue, saturation, value) = bgr_to_hsv(b as u8, g as u8, r as u8);
    let color = color_for_hue(hue);
    if color == Color::Unknown {
        log::debug!("unclassified symbol hue {hue} (s={saturation}, v={value})");
    }
    color
}

/// Maps a hue in [0, 360) onto the ink color bands. Bands are half-open
/// on the low side; red wraps around zero.
fn color_for_hue(hue: i32) -> Color {
    if hue > RED_MIN || hue <= RED_MAX {
        Color::Red
    } else if hue > PURPLE_MIN && hue <= PURPLE_MAX {
        Color::Purple
    } else if hue > GREEN_MIN && hue <= GREEN_MAX {
        Color::Green
    } else {
        Color::Unknown
    }
}

/// Contrast between the card background just outside the symbol and the
/// symbol fill: open symbols match the background, solid symbols differ
/// strongly, striped fall between.
pub fn classify_shading(frame: &Frame, outline: &[Point]) -> Shading {
    let band_outer = scale_polygon(outline, OUTSIDE_BAND_OUTER_SCALAR);
    let band_inner = scale_polygon(outline, OUTSIDE_BAND_INNER_SCALAR);
    let fill = scale_polygon(outline, FILL_SCALAR);

    let background = mean_bgr(frame, &band_outer, Some(&band_inner)).unwrap_or([0.0; 3]);
    let fill_color = mean_bgr(frame, &fill, None).unwrap_or([0.0; 3]);

    let contrast = color_difference(background, fill_color);
    if contrast < OPEN_SHADING_CONTRAST {
        Shading::Open
    } else if contrast < STRIPED_SHADING_CONTRAST {
        Shading::Striped
    } else {
        Shading::Solid
    }
}
