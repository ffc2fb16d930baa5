//! Contour-based card detection.
//!
//! One frame flows through four stages: adaptive binarization, contour
//! tracing with hierarchy, geometric filtering down to card and symbol
//! candidates, and parallel symbol classification. Cards are bright
//! quadrilaterals whose holes are the printed symbols.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::detection::domain::card::{Card, Shape};
use crate::detection::domain::card_detector::{CardDetector, DetectionOutcome};
use crate::detection::infrastructure::adaptive_threshold::binarize;
use crate::detection::infrastructure::contour_forest::ContourForest;
use crate::detection::infrastructure::shape_classifier::{self, SHAPE_APPROX_ACCURACY};
use crate::processor::worker_pool::{PoolError, WorkerPool};
use crate::shared::frame::Frame;
use crate::shared::geometry::{approx_polygon, bounding_rect, perimeter, polygon_area, Point};

/// Card area bounds as fractions of the frame area. Anything smaller is
/// table clutter, anything larger is the table itself.
const MIN_CARD_AREA_FRACTION: f64 = 0.007;
const MAX_CARD_AREA_FRACTION: f64 = 0.2;

/// Polygon-approximation accuracy for card borders, as a fraction of the
/// perimeter.
const CARD_APPROX_ACCURACY: f64 = 0.04;

const MIN_ASPECT_RATIO: f64 = 1.0;
const MAX_ASPECT_RATIO: f64 = 2.0;

/// A child nearly as large as its parent is the parent's own inner
/// border, not a symbol; the inner border is the one kept as the card.
const MAX_CHILD_AREA_RATIO: f64 = 0.5;

/// Symbol area bounds derived from the minimum card area: the lower
/// bound drops smudges, the upper bound drops card inner borders.
const MIN_SHAPE_AREA_DIVISOR: f64 = 7.0;
const MAX_SHAPE_AREA_FACTOR: f64 = 0.8;

const MAX_SHAPES_PER_CARD: usize = 3;

/// Contour area bounds for one frame resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AreaBounds {
    frame_width: u32,
    frame_height: u32,
    min_card: f64,
    max_card: f64,
    min_shape: f64,
    max_shape: f64,
}

impl AreaBounds {
    fn for_dimensions(width: u32, height: u32) -> Self {
        let frame_area = width as f64 * height as f64;
        let min_card = frame_area * MIN_CARD_AREA_FRACTION;
        Self {
            frame_width: width,
            frame_height: height,
            min_card,
            max_card: frame_area * MAX_CARD_AREA_FRACTION,
            min_shape: min_card / MIN_SHAPE_AREA_DIVISOR,
            max_shape: min_card * MAX_SHAPE_AREA_FACTOR,
        }
    }
}

/// Card index plus one symbol border inside that card, queued for
/// classification.
type SymbolCandidate = (usize, Vec<Point>);

/// Detector over the contour pipeline; owns the worker pool used for
/// symbol classification.
pub struct ContourCardDetector {
    pool: WorkerPool,
    bounds: Option<AreaBounds>,
}

impl ContourCardDetector {
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        Ok(Self {
            pool: WorkerPool::new(workers)?,
            bounds: None,
        })
    }

    /// Area bounds track the frame resolution; recomputed whenever the
    /// source switches dimensions mid-stream.
    fn bounds_for(&mut self, frame: &Frame) -> AreaBounds {
        match self.bounds {
            Some(b) if b.frame_width == frame.width() && b.frame_height == frame.height() => b,
            _ => {
                let b = AreaBounds::for_dimensions(frame.width(), frame.height());
                self.bounds = Some(b);
                b
            }
        }
    }
}

impl CardDetector for ContourCardDetector {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionOutcome, Box<dyn std::error::Error>> {
        let bounds = self.bounds_for(frame);

        let binary = binarize(frame);
        let forest = ContourForest::trace(&binary);
        if forest.is_empty() {
            return Ok(DetectionOutcome::default());
        }

        let mut card_indices = HashSet::new();
        for index in 0..forest.len() {
            if card_filter(&forest, index, &bounds, &card_indices) {
                card_indices.insert(index);
            }
        }
        if card_indices.is_empty() {
            return Ok(DetectionOutcome::default());
        }

        let mut candidates: Vec<SymbolCandidate> = Vec::new();
        for index in 0..forest.len() {
            if let Some(parent) = forest.parent(index) {
                if card_indices.contains(&parent) && shape_filter(&forest, index, &bounds) {
                    candidates.push((parent, forest.outline(index).to_vec()));
                }
            }
        }
        if candidates.is_empty() {
            return Ok(DetectionOutcome::default());
        }
        log::debug!(
            "frame {}: {} card candidates, {} symbol candidates",
            frame.index(),
            card_indices.len(),
            candidates.len()
        );

        let classify_frame = Arc::new(frame.clone());
        let classified = self.pool.map_chunks(candidates, move |chunk: &[SymbolCandidate]| {
            chunk
                .iter()
                .map(|(card_index, outline)| {
                    (*card_index, shape_classifier::classify(&classify_frame, outline))
                })
                .collect::<Vec<(usize, Shape)>>()
        })?;

        // Chunk results arrive in submission order, so grouping stays
        // deterministic across worker counts.
        let mut shapes_by_card: BTreeMap<usize, Vec<Shape>> = BTreeMap::new();
        for (card_index, shape) in classified.into_iter().flatten() {
            shapes_by_card.entry(card_index).or_default().push(shape);
        }

        let mut cards = Vec::new();
        let mut outlines = Vec::new();
        for (card_index, shapes) in shapes_by_card {
            if shapes.len() > MAX_SHAPES_PER_CARD {
                continue;
            }
            // A real card repeats one symbol; mixed readings mean the
            // contour was not a card or the lighting lied.
            if !shapes.windows(2).all(|pair| pair[0] == pair[1]) {
                continue;
            }
            let outline_index = outlines.len();
            outlines.push(forest.outline(card_index).to_vec());
            cards.push(Card::new(shapes[0], shapes.len(), outline_index));
        }

        Ok(DetectionOutcome { cards, outlines })
    }
}

/// A card contour encloses symbols, sits within the tuned area band, and
/// approximates to a quadrilateral with a card-like aspect ratio.
fn card_filter(
    forest: &ContourForest,
    index: usize,
    bounds: &AreaBounds,
    card_indices: &HashSet<usize>,
) -> bool {
    let Some(child) = forest.first_child(index) else {
        return false;
    };

    let outline = forest.outline(index);
    let area = polygon_area(outline);
    if area < bounds.min_card || area > bounds.max_card {
        return false;
    }

    // Thick card edges trace as two nested borders. Keep the inner one:
    // its children are the symbols. The outer border either encloses a
    // contour already accepted as a card, or a child covering most of
    // its own area.
    if card_indices.contains(&child) {
        return false;
    }
    if polygon_area(forest.outline(child)) / area > MAX_CHILD_AREA_RATIO {
        return false;
    }

    let epsilon = perimeter(outline) * CARD_APPROX_ACCURACY;
    if approx_polygon(outline, epsilon).len() != 4 {
        return false;
    }

    let Some(rect) = bounding_rect(outline) else {
        return false;
    };
    let aspect = rect.aspect_ratio();
    (MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&aspect)
}

/// A symbol contour sits within the symbol area band and approximates to
/// four corners at the looser symbol accuracy.
fn shape_filter(forest: &ContourForest, index: usize, bounds: &AreaBounds) -> bool {
    let outline = forest.outline(index);
    let area = polygon_area(outline);
    if area < bounds.min_shape || area > bounds.max_shape {
        return false;
    }

    let epsilon = perimeter(outline) * SHAPE_APPROX_ACCURACY;
    approx_polygon(outline, epsilon).len() == 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::card::{Color, Shading, Symbol};
    use crate::detection::domain::set_rules::find_sets;

    const WIDTH: u32 = 640;
    const HEIGHT: u32 = 480;

    const TABLE: [u8; 3] = [40, 40, 40];
    const CARD: [u8; 3] = [230, 230, 230];
    const RED_INK: [u8; 3] = [60, 50, 200];
    const GREEN_INK: [u8; 3] = [60, 180, 60];
    const PURPLE_INK: [u8; 3] = [180, 50, 130];

    fn fill_rect(frame: &mut Frame, x0: i32, y0: i32, x1: i32, y1: i32, bgr: [u8; 3]) {
        for y in y0..y1 {
            for x in x0..x1 {
                let offset = ((y as usize) * WIDTH as usize + x as usize) * 3;
                frame.data_mut()[offset..offset + 3].copy_from_slice(&bgr);
            }
        }
    }

    /// Rhombus with half-diagonals (rx, ry) centered at (cx, cy).
    fn fill_diamond(frame: &mut Frame, cx: i32, cy: i32, rx: i32, ry: i32, bgr: [u8; 3]) {
        for y in (cy - ry)..=(cy + ry) {
            for x in (cx - rx)..=(cx + rx) {
                let dx = (x - cx).abs() as f64 / rx as f64;
                let dy = (y - cy).abs() as f64 / ry as f64;
                if dx + dy <= 1.0 {
                    let offset = ((y as usize) * WIDTH as usize + x as usize) * 3;
                    frame.data_mut()[offset..offset + 3].copy_from_slice(&bgr);
                }
            }
        }
    }

    /// Three cards on a dark table: one red diamond, two green diamonds,
    /// three purple diamonds. Counts and colors all differ while symbol
    /// and shading match, so the three cards form exactly one Set.
    fn table_frame() -> Frame {
        let data = TABLE.repeat((WIDTH * HEIGHT) as usize);
        let mut frame = Frame::new(data, WIDTH, HEIGHT, 3, 7);

        fill_rect(&mut frame, 40, 180, 200, 290, CARD);
        fill_diamond(&mut frame, 120, 235, 20, 12, RED_INK);

        fill_rect(&mut frame, 240, 180, 400, 290, CARD);
        fill_diamond(&mut frame, 320, 220, 20, 12, GREEN_INK);
        fill_diamond(&mut frame, 320, 250, 20, 12, GREEN_INK);

        fill_rect(&mut frame, 440, 180, 600, 290, CARD);
        fill_diamond(&mut frame, 520, 205, 20, 12, PURPLE_INK);
        fill_diamond(&mut frame, 520, 235, 20, 12, PURPLE_INK);
        fill_diamond(&mut frame, 520, 265, 20, 12, PURPLE_INK);

        frame
    }

    #[test]
    fn test_uniform_frame_detects_nothing() {
        let mut detector = ContourCardDetector::new(2).unwrap();
        let data = TABLE.repeat((WIDTH * HEIGHT) as usize);
        let frame = Frame::new(data, WIDTH, HEIGHT, 3, 0);
        let outcome = detector.detect(&frame).unwrap();
        assert!(outcome.cards.is_empty());
        assert!(outcome.outlines.is_empty());
    }

    #[test]
    fn test_card_without_symbols_is_not_detected() {
        let mut detector = ContourCardDetector::new(2).unwrap();
        let data = TABLE.repeat((WIDTH * HEIGHT) as usize);
        let mut frame = Frame::new(data, WIDTH, HEIGHT, 3, 0);
        fill_rect(&mut frame, 240, 180, 400, 290, CARD);
        let outcome = detector.detect(&frame).unwrap();
        assert!(outcome.cards.is_empty());
    }

    #[test]
    fn test_detects_three_cards_with_counts_and_colors() {
        let mut detector = ContourCardDetector::new(2).unwrap();
        let outcome = detector.detect(&table_frame()).unwrap();
        assert_eq!(outcome.cards.len(), 3);
        assert_eq!(outcome.outlines.len(), 3);

        let mut cards = outcome.cards.clone();
        cards.sort();
        let counts: Vec<usize> = cards.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        let colors: Vec<Color> = cards.iter().map(|c| c.shape.color).collect();
        assert_eq!(colors, vec![Color::Red, Color::Green, Color::Purple]);
        for card in &cards {
            assert_eq!(card.shape.symbol, Symbol::Diamond);
            assert_eq!(card.shape.shading, Shading::Solid);
        }
    }

    #[test]
    fn test_card_outline_indices_are_valid_and_distinct() {
        let mut detector = ContourCardDetector::new(2).unwrap();
        let outcome = detector.detect(&table_frame()).unwrap();
        let mut seen = HashSet::new();
        for card in &outcome.cards {
            assert!(card.outline_index < outcome.outlines.len());
            assert!(seen.insert(card.outline_index));
            assert!(!outcome.outlines[card.outline_index].is_empty());
        }
    }

    #[test]
    fn test_detected_cards_form_one_set() {
        let mut detector = ContourCardDetector::new(2).unwrap();
        let outcome = detector.detect(&table_frame()).unwrap();
        assert_eq!(find_sets(&outcome.cards).len(), 1);
    }

    #[test]
    fn test_detection_is_deterministic_across_worker_counts() {
        let frame = table_frame();
        let mut results = Vec::new();
        for workers in [1, 2, 4] {
            let mut detector = ContourCardDetector::new(workers).unwrap();
            let outcome = detector.detect(&frame).unwrap();
            let mut cards = outcome.cards;
            cards.sort();
            results.push(cards);
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
    }

    #[test]
    fn test_area_bounds_scale_with_resolution() {
        let small = AreaBounds::for_dimensions(320, 240);
        let large = AreaBounds::for_dimensions(640, 480);
        assert!(large.min_card > small.min_card);
        assert!(large.max_card > small.max_card);
        assert!(small.min_shape < small.max_shape);
        assert!(small.max_shape < small.min_card);
    }

    #[test]
    fn test_bounds_recomputed_when_resolution_changes() {
        let mut detector = ContourCardDetector::new(1).unwrap();
        let small = Frame::new(TABLE.repeat(320 * 240), 320, 240, 3, 0);
        detector.detect(&small).unwrap();
        let first = detector.bounds.unwrap();

        let large = Frame::new(TABLE.repeat((WIDTH * HEIGHT) as usize), WIDTH, HEIGHT, 3, 1);
        detector.detect(&large).unwrap();
        let second = detector.bounds.unwrap();
        assert_ne!(first, second);
        assert_eq!(second.frame_width, WIDTH);
    }
}
