//! Draws found Sets by stroking each member card's border contour.
//!
//! Sets get palette colors in rotation. A card can belong to several
//! Sets at once; its second and later strokes are drawn on an expanded
//! copy of the border so every ring stays visible.

use std::collections::HashSet;

use thiserror::Error;

use crate::detection::domain::set_rules::DetectedSet;
use crate::highlighting::domain::set_highlighter::SetHighlighter;
use crate::shared::frame::Frame;
use crate::shared::geometry::{scale_polygon, Point};

/// Stroke colors in BGR, applied per Set in order.
pub const HIGHLIGHT_PALETTE: [[u8; 3]; 6] = [
    [0, 255, 0],
    [0, 0, 255],
    [255, 0, 0],
    [0, 255, 255],
    [255, 0, 255],
    [255, 255, 0],
];

/// Disc radius stamped at every contour point; yields a 9 px stroke.
const STROKE_RADIUS: i32 = 4;

/// Expansion applied to a card border that has already been stroked.
const REPEAT_EXPAND_FACTOR: f32 = 0.15;

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("card references outline {index} but only {available} outlines exist")]
    MissingOutline { index: usize, available: usize },
}

pub struct OutlineHighlighter;

impl SetHighlighter for OutlineHighlighter {
    fn highlight(
        &self,
        frame: &mut Frame,
        sets: &[DetectedSet],
        outlines: &[Vec<Point>],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut stroked: HashSet<usize> = HashSet::new();

        for (set_index, set) in sets.iter().enumerate() {
            let color = HIGHLIGHT_PALETTE[set_index % HIGHLIGHT_PALETTE.len()];
            for card in set.cards() {
                let outline =
                    outlines
                        .get(card.outline_index)
                        .ok_or(HighlightError::MissingOutline {
                            index: card.outline_index,
                            available: outlines.len(),
                        })?;

                if stroked.insert(card.outline_index) {
                    stroke_outline(frame, outline, color);
                } else {
                    let expanded = scale_polygon(outline, REPEAT_EXPAND_FACTOR);
                    stroke_outline(frame, &expanded, color);
                }
            }
        }
        Ok(())
    }
}

/// Stamps a filled disc at every contour point. Traced borders carry one
/// point per border pixel, so consecutive discs overlap even after a
/// 15 percent expansion.
fn stroke_outline(frame: &mut Frame, outline: &[Point], bgr: [u8; 3]) {
    for point in outline {
        stamp_disc(frame, point.x, point.y, bgr);
    }
}

fn stamp_disc(frame: &mut Frame, cx: i32, cy: i32, bgr: [u8; 3]) {
    let width = frame.width() as i32;
    let height = frame.height() as i32;
    let channels = frame.channels() as usize;
    let data = frame.data_mut();

    for dy in -STROKE_RADIUS..=STROKE_RADIUS {
        for dx in -STROKE_RADIUS..=STROKE_RADIUS {
            if dx * dx + dy * dy > STROKE_RADIUS * STROKE_RADIUS {
                continue;
            }
            let x = cx + dx;
            let y = cy + dy;
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let offset = (y as usize * width as usize + x as usize) * channels;
            data[offset..offset + 3].copy_from_slice(&bgr);
        }
    }
}
