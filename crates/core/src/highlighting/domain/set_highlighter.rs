use crate::detection::domain::set_rules::DetectedSet;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;

/// Domain interface for drawing found Sets onto a frame.
///
/// `outlines` is the contour table from the detection outcome;
/// `Card::outline_index` values inside `sets` point into it.
pub trait SetHighlighter: Send {
    fn highlight(
        &self,
        frame: &mut Frame,
        sets: &[DetectedSet],
        outlines: &[Vec<Point>],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
