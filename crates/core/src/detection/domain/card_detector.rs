use crate::detection::domain::card::Card;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;

/// Cards found in one frame plus the border contours used to highlight
/// them; `Card::outline_index` points into `outlines`.
#[derive(Clone, Debug, Default)]
pub struct DetectionOutcome {
    pub cards: Vec<Card>,
    pub outlines: Vec<Vec<Point>>,
}

/// Domain interface for card detection.
///
/// Implementations may be stateful (e.g., caching per-resolution area
/// bounds), hence `&mut self`.
pub trait CardDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionOutcome, Box<dyn std::error::Error>>;
}
