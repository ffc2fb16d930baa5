//! The frame processing service: detect cards, find Sets, annotate.
//!
//! One `FrameProcessor` serves one video stream. Processing is
//! synchronous per frame; parallelism lives inside the detector's worker
//! pool. The `show_sets` toggle is shared state a UI thread may flip
//! while frames are in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::detection::domain::card_detector::{CardDetector, DetectionOutcome};
use crate::detection::domain::set_rules::find_sets;
use crate::detection::infrastructure::contour_card_detector::ContourCardDetector;
use crate::highlighting::domain::set_highlighter::SetHighlighter;
use crate::highlighting::infrastructure::outline_highlighter::OutlineHighlighter;
use crate::processor::error::ProcessError;
use crate::shared::frame::Frame;

/// Worker count used when the caller has no preference. Matches the
/// level where per-frame speedup flattens out on phone-class hardware.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Clonable handle to the highlight toggle; safe to flip from any thread
/// while the owning processor is mid-frame.
#[derive(Clone)]
pub struct ShowSetsSwitch(Arc<AtomicBool>);

impl ShowSetsSwitch {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, show: bool) {
        self.0.store(show, Ordering::Relaxed);
    }
}

pub struct FrameProcessor {
    detector: Box<dyn CardDetector>,
    highlighter: Box<dyn SetHighlighter>,
    show_sets: Arc<AtomicBool>,
    num_sets_in_frame: usize,
}

impl FrameProcessor {
    /// Builds the full pipeline with `max_workers` classification
    /// workers. Zero workers cannot make progress and is rejected.
    pub fn new(max_workers: usize) -> Result<Self, ProcessError> {
        let detector =
            ContourCardDetector::new(max_workers).map_err(ProcessError::ServiceUnavailable)?;
        Ok(Self::with_parts(
            Box::new(detector),
            Box::new(OutlineHighlighter),
        ))
    }

    /// Assembles a processor from explicit stages.
    pub fn with_parts(
        detector: Box<dyn CardDetector>,
        highlighter: Box<dyn SetHighlighter>,
    ) -> Self {
        Self {
            detector,
            highlighter,
            show_sets: Arc::new(AtomicBool::new(true)),
            num_sets_in_frame: 0,
        }
    }

    /// Processes one frame and returns its annotated copy.
    ///
    /// A malformed frame is rejected up front and leaves the last Set
    /// count untouched. Detection or highlighting failures on a valid
    /// frame are logged and yield an unannotated copy with a count of
    /// zero for whatever stage did not complete.
    pub fn process(&mut self, frame: &Frame) -> Result<Frame, ProcessError> {
        validate(frame)?;

        let outcome = match self.detector.detect(frame) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("detection failed on frame {}: {err}", frame.index());
                DetectionOutcome::default()
            }
        };

        let sets = find_sets(&outcome.cards);
        self.num_sets_in_frame = sets.len();
        log::debug!(
            "frame {}: {} cards, {} sets",
            frame.index(),
            outcome.cards.len(),
            sets.len()
        );

        let mut annotated = frame.clone();
        if !sets.is_empty() && self.show_sets.load(Ordering::Relaxed) {
            if let Err(err) = self
                .highlighter
                .highlight(&mut annotated, &sets, &outcome.outlines)
            {
                log::error!("highlighting failed on frame {}: {err}", frame.index());
                annotated = frame.clone();
            }
        }
        Ok(annotated)
    }

    /// Number of Sets found by the most recent successful `process` call.
    pub fn num_sets_in_frame(&self) -> usize {
        self.num_sets_in_frame
    }

    pub fn show_sets(&self) -> bool {
        self.show_sets.load(Ordering::Relaxed)
    }

    pub fn set_show_sets(&self, show: bool) {
        self.show_sets.store(show, Ordering::Relaxed);
    }

    pub fn show_sets_switch(&self) -> ShowSetsSwitch {
        ShowSetsSwitch(Arc::clone(&self.show_sets))
    }
}

fn validate(frame: &Frame) -> Result<(), ProcessError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(ProcessError::InvalidFrame {
            reason: format!("zero dimension: {}x{}", frame.width(), frame.height()),
        });
    }
    if frame.channels() != 3 && frame.channels() != 4 {
        return Err(ProcessError::InvalidFrame {
            reason: format!("unsupported channel count {}", frame.channels()),
        });
    }
    let expected =
        frame.width() as usize * frame.height() as usize * frame.channels() as usize;
    if frame.data().len() != expected {
        return Err(ProcessError::InvalidFrame {
            reason: format!(
                "data length {} does not match {}x{}x{}",
                frame.data().len(),
                frame.width(),
                frame.height(),
                frame.channels()
            ),
        });
    }
    Ok(())
}
