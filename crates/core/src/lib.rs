//! Core library for spotting Sets, the card game, in video frames.
//!
//! A [`processor::frame_processor::FrameProcessor`] takes BGR/BGRA
//! frames, finds the cards on the table, searches for valid Sets among
//! them, and returns an annotated copy of the frame with every found Set
//! outlined.

pub mod detection;
pub mod highlighting;
pub mod io;
pub mod processor;
pub mod shared;

pub use processor::error::ProcessError;
pub use processor::frame_processor::{FrameProcessor, ShowSetsSwitch, DEFAULT_MAX_WORKERS};
pub use shared::frame::Frame;
