use thiserror::Error;

use crate::processor::worker_pool::PoolError;

/// Errors surfaced to callers of the frame processing service.
///
/// Detection and highlighting failures are not listed here: they are
/// logged and degrade to a zero-detection result so a live stream never
/// stalls on one bad frame.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },
    #[error("frame processing service unavailable")]
    ServiceUnavailable(#[source] PoolError),
}
