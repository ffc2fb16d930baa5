pub mod error;
pub mod frame_processor;
pub mod worker_pool;
