//! Sodaline Core - Common infrastructure for open-data ingestion
//!
//! This crate provides the shared machinery for pulling tabular datasets
//! from a rate-limited catalog API: HTTP access, request pacing,
//! compressed artifact sinks, logging, progress, and shutdown handling.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod rate_limit;
pub mod shutdown;
pub mod sink;

// Re-exports for convenience
pub use error::FetchError;
pub use http::{SHARED_RUNTIME, get_json, http_client};
pub use logging::{ProgressLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use rate_limit::RateLimiter;
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown};
pub use sink::{StreamSink, cleanup_tmp_files, write_document};
