//! Log tail source: incremental reader over an append-only console log.
//!
//! ## Contents
//! - [`LogTailer`] — the polling worker that classifies new lines into
//!   [`GameEvent`](crate::game::GameEvent)s and publishes them with
//!   backpressure
//! - [`LOG_TAILER`] — the worker's lifecycle name

mod tailer;

pub use tailer::{LogTailer, LOG_TAILER};
