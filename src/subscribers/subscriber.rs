//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for plugging custom event
//! handlers (logging, metrics, alerting) into the runtime.
//!
//! Each subscriber gets:
//! - a **dedicated worker task** (runs independently),
//! - a **per-subscriber bounded queue** (capacity via
//!   [`Subscribe::queue_capacity`]),
//! - **panic isolation** (panics are caught and reported to stderr).

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, never in the publisher's
    /// context. Events arrive in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in overflow/panic diagnostics.
    ///
    /// Prefer short, descriptive names (e.g. "log", "metrics"). The
    /// default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// When the queue is full the new event is dropped for this
    /// subscriber only. The runtime clamps capacity to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
