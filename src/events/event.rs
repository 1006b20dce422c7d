//! # Lifecycle events emitted by the supervisor and workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Worker lifecycle**: a worker starting, stopping, or dying.
//! - **Shutdown phases**: signal observed, drain outcome, grace outcome.
//! - **Device session**: scan results, selection, reconnect outcomes,
//!   dispatch timeouts/aborts, clamp warnings.
//! - **Tail source**: file rotation/truncation observed.
//!
//! The [`Event`] struct carries the metadata for its kind: worker name,
//! reason, attempt number, timeout, device name, numeric value.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so consumers can restore order after fan-out.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Worker lifecycle ===
    /// A worker entered its loop.
    ///
    /// Sets: `worker`.
    WorkerStarting,

    /// A worker exited cleanly (shutdown honored, or work complete).
    ///
    /// Sets: `worker`, optional `reason`.
    WorkerStopped,

    /// A worker exited because of an unrecoverable error.
    ///
    /// Sets: `worker`, `reason`.
    WorkerFailed,

    /// Every worker has acknowledged its init-barrier message: the
    /// whole bridge is live.
    WorkersReady,

    // === Shutdown phases ===
    /// Shutdown requested (OS signal observed or caller-initiated).
    ShutdownRequested,

    /// Every worker drained and exited within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some workers did not exit in time.
    ///
    /// Sets: `reason` (stuck worker names).
    GraceExceeded,

    /// A worker exited without consuming its pending shutdown message;
    /// the supervisor drained the queue on its behalf.
    ///
    /// Sets: `worker`.
    ShutdownNotConsumed,

    // === Device session ===
    /// A discovery pass finished.
    ///
    /// Sets: `value` (device count).
    ScanCompleted,

    /// A target device was selected.
    ///
    /// Sets: `device`.
    DeviceSelected,

    /// A dispatch attempt hit the per-command timeout.
    ///
    /// Sets: `device`, `attempt`, `timeout_ms`.
    CommandTimedOut,

    /// The bounded reconnect loop ran out of attempts.
    ///
    /// Sets: `device`, `attempt` (reconnect attempts made).
    ReconnectExhausted,

    /// A role group was aborted mid-iteration after an actuator failed.
    ///
    /// Sets: `device`, `reason` (role group + failure label).
    DispatchAborted,

    /// An intensity outside [0, 1] was clamped before dispatch.
    ///
    /// Sets: `value` (the original, pre-clamp value).
    IntensityClamped,

    /// A command was requested while no device is selected (no-op).
    ///
    /// Sets: `reason`.
    NoDeviceSelected,

    /// An idle connection health check found the transport disconnected
    /// and the bounded reconnect attempt did not restore it.
    ///
    /// Sets: `worker`.
    HealthCheckFailed,

    // === Tail source ===
    /// The tailed file shrank below the cursor; the cursor was snapped
    /// to the new end of file.
    ///
    /// Sets: `worker`, `value` (new length).
    TailTruncated,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the worker involved, if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (errors, abort details, etc.).
    pub reason: Option<Arc<str>>,
    /// Attempt count (1-based), for retry-related kinds.
    pub attempt: Option<u32>,
    /// Timeout that was hit, in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Name of the device involved, if applicable.
    pub device: Option<Arc<str>>,
    /// Numeric payload (clamped value, device count, file length).
    pub value: Option<f64>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            attempt: None,
            timeout_ms: None,
            device: None,
            value: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a device name.
    #[inline]
    pub fn with_device(mut self, device: impl Into<Arc<str>>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Attaches a numeric payload.
    #[inline]
    pub fn with_value(mut self, v: f64) -> Self {
        self.value = Some(v);
        self
    }
}
