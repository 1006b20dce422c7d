//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [starting] worker=log-tailer
//! [cmd-timeout] device=toy attempt=2 timeout=300ms
//! [clamped] value=1.7
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

fn opt(field: &Option<std::sync::Arc<str>>) -> &str {
    field.as_deref().unwrap_or("?")
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerStarting => {
                println!("[starting] worker={}", opt(&e.worker));
            }
            EventKind::WorkerStopped => match &e.reason {
                Some(r) => println!("[stopped] worker={} reason={r}", opt(&e.worker)),
                None => println!("[stopped] worker={}", opt(&e.worker)),
            },
            EventKind::WorkerFailed => {
                println!("[failed] worker={} err={}", opt(&e.worker), opt(&e.reason));
            }
            EventKind::WorkersReady => {
                println!("[workers-ready]");
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded] stuck={}", opt(&e.reason));
            }
            EventKind::ShutdownNotConsumed => {
                println!("[shutdown-not-consumed] worker={}", opt(&e.worker));
            }
            EventKind::ScanCompleted => {
                println!("[scan-completed] devices={}", e.value.unwrap_or(0.0));
            }
            EventKind::DeviceSelected => {
                println!("[device-selected] device={}", opt(&e.device));
            }
            EventKind::CommandTimedOut => {
                println!(
                    "[cmd-timeout] device={} attempt={} timeout={}ms",
                    opt(&e.device),
                    e.attempt.unwrap_or(0),
                    e.timeout_ms.unwrap_or(0)
                );
            }
            EventKind::ReconnectExhausted => {
                println!(
                    "[reconnect-exhausted] device={} attempts={}",
                    opt(&e.device),
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::DispatchAborted => {
                println!(
                    "[dispatch-aborted] device={} reason={}",
                    opt(&e.device),
                    opt(&e.reason)
                );
            }
            EventKind::IntensityClamped => {
                println!("[clamped] value={}", e.value.unwrap_or(f64::NAN));
            }
            EventKind::NoDeviceSelected => {
                println!("[no-device] reason={}", opt(&e.reason));
            }
            EventKind::HealthCheckFailed => {
                println!("[health-check-failed] worker={}", opt(&e.worker));
            }
            EventKind::TailTruncated => {
                println!(
                    "[tail-truncated] worker={} new_len={}",
                    opt(&e.worker),
                    e.value.unwrap_or(0.0)
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
