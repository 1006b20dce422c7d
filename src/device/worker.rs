//! # Device worker: the command-side cooperative loop.
//!
//! One worker owns the [`Session`] and pumps a single-threaded cycle:
//! control message, then at most one device command, then periodic
//! housekeeping, then an idle delay.
//!
//! ## Cycle
//! ```text
//! loop {
//!   ├─► control: try_recv ── Shutdown → ack, break
//!   │                     └─ NoOp     → ack
//!   ├─► command: try_recv ── Some → dispatch via Session (one per cycle)
//!   │                     └─ None → health check if ≥ interval since last
//!   └─► idle delay (cancellable safe point)
//! }
//! teardown: stop_all + disconnect, always
//! ```
//!
//! ## Rules
//! - Shutdown is honored only at the top of a cycle; an in-flight
//!   dispatch can delay it by up to the full retry budget.
//! - Dispatch activity counts as a health check (the idle check timer
//!   resets after a command).
//! - Every exit path drains the control queue and tears the session
//!   down, so supervisors joining on the queue never deadlock and the
//!   device is never left running.

use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::control::{ControlMessage, ControlReceiver};
use crate::device::command::DeviceCommand;
use crate::device::session::Session;
use crate::device::transport::Transport;
use crate::events::{Bus, Event, EventKind};

/// Name the worker reports in lifecycle events and stuck-worker lists.
pub const DEVICE_WORKER: &str = "device-worker";

/// Consumes [`DeviceCommand`]s and applies them to the selected device.
pub struct DeviceWorker<T: Transport> {
    session: Session<T>,
    commands: mpsc::Receiver<DeviceCommand>,
    control: ControlReceiver,
    bus: Bus,
}

impl<T: Transport> DeviceWorker<T> {
    /// Creates a worker over an un-handshaken session.
    pub fn new(
        session: Session<T>,
        commands: mpsc::Receiver<DeviceCommand>,
        control: ControlReceiver,
        bus: Bus,
    ) -> Self {
        Self {
            session,
            commands,
            control,
            bus,
        }
    }

    /// Runs until a Shutdown control message, runtime cancellation, or a
    /// fatal handshake failure. Returns the worker name for join
    /// bookkeeping.
    pub async fn run(mut self, token: CancellationToken) -> &'static str {
        self.bus
            .publish(Event::now(EventKind::WorkerStarting).with_worker(DEVICE_WORKER));

        if let Err(err) = self.session.handshake().await {
            self.bus.publish(
                Event::now(EventKind::WorkerFailed)
                    .with_worker(DEVICE_WORKER)
                    .with_reason(err.to_string()),
            );
            self.control.drain();
            self.session.teardown().await;
            return DEVICE_WORKER;
        }

        // The first scan may announce nothing; keep scanning until a
        // device appears, still honoring control messages between passes.
        while self.session.selected().is_none() {
            if self.observed_shutdown() {
                self.exit().await;
                return DEVICE_WORKER;
            }
            if token.is_cancelled() {
                self.publish_cancelled();
                self.exit().await;
                return DEVICE_WORKER;
            }
            if let Err(err) = self.session.scan_devices().await {
                self.bus.publish(
                    Event::now(EventKind::WorkerFailed)
                        .with_worker(DEVICE_WORKER)
                        .with_reason(err.to_string()),
                );
                self.exit().await;
                return DEVICE_WORKER;
            }
        }

        let poll = self.session.cfg.poll_interval;
        let health_interval = self.session.cfg.health_check_interval;
        let mut last_check = Instant::now();

        loop {
            if self.observed_shutdown() {
                break;
            }

            match self.commands.try_recv() {
                Ok(cmd) => {
                    self.dispatch(cmd).await;
                    last_check = Instant::now();
                }
                Err(_) => {
                    // Empty (or producers gone): idle housekeeping.
                    if last_check.elapsed() >= health_interval {
                        if !self.session.ensure_connected().await {
                            self.bus.publish(
                                Event::now(EventKind::HealthCheckFailed)
                                    .with_worker(DEVICE_WORKER),
                            );
                        }
                        last_check = Instant::now();
                    }
                }
            }

            select! {
                _ = sleep(poll) => {}
                _ = token.cancelled() => {
                    self.publish_cancelled();
                    break;
                }
            }
        }

        self.exit().await;
        DEVICE_WORKER
    }

    fn publish_cancelled(&self) {
        self.bus.publish(
            Event::now(EventKind::WorkerStopped)
                .with_worker(DEVICE_WORKER)
                .with_reason("cancelled"),
        );
    }

    /// Applies one queued command through the dispatcher; exhaustion is
    /// absorbed here (already published as events by the dispatcher).
    async fn dispatch(&mut self, cmd: DeviceCommand) {
        let result = match cmd {
            DeviceCommand::SetIntensity { value, .. } => {
                self.session.apply_intensity(Some(value), None, None).await
            }
            DeviceCommand::SetRotation {
                speed, clockwise, ..
            } => {
                self.session
                    .apply_intensity(None, Some((speed, clockwise)), None)
                    .await
            }
            DeviceCommand::SetPosition {
                duration_ms,
                position,
                ..
            } => {
                self.session
                    .apply_intensity(None, None, Some((duration_ms, position)))
                    .await
            }
        };
        // Exhaustion was already published by the dispatcher; nothing to
        // surface beyond that.
        let _ = result;
    }

    /// Polls one control message; returns true when it was a Shutdown.
    fn observed_shutdown(&mut self) -> bool {
        match self.control.try_recv() {
            Some(ControlMessage::Shutdown { origin }) => {
                self.bus.publish(
                    Event::now(EventKind::WorkerStopped)
                        .with_worker(DEVICE_WORKER)
                        .with_reason(format!("shutdown from {origin}")),
                );
                self.control.ack();
                true
            }
            Some(ControlMessage::NoOp { .. }) => {
                self.control.ack();
                false
            }
            None => false,
        }
    }

    /// Common exit path: drain control, tear the session down.
    async fn exit(&mut self) {
        self.control.drain();
        self.session.teardown().await;
    }
}
