//! # Supervisor: wires the bridge and drives graceful shutdown.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], and the
//! global [`Config`]. It spawns the two workers, hands each its control
//! queue, bridges the bus to subscribers, and turns an OS signal into a
//! cooperative shutdown.
//!
//! ## High-level wiring
//! ```text
//! run(transport, log_path, commands_rx, events_tx):
//!
//!   control::queue() ──► LogTailer ─────► events_tx (caller consumes)
//!   control::queue() ──► DeviceWorker ◄── commands_rx (caller produces)
//!                             │
//!                          Session ──► Transport
//!
//!   Bus ──► supervisor listener ──► SubscriberSet ──► Subscribe impls
//! ```
//!
//! ## Shutdown path
//! ```text
//! signal ──► publish ShutdownRequested
//!        ──► send ControlMessage::Shutdown to each queue
//!        ──► join workers under grace
//!              ├─ all exited → flag queues with pending() > 0 as
//!              │               ShutdownNotConsumed → AllStoppedWithin
//!              └─ grace hit  → cancel runtime token, brief second wait,
//!                              GraceExceeded { stuck }
//! ```
//!
//! ## Rules
//! - Shutdown is advisory: workers observe it at their next cycle top.
//!   A worker mid-dispatch can lag by the full retry budget, which the
//!   default grace comfortably covers.
//! - A worker that died without consuming its Shutdown is detected via
//!   the queue's outstanding count; the supervisor never blocks forever
//!   on a drain join.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::control::{self, ControlMessage, ControlSender};
use crate::core::shutdown;
use crate::device::{DeviceCommand, DeviceWorker, Session, Transport, DEVICE_WORKER};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::game::{default_matchers, GameEvent};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tail::{LogTailer, LOG_TAILER};

/// Coordinates the two workers, event fan-out, and graceful shutdown.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
}

impl Supervisor {
    /// Creates a supervisor with the given config and subscribers.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self { cfg, bus, subs }
    }

    /// The lifecycle event bus (for ad-hoc receivers beyond the
    /// subscriber set).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs the bridge until an OS termination signal arrives or both
    /// workers exit on their own.
    ///
    /// - `transport`: connection to the remote device (external seam).
    /// - `log_path`: the append-only console log to tail.
    /// - `commands`: caller-held producer side feeds this receiver;
    ///   producers should prefer `try_send` or a bounded wait over an
    ///   unbounded `send().await` so a busy dispatcher never blocks
    ///   them indefinitely.
    /// - `events`: classified log lines are delivered here; a full
    ///   channel backpressures the tailer rather than dropping events.
    pub async fn run<T: Transport>(
        &self,
        transport: T,
        log_path: impl Into<PathBuf>,
        commands: mpsc::Receiver<DeviceCommand>,
        events: mpsc::Sender<GameEvent>,
    ) -> Result<(), RuntimeError> {
        self.run_until(transport, log_path, commands, events, async {
            let _ = shutdown::wait_for_shutdown_signal().await;
        })
        .await
    }

    /// Like [`Supervisor::run`] but with a caller-supplied shutdown
    /// trigger instead of OS signals. Useful for embedding and tests.
    pub async fn run_until<T: Transport>(
        &self,
        transport: T,
        log_path: impl Into<PathBuf>,
        commands: mpsc::Receiver<DeviceCommand>,
        events: mpsc::Sender<GameEvent>,
        shutdown: impl std::future::Future<Output = ()>,
    ) -> Result<(), RuntimeError> {
        let token = CancellationToken::new();
        self.subscriber_listener();

        let (tail_ctl, tail_ctl_rx) = control::queue();
        let (dev_ctl, dev_ctl_rx) = control::queue();

        let tailer = LogTailer::new(
            log_path,
            default_matchers(),
            self.cfg.clone(),
            events,
            tail_ctl_rx,
            self.bus.clone(),
        );
        let session = Session::new(transport, self.cfg.clone(), self.bus.clone());
        let worker = DeviceWorker::new(session, commands, dev_ctl_rx, self.bus.clone());

        let mut set: JoinSet<&'static str> = JoinSet::new();
        set.spawn(tailer.run(token.child_token()));
        set.spawn(worker.run(token.child_token()));

        let queues: [(&'static str, ControlSender); 2] =
            [(LOG_TAILER, tail_ctl), (DEVICE_WORKER, dev_ctl)];

        // Init barrier: each worker acks a NoOp once its loop is live.
        for (_, queue) in &queues {
            queue.send(ControlMessage::noop("supervisor-init"));
        }
        let barrier = async {
            for (_, queue) in &queues {
                queue.join().await;
            }
            self.bus.publish(Event::now(EventKind::WorkersReady));
            std::future::pending::<()>().await
        };

        tokio::select! {
            _ = shutdown => {
                self.bus.publish(Event::now(EventKind::ShutdownRequested));
                self.drain_workers(&mut set, &queues, &token).await
            }
            _ = async { while set.join_next().await.is_some() {} } => {
                // Both workers finished by themselves (e.g. fatal
                // handshake failure plus a dead tail source).
                Ok(())
            }
            _ = barrier => unreachable!("init barrier never completes"),
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }

    /// Sends Shutdown to every queue and waits for workers under grace.
    async fn drain_workers(
        &self,
        set: &mut JoinSet<&'static str>,
        queues: &[(&'static str, ControlSender); 2],
        token: &CancellationToken,
    ) -> Result<(), RuntimeError> {
        for (name, queue) in queues {
            // A failed send means the worker end is already gone: it
            // exited before its shutdown could even be enqueued.
            if !queue.send(ControlMessage::shutdown("supervisor")) {
                self.bus
                    .publish(Event::now(EventKind::ShutdownNotConsumed).with_worker(*name));
            }
        }

        let grace = self.cfg.grace;
        let mut finished: Vec<&'static str> = Vec::new();

        let all_joined = timeout(grace, async {
            while let Some(res) = set.join_next().await {
                if let Ok(name) = res {
                    finished.push(name);
                }
            }
        })
        .await;

        match all_joined {
            Ok(()) => {
                // A queue still holding messages means its worker exited
                // between the send and the ack, without consuming them.
                for (name, queue) in queues {
                    if queue.pending() > 0 {
                        self.bus.publish(
                            Event::now(EventKind::ShutdownNotConsumed).with_worker(*name),
                        );
                    }
                }
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                // Advisory shutdown was not honored in time; fall back to
                // token cancellation and give stragglers one short window.
                token.cancel();
                let _ = timeout(Duration::from_secs(1), async {
                    while let Some(res) = set.join_next().await {
                        if let Ok(name) = res {
                            finished.push(name);
                        }
                    }
                })
                .await;

                let stuck: Vec<String> = [LOG_TAILER, DEVICE_WORKER]
                    .iter()
                    .filter(|name| !finished.contains(name))
                    .map(|name| name.to_string())
                    .collect();
                self.bus.publish(
                    Event::now(EventKind::GraceExceeded).with_reason(stuck.join(",")),
                );
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}
