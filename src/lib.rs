//! # gamelink
//!
//! **gamelink** bridges two asynchronous sources — a continuously-appended
//! game console log, and a stateful remote actuator device reachable over
//! a command/response transport — through a uniform worker/control-queue
//! pattern.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                         ┌──────────────────────────────────────────┐
//!                         │  Supervisor                              │
//!                         │  - Bus (broadcast lifecycle events)      │
//!                         │  - SubscriberSet (fans out to users)     │
//!                         │  - one control queue per worker          │
//!                         └───────┬──────────────────────┬───────────┘
//!                          ctrl   │                ctrl  │
//!                                 ▼                      ▼
//!                        ┌──────────────┐       ┌─────────────────┐
//!   console.log ───tail──│  LogTailer   │       │  DeviceWorker   │◄── DeviceCommand
//!                        └──────┬───────┘       └────────┬────────┘      (mpsc)
//!                               │                        │
//!                     GameEvent │                        ▼
//!                        (mpsc, ▼ backpressure)   ┌─────────────┐
//!                      downstream consumers       │   Session   │
//!                                                 └──────┬──────┘
//!                                                        ▼
//!                                                  Transport (seam)
//! ```
//!
//! ### Worker cycle
//! Both workers pump the same cooperative loop shape:
//! ```text
//! loop {
//!   ├─► one control message   (Shutdown → ack, exit; NoOp → ack)
//!   ├─► one domain unit       (log delta / one device command)
//!   ├─► housekeeping          (device worker: 5s connection check)
//!   └─► idle delay            (~100ms, cancellable safe point)
//! }
//! ```
//!
//! ### Dispatch resilience
//! Applying a command to an actuator is bounded on two axes: up to 3
//! dispatch attempts (per-command timeout ~300ms), each timeout gated by
//! up to 3 reconnect attempts (~1s each). A reconnect that lands exactly
//! on the final attempt grants one extra ungated dispatch, so a
//! just-restored connection is never wasted. Exhaustion — and only
//! exhaustion — surfaces to the caller, as a [`DispatchError`] naming
//! the bound that was hit.
//!
//! ## Features
//! | Area            | Description                                           | Key types / traits                        |
//! |-----------------|-------------------------------------------------------|-------------------------------------------|
//! | **Supervision** | Spawn both workers, init barrier, graceful shutdown.  | [`Supervisor`], [`Config`]                |
//! | **Control**     | Ack/join control queues for lifecycle directives.     | [`ControlMessage`], [`control::queue`]    |
//! | **Log tail**    | Poll-based tailing with pluggable classification.     | [`LogTailer`], [`LineMatcher`]            |
//! | **Device**      | Session lifecycle + bounded retry/reconnect dispatch. | [`Session`], [`Transport`], [`DeviceCommand`] |
//! | **Observability**| Typed lifecycle events fanned out to subscribers.    | [`Event`], [`Bus`], [`Subscribe`]         |
//! | **Errors**      | Typed families per failure domain.                    | [`RuntimeError`], [`SessionError`], [`DispatchError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use tokio::sync::mpsc;
//! use gamelink::{Config, DeviceCommand, Supervisor};
//! # use gamelink::{DeviceHandle, SessionError, Actuator, ActuatorCommand};
//! # struct MyTransport;
//! # #[async_trait::async_trait]
//! # impl gamelink::Transport for MyTransport {
//! #     async fn connect(&mut self) -> Result<(), SessionError> { Ok(()) }
//! #     async fn disconnect(&mut self) -> Result<(), SessionError> { Ok(()) }
//! #     async fn reconnect(&mut self) -> Result<(), SessionError> { Ok(()) }
//! #     fn is_connected(&self) -> bool { true }
//! #     async fn start_discovery(&mut self) -> Result<(), SessionError> { Ok(()) }
//! #     async fn stop_discovery(&mut self) -> Result<(), SessionError> { Ok(()) }
//! #     fn devices(&self) -> Vec<DeviceHandle> { Vec::new() }
//! #     async fn stop_all(&mut self) -> Result<(), SessionError> { Ok(()) }
//! #     async fn command(&mut self, _: &DeviceHandle, _: &Actuator, _: &ActuatorCommand) -> Result<(), SessionError> { Ok(()) }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::new(Config::default(), Vec::new());
//!
//!     let (cmd_tx, cmd_rx) = mpsc::channel(64);
//!     let (event_tx, mut event_rx) = mpsc::channel(256);
//!
//!     // Consume classified log lines elsewhere.
//!     tokio::spawn(async move {
//!         while let Some(ev) = event_rx.recv().await {
//!             println!("{ev}");
//!         }
//!     });
//!
//!     cmd_tx.send(DeviceCommand::set_intensity(0.5, "example")).await?;
//!
//!     // Runs until SIGINT/SIGTERM.
//!     sup.run(MyTransport, "console.log", cmd_rx, event_tx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod events;
pub mod game;
pub mod subscribers;
pub mod tail;

mod core;

// ---- Public re-exports ----

pub use config::Config;
pub use control::{ControlMessage, ControlReceiver, ControlSender};
pub use core::Supervisor;
pub use device::{
    Actuator, ActuatorCommand, ActuatorRole, DeviceCommand, DeviceHandle, DeviceWorker, Session,
    Transport, DEVICE_WORKER,
};
pub use error::{DispatchError, RuntimeError, SessionError, SteamIdError};
pub use events::{Bus, Event, EventKind};
pub use game::{
    default_matchers, ChatEvent, ChatMatcher, GameEvent, GameEventKind, KillEvent, KillMatcher,
    LineMatcher, SteamId,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tail::{LogTailer, LOG_TAILER};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
