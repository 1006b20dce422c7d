//! Runtime lifecycle events: types and broadcast bus.
//!
//! This module groups the observability **data model** and the **bus**
//! used to publish/subscribe to lifecycle events emitted by the
//! supervisor, the log-tail worker, the device worker, and the command
//! dispatcher.
//!
//! Domain data (parsed game events, device commands) does **not** travel
//! on this bus; it has its own channels with its own backpressure rules.
//! The bus carries only what an observer would want to log or meter.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor`, `LogTailer`, `DeviceWorker`, `Session`
//!   and the dispatch algorithm.
//! - **Consumer**: the supervisor's bus listener, which fans events out
//!   to user subscribers via `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
