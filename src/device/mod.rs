//! Device side: transport seam, session lifecycle, command dispatch,
//! and the device worker loop.
//!
//! ## Contents
//! - [`Transport`], [`DeviceHandle`] — the external-collaborator seam
//! - [`Actuator`], [`ActuatorRole`], [`ActuatorCommand`] — role-typed
//!   output capabilities and their command shapes
//! - [`Session`] — connect / discover / reconnect / disconnect lifecycle
//!   plus the bounded retry/reconnect dispatch algorithm
//! - [`DeviceCommand`] — queue payload consumed by the worker
//! - [`DeviceWorker`] — the per-cycle control/command/housekeeping loop
//!
//! ## Wiring
//! ```text
//! DeviceCommand ──► [bounded mpsc] ──► DeviceWorker ──► Session ──► Transport
//!                                          ▲  │
//!                         ControlReceiver ─┘  └─► Bus (lifecycle events)
//! ```

mod actuator;
mod command;
mod session;
mod transport;
mod worker;

// Dispatch is an impl block on Session kept in its own file: the retry
// algorithm is the densest part of the crate and reads better alone.
mod dispatch;

#[cfg(test)]
pub(crate) mod mock;

pub use actuator::{Actuator, ActuatorCommand, ActuatorRole};
pub use command::DeviceCommand;
pub use session::Session;
pub use transport::{DeviceHandle, Transport};
pub use worker::{DeviceWorker, DEVICE_WORKER};
