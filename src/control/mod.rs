//! Control-plane messaging between the supervisor and workers.
//!
//! This module groups the control **data model** and the **queue** used to
//! deliver lifecycle directives (no-op, shutdown) to each worker.
//!
//! ## Contents
//! - [`ControlMessage`] advisory lifecycle directives
//! - [`queue`] / [`ControlSender`] / [`ControlReceiver`] the ack/join queue
//!
//! ## Quick reference
//! - **Producers**: the supervisor (and anything holding a cloned
//!   [`ControlSender`]).
//! - **Consumer**: exactly one worker, polling [`ControlReceiver::try_recv`]
//!   once per loop cycle and calling [`ControlReceiver::ack`] after
//!   handling each message.
//! - **Drain detection**: [`ControlSender::join`] resolves once every
//!   enqueued message has been received *and* acknowledged; the supervisor
//!   uses this at startup (init barrier) and during shutdown.

mod message;
mod queue;

pub use message::ControlMessage;
pub use queue::{queue, ControlReceiver, ControlSender};
