//! # Event subscribers for the gamelink runtime.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery
//! for handling lifecycle events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Workers ── publish(Event) ──► Bus ──► supervisor listener
//!                                            │
//!                                            ▼
//!                                      SubscriberSet
//!                                 ┌─────────┼─────────┐
//!                                 ▼         ▼         ▼
//!                            [queue S1] [queue S2] [queue SN]
//!                                 ▼         ▼         ▼
//!                            worker S1  worker S2  worker SN
//!                                 ▼         ▼         ▼
//!                            on_event() on_event() on_event()
//! ```
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the event for that subscriber only.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Panics inside a subscriber are caught and reported; other
//!   subscribers are unaffected.

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
