//! Runtime core: supervision and lifecycle.
//!
//! The only public API from this module is [`Supervisor`], which wires
//! the control queues and domain channels, spawns the two workers, and
//! drives cooperative shutdown.
//!
//! Internal modules:
//! - [`supervisor`]: spawns workers, init barrier, shutdown drain/grace;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod shutdown;
mod supervisor;

pub use supervisor::Supervisor;
