//! # Control messages: advisory lifecycle directives.
//!
//! [`ControlMessage`] is the payload of the control queue. A message is
//! immutable once constructed; its display form is derived from the
//! variant at formatting time, never stored or mutated.
//!
//! Every message carries an `origin` — the name of the component that
//! created it — purely for diagnostics.

use std::fmt;
use std::sync::Arc;

/// An advisory lifecycle directive delivered to a worker.
///
/// Workers must handle every received variant and acknowledge it exactly
/// once, even when the variant is a no-op for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    /// Carries no directive. Useful as an init barrier: a worker that has
    /// acknowledged a `NoOp` has demonstrably entered its control loop.
    NoOp {
        /// Component that created the message.
        origin: Arc<str>,
    },
    /// Requests a cooperative shutdown; honored at the top of the
    /// worker's next loop cycle.
    Shutdown {
        /// Component that created the message.
        origin: Arc<str>,
    },
}

impl ControlMessage {
    /// Creates a no-op message from the given origin.
    pub fn noop(origin: impl Into<Arc<str>>) -> Self {
        ControlMessage::NoOp {
            origin: origin.into(),
        }
    }

    /// Creates a shutdown request from the given origin.
    pub fn shutdown(origin: impl Into<Arc<str>>) -> Self {
        ControlMessage::Shutdown {
            origin: origin.into(),
        }
    }

    /// Returns the component that created this message.
    pub fn origin(&self) -> &str {
        match self {
            ControlMessage::NoOp { origin } | ControlMessage::Shutdown { origin } => origin,
        }
    }

    /// Returns true for [`ControlMessage::Shutdown`].
    pub fn is_shutdown(&self) -> bool {
        matches!(self, ControlMessage::Shutdown { .. })
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::NoOp { origin } => write!(f, "NoOp(from {origin})"),
            ControlMessage::Shutdown { origin } => write!(f, "Shutdown(from {origin})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_derives_from_variant() {
        let m = ControlMessage::shutdown("supervisor");
        assert_eq!(m.to_string(), "Shutdown(from supervisor)");
        assert!(m.is_shutdown());
        assert_eq!(m.origin(), "supervisor");
    }
}
