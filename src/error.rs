//! Error types used by the gamelink runtime and device session.
//!
//! This module defines the error families of the crate:
//!
//! - [`RuntimeError`] — errors raised by the supervising runtime itself.
//! - [`SessionError`] — fatal device-session errors (handshake, bad state).
//! - [`DispatchError`] — command-dispatch exhaustion (retries or reconnects).
//! - [`SteamIdError`] — malformed Steam identifier strings.
//!
//! All types provide `as_label()` for logging/metrics. Transient dispatch
//! failures (command timeouts, transient disconnects) never appear here:
//! they are absorbed inside the dispatcher and only surface as lifecycle
//! events, per the propagation policy — only *exhaustion* is returned to
//! the caller, as a [`DispatchError`] that says which bound was hit.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the supervising runtime.
///
/// These represent failures in the orchestration layer itself, such as a
/// shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some workers remained stuck.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of workers that did not exit in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Fatal device-session errors.
///
/// Raised immediately to the caller with no internal retry: the initial
/// handshake failing, or an operation requested in the wrong connection
/// state. Transient disconnects are *not* session errors; they are handled
/// by the dispatcher's bounded reconnect loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SessionError {
    /// The initial connect to the transport endpoint failed.
    #[error("could not connect to device transport: {reason}")]
    ConnectFailed {
        /// Transport-reported reason.
        reason: String,
    },

    /// An operation that requires a live connection was called while
    /// disconnected (e.g. `scan_devices`).
    #[error("session is not connected")]
    NotConnected,

    /// The transport reported an operational failure.
    #[error("transport error: {reason}")]
    Transport {
        /// Transport-reported reason.
        reason: String,
    },
}

impl SessionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SessionError::ConnectFailed { .. } => "session_connect_failed",
            SessionError::NotConnected => "session_not_connected",
            SessionError::Transport { .. } => "session_transport",
        }
    }

    /// Shorthand for a transport-reported failure.
    pub fn transport(reason: impl Into<String>) -> Self {
        SessionError::Transport {
            reason: reason.into(),
        }
    }
}

/// # Command-dispatch exhaustion.
///
/// The per-actuator dispatch algorithm absorbs transient timeouts and
/// transient disconnects internally; it fails only when one of its two
/// bounds is exhausted. The two variants keep those bounds
/// distinguishable for callers that care which budget ran out.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// Every allowed dispatch attempt timed out.
    #[error("command dispatch failed after {attempts} attempts")]
    RetriesExhausted {
        /// Outer attempts made (not counting the boundary grant).
        attempts: u32,
    },

    /// The device could not be reconnected within the reconnect budget.
    #[error("device reconnect failed after {attempts} attempts")]
    ReconnectExhausted {
        /// Reconnect attempts made.
        attempts: u32,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::RetriesExhausted { .. } => "dispatch_retries_exhausted",
            DispatchError::ReconnectExhausted { .. } => "dispatch_reconnect_exhausted",
        }
    }
}

/// # Malformed Steam identifier strings.
///
/// Raised at the point of parsing; every variant carries the offending
/// input for diagnostics.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SteamIdError {
    /// Input matches none of the three known SteamID shapes.
    #[error("unrecognized steam id format: '{input}'")]
    UnrecognizedFormat {
        /// The string that failed to parse.
        input: String,
    },

    /// A `STEAM_0:X:Y` string whose numeric components do not parse.
    #[error("invalid SteamID1: '{input}'")]
    InvalidId1 {
        /// The string that failed to parse.
        input: String,
    },

    /// A `[U:1:N]` string whose account number does not parse.
    #[error("invalid SteamID3: '{input}'")]
    InvalidId3 {
        /// The string that failed to parse.
        input: String,
    },

    /// A 64-bit community id that does not parse or is below the base.
    #[error("invalid SteamID64: '{input}'")]
    InvalidId64 {
        /// The string that failed to parse.
        input: String,
    },
}

impl SteamIdError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SteamIdError::UnrecognizedFormat { .. } => "steam_id_unrecognized",
            SteamIdError::InvalidId1 { .. } => "steam_id_invalid_id1",
            SteamIdError::InvalidId3 { .. } => "steam_id_invalid_id3",
            SteamIdError::InvalidId64 { .. } => "steam_id_invalid_id64",
        }
    }
}
