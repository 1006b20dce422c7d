//! # Global runtime configuration.
//!
//! [`Config`] defines the bridge's behavior: polling cadence, the
//! dispatch/reconnect timeout budget, discovery settle window, channel
//! capacity, and the shutdown grace period.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use gamelink::Config;
//!
//! let mut cfg = Config::default();
//! cfg.command_timeout = Duration::from_millis(500);
//! cfg.max_retries = 5;
//!
//! assert_eq!(cfg.max_retries, 5);
//! ```

use std::time::Duration;

/// Global configuration for the supervisor and both workers.
///
/// Controls loop cadence, the retry/reconnect budget of the command
/// dispatcher, discovery timing, bus capacity, and shutdown grace.
#[derive(Clone, Debug)]
pub struct Config {
    /// Idle delay at the bottom of each worker cycle.
    pub poll_interval: Duration,
    /// Per-command dispatch timeout at the transport boundary.
    pub command_timeout: Duration,
    /// Budget for a single reconnect attempt inside `ensure_connected`.
    pub reconnect_timeout: Duration,
    /// Budget for the pre-handshake `stop_all` when resetting a live connection.
    pub stop_all_timeout: Duration,
    /// How long discovery stays open so devices can announce themselves.
    pub settle_window: Duration,
    /// Minimum interval between idle connection health checks.
    pub health_check_interval: Duration,
    /// Maximum dispatch attempts per actuator (outer retry bound).
    pub max_retries: u32,
    /// Maximum `ensure_connected` calls per timed-out dispatch (inner bound).
    pub max_reconnect_retries: u32,
    /// Capacity of the observability event bus.
    pub bus_capacity: usize,
    /// Maximum time to wait for workers to drain and exit during shutdown.
    pub grace: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `poll_interval = 100ms`
    /// - `command_timeout = 300ms`
    /// - `reconnect_timeout = 1s`
    /// - `stop_all_timeout = 5s`
    /// - `settle_window = 3s`
    /// - `health_check_interval = 5s`
    /// - `max_retries = 3`, `max_reconnect_retries = 3`
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    ///
    /// The grace period deliberately exceeds the worst-case in-flight
    /// dispatch budget (see [`Config::dispatch_budget`], 13.2s with
    /// these defaults) so a worker mid-retry can still observe a
    /// shutdown message before the supervisor gives up on it.
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            command_timeout: Duration::from_millis(300),
            reconnect_timeout: Duration::from_secs(1),
            stop_all_timeout: Duration::from_secs(5),
            settle_window: Duration::from_secs(3),
            health_check_interval: Duration::from_secs(5),
            max_retries: 3,
            max_reconnect_retries: 3,
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Worst-case time a single actuator dispatch can hold the device
    /// worker before it next observes a control message.
    ///
    /// One boundary reconnect grant can add an extra attempt on top of
    /// `max_retries`, hence the `+ 1`.
    pub fn dispatch_budget(&self) -> Duration {
        let per_attempt =
            self.command_timeout + self.reconnect_timeout * self.max_reconnect_retries;
        per_attempt * (self.max_retries + 1)
    }
}
