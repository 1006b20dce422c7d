//! # Device session lifecycle.
//!
//! [`Session`] owns exactly one transport connection, the list of
//! discovered devices, and the single selected target. Only the device
//! worker mutates it; it is never shared.
//!
//! ## States
//! ```text
//! Disconnected ──handshake()──► Connecting ──► Discovering ──► Ready
//!       ▲                            │                           │
//!       └────── failure / drop ◄─────┴── ensure_connected() ◄────┘
//! ```
//!
//! ## Rules
//! - `handshake` failure is fatal to the call and does not auto-retry;
//!   retrying belongs to the caller, not this type.
//! - `scan_devices` requires a live connection.
//! - `ensure_connected` is idempotent: connected sessions see no I/O.
//! - A scan that announces nothing leaves `selected` unset; callers
//!   re-scan until a device appears.

use tokio::time::timeout;

use crate::config::Config;
use crate::device::transport::{DeviceHandle, Transport};
use crate::error::SessionError;
use crate::events::{Bus, Event, EventKind};

/// Live connection plus discovered-device state.
pub struct Session<T: Transport> {
    pub(crate) transport: T,
    pub(crate) cfg: Config,
    pub(crate) bus: Bus,
    devices: Vec<DeviceHandle>,
    selected: Option<DeviceHandle>,
}

impl<T: Transport> Session<T> {
    /// Creates a disconnected session over the given transport.
    pub fn new(transport: T, cfg: Config, bus: Bus) -> Self {
        Self {
            transport,
            cfg,
            bus,
            devices: Vec::new(),
            selected: None,
        }
    }

    /// Devices announced by the latest completed scan.
    pub fn devices(&self) -> &[DeviceHandle] {
        &self.devices
    }

    /// The selected target device, if discovery has produced one.
    pub fn selected(&self) -> Option<&DeviceHandle> {
        self.selected.as_ref()
    }

    /// Connects (resetting any live connection first) and runs an
    /// initial discovery pass.
    ///
    /// An existing connection is stopped and closed before the new
    /// connect: `stop_all` under a bounded timeout with failures
    /// absorbed, then `disconnect`. A connect failure is returned as
    /// [`SessionError::ConnectFailed`] with no retry — the worker loop
    /// owns retry decisions.
    pub async fn handshake(&mut self) -> Result<(), SessionError> {
        if self.transport.is_connected() {
            let _ = timeout(self.cfg.stop_all_timeout, self.transport.stop_all()).await;
            self.transport.disconnect().await?;
        }

        self.transport
            .connect()
            .await
            .map_err(|e| SessionError::ConnectFailed {
                reason: e.to_string(),
            })?;

        self.scan_devices().await
    }

    /// Runs one discovery pass and selects the first announced device.
    ///
    /// Opens discovery, waits the settle window so devices can announce
    /// themselves, closes discovery, then refreshes the device list.
    /// Requires a live connection ([`SessionError::NotConnected`]
    /// otherwise). With nothing announced, `selected` is left unset.
    pub async fn scan_devices(&mut self) -> Result<(), SessionError> {
        if !self.transport.is_connected() {
            return Err(SessionError::NotConnected);
        }

        self.transport.start_discovery().await?;
        tokio::time::sleep(self.cfg.settle_window).await;
        self.transport.stop_discovery().await?;

        self.devices = self.transport.devices();
        self.selected = self.devices.first().cloned();

        self.bus.publish(
            Event::now(EventKind::ScanCompleted).with_value(self.devices.len() as f64),
        );
        if let Some(dev) = &self.selected {
            self.bus
                .publish(Event::now(EventKind::DeviceSelected).with_device(dev.name.as_str()));
        }
        Ok(())
    }

    /// Idempotent connection health check.
    ///
    /// Already connected: returns `true` with no I/O. Otherwise issues
    /// one reconnect bounded by the configured timeout and reports
    /// whether the transport is connected afterward.
    pub async fn ensure_connected(&mut self) -> bool {
        if self.transport.is_connected() {
            return true;
        }
        let _ = timeout(self.cfg.reconnect_timeout, self.transport.reconnect()).await;
        self.transport.is_connected()
    }

    /// Stops all actuators and closes the connection, absorbing failures.
    ///
    /// Runs on every device-worker exit path.
    pub async fn teardown(&mut self) {
        let _ = timeout(self.cfg.stop_all_timeout, self.transport.stop_all()).await;
        let _ = self.transport.disconnect().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockTransport;
    use std::time::Duration;

    fn quick_cfg() -> Config {
        let mut cfg = Config::default();
        cfg.settle_window = Duration::from_millis(1);
        cfg.reconnect_timeout = Duration::from_millis(20);
        cfg.stop_all_timeout = Duration::from_millis(20);
        cfg
    }

    fn session(transport: MockTransport) -> Session<MockTransport> {
        Session::new(transport, quick_cfg(), Bus::new(64))
    }

    #[tokio::test]
    async fn handshake_connects_and_selects_first_device() {
        let mut s = session(MockTransport::with_devices(vec![
            MockTransport::device("alpha", 2, 1, 1),
            MockTransport::device("beta", 1, 0, 0),
        ]));

        s.handshake().await.expect("handshake succeeds");
        assert_eq!(s.devices().len(), 2);
        assert_eq!(s.selected().unwrap().name, "alpha");
    }

    #[tokio::test]
    async fn handshake_resets_an_existing_connection() {
        let transport = MockTransport::with_devices(vec![MockTransport::device("alpha", 1, 0, 0)]);
        let mut s = session(transport);
        s.handshake().await.unwrap();
        s.handshake().await.unwrap();

        let calls = s.transport.call_names();
        // Second handshake must stop_all + disconnect before reconnecting.
        let reset_at = calls
            .iter()
            .position(|c| c == "stop_all")
            .expect("stop_all issued");
        assert_eq!(calls[reset_at + 1], "disconnect");
        assert_eq!(calls[reset_at + 2], "connect");
    }

    #[tokio::test]
    async fn handshake_connect_failure_is_fatal_and_not_retried() {
        let mut transport = MockTransport::new();
        transport.fail_next_connect("refused");
        let mut s = session(transport);

        let err = s.handshake().await.unwrap_err();
        assert_eq!(err.as_label(), "session_connect_failed");
        assert_eq!(s.transport.connect_calls(), 1);
    }

    #[tokio::test]
    async fn scan_while_disconnected_is_an_error() {
        let mut s = session(MockTransport::new());
        let err = s.scan_devices().await.unwrap_err();
        assert_eq!(err.as_label(), "session_not_connected");
    }

    #[tokio::test]
    async fn empty_scan_leaves_selection_unset() {
        let mut s = session(MockTransport::with_devices(vec![]));
        s.handshake().await.unwrap();
        assert!(s.selected().is_none());
    }

    #[tokio::test]
    async fn ensure_connected_is_idempotent_while_connected() {
        let mut s = session(MockTransport::with_devices(vec![]));
        s.handshake().await.unwrap();

        for _ in 0..5 {
            assert!(s.ensure_connected().await);
        }
        assert_eq!(s.transport.reconnect_calls(), 0);
    }

    #[tokio::test]
    async fn ensure_connected_reconnects_once_when_dropped() {
        let mut s = session(MockTransport::with_devices(vec![]));
        s.handshake().await.unwrap();
        s.transport.drop_connection();

        assert!(s.ensure_connected().await);
        assert_eq!(s.transport.reconnect_calls(), 1);
    }

    #[tokio::test]
    async fn ensure_connected_reports_failure_when_reconnect_fails() {
        let mut s = session(MockTransport::with_devices(vec![]));
        s.handshake().await.unwrap();
        s.transport.drop_connection();
        s.transport.fail_reconnects();

        assert!(!s.ensure_connected().await);
    }
}
