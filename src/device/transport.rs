//! # Device transport seam.
//!
//! The wire protocol to the remote device is an external collaborator;
//! this crate only assumes the primitives below. The concrete transport
//! owns its own connection semantics — the dispatcher adds timeout
//! bounds *around* these calls, never inside them.
//!
//! ## Rules
//! - `command` is asynchronous and may hang arbitrarily long; callers
//!   wrap it in their own timeout.
//! - `devices` reflects the latest completed discovery pass.
//! - `is_connected` must be cheap; it is polled from housekeeping.

use async_trait::async_trait;

use crate::device::actuator::{Actuator, ActuatorCommand, ActuatorRole};
use crate::error::SessionError;

/// One discovered device with its enumerated actuators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Device display name.
    pub name: String,
    /// Actuators in enumeration order, all roles interleaved.
    pub actuators: Vec<Actuator>,
}

impl DeviceHandle {
    /// Actuators of one role, preserving enumeration order.
    pub fn actuators_with_role(&self, role: ActuatorRole) -> impl Iterator<Item = &Actuator> {
        self.actuators.iter().filter(move |a| a.role == role)
    }

    /// Count of actuators with the given role.
    pub fn role_count(&self, role: ActuatorRole) -> usize {
        self.actuators_with_role(role).count()
    }
}

/// Command/response transport to a remote device endpoint.
///
/// Implementations are driven from a single worker; no interior
/// synchronization is required of them.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Establishes the connection to the endpoint.
    async fn connect(&mut self) -> Result<(), SessionError>;

    /// Closes the connection.
    async fn disconnect(&mut self) -> Result<(), SessionError>;

    /// Re-establishes a dropped connection.
    async fn reconnect(&mut self) -> Result<(), SessionError>;

    /// Current connection state, as the transport reports it.
    fn is_connected(&self) -> bool;

    /// Asks the endpoint to start announcing devices.
    async fn start_discovery(&mut self) -> Result<(), SessionError>;

    /// Stops the discovery pass.
    async fn stop_discovery(&mut self) -> Result<(), SessionError>;

    /// Devices announced by the latest discovery pass.
    fn devices(&self) -> Vec<DeviceHandle>;

    /// Stops every actuator on every device.
    async fn stop_all(&mut self) -> Result<(), SessionError>;

    /// Applies one role-shaped command to one actuator.
    async fn command(
        &mut self,
        device: &DeviceHandle,
        actuator: &Actuator,
        command: &ActuatorCommand,
    ) -> Result<(), SessionError>;
}
