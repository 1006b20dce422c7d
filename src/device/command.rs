//! # Device commands: the domain payload of the command channel.
//!
//! A [`DeviceCommand`] asks the device worker to drive one role group of
//! the selected device's actuators. Commands are immutable once
//! constructed and consumed exactly once; `origin` names the producing
//! component for diagnostics.

use std::fmt;
use std::sync::Arc;

/// A request to drive the selected device.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCommand {
    /// Sets the intensity of every normal actuator.
    ///
    /// `value` is clamped into `[0, 1]` before dispatch.
    SetIntensity {
        /// Requested intensity.
        value: f64,
        /// Component that created the command.
        origin: Arc<str>,
    },
    /// Sets speed and direction of every rotary actuator.
    SetRotation {
        /// Rotation speed.
        speed: f64,
        /// Direction; `false` is counter-clockwise.
        clockwise: bool,
        /// Component that created the command.
        origin: Arc<str>,
    },
    /// Moves every linear actuator to a position over a duration.
    SetPosition {
        /// Time to reach the target position, in milliseconds.
        duration_ms: u32,
        /// Target position.
        position: f64,
        /// Component that created the command.
        origin: Arc<str>,
    },
}

impl DeviceCommand {
    /// Creates a set-intensity command.
    pub fn set_intensity(value: f64, origin: impl Into<Arc<str>>) -> Self {
        DeviceCommand::SetIntensity {
            value,
            origin: origin.into(),
        }
    }

    /// Creates a set-rotation command.
    pub fn set_rotation(speed: f64, clockwise: bool, origin: impl Into<Arc<str>>) -> Self {
        DeviceCommand::SetRotation {
            speed,
            clockwise,
            origin: origin.into(),
        }
    }

    /// Creates a set-position command.
    pub fn set_position(duration_ms: u32, position: f64, origin: impl Into<Arc<str>>) -> Self {
        DeviceCommand::SetPosition {
            duration_ms,
            position,
            origin: origin.into(),
        }
    }

    /// Returns the component that created this command.
    pub fn origin(&self) -> &str {
        match self {
            DeviceCommand::SetIntensity { origin, .. }
            | DeviceCommand::SetRotation { origin, .. }
            | DeviceCommand::SetPosition { origin, .. } => origin,
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::SetIntensity { value, origin } => {
                write!(f, "SetIntensity({value}) from {origin}")
            }
            DeviceCommand::SetRotation {
                speed,
                clockwise,
                origin,
            } => write!(f, "SetRotation({speed}, cw={clockwise}) from {origin}"),
            DeviceCommand::SetPosition {
                duration_ms,
                position,
                origin,
            } => write!(f, "SetPosition({duration_ms}ms, {position}) from {origin}"),
        }
    }
}
