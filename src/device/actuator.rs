//! # Role-typed actuators and their command shapes.
//!
//! An [`Actuator`] is a read-only capability handle enumerated from a
//! device. Its [`ActuatorRole`] decides which [`ActuatorCommand`] shape
//! it accepts; the dispatcher constructs commands from the role, so a
//! role/command mismatch cannot be expressed in well-formed code —
//! dispatch is an exhaustive match over the role enum, not a runtime
//! type test.

/// The three output-capability roles a device can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActuatorRole {
    /// Scalar-intensity output (vibration and similar).
    Normal,
    /// Rotating output taking speed plus direction.
    Rotary,
    /// Positional output taking duration plus target position.
    Linear,
}

impl ActuatorRole {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActuatorRole::Normal => "normal",
            ActuatorRole::Rotary => "rotary",
            ActuatorRole::Linear => "linear",
        }
    }
}

/// A single output capability on a device.
///
/// Read-only once enumerated; `index` is the transport's per-role
/// actuator index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actuator {
    /// Transport-side index within this actuator's role group.
    pub index: u32,
    /// Capability role deciding the accepted command shape.
    pub role: ActuatorRole,
}

/// Role-shaped command arguments.
///
/// - `Intensity` values are clamped into `[0, 1]` by the dispatcher
///   before reaching the transport.
/// - `Rotate` and `Position` values pass through as given; no range is
///   specified for them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActuatorCommand {
    /// Scalar intensity for a [`ActuatorRole::Normal`] actuator.
    Intensity(f64),
    /// Speed and direction for a [`ActuatorRole::Rotary`] actuator.
    Rotate {
        /// Rotation speed.
        speed: f64,
        /// Direction; `false` is counter-clockwise.
        clockwise: bool,
    },
    /// Movement for a [`ActuatorRole::Linear`] actuator.
    Position {
        /// Time to reach the target position, in milliseconds.
        duration_ms: u32,
        /// Target position.
        position: f64,
    },
}

impl ActuatorCommand {
    /// The role this command shape addresses.
    pub fn role(&self) -> ActuatorRole {
        match self {
            ActuatorCommand::Intensity(_) => ActuatorRole::Normal,
            ActuatorCommand::Rotate { .. } => ActuatorRole::Rotary,
            ActuatorCommand::Position { .. } => ActuatorRole::Linear,
        }
    }
}

/// Clamps an intensity into `[0, 1]`, reporting whether clamping occurred.
pub(crate) fn clamp_intensity(value: f64) -> (f64, bool) {
    if (0.0..=1.0).contains(&value) {
        (value, false)
    } else {
        (value.clamp(0.0, 1.0), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_intensity(1.7), (1.0, true));
        assert_eq!(clamp_intensity(-0.3), (0.0, true));
        assert_eq!(clamp_intensity(0.42), (0.42, false));
        assert_eq!(clamp_intensity(0.0), (0.0, false));
        assert_eq!(clamp_intensity(1.0), (1.0, false));
    }

    #[test]
    fn command_role_agreement() {
        assert_eq!(ActuatorCommand::Intensity(0.5).role(), ActuatorRole::Normal);
        assert_eq!(
            ActuatorCommand::Rotate {
                speed: 0.3,
                clockwise: true
            }
            .role(),
            ActuatorRole::Rotary
        );
        assert_eq!(
            ActuatorCommand::Position {
                duration_ms: 500,
                position: 0.8
            }
            .role(),
            ActuatorRole::Linear
        );
    }
}
