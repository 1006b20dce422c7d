//! # Command dispatch: bounded retry, bounded reconnect.
//!
//! Applies a group of per-actuator commands to the selected device,
//! absorbing transient timeouts and transient disconnects while bounding
//! total cost. This is the densest algorithm in the crate; its semantics
//! are deliberate down to the attempt counts.
//!
//! ## Per-actuator flow
//! ```text
//! attempt = 1, extra_granted = false
//! while attempt <= max_retries {
//!   ├─► dispatch with command_timeout ── Ok ──► return Ok
//!   ├─► on timeout: reconnect sub-loop (≤ max_reconnect_retries calls
//!   │     to ensure_connected; first success breaks out)
//!   │       └─ exhausted ──► return ReconnectExhausted   (no outer retry)
//!   └─► reconnected:
//!         attempt == max_retries && !extra_granted
//!            ├─ yes → extra_granted = true   (attempt NOT incremented)
//!            └─ no  → attempt += 1
//! }
//! return RetriesExhausted
//! ```
//!
//! ## Rules
//! - The boundary grant fires at most once per per-actuator call: a
//!   reconnect landing exactly on the final attempt buys one ungated
//!   extra dispatch, so the reconnect is not wasted. With an
//!   always-timing-out but connected transport this makes the observable
//!   dispatch count `max_retries + 1`.
//! - A failed actuator aborts the remaining actuators of the *same* role
//!   group only; other groups still run, in the fixed order
//!   regular → rotary → linear.
//! - A transport-reported command failure is handled like a timeout:
//!   it enters the reconnect gate rather than surfacing, since only
//!   exhaustion is ever returned to callers.

use tokio::time::timeout;

use crate::device::actuator::{clamp_intensity, Actuator, ActuatorCommand, ActuatorRole};
use crate::device::session::Session;
use crate::device::transport::{DeviceHandle, Transport};
use crate::error::DispatchError;
use crate::events::{Event, EventKind};

impl<T: Transport> Session<T> {
    /// Applies an intensity to every normal actuator of the selected
    /// device. Shorthand for the regular-only form of
    /// [`Session::apply_intensity`].
    pub async fn apply_normal_intensity(&mut self, intensity: f64) -> Result<(), DispatchError> {
        self.apply_intensity(Some(intensity), None, None).await
    }

    /// Applies role-shaped commands to the selected device's actuator
    /// groups.
    ///
    /// Each supplied argument enables its group; groups run in the fixed
    /// order regular → rotary → linear and are attempted independently —
    /// an exhausted actuator aborts only the rest of its own group. The
    /// first failure is returned after all enabled groups have had their
    /// turn.
    ///
    /// With no device selected this is a no-op with a warning event, per
    /// the session invariant that commands require a completed discovery.
    pub async fn apply_intensity(
        &mut self,
        regular: Option<f64>,
        rotary: Option<(f64, bool)>,
        linear: Option<(u32, f64)>,
    ) -> Result<(), DispatchError> {
        let Some(device) = self.selected().cloned() else {
            self.bus.publish(
                Event::now(EventKind::NoDeviceSelected)
                    .with_reason("command dropped: no device selected"),
            );
            return Ok(());
        };

        let mut first_err: Option<DispatchError> = None;

        if let Some(raw) = regular {
            let (value, clamped) = clamp_intensity(raw);
            if clamped {
                self.bus
                    .publish(Event::now(EventKind::IntensityClamped).with_value(raw));
            }
            let res = self
                .apply_group(&device, ActuatorRole::Normal, ActuatorCommand::Intensity(value))
                .await;
            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        }

        if let Some((speed, clockwise)) = rotary {
            let res = self
                .apply_group(
                    &device,
                    ActuatorRole::Rotary,
                    ActuatorCommand::Rotate { speed, clockwise },
                )
                .await;
            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        }

        if let Some((duration_ms, position)) = linear {
            let res = self
                .apply_group(
                    &device,
                    ActuatorRole::Linear,
                    ActuatorCommand::Position {
                        duration_ms,
                        position,
                    },
                )
                .await;
            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    /// Applies one command to every actuator of `role`, in enumeration
    /// order, aborting the group at the first per-actuator failure.
    async fn apply_group(
        &mut self,
        device: &DeviceHandle,
        role: ActuatorRole,
        command: ActuatorCommand,
    ) -> Result<(), DispatchError> {
        let actuators: Vec<Actuator> = device.actuators_with_role(role).copied().collect();
        for actuator in actuators {
            if let Err(err) = self.apply_one(device, &actuator, &command).await {
                self.bus.publish(
                    Event::now(EventKind::DispatchAborted)
                        .with_device(device.name.as_str())
                        .with_reason(format!("group={} err={}", role.as_label(), err.as_label())),
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// The bounded per-actuator retry/reconnect algorithm. See the
    /// module docs for the exact flow.
    async fn apply_one(
        &mut self,
        device: &DeviceHandle,
        actuator: &Actuator,
        command: &ActuatorCommand,
    ) -> Result<(), DispatchError> {
        let max_retries = self.cfg.max_retries.max(1);
        let max_reconnects = self.cfg.max_reconnect_retries.max(1);
        let command_timeout = self.cfg.command_timeout;

        let mut attempt: u32 = 1;
        let mut extra_granted = false;

        while attempt <= max_retries {
            match timeout(command_timeout, self.transport.command(device, actuator, command)).await
            {
                Ok(Ok(())) => return Ok(()),
                // Transport failures are gated through the same reconnect
                // path as timeouts; only exhaustion surfaces.
                Ok(Err(_)) | Err(_) => {}
            }

            self.bus.publish(
                Event::now(EventKind::CommandTimedOut)
                    .with_device(device.name.as_str())
                    .with_attempt(attempt)
                    .with_timeout(command_timeout),
            );

            let mut reconnect_attempt: u32 = 1;
            let mut reconnected = false;
            while reconnect_attempt <= max_reconnects {
                if self.ensure_connected().await {
                    reconnected = true;
                    break;
                }
                reconnect_attempt += 1;
            }

            if !reconnected {
                self.bus.publish(
                    Event::now(EventKind::ReconnectExhausted)
                        .with_device(device.name.as_str())
                        .with_attempt(max_reconnects),
                );
                return Err(DispatchError::ReconnectExhausted {
                    attempts: max_reconnects,
                });
            }

            // A reconnect landing on the final attempt buys exactly one
            // ungated extra dispatch; the flag keeps it one-shot.
            if attempt == max_retries && !extra_granted {
                extra_granted = true;
            } else {
                attempt += 1;
            }
        }

        Err(DispatchError::RetriesExhausted {
            attempts: max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::device::mock::{CommandOutcome, MockTransport};
    use crate::events::Bus;
    use std::time::Duration;

    fn quick_cfg() -> Config {
        let mut cfg = Config::default();
        cfg.settle_window = Duration::from_millis(1);
        cfg.command_timeout = Duration::from_millis(10);
        cfg.reconnect_timeout = Duration::from_millis(10);
        cfg.stop_all_timeout = Duration::from_millis(10);
        cfg
    }

    async fn ready_session(transport: MockTransport) -> Session<MockTransport> {
        let mut s = Session::new(transport, quick_cfg(), Bus::new(256));
        s.handshake().await.expect("handshake");
        s
    }

    #[tokio::test(start_paused = true)]
    async fn intensity_is_clamped_before_dispatch() {
        let mut s =
            ready_session(MockTransport::with_devices(vec![MockTransport::device(
                "toy", 1, 0, 0,
            )]))
            .await;

        s.apply_normal_intensity(1.7).await.unwrap();
        s.apply_normal_intensity(-0.3).await.unwrap();
        s.apply_normal_intensity(0.42).await.unwrap();

        let sent: Vec<_> = s
            .transport
            .commands_sent()
            .into_iter()
            .map(|(_, _, c)| c)
            .collect();
        assert_eq!(
            sent,
            vec![
                ActuatorCommand::Intensity(1.0),
                ActuatorCommand::Intensity(0.0),
                ActuatorCommand::Intensity(0.42),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_returns_after_one_dispatch() {
        let mut s =
            ready_session(MockTransport::with_devices(vec![MockTransport::device(
                "toy", 1, 0, 0,
            )]))
            .await;

        s.apply_normal_intensity(0.5).await.unwrap();
        assert_eq!(s.transport.commands_sent().len(), 1);
        assert_eq!(s.transport.reconnect_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn always_timing_out_dispatch_is_bounded() {
        let transport = MockTransport::with_devices(vec![MockTransport::device("toy", 1, 0, 0)]);
        let mut s = ready_session(transport).await;
        s.transport.script_commands(vec![
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
        ]);

        let err = s.apply_normal_intensity(0.5).await.unwrap_err();
        assert_eq!(err, DispatchError::RetriesExhausted { attempts: 3 });
        // 3 outer attempts plus exactly one boundary grant: the
        // transport, which stayed connected, saw 4 dispatches and no
        // reconnect traffic.
        assert_eq!(s.transport.commands_sent().len(), 4);
        assert_eq!(s.transport.reconnect_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn boundary_grant_can_rescue_the_final_attempt() {
        let transport = MockTransport::with_devices(vec![MockTransport::device("toy", 1, 0, 0)]);
        let mut s = ready_session(transport).await;
        s.transport.script_commands(vec![
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Ok,
        ]);

        s.apply_normal_intensity(0.5).await.unwrap();
        assert_eq!(s.transport.commands_sent().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_exhaustion_aborts_without_outer_retries() {
        let transport = MockTransport::with_devices(vec![MockTransport::device("toy", 1, 0, 0)]);
        let mut s = ready_session(transport).await;
        s.transport.script_commands(vec![CommandOutcome::Timeout]);
        s.transport.drop_connection();
        s.transport.fail_reconnects();

        let err = s.apply_normal_intensity(0.5).await.unwrap_err();
        assert_eq!(err, DispatchError::ReconnectExhausted { attempts: 3 });
        assert_eq!(s.transport.commands_sent().len(), 1);
        assert_eq!(s.transport.reconnect_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_gated_like_a_timeout() {
        let transport = MockTransport::with_devices(vec![MockTransport::device("toy", 1, 0, 0)]);
        let mut s = ready_session(transport).await;
        s.transport
            .script_commands(vec![CommandOutcome::Fail("socket closed".into())]);

        // Failure → reconnect gate (trivially connected) → second attempt
        // succeeds from the default plan.
        s.apply_normal_intensity(0.5).await.unwrap();
        assert_eq!(s.transport.commands_sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn group_aborts_at_first_failed_actuator() {
        let transport = MockTransport::with_devices(vec![MockTransport::device("toy", 3, 0, 0)]);
        let mut s = ready_session(transport).await;
        s.transport.script_commands(vec![
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
        ]);

        let err = s.apply_normal_intensity(0.5).await.unwrap_err();
        assert_eq!(err, DispatchError::RetriesExhausted { attempts: 3 });
        // All four dispatches hit actuator 0; actuators 1 and 2 were
        // never attempted.
        let sent = s.transport.commands_sent();
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().all(|(_, a, _)| a.index == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn groups_fail_independently() {
        let transport = MockTransport::with_devices(vec![MockTransport::device("toy", 1, 1, 0)]);
        let mut s = ready_session(transport).await;
        // Exhaust the single normal actuator (4 dispatches), then let
        // the rotary group succeed.
        s.transport.script_commands(vec![
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
            CommandOutcome::Timeout,
        ]);

        let err = s
            .apply_intensity(Some(0.5), Some((0.3, true)), None)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::RetriesExhausted { attempts: 3 });

        let sent = s.transport.commands_sent();
        assert_eq!(sent.len(), 5);
        assert_eq!(
            sent.last().unwrap().2,
            ActuatorCommand::Rotate {
                speed: 0.3,
                clockwise: true
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_selected_device_is_a_warned_noop() {
        let mut s = ready_session(MockTransport::with_devices(vec![])).await;
        let mut rx = s.bus.subscribe();

        s.apply_normal_intensity(0.5).await.unwrap();
        assert!(s.transport.commands_sent().is_empty());

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::NoDeviceSelected);
    }
}
