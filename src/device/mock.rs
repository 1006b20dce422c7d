//! Scriptable transport double for session/dispatch/worker tests.
//!
//! Outcomes are scripted per call; everything observable (call order,
//! dispatched commands, counters) is recorded in a journal that tests
//! can keep a handle to after the transport moves into a worker.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::device::actuator::{Actuator, ActuatorCommand, ActuatorRole};
use crate::device::transport::{DeviceHandle, Transport};
use crate::error::SessionError;

/// Scripted result of one `command` call.
#[derive(Clone, Debug)]
pub(crate) enum CommandOutcome {
    /// Complete successfully.
    Ok,
    /// Never complete; the caller's timeout fires.
    Timeout,
    /// Fail with a transport error.
    Fail(String),
}

#[derive(Clone, Copy, Debug)]
enum ReconnectPlan {
    AlwaysOk,
    AlwaysFail,
}

#[derive(Default)]
struct Inner {
    connected: bool,
    devices: Vec<DeviceHandle>,
    calls: Vec<String>,
    commands: Vec<(String, Actuator, ActuatorCommand)>,
    connect_failure: Option<String>,
    command_plan: VecDeque<CommandOutcome>,
    reconnect_plan: Option<ReconnectPlan>,
    connect_calls: u32,
    reconnect_calls: u32,
}

/// Shared journal handle; stays valid after the transport moves away.
#[derive(Clone)]
pub(crate) struct MockHandle {
    inner: Arc<Mutex<Inner>>,
}

pub(crate) struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn with_devices(devices: Vec<DeviceHandle>) -> Self {
        let t = Self::new();
        t.inner.lock().unwrap().devices = devices;
        t
    }

    /// Builds a device with `normal`/`rotary`/`linear` actuators, in
    /// role order, indexed per role.
    pub fn device(name: &str, normal: u32, rotary: u32, linear: u32) -> DeviceHandle {
        let mut actuators = Vec::new();
        for index in 0..normal {
            actuators.push(Actuator {
                index,
                role: ActuatorRole::Normal,
            });
        }
        for index in 0..rotary {
            actuators.push(Actuator {
                index,
                role: ActuatorRole::Rotary,
            });
        }
        for index in 0..linear {
            actuators.push(Actuator {
                index,
                role: ActuatorRole::Linear,
            });
        }
        DeviceHandle {
            name: name.to_string(),
            actuators,
        }
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn fail_next_connect(&mut self, reason: &str) {
        self.inner.lock().unwrap().connect_failure = Some(reason.to_string());
    }

    pub fn drop_connection(&self) {
        self.inner.lock().unwrap().connected = false;
    }

    pub fn fail_reconnects(&self) {
        self.inner.lock().unwrap().reconnect_plan = Some(ReconnectPlan::AlwaysFail);
    }

    /// Queues outcomes for upcoming `command` calls; once the queue is
    /// empty, calls succeed.
    pub fn script_commands(&self, plan: Vec<CommandOutcome>) {
        self.inner.lock().unwrap().command_plan = plan.into();
    }

    pub fn call_names(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn connect_calls(&self) -> u32 {
        self.inner.lock().unwrap().connect_calls
    }

    pub fn reconnect_calls(&self) -> u32 {
        self.inner.lock().unwrap().reconnect_calls
    }

    pub fn commands_sent(&self) -> Vec<(String, Actuator, ActuatorCommand)> {
        self.inner.lock().unwrap().commands.clone()
    }
}

impl MockHandle {
    pub fn drop_connection(&self) {
        self.inner.lock().unwrap().connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().unwrap().connected
    }

    pub fn call_names(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn commands_sent(&self) -> Vec<(String, Actuator, ActuatorCommand)> {
        self.inner.lock().unwrap().commands.clone()
    }

    pub fn reconnect_calls(&self) -> u32 {
        self.inner.lock().unwrap().reconnect_calls
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("connect".into());
        inner.connect_calls += 1;
        if let Some(reason) = inner.connect_failure.take() {
            return Err(SessionError::transport(reason));
        }
        inner.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("disconnect".into());
        inner.connected = false;
        Ok(())
    }

    async fn reconnect(&mut self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("reconnect".into());
        inner.reconnect_calls += 1;
        match inner.reconnect_plan.unwrap_or(ReconnectPlan::AlwaysOk) {
            ReconnectPlan::AlwaysOk => {
                inner.connected = true;
                Ok(())
            }
            ReconnectPlan::AlwaysFail => Err(SessionError::transport("reconnect refused")),
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().unwrap().connected
    }

    async fn start_discovery(&mut self) -> Result<(), SessionError> {
        self.inner.lock().unwrap().calls.push("start_discovery".into());
        Ok(())
    }

    async fn stop_discovery(&mut self) -> Result<(), SessionError> {
        self.inner.lock().unwrap().calls.push("stop_discovery".into());
        Ok(())
    }

    fn devices(&self) -> Vec<DeviceHandle> {
        self.inner.lock().unwrap().devices.clone()
    }

    async fn stop_all(&mut self) -> Result<(), SessionError> {
        self.inner.lock().unwrap().calls.push("stop_all".into());
        Ok(())
    }

    async fn command(
        &mut self,
        device: &DeviceHandle,
        actuator: &Actuator,
        command: &ActuatorCommand,
    ) -> Result<(), SessionError> {
        let outcome = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push("command".into());
            inner
                .commands
                .push((device.name.clone(), *actuator, *command));
            inner.command_plan.pop_front().unwrap_or(CommandOutcome::Ok)
        };
        match outcome {
            CommandOutcome::Ok => Ok(()),
            CommandOutcome::Timeout => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
            CommandOutcome::Fail(reason) => Err(SessionError::transport(reason)),
        }
    }
}
