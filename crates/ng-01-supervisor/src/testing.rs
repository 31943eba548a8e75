//! Test doubles for the supervisor port.
//!
//! Available to this crate's tests and, with the `test-utils` feature, to
//! downstream crates.

use crate::domain::error::{Fault, SupervisorError};
use crate::domain::value::RpcValue;
use crate::ports::{methods, SupervisorApi};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// One observed call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Vec<RpcValue>,
    /// Tokio clock reading when the call began; follows a paused test clock.
    pub at: Instant,
}

impl RecordedCall {
    /// The process-name argument of stop/start calls.
    pub fn process(&self) -> Option<&str> {
        self.params.first().and_then(RpcValue::as_str)
    }
}

/// In-memory supervisor that records every call.
///
/// Calls succeed with `true` unless a fault or a delay has been registered
/// for the `(method, process)` pair. `getAllProcessInfo` answers with the
/// configured process-info value (an empty array by default).
pub struct RecordingSupervisor {
    calls: Mutex<Vec<RecordedCall>>,
    faults: Mutex<HashMap<(String, String), Fault>>,
    delays: Mutex<HashMap<(String, String), Duration>>,
    process_info: Mutex<Result<RpcValue, Fault>>,
}

impl RecordingSupervisor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            process_info: Mutex::new(Ok(RpcValue::Array(Vec::new()))),
        }
    }

    pub fn fail_on(&self, method: &str, process: &str, fault: Fault) {
        self.faults
            .lock()
            .insert((method.to_string(), process.to_string()), fault);
    }

    pub fn delay_on(&self, method: &str, process: &str, delay: Duration) {
        self.delays
            .lock()
            .insert((method.to_string(), process.to_string()), delay);
    }

    pub fn set_process_info(&self, info: RpcValue) {
        *self.process_info.lock() = Ok(info);
    }

    pub fn fail_process_info(&self, fault: Fault) {
        *self.process_info.lock() = Err(fault);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, method: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }
}

impl Default for RecordingSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SupervisorApi for RecordingSupervisor {
    async fn call_method(
        &self,
        method: &str,
        params: Vec<RpcValue>,
    ) -> Result<RpcValue, SupervisorError> {
        let call = RecordedCall {
            method: method.to_string(),
            params,
            at: Instant::now(),
        };
        let key = (
            method.to_string(),
            call.process().unwrap_or_default().to_string(),
        );
        self.calls.lock().push(call);

        let delay = self.delays.lock().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if method == methods::GET_ALL_PROCESS_INFO {
            return self.process_info.lock().clone().map_err(SupervisorError::Fault);
        }

        let fault = self.faults.lock().get(&key).cloned();
        match fault {
            Some(fault) => Err(SupervisorError::Fault(fault)),
            None => Ok(RpcValue::Bool(true)),
        }
    }
}
