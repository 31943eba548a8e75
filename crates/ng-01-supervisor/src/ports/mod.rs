//! # Driven Ports (Outbound SPI)
//!
//! The one interface the orchestrator and the HTTP layer need from
//! supervisord: a single XML-RPC round trip.

use crate::domain::error::SupervisorError;
use crate::domain::value::RpcValue;
use async_trait::async_trait;

/// Supervisord method names used by the gateway.
pub mod methods {
    pub const STOP_PROCESS: &str = "supervisor.stopProcess";
    pub const START_PROCESS: &str = "supervisor.startProcess";
    pub const GET_ALL_PROCESS_INFO: &str = "supervisor.getAllProcessInfo";
}

/// Remote-procedure access to a process supervisor.
///
/// Implementations perform exactly one round trip per call and never retry.
#[async_trait]
pub trait SupervisorApi: Send + Sync {
    /// Call `method` with positional `params`, returning the decoded result
    /// or the fault the supervisor answered with.
    async fn call_method(
        &self,
        method: &str,
        params: Vec<RpcValue>,
    ) -> Result<RpcValue, SupervisorError>;

    /// `supervisor.stopProcess(name, wait)`.
    async fn stop_process(&self, name: &str, wait: bool) -> Result<RpcValue, SupervisorError> {
        self.call_method(methods::STOP_PROCESS, vec![name.into(), wait.into()])
            .await
    }

    /// `supervisor.startProcess(name, wait)`.
    async fn start_process(&self, name: &str, wait: bool) -> Result<RpcValue, SupervisorError> {
        self.call_method(methods::START_PROCESS, vec![name.into(), wait.into()])
            .await
    }

    /// `supervisor.getAllProcessInfo()`: one state record per process.
    async fn get_all_process_info(&self) -> Result<RpcValue, SupervisorError> {
        self.call_method(methods::GET_ALL_PROCESS_INFO, Vec::new())
            .await
    }
}
