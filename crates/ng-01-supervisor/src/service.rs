//! Restart orchestrator.
//!
//! Sequences lifecycle calls across the configured processes:
//!
//! ```text
//! Idle ─► Stopping ─► Quiescing ─► Starting ─► Idle
//!            │                         │
//!            └────────► Failed ◄───────┘
//! ```
//!
//! Within a phase every process gets its own task; the phase settles only
//! when all of them have returned, and a failure for one process never
//! cancels the others. The quiescence delay starts after the stop phase
//! settles, whatever its outcomes were.

use crate::domain::error::SupervisorError;
use crate::domain::plan::{Phase, PhaseReport, ProcessOutcome, RestartPlan, RestartReport, RestartState};
use crate::ports::SupervisorApi;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Unrecoverable orchestration failures.
#[derive(Debug, thiserror::Error)]
pub enum RestartError {
    /// A fan-out task panicked or was cancelled, so its outcome is unknown.
    #[error("{phase} phase lost {lost} task(s): {reason}")]
    TaskFailed {
        phase: Phase,
        lost: usize,
        reason: String,
    },

    /// The task driving the whole run panicked.
    #[error("restart run aborted: {0}")]
    Aborted(String),
}

/// Drives stop / start / restart across the managed process set.
///
/// Each run executes on its own spawned task. Dropping the caller's future
/// stops the wait for the report but never the run itself, so a restart
/// whose stop phase went out always reaches its start phase.
pub struct RestartOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    supervisor: Arc<dyn SupervisorApi>,
    plan: RestartPlan,
    state: Mutex<RestartState>,
    /// Serializes runs so two restarts never interleave their phases.
    run_lock: tokio::sync::Mutex<()>,
}

impl RestartOrchestrator {
    pub fn new(supervisor: Arc<dyn SupervisorApi>, plan: RestartPlan) -> Self {
        Self {
            inner: Arc::new(Inner {
                supervisor,
                plan,
                state: Mutex::new(RestartState::Idle),
                run_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn plan(&self) -> &RestartPlan {
        &self.inner.plan
    }

    /// Current state of the most recent run.
    ///
    /// `Failed` is sticky: it stays until the next run begins and moves the
    /// machine to `Stopping` (or `Starting` for a start-only run).
    pub fn state(&self) -> RestartState {
        *self.inner.state.lock()
    }

    /// Stop every process, wait the quiescence interval, start every process.
    ///
    /// Per-process failures are logged and reported, never fatal.
    pub async fn restart(&self) -> Result<RestartReport, RestartError> {
        self.detached(|inner| async move { inner.restart().await })
            .await
    }

    /// Stop phase only.
    pub async fn stop_all(&self) -> Result<PhaseReport, RestartError> {
        self.detached(|inner| async move { inner.single_phase(Phase::Stop).await })
            .await
    }

    /// Start phase only.
    pub async fn start_all(&self) -> Result<PhaseReport, RestartError> {
        self.detached(|inner| async move { inner.single_phase(Phase::Start).await })
            .await
    }

    async fn detached<T, F, Fut>(&self, run: F) -> Result<T, RestartError>
    where
        F: FnOnce(Arc<Inner>) -> Fut,
        Fut: Future<Output = Result<T, RestartError>> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(run(Arc::clone(&self.inner)));
        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Restart run aborted");
                self.inner.transition(RestartState::Failed);
                Err(RestartError::Aborted(e.to_string()))
            }
        }
    }
}

impl Inner {
    async fn restart(&self) -> Result<RestartReport, RestartError> {
        let _run = self.run_lock.lock().await;
        info!(processes = ?self.plan.processes, "Restarting supervised processes");

        let stop = self.run_phase(Phase::Stop).await?;

        self.transition(RestartState::Quiescing);
        debug!(delay_ms = self.plan.quiescence.as_millis() as u64, "Waiting before start phase");
        tokio::time::sleep(self.plan.quiescence).await;

        let start = self.run_phase(Phase::Start).await?;
        self.transition(RestartState::Idle);

        let report = RestartReport { stop, start };
        if report.is_success() {
            info!("Restart completed");
        } else {
            warn!(
                stop_failures = %report.stop.failure_summary(),
                start_failures = %report.start.failure_summary(),
                "Restart completed with failures"
            );
        }
        Ok(report)
    }

    async fn single_phase(&self, phase: Phase) -> Result<PhaseReport, RestartError> {
        let _run = self.run_lock.lock().await;
        let report = self.run_phase(phase).await?;
        self.transition(RestartState::Idle);
        Ok(report)
    }

    async fn run_phase(&self, phase: Phase) -> Result<PhaseReport, RestartError> {
        self.transition(match phase {
            Phase::Stop => RestartState::Stopping,
            Phase::Start => RestartState::Starting,
        });

        let mut tasks = JoinSet::new();
        for (index, process) in self.plan.processes.iter().cloned().enumerate() {
            let supervisor = Arc::clone(&self.supervisor);
            tasks.spawn(async move {
                let result = match phase {
                    Phase::Stop => supervisor.stop_process(&process, true).await,
                    Phase::Start => supervisor.start_process(&process, true).await,
                };
                (index, process, result)
            });
        }

        let mut settled = Vec::with_capacity(self.plan.processes.len());
        let mut lost = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, process, result)) => {
                    let result = result.map(|_| ());
                    log_outcome(phase, &process, &result);
                    settled.push((index, ProcessOutcome { process, result }));
                }
                Err(e) => lost.push(e.to_string()),
            }
        }

        if !lost.is_empty() {
            error!(%phase, lost = lost.len(), "Phase lost track of supervisor calls");
            self.transition(RestartState::Failed);
            return Err(RestartError::TaskFailed {
                phase,
                lost: lost.len(),
                reason: lost.join("; "),
            });
        }

        settled.sort_by_key(|(index, _)| *index);
        Ok(PhaseReport {
            phase,
            outcomes: settled.into_iter().map(|(_, outcome)| outcome).collect(),
        })
    }

    fn transition(&self, next: RestartState) {
        let mut state = self.state.lock();
        if *state != next {
            debug!(from = %*state, to = %next, "Restart state transition");
            *state = next;
        }
    }
}

fn log_outcome(phase: Phase, process: &str, result: &Result<(), SupervisorError>) {
    match result {
        Ok(()) => info!(%phase, process, "Process call succeeded"),
        Err(e) => warn!(%phase, process, error = %e, "Process call failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{fault_codes, Fault};
    use crate::ports::methods;
    use crate::testing::RecordingSupervisor;
    use std::time::Duration;

    fn orchestrator(supervisor: Arc<RecordingSupervisor>) -> RestartOrchestrator {
        let plan = RestartPlan::new(vec!["beacon-chain".into(), "validator".into()]);
        RestartOrchestrator::new(supervisor, plan)
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_sequence_and_quiescence() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        let orchestrator = orchestrator(Arc::clone(&supervisor));

        let report = orchestrator.restart().await.unwrap();
        assert!(report.is_success());

        let calls = supervisor.calls();
        assert_eq!(calls.len(), 4);
        let (stops, starts) = calls.split_at(2);
        assert!(stops.iter().all(|c| c.method == methods::STOP_PROCESS));
        assert!(starts.iter().all(|c| c.method == methods::START_PROCESS));

        let mut stopped: Vec<_> = stops.iter().map(|c| c.process().unwrap()).collect();
        stopped.sort();
        assert_eq!(stopped, vec!["beacon-chain", "validator"]);

        let last_stop = stops.iter().map(|c| c.at).max().unwrap();
        let first_start = starts.iter().map(|c| c.at).min().unwrap();
        assert!(first_start.duration_since(last_stop) >= Duration::from_secs(3));
        assert_eq!(orchestrator.state(), RestartState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_calls_wait_for_completion() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        let orchestrator = orchestrator(Arc::clone(&supervisor));

        orchestrator.stop_all().await.unwrap();

        for call in supervisor.calls() {
            assert_eq!(call.params.get(1), Some(&crate::RpcValue::Bool(true)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_stop_does_not_block_siblings() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        supervisor.fail_on(
            methods::STOP_PROCESS,
            "beacon-chain",
            Fault::new(fault_codes::NOT_RUNNING, "NOT_RUNNING: beacon-chain"),
        );
        let orchestrator = orchestrator(Arc::clone(&supervisor));

        let report = orchestrator.restart().await.unwrap();

        assert!(!report.stop.is_success());
        assert!(report.start.is_success());
        assert_eq!(report.stop.outcomes[0].process, "beacon-chain");
        assert!(report.stop.outcomes[0].result.is_err());
        assert!(report.stop.outcomes[1].result.is_ok());
        assert_eq!(supervisor.calls_for(methods::STOP_PROCESS).len(), 2);
        assert_eq!(supervisor.calls_for(methods::START_PROCESS).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stop_delays_start_phase() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        supervisor.delay_on(methods::STOP_PROCESS, "validator", Duration::from_secs(10));
        let orchestrator = orchestrator(Arc::clone(&supervisor));
        let began = tokio::time::Instant::now();

        orchestrator.restart().await.unwrap();

        let first_start = supervisor
            .calls_for(methods::START_PROCESS)
            .iter()
            .map(|c| c.at)
            .min()
            .unwrap();
        assert!(first_start.duration_since(began) >= Duration::from_secs(13));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_phase_runs_in_parallel() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        supervisor.delay_on(methods::STOP_PROCESS, "beacon-chain", Duration::from_secs(10));
        supervisor.delay_on(methods::STOP_PROCESS, "validator", Duration::from_secs(10));
        let orchestrator = orchestrator(Arc::clone(&supervisor));
        let began = tokio::time::Instant::now();

        orchestrator.restart().await.unwrap();

        let first_start = supervisor
            .calls_for(methods::START_PROCESS)
            .iter()
            .map(|c| c.at)
            .min()
            .unwrap();
        let elapsed = first_start.duration_since(began);
        assert!(elapsed >= Duration::from_secs(13));
        assert!(elapsed < Duration::from_secs(20), "stops ran one after another: {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_still_starts_processes() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        let orchestrator = orchestrator(Arc::clone(&supervisor));

        // Caller gives up during the quiescence wait.
        let outcome = tokio::time::timeout(Duration::from_secs(1), orchestrator.restart()).await;
        assert!(outcome.is_err());
        assert_eq!(supervisor.calls_for(methods::STOP_PROCESS).len(), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(supervisor.calls_for(methods::START_PROCESS).len(), 2);
        assert_eq!(orchestrator.state(), RestartState::Idle);
    }

    /// Panics on every stop call, succeeds on everything else.
    struct PanicOnStop;

    #[async_trait::async_trait]
    impl SupervisorApi for PanicOnStop {
        async fn call_method(
            &self,
            method: &str,
            _params: Vec<crate::RpcValue>,
        ) -> Result<crate::RpcValue, SupervisorError> {
            if method == methods::STOP_PROCESS {
                panic!("supervisor connection torn down");
            }
            Ok(crate::RpcValue::Bool(true))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_state_holds_until_next_run() {
        let plan = RestartPlan::new(vec!["beacon-chain".into(), "validator".into()]);
        let orchestrator = RestartOrchestrator::new(Arc::new(PanicOnStop), plan);

        let err = orchestrator.restart().await.unwrap_err();
        assert!(matches!(err, RestartError::TaskFailed { phase: Phase::Stop, lost: 2, .. }));
        assert_eq!(orchestrator.state(), RestartState::Failed);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(orchestrator.state(), RestartState::Failed);

        orchestrator.start_all().await.unwrap();
        assert_eq!(orchestrator.state(), RestartState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_only_skips_stop_and_delay() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        let orchestrator = orchestrator(Arc::clone(&supervisor));
        let began = tokio::time::Instant::now();

        let report = orchestrator.start_all().await.unwrap();

        assert_eq!(report.phase, Phase::Start);
        assert!(supervisor.calls_for(methods::STOP_PROCESS).is_empty());
        assert_eq!(tokio::time::Instant::now(), began);
    }

    #[tokio::test]
    async fn test_empty_plan_is_noop() {
        let supervisor = Arc::new(RecordingSupervisor::new());
        let orchestrator = RestartOrchestrator::new(
            supervisor.clone(),
            RestartPlan::new(vec![]).with_quiescence(Duration::ZERO),
        );

        let report = orchestrator.restart().await.unwrap();
        assert!(report.is_success());
        assert!(supervisor.calls().is_empty());
    }
}
