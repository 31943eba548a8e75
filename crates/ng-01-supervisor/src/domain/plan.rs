//! Restart plan, orchestrator states, and per-phase outcome reports.

use crate::domain::error::SupervisorError;
use std::fmt;
use std::time::Duration;

/// Pause between the stop phase settling and the start phase beginning.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_secs(3);

/// Lifecycle operation applied to every managed process in one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stop,
    Start,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Stop => "stop",
            Phase::Start => "start",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator state machine.
///
/// `Idle → Stopping → Quiescing → Starting → Idle`, or `Failed` when a
/// phase cannot gather its outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartState {
    Idle,
    Stopping,
    Quiescing,
    Starting,
    Failed,
}

impl fmt::Display for RestartState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestartState::Idle => "idle",
            RestartState::Stopping => "stopping",
            RestartState::Quiescing => "quiescing",
            RestartState::Starting => "starting",
            RestartState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Fixed set of supervised processes and the delay between phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPlan {
    pub processes: Vec<String>,
    pub quiescence: Duration,
}

impl RestartPlan {
    pub fn new(processes: Vec<String>) -> Self {
        Self {
            processes,
            quiescence: DEFAULT_QUIESCENCE,
        }
    }

    pub fn with_quiescence(mut self, quiescence: Duration) -> Self {
        self.quiescence = quiescence;
        self
    }
}

/// Outcome of one process's call within a phase.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub process: String,
    pub result: Result<(), SupervisorError>,
}

/// All outcomes of one phase, in configured process order.
#[derive(Debug)]
pub struct PhaseReport {
    pub phase: Phase,
    pub outcomes: Vec<ProcessOutcome>,
}

impl PhaseReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SupervisorError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.process.as_str(), e)))
    }

    /// One line per failed process, `name: error`, joined with `; `.
    pub fn failure_summary(&self) -> String {
        self.failures()
            .map(|(process, err)| format!("{}: {}", process, err))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Outcome of a full stop → quiescence → start sequence.
#[derive(Debug)]
pub struct RestartReport {
    pub stop: PhaseReport,
    pub start: PhaseReport,
}

impl RestartReport {
    pub fn is_success(&self) -> bool {
        self.stop.is_success() && self.start.is_success()
    }
}
