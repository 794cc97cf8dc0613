//! Failed Run - an invocation that produced no result record

use serde::{Deserialize, Serialize};

use super::BatchStamp;

/// Why a run produced no [`ExperimentResult`](super::ExperimentResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Output lacked a required metric.
    Extraction,
    /// Planner exited non-zero or was killed by a signal.
    ExitStatus,
    /// Planner exceeded the configured wall-clock timeout.
    Timeout,
    /// Planner could not be started.
    Spawn,
}

impl FailureKind {
    /// Stable name used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::ExitStatus => "exit_status",
            Self::Timeout => "timeout",
            Self::Spawn => "spawn",
        }
    }

    /// Inverse of [`FailureKind::as_str`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "extraction" => Some(Self::Extraction),
            "exit_status" => Some(Self::ExitStatus),
            "timeout" => Some(Self::Timeout),
            "spawn" => Some(Self::Spawn),
            _ => None,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run kept for diagnosis: whatever the planner printed is retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRun {
    domain_path: String,
    problem_path: String,
    run_date: String,
    run_time: String,
    kind: FailureKind,
    reason: String,
    exit_code: Option<i32>,
    raw_log: String,
}

impl FailedRun {
    /// Create a failed-run record.
    #[must_use]
    pub fn new(
        stamp: &BatchStamp,
        domain_path: impl Into<String>,
        problem_path: impl Into<String>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            domain_path: domain_path.into(),
            problem_path: problem_path.into(),
            run_date: stamp.date().to_string(),
            run_time: stamp.time().to_string(),
            kind,
            reason: reason.into(),
            exit_code: None,
            raw_log: String::new(),
        }
    }

    /// Attach the process exit code.
    #[must_use]
    pub const fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Attach the captured (possibly partial) planner output.
    #[must_use]
    pub fn with_raw_log(mut self, raw_log: impl Into<String>) -> Self {
        self.raw_log = raw_log.into();
        self
    }

    /// Domain file path.
    #[must_use]
    pub fn domain_path(&self) -> &str {
        &self.domain_path
    }

    /// Problem file path.
    #[must_use]
    pub fn problem_path(&self) -> &str {
        &self.problem_path
    }

    /// Batch date.
    #[must_use]
    pub fn run_date(&self) -> &str {
        &self.run_date
    }

    /// Batch time.
    #[must_use]
    pub fn run_time(&self) -> &str {
        &self.run_time
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Exit code, if the process exited normally.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Captured planner output.
    #[must_use]
    pub fn raw_log(&self) -> &str {
        &self.raw_log
    }
}
