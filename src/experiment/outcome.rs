//! Run outcomes and ordered batches of them

use serde::{Deserialize, Serialize};

use super::{ExperimentResult, FailedRun};

/// What one planner invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Output parsed into a full result.
    Completed(ExperimentResult),
    /// Run failed; the captured log is kept in the record.
    Failed(FailedRun),
}

impl RunOutcome {
    /// The result, if the run completed.
    #[must_use]
    pub const fn result(&self) -> Option<&ExperimentResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Failed(_) => None,
        }
    }

    /// The failure, if the run failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&FailedRun> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(failed) => Some(failed),
        }
    }

    /// Problem file of the run.
    #[must_use]
    pub fn problem_path(&self) -> &str {
        match self {
            Self::Completed(result) => result.problem_path(),
            Self::Failed(failed) => failed.problem_path(),
        }
    }

    /// Captured planner output, whatever the outcome.
    #[must_use]
    pub fn raw_log(&self) -> &str {
        match self {
            Self::Completed(result) => result.raw_log(),
            Self::Failed(failed) => failed.raw_log(),
        }
    }

    /// Convert into the result, handing back the failure otherwise.
    ///
    /// # Errors
    ///
    /// Returns the [`FailedRun`] when the run did not complete.
    pub fn into_result(self) -> std::result::Result<ExperimentResult, FailedRun> {
        match self {
            Self::Completed(result) => Ok(result),
            Self::Failed(failed) => Err(failed),
        }
    }
}

/// Outcomes of one batch in invocation order (problem-major, repetition-minor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    outcomes: Vec<RunOutcome>,
}

impl Batch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome.
    pub fn push(&mut self, outcome: RunOutcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes in order.
    #[must_use]
    pub fn outcomes(&self) -> &[RunOutcome] {
        &self.outcomes
    }

    /// Number of invocations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when nothing ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Completed results in order.
    pub fn results(&self) -> impl Iterator<Item = &ExperimentResult> {
        self.outcomes.iter().filter_map(RunOutcome::result)
    }

    /// Failed runs in order.
    pub fn failures(&self) -> impl Iterator<Item = &FailedRun> {
        self.outcomes.iter().filter_map(RunOutcome::failure)
    }

    /// Number of failed runs.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Last outcome, used to echo the final log in verbose mode.
    #[must_use]
    pub fn last(&self) -> Option<&RunOutcome> {
        self.outcomes.last()
    }
}

impl FromIterator<RunOutcome> for Batch {
    fn from_iter<I: IntoIterator<Item = RunOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Batch {
    type Item = RunOutcome;
    type IntoIter = std::vec::IntoIter<RunOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}
