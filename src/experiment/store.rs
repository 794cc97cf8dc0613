//! Result Store - append-only persistence seam
//!
//! The orchestrator only needs three verbs: append a result, append a
//! failure, commit. [`SqliteResultStore`](super::SqliteResultStore) is the
//! durable implementation; [`MemoryResultStore`] backs tests and dry runs.

use super::{ExperimentResult, FailedRun, RunOutcome};
use crate::Result;

/// Append-only sink for run records.
///
/// Writes may be buffered until [`ResultStore::commit`]; a batch commits
/// exactly once, after its last run.
pub trait ResultStore {
    /// Append a completed result.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the write.
    fn append(&mut self, result: &ExperimentResult) -> Result<()>;

    /// Append a failed run.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the write.
    fn append_failure(&mut self, failed: &FailedRun) -> Result<()>;

    /// Make everything appended so far durable.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot flush.
    fn commit(&mut self) -> Result<()>;

    /// Append whichever record the outcome carries.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the write.
    fn append_outcome(&mut self, outcome: &RunOutcome) -> Result<()> {
        match outcome {
            RunOutcome::Completed(result) => self.append(result),
            RunOutcome::Failed(failed) => self.append_failure(failed),
        }
    }
}

/// In-memory result store.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: Vec<ExperimentResult>,
    failures: Vec<FailedRun>,
    commits: usize,
}

impl MemoryResultStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.failures.is_empty()
    }

    /// Completed results in append order.
    #[must_use]
    pub fn results(&self) -> &[ExperimentResult] {
        &self.results
    }

    /// Failed runs in append order.
    #[must_use]
    pub fn failures(&self) -> &[FailedRun] {
        &self.failures
    }

    /// How many times `commit` was called.
    #[must_use]
    pub const fn commit_count(&self) -> usize {
        self.commits
    }
}

impl ResultStore for MemoryResultStore {
    fn append(&mut self, result: &ExperimentResult) -> Result<()> {
        self.results.push(result.clone());
        Ok(())
    }

    fn append_failure(&mut self, failed: &FailedRun) -> Result<()> {
        self.failures.push(failed.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{BatchStamp, FailureKind};
    use crate::extract::{ExtractedMetrics, Outcome};

    fn result(problem: &str) -> ExperimentResult {
        let metrics = ExtractedMetrics {
            grounded_time: Some(0.1),
            algebra_time: Some(0.2),
            outcome: Outcome::Satisfiable {
                iterations: 2,
                solution_time: 0.4,
            },
            total_time: 1.0,
        };
        let stamp = BatchStamp::from_parts("2022-01-17", "10:00:00");
        ExperimentResult::new(&stamp, "d.pddl", problem, &metrics, "log")
    }

    #[test]
    fn test_store_default() {
        let store = MemoryResultStore::new();
        assert!(store.is_empty());
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn test_store_append_outcomes() {
        let mut store = MemoryResultStore::new();
        let stamp = BatchStamp::from_parts("2022-01-17", "10:00:00");

        store
            .append_outcome(&RunOutcome::Completed(result("p1.pddl")))
            .unwrap();
        store
            .append_outcome(&RunOutcome::Completed(result("p2.pddl")))
            .unwrap();
        store
            .append_outcome(&RunOutcome::Failed(FailedRun::new(
                &stamp,
                "d.pddl",
                "p1.pddl",
                FailureKind::Timeout,
                "killed",
            )))
            .unwrap();
        store.commit().unwrap();

        assert_eq!(store.results().len(), 2);
        assert_eq!(store.failures().len(), 1);
        assert_eq!(store.results()[0].problem_path(), "p1.pddl");
        assert_eq!(store.failures()[0].problem_path(), "p1.pddl");
        assert_eq!(store.commit_count(), 1);
    }
}
