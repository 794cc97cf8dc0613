//! Run orchestration: planner invocation + metric extraction
//!
//! An [`Orchestrator`] stamps every run it performs with the date/time at
//! which it was built. Runs are strictly sequential: one planner process is
//! started, awaited, and its output parsed before the next begins.
//!
//! A run never aborts the batch. Spawn errors, timeouts, non-zero exits and
//! unparsable output all become [`RunOutcome::Failed`] records carrying
//! whatever the planner printed.

use crate::experiment::{
    Batch, BatchStamp, ExperimentResult, FailedRun, FailureKind, ResultStore, RunOutcome,
};
use crate::extract::MetricExtractor;
use crate::planner::Planner;
use crate::Result;

/// Progress narration: `info` when verbose, `debug` otherwise.
macro_rules! narrate {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Runs experiments against one planner under one batch stamp.
#[derive(Debug)]
pub struct Orchestrator<P> {
    planner: P,
    extractor: MetricExtractor,
    stamp: BatchStamp,
}

impl<P: Planner> Orchestrator<P> {
    /// Build an orchestrator stamped with the current local time.
    #[must_use]
    pub fn new(planner: P) -> Self {
        Self::with_stamp(planner, BatchStamp::now())
    }

    /// Build an orchestrator with an explicit batch stamp.
    #[must_use]
    pub fn with_stamp(planner: P, stamp: BatchStamp) -> Self {
        Self {
            planner,
            extractor: MetricExtractor::new(),
            stamp,
        }
    }

    /// Stamp shared by every outcome of this orchestrator.
    #[must_use]
    pub const fn stamp(&self) -> &BatchStamp {
        &self.stamp
    }

    /// Underlying planner.
    #[must_use]
    pub const fn planner(&self) -> &P {
        &self.planner
    }

    /// Run the planner once and turn its output into an outcome.
    pub fn run_experiment(
        &self,
        domain_path: &str,
        problem_path: &str,
        bound: u32,
        verbose: bool,
    ) -> RunOutcome {
        let failed = |kind: FailureKind, reason: String| {
            tracing::warn!(problem = problem_path, %kind, %reason, "run failed");
            FailedRun::new(&self.stamp, domain_path, problem_path, kind, reason)
        };

        let output = match self.planner.run(domain_path, problem_path, bound) {
            Ok(output) => output,
            Err(err) => return RunOutcome::Failed(failed(FailureKind::Spawn, err.to_string())),
        };

        if output.timed_out {
            return RunOutcome::Failed(
                failed(FailureKind::Timeout, "planner exceeded timeout".to_string())
                    .with_exit_code(output.exit_code)
                    .with_raw_log(output.stdout),
            );
        }

        if !output.success() {
            let reason = output.exit_code.map_or_else(
                || "planner terminated by signal".to_string(),
                |code| format!("planner exited with status {code}"),
            );
            return RunOutcome::Failed(
                failed(FailureKind::ExitStatus, reason)
                    .with_exit_code(output.exit_code)
                    .with_raw_log(output.stdout),
            );
        }

        let metrics = match self.extractor.extract(&output.stdout) {
            Ok(metrics) => metrics,
            Err(err) => {
                return RunOutcome::Failed(
                    failed(FailureKind::Extraction, err.to_string())
                        .with_exit_code(output.exit_code)
                        .with_raw_log(output.stdout),
                )
            }
        };

        narrate!(
            verbose,
            grounded_time = ?metrics.grounded_time,
            algebra_time = ?metrics.algebra_time,
            sat = metrics.satisfiable(),
            "captured values"
        );
        if metrics.satisfiable() {
            narrate!(
                verbose,
                solution_time = metrics.solution_time(),
                iterations = metrics.iterations(),
                "solution found"
            );
        } else {
            narrate!(
                verbose,
                max_iterations = metrics.timeout_bound(),
                "no solution within bound"
            );
        }
        narrate!(verbose, total_time = metrics.total_time, "run finished");

        RunOutcome::Completed(ExperimentResult::new(
            &self.stamp,
            domain_path,
            problem_path,
            &metrics,
            output.stdout,
        ))
    }

    /// Run every problem `repetitions` times, problem-major.
    pub fn run_batch<S: AsRef<str>>(
        &self,
        domain_path: &str,
        problem_paths: &[S],
        repetitions: u32,
        bound: u32,
        verbose: bool,
    ) -> Batch {
        self.runs(domain_path, problem_paths, repetitions, bound, verbose)
            .collect()
    }

    /// Like [`Self::run_batch`], appending each outcome to `store` as it
    /// arrives and committing once after the last run.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects a write or the commit; runs
    /// already appended stay uncommitted in that case.
    pub fn run_batch_into<S, R>(
        &self,
        store: &mut R,
        domain_path: &str,
        problem_paths: &[S],
        repetitions: u32,
        bound: u32,
        verbose: bool,
    ) -> Result<Batch>
    where
        S: AsRef<str>,
        R: ResultStore + ?Sized,
    {
        let mut batch = Batch::new();
        for outcome in self.runs(domain_path, problem_paths, repetitions, bound, verbose) {
            store.append_outcome(&outcome)?;
            batch.push(outcome);
        }
        store.commit()?;
        tracing::info!(
            runs = batch.len(),
            failed = batch.failure_count(),
            date = self.stamp.date(),
            time = self.stamp.time(),
            "batch committed"
        );
        Ok(batch)
    }

    /// Lazily run each (problem, repetition) pair in order.
    fn runs<'a, S: AsRef<str>>(
        &'a self,
        domain_path: &'a str,
        problem_paths: &'a [S],
        repetitions: u32,
        bound: u32,
        verbose: bool,
    ) -> impl Iterator<Item = RunOutcome> + 'a {
        problem_paths.iter().flat_map(move |problem| {
            let problem = problem.as_ref();
            narrate!(verbose, problem, "running problem");
            (0..repetitions).map(move |run| {
                narrate!(verbose, run, "run");
                self.run_experiment(domain_path, problem, bound, verbose)
            })
        })
    }
}
