//! Experiment Result - one successful planner invocation

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::extract::ExtractedMetrics;

/// Date/time label shared by every run of one batch.
///
/// Captured once when the orchestrator is built, so a long batch is still
/// filed under the moment it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStamp {
    date: String,
    time: String,
}

impl BatchStamp {
    /// Stamp for the current local wall clock.
    #[must_use]
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    /// Stamp for a given instant, formatted `YYYY-MM-DD` / `HH:MM:SS`.
    #[must_use]
    pub fn at<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            date: instant.format("%Y-%m-%d").to_string(),
            time: instant.format("%H:%M:%S").to_string(),
        }
    }

    /// Build from already formatted parts (used when reading the store back).
    #[must_use]
    pub fn from_parts(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    /// `YYYY-MM-DD`
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// `HH:MM:SS`
    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }
}

/// Result of one planner invocation whose output could be fully parsed.
///
/// Fields that do not apply to the outcome hold the `-1` sentinel:
/// `solution_time` and `iterations` when unsatisfiable, `timeout_bound`
/// when satisfiable. Records are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    domain_path: String,
    problem_path: String,
    run_date: String,
    run_time: String,
    satisfiable: bool,
    grounded_time: Option<f64>,
    algebra_time: Option<f64>,
    solution_time: f64,
    iterations: i64,
    timeout_bound: i64,
    total_time: f64,
    raw_log: String,
}

impl ExperimentResult {
    /// Assemble a result from extracted metrics.
    ///
    /// # Arguments
    ///
    /// * `stamp` - Batch date/time label
    /// * `domain_path` - Domain file given to the planner
    /// * `problem_path` - Problem file given to the planner
    /// * `metrics` - Output of the metric extractor
    /// * `raw_log` - Planner stdout, kept verbatim
    #[must_use]
    pub fn new(
        stamp: &BatchStamp,
        domain_path: impl Into<String>,
        problem_path: impl Into<String>,
        metrics: &ExtractedMetrics,
        raw_log: impl Into<String>,
    ) -> Self {
        Self {
            domain_path: domain_path.into(),
            problem_path: problem_path.into(),
            run_date: stamp.date().to_string(),
            run_time: stamp.time().to_string(),
            satisfiable: metrics.satisfiable(),
            grounded_time: metrics.grounded_time,
            algebra_time: metrics.algebra_time,
            solution_time: metrics.solution_time(),
            iterations: metrics.iterations(),
            timeout_bound: metrics.timeout_bound(),
            total_time: metrics.total_time,
            raw_log: raw_log.into(),
        }
    }

    /// Rebuild a record from its stored columns.
    ///
    /// Only the result store should need this; the field order matches the
    /// `experiments` table.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_row(
        domain_path: String,
        problem_path: String,
        run_date: String,
        run_time: String,
        satisfiable: bool,
        grounded_time: Option<f64>,
        algebra_time: Option<f64>,
        solution_time: f64,
        iterations: i64,
        timeout_bound: i64,
        total_time: f64,
        raw_log: String,
    ) -> Self {
        Self {
            domain_path,
            problem_path,
            run_date,
            run_time,
            satisfiable,
            grounded_time,
            algebra_time,
            solution_time,
            iterations,
            timeout_bound,
            total_time,
            raw_log,
        }
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

    /// Batch date, `YYYY-MM-DD`.
    #[must_use]
    pub fn run_date(&self) -> &str {
        &self.run_date
    }

    /// Batch time, `HH:MM:SS`.
    #[must_use]
    pub fn run_time(&self) -> &str {
        &self.run_time
    }

    /// Whether the planner reported a solution.
    #[must_use]
    pub const fn satisfiable(&self) -> bool {
        self.satisfiable
    }

    /// Grounding phase seconds, if reported.
    #[must_use]
    pub const fn grounded_time(&self) -> Option<f64> {
        self.grounded_time
    }

    /// Algebra phase seconds, if reported.
    #[must_use]
    pub const fn algebra_time(&self) -> Option<f64> {
        self.algebra_time
    }

    /// Seconds to solution, `-1` when unsatisfiable.
    #[must_use]
    pub const fn solution_time(&self) -> f64 {
        self.solution_time
    }

    /// Iterations consumed, `-1` when unsatisfiable.
    #[must_use]
    pub const fn iterations(&self) -> i64 {
        self.iterations
    }

    /// Bound at which search gave up, `-1` when satisfiable.
    #[must_use]
    pub const fn timeout_bound(&self) -> i64 {
        self.timeout_bound
    }

    /// Total wall time reported by the planner.
    #[must_use]
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Full planner stdout.
    #[must_use]
    pub fn raw_log(&self) -> &str {
        &self.raw_log
    }
}
