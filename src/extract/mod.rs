//! Metric extraction from planner output
//!
//! The planner reports its progress as free text on stdout. Each metric is
//! found by searching for a fixed marker and reading the number right after
//! it:
//!
//! | Marker          | Metric          | Required                  |
//! |-----------------|-----------------|---------------------------|
//! | `Grounded:`     | grounding time  | no                        |
//! | `Algebra:`      | algebra time    | no                        |
//! | `SAT` (not `UNSAT`) | satisfiable | presence test             |
//! | `SAT Solution:` | solution time   | when satisfiable          |
//! | `Iterations:`   | iterations      | when satisfiable          |
//! | `Timeout at`    | timeout bound   | when not satisfiable      |
//! | `Total time:`   | total time      | always                    |
//!
//! ## Example
//!
//! ```rust
//! use smtbench::extract::{MetricExtractor, Outcome};
//!
//! let extractor = MetricExtractor::new();
//! let metrics = extractor
//!     .extract("Grounded: 0.1\nSAT\nIterations: 4\nSAT Solution: 1.23\nTotal time: 1.5")
//!     .unwrap();
//!
//! assert!(metrics.satisfiable());
//! assert_eq!(metrics.outcome, Outcome::Satisfiable { iterations: 4, solution_time: 1.23 });
//! assert_eq!(metrics.algebra_time, None);
//! ```

use regex::Regex;
use thiserror::Error;

/// Sentinel stored for integer and float metrics that do not apply to a run.
pub const SENTINEL: i64 = -1;

/// Float form of [`SENTINEL`].
#[allow(clippy::cast_precision_loss)]
pub const SENTINEL_F64: f64 = SENTINEL as f64;

/// Why a planner log could not be turned into metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A marker required for this outcome is not in the output.
    #[error("required marker `{marker}` ({field}) not found in planner output")]
    MissingMarker {
        /// Metric the marker reports
        field: &'static str,
        /// Marker text searched for
        marker: &'static str,
    },

    /// The marker is present but no number follows it.
    #[error("value after `{marker}` ({field}) is not a number: {value:?}")]
    MalformedValue {
        /// Metric the marker reports
        field: &'static str,
        /// Marker text searched for
        marker: &'static str,
        /// Text captured after the marker
        value: String,
    },
}

/// Branch-specific metrics, decided by whether the planner found a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Planner reported `SAT`.
    Satisfiable {
        /// Bound-search iterations consumed
        iterations: i64,
        /// Seconds to find the solution
        solution_time: f64,
    },
    /// No plan within the bound.
    Unsatisfiable {
        /// Iteration bound at which search was abandoned
        timeout_bound: i64,
    },
}

/// Everything scraped from one planner log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedMetrics {
    /// Grounding phase seconds, if reported
    pub grounded_time: Option<f64>,
    /// Algebra phase seconds, if reported
    pub algebra_time: Option<f64>,
    /// Satisfiable or timed-out branch
    pub outcome: Outcome,
    /// Total wall time reported by the planner
    pub total_time: f64,
}

impl ExtractedMetrics {
    /// Whether the planner reported a solution.
    #[must_use]
    pub const fn satisfiable(&self) -> bool {
        matches!(self.outcome, Outcome::Satisfiable { .. })
    }

    /// Iterations, or [`SENTINEL`] when unsatisfiable.
    #[must_use]
    pub const fn iterations(&self) -> i64 {
        match self.outcome {
            Outcome::Satisfiable { iterations, .. } => iterations,
            Outcome::Unsatisfiable { .. } => SENTINEL,
        }
    }

    /// Solution time, or [`SENTINEL_F64`] when unsatisfiable.
    #[must_use]
    pub const fn solution_time(&self) -> f64 {
        match self.outcome {
            Outcome::Satisfiable { solution_time, .. } => solution_time,
            Outcome::Unsatisfiable { .. } => SENTINEL_F64,
        }
    }

    /// Timeout bound, or [`SENTINEL`] when a solution was found.
    #[must_use]
    pub const fn timeout_bound(&self) -> i64 {
        match self.outcome {
            Outcome::Satisfiable { .. } => SENTINEL,
            Outcome::Unsatisfiable { timeout_bound } => timeout_bound,
        }
    }
}

/// One labelled marker search.
#[derive(Debug, Clone)]
struct Rule {
    field: &'static str,
    marker: &'static str,
    pattern: Regex,
}

impl Rule {
    fn new(field: &'static str, marker: &'static str) -> Self {
        let pattern = Regex::new(&format!(r"{}[ \t]*(\d*\.?\d*)", regex::escape(marker)))
            .expect("escaped marker is a valid regex");
        Self {
            field,
            marker,
            pattern,
        }
    }

    /// Text following the first occurrence of the marker, `None` if the marker is absent.
    fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn malformed(&self, value: &str) -> ExtractionError {
        ExtractionError::MalformedValue {
            field: self.field,
            marker: self.marker,
            value: value.to_string(),
        }
    }

    fn missing(&self) -> ExtractionError {
        ExtractionError::MissingMarker {
            field: self.field,
            marker: self.marker,
        }
    }

    fn float(&self, text: &str) -> Result<Option<f64>, ExtractionError> {
        self.capture(text)
            .map(|raw| raw.parse::<f64>().map_err(|_| self.malformed(raw)))
            .transpose()
    }

    fn integer(&self, text: &str) -> Result<Option<i64>, ExtractionError> {
        self.capture(text)
            .map(|raw| parse_integer(raw).ok_or_else(|| self.malformed(raw)))
            .transpose()
    }

    fn required_float(&self, text: &str) -> Result<f64, ExtractionError> {
        self.float(text)?.ok_or_else(|| self.missing())
    }

    fn required_integer(&self, text: &str) -> Result<i64, ExtractionError> {
        self.integer(text)?.ok_or_else(|| self.missing())
    }

    /// Optional metrics degrade to absent rather than failing the run.
    fn optional_float(&self, text: &str) -> Option<f64> {
        match self.float(text) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "ignoring optional metric");
                None
            }
        }
    }
}

/// 2^63, the first integral `f64` past `i64::MAX`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Accepts `7` and integral decimals such as `7.0`; values outside `i64`
/// are rejected rather than saturated.
#[allow(clippy::cast_possible_truncation)]
fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(v))
            .map(|v| v as i64)
    })
}

/// `SAT` anywhere in the text, as long as it is not the tail of `UNSAT`.
#[must_use]
pub fn reports_sat(text: &str) -> bool {
    text.match_indices("SAT")
        .any(|(idx, _)| !text[..idx].ends_with("UN"))
}

/// Compiled marker rules for planner output.
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    grounded: Rule,
    algebra: Rule,
    solution_time: Rule,
    iterations: Rule,
    timeout: Rule,
    total_time: Rule,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricExtractor {
    /// Compile the marker rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grounded: Rule::new("grounded_time", "Grounded:"),
            algebra: Rule::new("algebra_time", "Algebra:"),
            solution_time: Rule::new("solution_time", "SAT Solution:"),
            iterations: Rule::new("iterations", "Iterations:"),
            timeout: Rule::new("timeout_bound", "Timeout at"),
            total_time: Rule::new("total_time", "Total time:"),
        }
    }

    /// Scrape metrics from raw planner stdout.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] when `Total time:` is missing, or when a
    /// marker required by the satisfiable/unsatisfiable branch is missing
    /// or malformed.
    pub fn extract(&self, text: &str) -> Result<ExtractedMetrics, ExtractionError> {
        let outcome = if reports_sat(text) {
            Outcome::Satisfiable {
                iterations: self.iterations.required_integer(text)?,
                solution_time: self.solution_time.required_float(text)?,
            }
        } else {
            Outcome::Unsatisfiable {
                timeout_bound: self.timeout.required_integer(text)?,
            }
        };

        Ok(ExtractedMetrics {
            grounded_time: self.grounded.optional_float(text),
            algebra_time: self.algebra.optional_float(text),
            outcome,
            total_time: self.total_time.required_float(text)?,
        })
    }
}
