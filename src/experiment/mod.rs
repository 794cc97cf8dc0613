//! Experiment records and the result store
//!
//! ## Schema Overview
//!
//! ```text
//! BatchStamp (1) ──< RunOutcome (N)
//!                      ├── Completed(ExperimentResult) ──> experiments
//!                      └── Failed(FailedRun)           ──> failed_runs
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use smtbench::experiment::{BatchStamp, ExperimentResult, ResultStore, SqliteResultStore};
//! use smtbench::extract::MetricExtractor;
//!
//! let log = "UNSAT\nTimeout at 20\nTotal time: 12.5";
//! let metrics = MetricExtractor::new().extract(log).unwrap();
//! let result = ExperimentResult::new(&BatchStamp::now(), "domain.pddl", "p1.pddl", &metrics, log);
//!
//! let mut store = SqliteResultStore::open_in_memory().unwrap();
//! store.append(&result).unwrap();
//! store.commit().unwrap();
//!
//! assert_eq!(store.results().unwrap(), vec![result]);
//! ```

mod failed_run;
mod outcome;
mod result_record;
mod sqlite;
mod store;

pub use failed_run::{FailedRun, FailureKind};
pub use outcome::{Batch, RunOutcome};
pub use result_record::{BatchStamp, ExperimentResult};
pub use sqlite::SqliteResultStore;
pub use store::{MemoryResultStore, ResultStore};
