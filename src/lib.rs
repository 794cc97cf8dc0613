//! # smtbench: Benchmark Harness for the SMTPlan Planner
//!
//! Runs the planner repeatedly over the problems of an experiment, scrapes
//! timing and outcome metrics from its stdout, and appends one record per
//! run to a SQLite database for later analysis.
//!
//! ## Pipeline
//!
//! ```text
//! Orchestrator ──> PlannerProcess ──(stdout)──> MetricExtractor ──> ExperimentResult ──> ResultStore
//! ```
//!
//! - [`planner`]: launches `<planner> <domain> <problem> -u <bound>` and captures stdout
//! - [`extract`]: marker-based metric scraping (`Grounded:`, `Total time:`, ...)
//! - [`orchestrator`]: one-run and batch operations under a shared batch stamp
//! - [`experiment`]: result records and the append-only store
//! - [`config`], [`discover`], [`session`]: experiment directories and end-to-end flows
//!
//! ## Example
//!
//! ```rust,no_run
//! use smtbench::experiment::SqliteResultStore;
//! use smtbench::orchestrator::Orchestrator;
//! use smtbench::planner::{PlannerProcess, PlannerSettings};
//!
//! let planner = PlannerProcess::new(PlannerSettings::new("../SMTPlan/build/SMTPlanExpt"))?;
//! let mut store = SqliteResultStore::open("databases/conveyor.db")?;
//!
//! let orchestrator = Orchestrator::new(planner);
//! let batch = orchestrator.run_batch_into(
//!     &mut store,
//!     "conveyor_domain_transfer.pddl",
//!     &["conveyor_p1.pddl", "conveyor_p2.pddl"],
//!     5,     // repetitions per problem
//!     20,    // planner bound
//!     true,  // verbose
//! )?;
//! println!("{} runs, {} failed", batch.len(), batch.failure_count());
//! # Ok::<(), smtbench::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod discover;
pub mod error;
pub mod experiment;
pub mod extract;
pub mod orchestrator;
pub mod planner;
pub mod session;

pub use error::{Error, Result};
