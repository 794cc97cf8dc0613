//! End-to-end sessions: configured experiment directory or ad-hoc problem
//!
//! Both flows follow the same order: locate the planner (fatal if missing),
//! open the result database, run the batch through an [`Orchestrator`], and
//! commit once at the end.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::config::HarnessSettings;
use crate::discover::Experiment;
use crate::experiment::{Batch, BatchStamp, SqliteResultStore};
use crate::orchestrator::Orchestrator;
use crate::planner::{PlannerProcess, PlannerSettings};
use crate::Result;

/// Ad-hoc repetition settings for a single problem.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleRun {
    /// Domain file
    pub domain: PathBuf,
    /// Problem file
    pub problem: PathBuf,
    /// Repetitions
    pub runs: u32,
    /// Planner search bound
    pub bound: u32,
    /// Database file; `None` picks a fresh timestamped name
    pub database: Option<PathBuf>,
    /// Narrate progress and metrics
    pub verbose: bool,
}

/// What a session did, for printing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    /// Experiment label
    pub name: String,
    /// Database the batch was committed to
    pub database: PathBuf,
    /// Batch stamp shared by every run
    pub stamp: BatchStamp,
    /// Every outcome, in run order
    pub batch: Batch,
}

impl SessionReport {
    /// Runs that produced a result.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.batch.results().count()
    }

    /// Runs that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.batch.failure_count()
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Run a configured experiment directory.
///
/// # Errors
///
/// Returns error if the planner is missing, the domain file is missing, or
/// the database cannot be opened or committed. Individual run failures are
/// recorded, not returned.
pub fn run_experiment_dir(settings: &HarnessSettings, experiment: &Experiment) -> Result<SessionReport> {
    let config = experiment.config();
    let planner = PlannerProcess::new(config.planner_settings(&settings.planner))?;

    let domain = experiment.domain_path();
    let problems: Vec<String> = experiment
        .problem_paths()?
        .iter()
        .map(|p| path_str(p))
        .collect();

    let database = settings.database_path(&config.database);
    let mut store = SqliteResultStore::open(&database)?;
    tracing::info!(database = %database.display(), "connected to database");

    let orchestrator = Orchestrator::new(planner);
    tracing::info!(
        name = %config.name,
        problems = problems.len(),
        runs_per_problem = config.num_runs_per_expt,
        bound = config.upper_bound,
        "running experiment"
    );
    let batch = orchestrator.run_batch_into(
        &mut store,
        &path_str(&domain),
        &problems,
        config.num_runs_per_expt,
        config.upper_bound,
        config.verbose,
    )?;

    Ok(SessionReport {
        name: config.name.clone(),
        database,
        stamp: orchestrator.stamp().clone(),
        batch,
    })
}

/// Run one domain/problem pair repeatedly.
///
/// # Errors
///
/// Returns error if the planner is missing or the database cannot be
/// opened or committed.
pub fn run_single(
    settings: &HarnessSettings,
    planner_settings: PlannerSettings,
    single: &SingleRun,
) -> Result<SessionReport> {
    let planner = PlannerProcess::new(planner_settings)?;

    let database = single.database.clone().unwrap_or_else(|| {
        let name = format!("expt_{}", Local::now().format("%Y_%m_%d-%H:%M:%S"));
        settings.database_path(&name)
    });
    let mut store = SqliteResultStore::open(&database)?;

    let orchestrator = Orchestrator::new(planner);
    tracing::info!(
        date = orchestrator.stamp().date(),
        time = orchestrator.stamp().time(),
        domain = %single.domain.display(),
        problem = %single.problem.display(),
        runs = single.runs,
        "SMTPlan benchmark"
    );
    let batch = orchestrator.run_batch_into(
        &mut store,
        &path_str(&single.domain),
        &[path_str(&single.problem)],
        single.runs,
        single.bound,
        single.verbose,
    )?;

    Ok(SessionReport {
        name: path_str(&single.problem),
        database,
        stamp: orchestrator.stamp().clone(),
        batch,
    })
}
