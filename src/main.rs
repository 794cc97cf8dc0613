//! `smtbench` command line
//!
//! Exit status is 1 for any fatal error (planner missing, config key
//! missing, database unusable) and 0 once a batch is committed, even if
//! some runs in it failed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smtbench::config::{HarnessSettings, DEFAULT_PLANNER};
use smtbench::discover::{list_experiments, resolve_experiment, Experiment};
use smtbench::planner::PlannerSettings;
use smtbench::session::{run_experiment_dir, run_single, SessionReport, SingleRun};

#[derive(Debug, Parser)]
#[command(name = "smtbench", version, about = "SMTPlan experiment benchmarker")]
struct Cli {
    /// Planner executable
    #[arg(long, env = "SMTBENCH_PLANNER", default_value = DEFAULT_PLANNER, global = true)]
    planner: PathBuf,

    /// Directory with one subdirectory per experiment
    #[arg(long, env = "SMTBENCH_EXPERIMENTS", default_value = "experiments", global = true)]
    experiments_dir: PathBuf,

    /// Directory for result databases
    #[arg(long, env = "SMTBENCH_DATABASES", default_value = "databases", global = true)]
    database_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available experiments
    List,

    /// Run a configured experiment (by index, name, or path)
    Run {
        experiment: String,

        /// Print the session report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Repeat one domain/problem pair
    RunSingle {
        #[arg(long)]
        domain: PathBuf,

        #[arg(long)]
        problem: PathBuf,

        /// Repetitions
        #[arg(long, default_value_t = 5)]
        runs: u32,

        /// Planner search bound
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        bound: u32,

        /// Database file (default: <database-dir>/expt_<timestamp>.db)
        #[arg(long)]
        database: Option<PathBuf>,

        /// Kill the planner after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Pass -v to the planner
        #[arg(long)]
        planner_verbose: bool,

        /// Narrate runs and print the last planner log
        #[arg(short, long)]
        verbose: bool,

        /// Print the session report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn print_report(report: &SessionReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("Experiment: {}", report.name);
    println!("Experiment date: {}", report.stamp.date());
    println!("Experiment time: {}", report.stamp.time());
    println!("Database: {}", report.database.display());
    println!(
        "Runs: {} completed, {} failed",
        report.completed(),
        report.failed()
    );
    for failed in report.batch.failures() {
        println!(
            "  FAILED {} [{}]: {}",
            failed.problem_path(),
            failed.kind(),
            failed.reason()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = HarnessSettings {
        planner: cli.planner,
        experiments_dir: cli.experiments_dir,
        database_dir: cli.database_dir,
    };

    match cli.command {
        Command::List => {
            let dirs = list_experiments(&settings.experiments_dir).with_context(|| {
                format!(
                    "reading experiments directory {}",
                    settings.experiments_dir.display()
                )
            })?;
            println!("Available experiments:");
            for (index, dir) in dirs.iter().enumerate() {
                println!("{index}: {}", dir.display());
            }
        }
        Command::Run { experiment, json } => {
            let dir = resolve_experiment(&settings.experiments_dir, &experiment)?;
            tracing::info!(dir = %dir.display(), "loading experiment");
            let experiment = Experiment::load(&dir)?;
            let report = run_experiment_dir(&settings, &experiment)?;
            print_report(&report, json)?;
        }
        Command::RunSingle {
            domain,
            problem,
            runs,
            bound,
            database,
            timeout_secs,
            planner_verbose,
            verbose,
            json,
        } => {
            let planner_settings = PlannerSettings::new(&settings.planner)
                .with_timeout(timeout_secs.map(Duration::from_secs))
                .with_planner_verbose(planner_verbose);
            let single = SingleRun {
                domain,
                problem,
                runs,
                bound,
                database,
                verbose,
            };
            let report = run_single(&settings, planner_settings, &single)?;
            print_report(&report, json)?;
            if verbose && !json {
                if let Some(last) = report.batch.last() {
                    println!("{}", last.raw_log());
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
