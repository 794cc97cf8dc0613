//! Error types for smtbench
//!
//! Fatal errors (missing planner, broken config) abort the program.
//! Per-run problems (unparsable output, planner crashes) never surface here;
//! the orchestrator records them as failed runs instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// smtbench error types
#[derive(Error, Debug)]
pub enum Error {
    /// Planner executable missing or not executable (fatal, checked once at startup)
    #[error("Executable {} was not found", .0.display())]
    ExecutableNotFound(PathBuf),

    /// A required key is absent from an experiment's config.yaml
    #[error("Missing config \"{0}\" from config.yaml file")]
    MissingConfigKey(String),

    /// Config is present but a value is unusable
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Planner process could not be spawned or awaited
    #[error("Planner process error: {0}")]
    Process(String),

    /// Experiment directory layout is wrong (no domain file, unknown experiment)
    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    /// Result store error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

