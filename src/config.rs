//! Experiment configuration
//!
//! Each experiment directory carries a `config.yaml`:
//!
//! ```yaml
//! name: conveyor
//! domain: conveyor_domain_transfer   # <domain>.pddl in the same directory
//! upper_bound: 20                    # planner -u bound
//! database: conveyor                 # <database_dir>/<database>.db
//! num_runs_per_expt: 5               # repetitions per problem
//! verbose: true
//! timeout_secs: 600                  # optional, kill hung planners
//! planner_verbose: false             # optional, pass -v to the planner
//! ```
//!
//! Harness-wide paths (planner executable, experiment and database
//! directories) live in [`HarnessSettings`], passed in explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::planner::PlannerSettings;
use crate::{Error, Result};

/// File name of the per-experiment config.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Keys that must be present in every `config.yaml`, in the order they are checked.
pub const REQUIRED_KEYS: [&str; 6] = [
    "name",
    "domain",
    "upper_bound",
    "database",
    "num_runs_per_expt",
    "verbose",
];

/// Default planner location, relative to the working directory.
pub const DEFAULT_PLANNER: &str = "../SMTPlan/build/SMTPlanExpt";

/// Parsed `config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment label
    pub name: String,
    /// Domain file stem (with or without `.pddl`)
    pub domain: String,
    /// Planner search bound
    #[serde(deserialize_with = "lenient::count")]
    pub upper_bound: u32,
    /// Database name, without `.db`
    pub database: String,
    /// Repetitions per problem
    #[serde(deserialize_with = "lenient::count")]
    pub num_runs_per_expt: u32,
    /// Narrate progress and metrics
    #[serde(deserialize_with = "lenient::flag")]
    pub verbose: bool,
    /// Kill the planner after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<f64>,
    /// Pass `-v` to the planner
    #[serde(default)]
    pub planner_verbose: bool,
}

impl ExperimentConfig {
    /// Parse and validate YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfigKey`] naming the first absent required
    /// key, [`Error::Yaml`] for malformed YAML or wrongly typed values, and
    /// [`Error::InvalidConfig`] for values out of range.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        let map = value
            .as_mapping()
            .ok_or_else(|| Error::InvalidConfig("config.yaml must be a mapping".to_string()))?;

        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
            return Err(Error::MissingConfigKey((*missing).to_string()));
        }

        let config: Self = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a `config.yaml` file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or fails [`Self::from_yaml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), name = %config.name, "loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.upper_bound == 0 {
            return Err(Error::InvalidConfig(
                "upper_bound must be a positive integer".to_string(),
            ));
        }
        if let Some(secs) = self.timeout_secs {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(Error::InvalidConfig(format!(
                    "timeout_secs must be a positive number of seconds, got {secs}"
                )));
            }
        }
        if self.domain.trim().is_empty() || self.database.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "domain and database must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Domain file name, adding `.pddl` when the config omits it.
    #[must_use]
    pub fn domain_file_name(&self) -> String {
        if Path::new(&self.domain)
            .extension()
            .is_some_and(|ext| ext == "pddl")
        {
            self.domain.clone()
        } else {
            format!("{}.pddl", self.domain)
        }
    }

    /// Configured planner timeout; `None` also for a value `validate` rejects.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Planner launch settings for this experiment.
    #[must_use]
    pub fn planner_settings(&self, executable: impl Into<PathBuf>) -> PlannerSettings {
        PlannerSettings::new(executable)
            .with_timeout(self.timeout())
            .with_planner_verbose(self.planner_verbose)
    }
}

/// Scalar forms older `config.yaml` files use: `verbose: 1`,
/// `upper_bound: "20"`.
mod lenient {
    use serde::de::{Deserializer, Error as _};
    use serde::Deserialize;
    use serde_yaml::Value;

    /// Non-negative integer given as a number, an integral float, or a numeric string.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(integral)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, got {value:?}")))
    }

    /// Boolean given as `true`/`false`, a number (non-zero is true), or a
    /// string such as `"yes"`, `"no"`, `"1"`, `"0"`.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.ok_or_else(|| D::Error::custom(format!("expected a boolean, got {value:?}")))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn integral(f: f64) -> u64 {
        f as u64
    }
}

/// Harness-wide locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSettings {
    /// Planner executable
    pub planner: PathBuf,
    /// Directory holding one subdirectory per experiment
    pub experiments_dir: PathBuf,
    /// Directory for result databases
    pub database_dir: PathBuf,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            planner: PathBuf::from(DEFAULT_PLANNER),
            experiments_dir: PathBuf::from("experiments"),
            database_dir: PathBuf::from("databases"),
        }
    }
}

impl HarnessSettings {
    /// `<database_dir>/<name>.db`
    #[must_use]
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.database_dir.join(format!("{name}.db"))
    }
}
