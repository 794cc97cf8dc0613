//! Experiment directory layout
//!
//! ```text
//! experiments/
//!   conveyor/
//!     config.yaml
//!     conveyor_domain_transfer.pddl   <- domain (named by config)
//!     conveyor_p1.pddl                <- problems: every other .pddl
//!     conveyor_p2.pddl
//! ```

use std::path::{Path, PathBuf};

use crate::config::{ExperimentConfig, CONFIG_FILENAME};
use crate::{Error, Result};

/// Subdirectories of `experiments_dir`, sorted by path.
///
/// # Errors
///
/// Returns error if the directory cannot be read.
pub fn list_experiments<P: AsRef<Path>>(experiments_dir: P) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(experiments_dir.as_ref())? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Find an experiment by list index, directory name, or path.
///
/// # Errors
///
/// Returns [`Error::ExperimentNotFound`] if nothing matches.
pub fn resolve_experiment<P: AsRef<Path>>(experiments_dir: P, selector: &str) -> Result<PathBuf> {
    let direct = Path::new(selector);
    if direct.is_dir() && direct.join(CONFIG_FILENAME).is_file() {
        return Ok(direct.to_path_buf());
    }

    let dirs = list_experiments(experiments_dir)?;
    if let Ok(index) = selector.parse::<usize>() {
        return dirs.get(index).cloned().ok_or_else(|| {
            Error::ExperimentNotFound(format!(
                "invalid selection {index} ({} experiments available)",
                dirs.len()
            ))
        });
    }

    dirs.into_iter()
        .find(|dir| dir.file_name().is_some_and(|name| name == selector))
        .ok_or_else(|| Error::ExperimentNotFound(selector.to_string()))
}

/// A loaded experiment directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    dir: PathBuf,
    config: ExperimentConfig,
}

impl Experiment {
    /// Load `config.yaml` from an experiment directory.
    ///
    /// # Errors
    ///
    /// Returns error if the config is missing, unreadable, or invalid.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let config = ExperimentConfig::load(dir.join(CONFIG_FILENAME))?;
        Ok(Self { dir, config })
    }

    /// Experiment directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parsed config.
    #[must_use]
    pub const fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Path of the domain file.
    #[must_use]
    pub fn domain_path(&self) -> PathBuf {
        self.dir.join(self.config.domain_file_name())
    }

    /// Every `.pddl` in the directory except the domain, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the domain file is missing,
    /// or an IO error if the directory cannot be read.
    pub fn problem_paths(&self) -> Result<Vec<PathBuf>> {
        let domain = self.domain_path();
        if !domain.is_file() {
            return Err(Error::ExperimentNotFound(format!(
                "domain file {} does not exist",
                domain.display()
            )));
        }

        let mut problems = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_pddl = path.extension().is_some_and(|ext| ext == "pddl");
            if is_pddl && path.is_file() && path != domain {
                problems.push(path);
            }
        }
        problems.sort();
        Ok(problems)
    }
}
