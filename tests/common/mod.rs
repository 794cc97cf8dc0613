//! Shared fixtures: stub planners and experiment directories

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const SAT_LOG: &str =
    "Grounded: 0.1\nAlgebra: 0.05\nSAT\nIterations: 4\nSAT Solution: 1.23\nTotal time: 1.5";

pub const UNSAT_LOG: &str = "Grounded: 0.2\nAlgebra: 0.07\nUNSAT\nTimeout at 20\nTotal time: 12.5";

/// Write an executable shell script that prints `stdout` verbatim, appends
/// its arguments to `<dir>/calls.txt`, and exits with `exit_code`.
#[cfg(unix)]
pub fn stub_planner(dir: &Path, stdout: &str, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let out = dir.join("planner_stdout.txt");
    std::fs::write(&out, stdout).unwrap();
    let calls = dir.join("calls.txt");

    let script = dir.join("SMTPlanExpt");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\ncat '{}'\nexit {exit_code}\n",
            calls.display(),
            out.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Argument lines recorded by [`stub_planner`].
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.txt"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Create `<root>/<name>/` with a config, a domain and the given problems.
pub fn experiment_dir(root: &Path, name: &str, config: &str, problems: &[&str]) -> PathBuf {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.yaml"), config).unwrap();
    std::fs::write(dir.join("domain.pddl"), "(define (domain conveyor))").unwrap();
    for problem in problems {
        std::fs::write(dir.join(problem), "(define (problem p))").unwrap();
    }
    dir
}

pub fn config_yaml(database: &str, runs: u32) -> String {
    format!(
        "name: conveyor\ndomain: domain\nupper_bound: 20\ndatabase: {database}\nnum_runs_per_expt: {runs}\nverbose: true\n"
    )
}
