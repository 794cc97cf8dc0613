//! CLI exit codes and end-to-end runs
#![cfg(unix)]

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{config_yaml, experiment_dir, stub_planner, SAT_LOG};
use smtbench::experiment::SqliteResultStore;

fn smtbench() -> Command {
    let mut cmd = Command::cargo_bin("smtbench").unwrap();
    cmd.env_remove("SMTBENCH_PLANNER")
        .env_remove("SMTBENCH_EXPERIMENTS")
        .env_remove("SMTBENCH_DATABASES")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_missing_planner_exits_one() {
    let root = tempfile::tempdir().unwrap();
    experiment_dir(root.path(), "conveyor", &config_yaml("conveyor", 1), &["p1.pddl"]);

    smtbench()
        .arg("--planner")
        .arg(root.path().join("no-such-planner"))
        .arg("--experiments-dir")
        .arg(root.path())
        .arg("--database-dir")
        .arg(root.path().join("db"))
        .args(["run", "conveyor"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("was not found"));

    assert!(!root.path().join("db").exists());
}

#[test]
fn test_missing_config_key_exits_one() {
    let root = tempfile::tempdir().unwrap();
    let planner = stub_planner(root.path(), SAT_LOG, 0);
    let config = config_yaml("conveyor", 1).replace("upper_bound: 20\n", "");
    experiment_dir(root.path(), "conveyor", &config, &["p1.pddl"]);

    smtbench()
        .arg("--planner")
        .arg(&planner)
        .arg("--experiments-dir")
        .arg(root.path())
        .args(["run", "conveyor"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing config \"upper_bound\""));
}

#[test]
fn test_run_experiment_writes_database() {
    let root = tempfile::tempdir().unwrap();
    let planner = stub_planner(root.path(), SAT_LOG, 0);
    let experiments = root.path().join("experiments");
    experiment_dir(&experiments, "conveyor", &config_yaml("conveyor", 3), &["p1.pddl", "p2.pddl"]);
    let databases = root.path().join("databases");

    smtbench()
        .arg("--planner")
        .arg(&planner)
        .arg("--experiments-dir")
        .arg(&experiments)
        .arg("--database-dir")
        .arg(&databases)
        .args(["run", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 completed, 0 failed"));

    let store = SqliteResultStore::open(databases.join("conveyor.db")).unwrap();
    let results = store.results().unwrap();
    assert_eq!(results.len(), 6);
    assert!(results[0].problem_path().ends_with("p1.pddl"));
    assert!(results[5].problem_path().ends_with("p2.pddl"));
    assert!(results.iter().all(|r| r.raw_log() == SAT_LOG));
}

#[test]
fn test_failed_runs_still_exit_zero() {
    let root = tempfile::tempdir().unwrap();
    let planner = stub_planner(root.path(), "Grounded: 0.1\n", 0);
    experiment_dir(root.path(), "conveyor", &config_yaml("conveyor", 1), &["p1.pddl"]);

    smtbench()
        .arg("--planner")
        .arg(&planner)
        .arg("--experiments-dir")
        .arg(root.path())
        .arg("--database-dir")
        .arg(root.path().join("db"))
        .args(["run", "conveyor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 completed, 1 failed"));

    let store = SqliteResultStore::open(root.path().join("db").join("conveyor.db")).unwrap();
    assert_eq!(store.failures().unwrap().len(), 1);
}

#[test]
fn test_list_experiments() {
    let root = tempfile::tempdir().unwrap();
    experiment_dir(root.path(), "alpha", &config_yaml("a", 1), &[]);
    experiment_dir(root.path(), "beta", &config_yaml("b", 1), &[]);

    smtbench()
        .arg("--experiments-dir")
        .arg(root.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0: ").and(predicate::str::contains("alpha")))
        .stdout(predicate::str::contains("1: ").and(predicate::str::contains("beta")));
}

#[test]
fn test_run_single_json_and_log() {
    let root = tempfile::tempdir().unwrap();
    let planner = stub_planner(root.path(), SAT_LOG, 0);
    let db = root.path().join("single.db");

    let output = smtbench()
        .arg("--planner")
        .arg(&planner)
        .args(["run-single", "--domain", "d.pddl", "--problem", "p.pddl", "--runs", "2"])
        .arg("--database")
        .arg(&db)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["batch"]["outcomes"].as_array().unwrap().len(), 2);
    assert_eq!(report["batch"]["outcomes"][0]["status"], "completed");

    let store = SqliteResultStore::open(&db).unwrap();
    assert_eq!(store.result_count().unwrap(), 2);
}

#[test]
fn test_run_single_verbose_prints_last_log() {
    let root = tempfile::tempdir().unwrap();
    let planner = stub_planner(root.path(), SAT_LOG, 0);

    smtbench()
        .arg("--planner")
        .arg(&planner)
        .arg("--database-dir")
        .arg(root.path().join("db"))
        .args(["run-single", "--domain", "d.pddl", "--problem", "p.pddl", "--runs", "1", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SAT Solution: 1.23"));
}
