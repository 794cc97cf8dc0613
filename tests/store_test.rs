//! SQLite result store: round-trips, durability, append-only behaviour

use smtbench::experiment::{
    BatchStamp, ExperimentResult, FailedRun, FailureKind, ResultStore, SqliteResultStore,
};
use smtbench::extract::MetricExtractor;

fn result(problem: &str, log: &str) -> ExperimentResult {
    let metrics = MetricExtractor::new().extract(log).unwrap();
    let stamp = BatchStamp::from_parts("2022-01-17", "13:45:10");
    ExperimentResult::new(&stamp, "domain.pddl", problem, &metrics, log)
}

#[test]
fn test_round_trip_preserves_every_field() {
    let sat = result(
        "p1.pddl",
        "Grounded: 0.1\nAlgebra: 0.05\nSAT\nIterations: 4\nSAT Solution: 1.23\nTotal time: 1.5",
    );
    let unsat = result("p2.pddl", "UNSAT\nTimeout at 20\nTotal time: 12.5\n");

    let mut store = SqliteResultStore::open_in_memory().unwrap();
    store.append(&sat).unwrap();
    store.append(&unsat).unwrap();
    store.commit().unwrap();

    let stored = store.results().unwrap();
    assert_eq!(stored, vec![sat, unsat]);
    assert_eq!(stored[1].grounded_time(), None);
}

#[test]
fn test_raw_log_kept_verbatim() {
    let mut log = String::from("Grounded: 0.1\r\n\tSAT  \nIterations: 2\nSAT Solution: 0.5\n");
    log.push_str("unicode: λ → ✓\n");
    log.push_str(&"x".repeat(200_000));
    log.push_str("\nTotal time: 3.25\n\n");

    let appended = result("big.pddl", &log);
    let mut store = SqliteResultStore::open_in_memory().unwrap();
    store.append(&appended).unwrap();
    store.commit().unwrap();

    let stored = store.results().unwrap();
    assert_eq!(stored[0].raw_log(), log);
    assert_eq!(stored[0].raw_log().len(), log.len());
}

#[test]
fn test_committed_rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("conveyor.db");

    {
        let mut store = SqliteResultStore::open(&path).unwrap();
        store.append(&result("p1.pddl", "UNSAT\nTimeout at 3\nTotal time: 1")).unwrap();
        store.commit().unwrap();
    }

    // Second batch appends rather than replacing.
    {
        let mut store = SqliteResultStore::open(&path).unwrap();
        store.append(&result("p2.pddl", "UNSAT\nTimeout at 3\nTotal time: 2")).unwrap();
        store.commit().unwrap();
    }

    let store = SqliteResultStore::open(&path).unwrap();
    assert_eq!(store.result_count().unwrap(), 2);
    assert_eq!(store.path(), Some(path.as_path()));
}

#[test]
fn test_uncommitted_rows_are_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crash.db");

    {
        let mut store = SqliteResultStore::open(&path).unwrap();
        store.append(&result("p1.pddl", "UNSAT\nTimeout at 3\nTotal time: 1")).unwrap();
        // dropped without commit
    }

    let store = SqliteResultStore::open(&path).unwrap();
    assert_eq!(store.result_count().unwrap(), 0);
}

#[test]
fn test_failed_runs_stored_separately() {
    let stamp = BatchStamp::from_parts("2022-01-17", "13:45:10");
    let failed = FailedRun::new(
        &stamp,
        "domain.pddl",
        "p3.pddl",
        FailureKind::Extraction,
        "required marker `Total time:` (total_time) not found in planner output",
    )
    .with_exit_code(Some(0))
    .with_raw_log("Grounded: 0.1\nSAT\n");

    let mut store = SqliteResultStore::open_in_memory().unwrap();
    store.append_failure(&failed).unwrap();
    store.commit().unwrap();

    assert_eq!(store.result_count().unwrap(), 0);
    assert_eq!(store.failures().unwrap(), vec![failed]);
}
