//! SQLite-backed result store
//!
//! Schema (one database file per experiment, shared across batches):
//!
//! ```text
//! experiments(domain, problem, date, time, sat, grounded_time, algebra_time,
//!             sol_time, iterations, timeout, total_time, log)
//! failed_runs(domain, problem, date, time, kind, reason, exit_code, log)
//! ```
//!
//! Appends go into one open transaction that is committed by
//! [`ResultStore::commit`]. A crash before that loses the uncommitted batch.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use super::{BatchStamp, ExperimentResult, FailedRun, FailureKind, ResultStore};
use crate::{Error, Result};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS experiments
    (domain TEXT, problem TEXT, date TEXT, time TEXT,
     sat INTEGER, grounded_time REAL, algebra_time REAL, sol_time REAL,
     iterations INTEGER, timeout INTEGER, total_time REAL, log TEXT);
CREATE TABLE IF NOT EXISTS failed_runs
    (domain TEXT, problem TEXT, date TEXT, time TEXT,
     kind TEXT, reason TEXT, exit_code INTEGER, log TEXT);
";

/// Result store on a single SQLite connection.
pub struct SqliteResultStore {
    conn: Connection,
    path: Option<PathBuf>,
    in_transaction: bool,
}

impl std::fmt::Debug for SqliteResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteResultStore")
            .field("path", &self.path)
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

impl SqliteResultStore {
    /// Open (or create) a database file and ensure the tables exist.
    ///
    /// Parent directories are created if missing.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or the schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened result database");
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns error if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            path,
            in_transaction: false,
        })
    }

    /// Database file, `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn begin_if_needed(&mut self) -> Result<()> {
        if !self.in_transaction {
            self.conn.execute_batch("BEGIN")?;
            self.in_transaction = true;
        }
        Ok(())
    }

    /// All stored results in insertion order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub fn results(&self) -> Result<Vec<ExperimentResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT domain, problem, date, time, sat, grounded_time, algebra_time, \
             sol_time, iterations, timeout, total_time, log \
             FROM experiments ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ExperimentResult::from_row(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get::<_, i64>(4)? != 0,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
                row.get(10)?,
                row.get(11)?,
            ))
        })?;
        let results = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(results)
    }

    /// All stored failed runs in insertion order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails or a row carries an unknown failure kind.
    pub fn failures(&self) -> Result<Vec<FailedRun>> {
        let mut stmt = self.conn.prepare(
            "SELECT domain, problem, date, time, kind, reason, exit_code, log \
             FROM failed_runs ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<i32>>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut failures = Vec::new();
        for row in rows {
            let (domain, problem, date, time, kind, reason, exit_code, log) = row?;
            let kind = FailureKind::parse(&kind)
                .ok_or_else(|| Error::Other(format!("unknown failure kind in store: {kind}")))?;
            let stamp = BatchStamp::from_parts(date, time);
            failures.push(
                FailedRun::new(&stamp, domain, problem, kind, reason)
                    .with_exit_code(exit_code)
                    .with_raw_log(log),
            );
        }
        Ok(failures)
    }

    /// Number of rows in `experiments`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub fn result_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM experiments", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|e| Error::Other(e.to_string()))
    }
}

impl ResultStore for SqliteResultStore {
    fn append(&mut self, result: &ExperimentResult) -> Result<()> {
        self.begin_if_needed()?;
        self.conn.execute(
            "INSERT INTO experiments VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                result.domain_path(),
                result.problem_path(),
                result.run_date(),
                result.run_time(),
                i64::from(result.satisfiable()),
                result.grounded_time(),
                result.algebra_time(),
                result.solution_time(),
                result.iterations(),
                result.timeout_bound(),
                result.total_time(),
                result.raw_log(),
            ],
        )?;
        Ok(())
    }

    fn append_failure(&mut self, failed: &FailedRun) -> Result<()> {
        self.begin_if_needed()?;
        self.conn.execute(
            "INSERT INTO failed_runs VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                failed.domain_path(),
                failed.problem_path(),
                failed.run_date(),
                failed.run_time(),
                failed.kind().as_str(),
                failed.reason(),
                failed.exit_code(),
                failed.raw_log(),
            ],
        )?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_transaction {
            self.conn.execute_batch("COMMIT")?;
            self.in_transaction = false;
            tracing::debug!(path = ?self.path, "committed result database");
        }
        Ok(())
    }
}
