use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;

use super::{RunReport, TestStatus};

/// One stored run, as listed by [`ReportStore::recent_runs`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub id: i64,
    pub suite: String,
    pub started_at: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub duration_ms: u64,
}

/// One stored test row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCase {
    pub name: String,
    pub status: String,
    pub duration_ms: u64,
    pub message: Option<String>,
}

/// SQLite persistence for run reports.
pub struct ReportStore {
    conn: Connection,
}

impl ReportStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS runs (
               id INTEGER PRIMARY KEY AUTOINCREMENT,
               suite TEXT NOT NULL,
               started_at INTEGER NOT NULL,
               total INTEGER NOT NULL,
               passed INTEGER NOT NULL,
               failed INTEGER NOT NULL,
               errored INTEGER NOT NULL,
               duration_ms INTEGER NOT NULL,
               report_json TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS test_cases (
               run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
               position INTEGER NOT NULL,
               name TEXT NOT NULL,
               status TEXT NOT NULL,
               duration_ms INTEGER NOT NULL,
               message TEXT,
               PRIMARY KEY (run_id, position)
             );",
        )?;
        Ok(Self { conn })
    }

    /// Store a run and its test rows; returns the run id.
    pub fn save_run(&self, report: &RunReport) -> Result<i64> {
        let report_json = serde_json::to_string(report)?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO runs (suite, started_at, total, passed, failed, errored, duration_ms, report_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                report.suite,
                to_i64(report.started_at),
                to_i64(report.total as u64),
                to_i64(report.passed as u64),
                to_i64(report.failed as u64),
                to_i64(report.errored as u64),
                to_i64(report.duration_ms),
                report_json,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        for (position, test) in report.tests.iter().enumerate() {
            let message = if test.status == TestStatus::Passed {
                None
            } else {
                let failures: Vec<&str> = test
                    .steps
                    .iter()
                    .filter(|step| step.level.is_problem())
                    .map(|step| step.message.as_str())
                    .collect();
                Some(failures.join("\n"))
            };
            tx.execute(
                "INSERT INTO test_cases (run_id, position, name, status, duration_ms, message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    run_id,
                    to_i64(position as u64),
                    test.name,
                    test.status.as_str(),
                    to_i64(test.duration_ms),
                    message,
                ],
            )?;
        }

        tx.commit()?;
        Ok(run_id)
    }

    /// Most recent runs first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<StoredRun>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, suite, started_at, total, passed, failed, errored, duration_ms
             FROM runs ORDER BY id DESC LIMIT ?1;",
        )?;
        let rows = stmt.query_map(params![to_i64(limit as u64)], |row| {
            Ok(StoredRun {
                id: row.get(0)?,
                suite: row.get(1)?,
                started_at: from_i64(row.get(2)?),
                total: from_i64(row.get(3)?) as usize,
                passed: from_i64(row.get(4)?) as usize,
                failed: from_i64(row.get(5)?) as usize,
                errored: from_i64(row.get(6)?) as usize,
                duration_ms: from_i64(row.get(7)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn cases(&self, run_id: i64) -> Result<Vec<StoredCase>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, status, duration_ms, message FROM test_cases
             WHERE run_id = ?1 ORDER BY position;",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(StoredCase {
                name: row.get(0)?,
                status: row.get(1)?,
                duration_ms: from_i64(row.get(2)?),
                message: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Full report as it was saved.
    pub fn load_report(&self, run_id: i64) -> Result<Option<RunReport>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT report_json FROM runs WHERE id = ?1 LIMIT 1;",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_i64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
