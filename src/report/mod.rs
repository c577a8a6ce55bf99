//! # Run Reports
//!
//! Each executed test gets a [`TestLog`] with its steps and final status; a
//! [`RunReport`] collects them with pass/fail totals. Reports serialize to
//! JSON (see [`crate::storage`]) and can be persisted to SQLite through
//! [`store::ReportStore`].

pub mod store;

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::testing::AssertionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepLevel {
    Info,
    Pass,
    Fail,
    Error,
}

impl StepLevel {
    /// Failing and errored steps.
    pub fn is_problem(self) -> bool {
        matches!(self, StepLevel::Fail | StepLevel::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStep {
    pub level: StepLevel,
    pub message: String,
}

/// Log of one executed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestLog {
    pub name: String,
    pub description: String,
    pub started_at: u64,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub steps: Vec<LogStep>,
    pub assertions: Vec<AssertionResult>,
}

impl TestLog {
    pub fn start_test(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            started_at: current_unix_timestamp(),
            status: TestStatus::Passed,
            duration_ms: 0,
            steps: Vec::new(),
            assertions: Vec::new(),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(StepLevel::Info, message.into());
    }

    pub fn pass(&mut self, message: impl Into<String>) {
        self.push(StepLevel::Pass, message.into());
    }

    /// Record a failing step; the test is marked failed.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.push(StepLevel::Fail, message.into());
        if self.status == TestStatus::Passed {
            self.status = TestStatus::Failed;
        }
    }

    /// Record an infrastructure error; the test is marked errored.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(StepLevel::Error, message.into());
        self.status = TestStatus::Error;
    }

    fn push(&mut self, level: StepLevel, message: String) {
        match level {
            StepLevel::Fail | StepLevel::Error => warn!(test = %self.name, "{message}"),
            StepLevel::Info | StepLevel::Pass => info!(test = %self.name, "{message}"),
        }
        self.steps.push(LogStep { level, message });
    }
}

/// Summary report for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub suite: String,
    pub started_at: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub duration_ms: u64,
    pub tests: Vec<TestLog>,
}

impl RunReport {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            started_at: current_unix_timestamp(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, log: TestLog) {
        self.total += 1;
        match log.status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Error => self.errored += 1,
        }
        self.tests.push(log);
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Percentage of passed tests; 100 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} total, {} passed, {} failed, {} errored ({:.1}%) in {} ms",
            self.suite,
            self.total,
            self.passed,
            self.failed,
            self.errored,
            self.success_rate(),
            self.duration_ms
        )
    }

    /// Plain-text rendering: one line per test, failure details indented.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for test in &self.tests {
            let _ = writeln!(
                out,
                "[{}] {} ({} ms)",
                test.status.as_str().to_ascii_uppercase(),
                test.name,
                test.duration_ms
            );
            for step in test.steps.iter().filter(|step| step.level.is_problem()) {
                for line in step.message.lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
        }
        out.push_str(&self.summary_line());
        out
    }
}

pub fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
