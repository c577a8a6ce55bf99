use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use super::value::{CheckValue, Comparison};

/// One failed check.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    pub description: String,
    pub actual: CheckValue,
    /// `None` for boolean-only checks.
    pub expected: Option<CheckValue>,
    pub message: String,
}

impl AssertionFailure {
    pub fn new(
        description: &str,
        actual: CheckValue,
        expected: Option<CheckValue>,
        explanation: impl AsRef<str>,
    ) -> Self {
        let explanation = explanation.as_ref();
        let message = if description.is_empty() {
            explanation.to_string()
        } else {
            format!("{description}: {explanation}")
        };

        Self {
            description: description.to_string(),
            actual,
            expected,
            message,
        }
    }
}

/// Raised by the checkpoint when at least one check failed. The message lists
/// every recorded failure, one per line, in the order they were recorded.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", join_messages(.failures))]
pub struct AggregateFailure {
    failures: Vec<AssertionFailure>,
}

fn join_messages(failures: &[AssertionFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl AggregateFailure {
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_failures(self) -> Vec<AssertionFailure> {
        self.failures
    }
}

/// Collects check outcomes for one logical test case without stopping it.
///
/// Checks never fail at the call site. [`SoftAssertions::assert_all`] is the
/// only point where recorded failures surface, and it always leaves the
/// session empty.
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<AssertionFailure>,
}

impl SoftAssertions {
    pub fn new() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    pub fn assert_equals(
        &mut self,
        actual: impl Into<CheckValue>,
        expected: impl Into<CheckValue>,
        description: &str,
    ) {
        let actual = actual.into();
        let expected = expected.into();

        let explanation = match actual.compare(&expected) {
            Comparison::Equal => return,
            Comparison::NotEqual => format!("expected {expected} but got {actual}"),
            Comparison::Incompatible => format!(
                "expected {expected} ({}) but got {actual} ({})",
                expected.kind(),
                actual.kind()
            ),
        };
        self.record(AssertionFailure::new(
            description,
            actual,
            Some(expected),
            explanation,
        ));
    }

    pub fn assert_not_equals(
        &mut self,
        actual: impl Into<CheckValue>,
        unexpected: impl Into<CheckValue>,
        description: &str,
    ) {
        let actual = actual.into();
        let unexpected = unexpected.into();

        if actual.compare(&unexpected) == Comparison::Equal {
            let explanation = format!("expected a value other than {unexpected} but got {actual}");
            self.record(AssertionFailure::new(
                description,
                actual,
                Some(unexpected),
                explanation,
            ));
        }
    }

    pub fn assert_true(&mut self, condition: bool, description: &str) {
        if !condition {
            self.record(AssertionFailure::new(
                description,
                CheckValue::Bool(false),
                None,
                "expected true but got false",
            ));
        }
    }

    pub fn assert_false(&mut self, condition: bool, description: &str) {
        if condition {
            self.record(AssertionFailure::new(
                description,
                CheckValue::Bool(true),
                None,
                "expected false but got true",
            ));
        }
    }

    pub fn assert_contains(&mut self, haystack: &str, needle: &str, description: &str) {
        if !haystack.contains(needle) {
            let explanation = format!("expected a value containing {needle} but got {haystack}");
            self.record(AssertionFailure::new(
                description,
                CheckValue::from(haystack),
                Some(CheckValue::from(needle)),
                explanation,
            ));
        }
    }

    pub fn assert_some<T>(&mut self, value: &Option<T>, description: &str) {
        if value.is_none() {
            self.record(AssertionFailure::new(
                description,
                CheckValue::Null,
                None,
                "expected a value but got none",
            ));
        }
    }

    /// Append an already-rendered failure.
    pub fn record(&mut self, failure: AssertionFailure) {
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Checkpoint. Drains the session and returns every recorded failure as
    /// a single error.
    pub fn assert_all(&mut self) -> Result<(), AggregateFailure> {
        let failures = std::mem::take(&mut self.failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(AggregateFailure { failures })
        }
    }

    /// Checkpoint that panics with the aggregate message, for use directly in
    /// `#[test]` bodies.
    #[track_caller]
    pub fn check_all(&mut self) {
        if let Err(failure) = self.assert_all() {
            panic!("{failure}");
        }
    }
}

/// A session shared by several tasks of the same logical test. Every
/// mutation goes through the mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedSoftAssertions {
    inner: Arc<Mutex<SoftAssertions>>,
}

impl SharedSoftAssertions {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut SoftAssertions) -> R) -> R {
        // A panic while holding the lock cannot leave the failure list torn.
        let mut session = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    pub fn assert_equals(
        &self,
        actual: impl Into<CheckValue>,
        expected: impl Into<CheckValue>,
        description: &str,
    ) {
        self.with(|session| session.assert_equals(actual, expected, description));
    }

    pub fn assert_true(&self, condition: bool, description: &str) {
        self.with(|session| session.assert_true(condition, description));
    }

    pub fn record(&self, failure: AssertionFailure) {
        self.with(|session| session.record(failure));
    }

    pub fn failure_count(&self) -> usize {
        self.with(|session| session.failure_count())
    }

    pub fn assert_all(&self) -> Result<(), AggregateFailure> {
        self.with(SoftAssertions::assert_all)
    }
}
