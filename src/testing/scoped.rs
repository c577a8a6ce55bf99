//! Free-function soft assertions backed by an ambient session.
//!
//! Outside [`with_task_session`] the session is thread-local and created on
//! first use; the default test harness runs every test on its own thread.
//! Inside [`with_task_session`] the session belongs to the tokio task, so
//! tasks sharing a worker thread never see each other's failures.

use std::cell::RefCell;
use std::future::Future;

use tracing::warn;

use super::soft::{AggregateFailure, SoftAssertions};
use super::value::CheckValue;

thread_local! {
    static THREAD_SESSION: RefCell<SoftAssertions> = RefCell::new(SoftAssertions::new());
}

tokio::task_local! {
    static TASK_SESSION: RefCell<SoftAssertions>;
}

fn with_session<R>(f: impl FnOnce(&mut SoftAssertions) -> R) -> R {
    if TASK_SESSION.try_with(|_| ()).is_ok() {
        TASK_SESSION.with(|session| f(&mut session.borrow_mut()))
    } else {
        THREAD_SESSION.with(|session| f(&mut session.borrow_mut()))
    }
}

/// Run `future` with a fresh session owned by the current task.
pub async fn with_task_session<F: Future>(future: F) -> F::Output {
    TASK_SESSION
        .scope(RefCell::new(SoftAssertions::new()), future)
        .await
}

pub fn assert_equals(
    actual: impl Into<CheckValue>,
    expected: impl Into<CheckValue>,
    description: &str,
) {
    with_session(|session| session.assert_equals(actual, expected, description));
}

pub fn assert_not_equals(
    actual: impl Into<CheckValue>,
    unexpected: impl Into<CheckValue>,
    description: &str,
) {
    with_session(|session| session.assert_not_equals(actual, unexpected, description));
}

pub fn assert_true(condition: bool, description: &str) {
    with_session(|session| session.assert_true(condition, description));
}

pub fn assert_false(condition: bool, description: &str) {
    with_session(|session| session.assert_false(condition, description));
}

pub fn failure_count() -> usize {
    with_session(|session| session.failure_count())
}

/// Checkpoint for the ambient session.
pub fn assert_all() -> Result<(), AggregateFailure> {
    with_session(SoftAssertions::assert_all)
}

/// Clear the ambient session without failing. Every dropped failure is
/// logged at `warn`; returns how many were dropped.
pub fn discard() -> usize {
    match with_session(SoftAssertions::assert_all) {
        Ok(()) => 0,
        Err(aggregate) => {
            for failure in aggregate.failures() {
                warn!(description = %failure.description, "discarded failure: {}", failure.message);
            }
            aggregate.len()
        }
    }
}
