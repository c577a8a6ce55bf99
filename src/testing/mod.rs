//! # Testing & Assertions
//!
//! Soft assertions let a test perform several independent checks where an
//! early failure does not stop the later ones, while the test as a whole
//! still fails if any check failed:
//!
//! ```
//! use restcheck::testing::SoftAssertions;
//!
//! let mut soft = SoftAssertions::new();
//! soft.assert_true(false, "a");
//! soft.assert_equals(1, 2, "b");
//!
//! let err = soft.assert_all().unwrap_err();
//! assert_eq!(err.to_string(), "a: expected true but got false\nb: expected 2 but got 1");
//! assert!(soft.assert_all().is_ok());
//! ```
//!
//! [`expectation`] evaluates declarative response checks into a session and
//! [`scoped`] offers the same checks as free functions over a thread- or
//! task-local session.

pub mod expectation;
pub mod scoped;
pub mod soft;
pub mod value;

pub use expectation::{Assertion, AssertionOperator, AssertionResult, AssertionTarget};
pub use soft::{AggregateFailure, AssertionFailure, SharedSoftAssertions, SoftAssertions};
pub use value::{CheckValue, Comparison};
