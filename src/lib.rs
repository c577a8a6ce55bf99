//! Soft-assertion REST API smoke checks.
//!
//! The core is [`testing::SoftAssertions`]: a session that records any number
//! of check outcomes and reports every failure at once from
//! [`testing::SoftAssertions::assert_all`]. Around it sit an HTTP request
//! builder ([`http`]), JSON test data and `.properties` readers, a suite
//! runner and run reports.

pub mod auth;
pub mod cli;
pub mod collections;
pub mod environment;
pub mod error;
pub mod http;
pub mod json_path;
pub mod logging;
pub mod report;
pub mod runner;
pub mod status;
pub mod storage;
pub mod test_data;
pub mod testing;

pub use error::{Error, Result};
