use std::io::Error as IoError;
use std::path::PathBuf;

use rusqlite::Error as SqliteError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Infrastructure errors. Assertion mismatches are never reported through
/// this type; they are collected by a soft-assertion session instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("Invalid properties file `{path}` at line {line}: {reason}")]
    Properties {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Missing key `{0}`")]
    MissingKey(String),

    #[error("Invalid JSON path `{path}`: {reason}")]
    JsonPath { path: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] SqliteError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: IoError) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
