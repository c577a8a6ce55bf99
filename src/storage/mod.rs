use std::fs;
use std::path::Path;

use crate::collections::Suite;
use crate::error::{Error, Result};
use crate::report::RunReport;

pub fn load_suite(path: impl AsRef<Path>) -> Result<Suite> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_report(path: impl AsRef<Path>, report: &RunReport) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let raw = serde_json::to_string_pretty(report)?;
    fs::write(path, raw).map_err(|e| Error::io(path, e))
}

pub fn load_report(path: impl AsRef<Path>) -> Result<RunReport> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}
