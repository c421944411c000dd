use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// An XML file picked up by discovery.
#[derive(Debug, Clone)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
    pub size_bytes: u64,
}

/// One test run parsed out of a single artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRunRecord {
    pub file_name: String,
    pub file_date: String,
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub skipped: i64,
    pub errors: i64,
    pub inconclusive: i64,
    pub execution_time_seconds: Option<f64>,
    pub success_rate: f64,
}
