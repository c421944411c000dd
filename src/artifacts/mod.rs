pub mod discovery;
pub mod summary;
pub mod types;
pub mod unittest;

use chrono::{DateTime, Utc};

use crate::artifacts::types::{ArtifactFile, TestRunRecord};
use crate::error::{Result, TestLensError};

/// The two report schemas the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFamily {
    Summary,
    UnitTest,
}

impl SchemaFamily {
    pub fn label(self) -> &'static str {
        match self {
            SchemaFamily::Summary => "Summary",
            SchemaFamily::UnitTest => "UnitTest",
        }
    }

    /// Subdirectory of the base directory holding this family's artifacts.
    pub fn subdirectory(self) -> &'static str {
        match self {
            SchemaFamily::Summary => "summary",
            SchemaFamily::UnitTest => "unittest",
        }
    }

    pub fn parse(self, artifact: &ArtifactFile) -> Result<TestRunRecord> {
        match self {
            SchemaFamily::Summary => summary::parse_artifact(artifact),
            SchemaFamily::UnitTest => unittest::parse_artifact(artifact),
        }
    }
}

pub fn read_artifact(artifact: &ArtifactFile) -> Result<String> {
    std::fs::read_to_string(&artifact.path).map_err(|e| TestLensError::MalformedArtifact {
        file: artifact.name.clone(),
        message: e.to_string(),
    })
}

/// Success percentage for a run; 0.0 when nothing ran.
pub fn success_rate(passed: i64, total: i64) -> f64 {
    if total > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            (passed as f64 / total as f64) * 100.0
        }
    } else {
        0.0
    }
}

/// ISO date (UTC) of the artifact's last modification.
pub fn modified_date(artifact: &ArtifactFile) -> String {
    let modified: DateTime<Utc> = artifact.modified.into();
    modified.format("%Y-%m-%d").to_string()
}

/// Record for an artifact whose root element is not a recognized schema.
pub fn zero_record(artifact: &ArtifactFile) -> TestRunRecord {
    TestRunRecord {
        file_name: artifact.name.clone(),
        file_date: modified_date(artifact),
        total: 0,
        passed: 0,
        failed: 0,
        skipped: 0,
        errors: 0,
        inconclusive: 0,
        execution_time_seconds: None,
        success_rate: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn artifact() -> ArtifactFile {
        ArtifactFile {
            path: PathBuf::from("run.xml"),
            name: "run.xml".to_string(),
            // 2023-11-14 22:13:20 UTC
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            size_bytes: 0,
        }
    }

    #[test]
    fn test_success_rate() {
        assert!((success_rate(8, 10) - 80.0).abs() < f64::EPSILON);
        assert!((success_rate(3, 3) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_zero_when_no_tests() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(5, 0), 0.0);
        assert_eq!(success_rate(5, -1), 0.0);
    }

    #[test]
    fn test_modified_date_is_iso_utc() {
        assert_eq!(modified_date(&artifact()), "2023-11-14");
    }

    #[test]
    fn test_zero_record_defaults() {
        let record = zero_record(&artifact());
        assert_eq!(record.file_name, "run.xml");
        assert_eq!(record.total, 0);
        assert_eq!(record.success_rate, 0.0);
        assert!(record.execution_time_seconds.is_none());
    }

    #[test]
    fn test_family_labels_and_subdirectories() {
        assert_eq!(SchemaFamily::Summary.label(), "Summary");
        assert_eq!(SchemaFamily::Summary.subdirectory(), "summary");
        assert_eq!(SchemaFamily::UnitTest.label(), "UnitTest");
        assert_eq!(SchemaFamily::UnitTest.subdirectory(), "unittest");
    }
}
