use std::path::Path;

use chrono::Utc;
use log::{info, warn};

use crate::artifacts::types::TestRunRecord;
use crate::artifacts::{discovery, SchemaFamily};
use crate::error::Result;
use crate::insights::{CombinedSummary, FamilyTrends, HealthStatus, TestingTrendsReport};
use crate::trends::analysis;

/// Runs both schema families under the base directory and merges their
/// trends into one report. A family that cannot be read turns into an
/// error string; the other family still reports.
pub fn collect_testing_trends(base_directory: &Path, lookback_days: u32) -> TestingTrendsReport {
    info!(
        "Collecting testing trends from {} ({lookback_days} day lookback)",
        base_directory.display()
    );

    let (summary_trends, summary_error) =
        split_outcome(collect_family(base_directory, SchemaFamily::Summary, lookback_days));
    let (unittest_trends, unittest_error) =
        split_outcome(collect_family(base_directory, SchemaFamily::UnitTest, lookback_days));

    let summary = combined_summary(summary_trends.as_ref(), unittest_trends.as_ref());

    TestingTrendsReport {
        query_type: "testing_trends".to_string(),
        description: "Automated testing history trends".to_string(),
        executed_at: Utc::now(),
        lookback_days,
        base_directory: base_directory.display().to_string(),
        summary_trends,
        summary_error,
        unittest_trends,
        unittest_error,
        summary,
    }
}

fn collect_family(
    base_directory: &Path,
    family: SchemaFamily,
    lookback_days: u32,
) -> Result<FamilyTrends> {
    let directory = base_directory.join(family.subdirectory());
    let artifacts = discovery::discover_recent(&directory, lookback_days)?;
    info!("Found {} {} artifacts", artifacts.len(), family.label());

    let mut records: Vec<TestRunRecord> = Vec::new();
    for artifact in &artifacts {
        match family.parse(artifact) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping {}: {e}", artifact.name),
        }
    }
    records.sort_by(|a, b| a.file_date.cmp(&b.file_date));

    let trend_analysis = analysis::analyze_records(&records);
    Ok(FamilyTrends {
        test_type: family.label().to_string(),
        total_files: artifacts.len(),
        daily_results: records,
        trend_analysis,
    })
}

fn split_outcome(outcome: Result<FamilyTrends>) -> (Option<FamilyTrends>, Option<String>) {
    match outcome {
        Ok(trends) => (Some(trends), None),
        Err(e) => (None, Some(e.to_string())),
    }
}

fn combined_summary(
    summary: Option<&FamilyTrends>,
    unittest: Option<&FamilyTrends>,
) -> CombinedSummary {
    let total_test_files =
        summary.map_or(0, |f| f.total_files) + unittest.map_or(0, |f| f.total_files);

    let rates: Vec<f64> = [summary, unittest]
        .into_iter()
        .flatten()
        .map(|family| family.trend_analysis.average_success_rate)
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let overall_success_rate = if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    };

    CombinedSummary {
        total_test_files,
        overall_success_rate,
        health_status: health_status(overall_success_rate),
    }
}

fn health_status(rate: f64) -> HealthStatus {
    if rate >= 95.0 {
        HealthStatus::Excellent
    } else if rate >= 85.0 {
        HealthStatus::Good
    } else if rate >= 70.0 {
        HealthStatus::Fair
    } else if rate >= 50.0 {
        HealthStatus::Poor
    } else {
        HealthStatus::Critical
    }
}
