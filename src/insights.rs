use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::artifacts::types::TestRunRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
    InsufficientData,
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub average_success_rate: f64,
    pub total_tests: i64,
    pub total_passed: i64,
    pub days_with_data: usize,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyTrends {
    pub test_type: String,
    pub total_files: usize,
    pub daily_results: Vec<TestRunRecord>,
    pub trend_analysis: TrendAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedSummary {
    pub total_test_files: usize,
    pub overall_success_rate: f64,
    pub health_status: HealthStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestingTrendsReport {
    pub query_type: String,
    pub description: String,
    pub executed_at: DateTime<Utc>,
    pub lookback_days: u32,
    pub base_directory: String,
    pub summary_trends: Option<FamilyTrends>,
    pub summary_error: Option<String>,
    pub unittest_trends: Option<FamilyTrends>,
    pub unittest_error: Option<String>,
    pub summary: CombinedSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub file_name: String,
    pub file_modified: DateTime<Utc>,
    pub value: String,
    pub attributes: IndexMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
    pub file_count: usize,
    pub total_data_points: usize,
    pub average_data_points_per_file: f64,
    pub unique_values: usize,
    pub most_common_values: IndexMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendExtractionReport {
    pub query_type: String,
    pub description: String,
    pub executed_at: DateTime<Utc>,
    pub directory: String,
    pub selector: String,
    pub files_processed: usize,
    pub extracted_count: usize,
    pub extracted_items: Vec<ExtractedItem>,
    pub trend_analysis: FrequencyAnalysis,
    pub processing_errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub path: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesSummaryReport {
    pub query_type: String,
    pub description: String,
    pub executed_at: DateTime<Utc>,
    pub directory: String,
    pub total_files: usize,
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetrics {
    pub file_name: String,
    pub file_modified: DateTime<Utc>,
    pub root_element: String,
    pub total_elements: usize,
    pub element_types: IndexMap<String, usize>,
    pub error_count: usize,
    pub warning_count: usize,
    pub config_count: usize,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub average_elements_per_file: f64,
    pub total_errors_across_files: usize,
    pub total_warnings_across_files: usize,
    pub files_with_errors: usize,
    pub root_element_types: IndexMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessMetricsReport {
    pub query_type: String,
    pub description: String,
    pub executed_at: DateTime<Utc>,
    pub directory: String,
    pub files_processed: usize,
    pub file_metrics: Vec<FileMetrics>,
    pub aggregated_trends: AggregatedMetrics,
    pub processing_errors: Vec<String>,
}

/// Outcome of one named selector on one file: the extracted values, or the
/// failure message under a `<name>_error` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorOutcome {
    Values(Vec<String>),
    Error(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileExtraction {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub selections: IndexMap<String, SelectorOutcome>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomExtractionReport {
    pub query_type: String,
    pub description: String,
    pub executed_at: DateTime<Utc>,
    pub directory: String,
    pub selectors: IndexMap<String, String>,
    pub files_processed: usize,
    pub results: Vec<FileExtraction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_direction_wire_format() {
        assert_eq!(
            serde_json::to_string(&TrendDirection::NoData).unwrap(),
            "\"NO_DATA\""
        );
        assert_eq!(
            serde_json::to_string(&TrendDirection::InsufficientData).unwrap(),
            "\"INSUFFICIENT_DATA\""
        );
    }

    #[test]
    fn test_health_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Excellent).unwrap(),
            "\"EXCELLENT\""
        );
    }

    #[test]
    fn test_file_extraction_flattens_selections() {
        let mut selections = IndexMap::new();
        selections.insert(
            "cases".to_string(),
            SelectorOutcome::Values(vec!["3".to_string()]),
        );
        selections.insert(
            "bad_error".to_string(),
            SelectorOutcome::Error("Invalid selector".to_string()),
        );
        let extraction = FileExtraction {
            file_name: "run.xml".to_string(),
            error: None,
            selections,
        };

        let json = serde_json::to_string(&extraction).unwrap();
        assert_eq!(
            json,
            r#"{"file_name":"run.xml","cases":["3"],"bad_error":"Invalid selector"}"#
        );
    }
}
