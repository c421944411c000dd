use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{info, warn};

use crate::artifacts::types::ArtifactFile;
use crate::artifacts::{self, discovery};
use crate::error::Result;
use crate::insights::{
    AggregatedMetrics, BusinessMetricsReport, CustomExtractionReport, ExtractedItem,
    FileExtraction, FileMetrics, FileSummary, FilesSummaryReport, SelectorOutcome,
    TrendExtractionReport,
};
use crate::trends::frequency;
use crate::xml::document;
use crate::xml::selector::{Match, Selector};
use crate::xml::structural;

/// Inventory of every XML artifact under the directory.
pub fn files_summary(directory: &Path) -> Result<FilesSummaryReport> {
    let artifacts = discovery::list_artifacts(directory)?;
    info!(
        "Summarizing {} XML artifacts in {}",
        artifacts.len(),
        directory.display()
    );

    let files: Vec<FileSummary> = artifacts
        .iter()
        .map(|artifact| FileSummary {
            name: artifact.name.clone(),
            path: artifact.path.display().to_string(),
            size_bytes: artifact.size_bytes,
            last_modified: DateTime::<Utc>::from(artifact.modified),
        })
        .collect();

    Ok(FilesSummaryReport {
        query_type: "xml_files_summary".to_string(),
        description: "Summary of XML files in directory".to_string(),
        executed_at: Utc::now(),
        directory: directory.display().to_string(),
        total_files: files.len(),
        files,
    })
}

/// Evaluates one selector across every artifact and builds a frequency
/// analysis of the extracted values. Files that cannot be read, parsed,
/// or selected land in `processing_errors` while the batch continues.
pub fn extract_trend_data(directory: &Path, expression: &str) -> Result<TrendExtractionReport> {
    let artifacts = discovery::list_artifacts(directory)?;
    info!(
        "Extracting '{expression}' from {} artifacts",
        artifacts.len()
    );

    let mut extracted_items: Vec<ExtractedItem> = Vec::new();
    let mut processing_errors: Vec<String> = Vec::new();
    for artifact in &artifacts {
        match extract_from_artifact(artifact, expression) {
            Ok(mut items) => extracted_items.append(&mut items),
            Err(e) => {
                warn!("Failed to process {}: {e}", artifact.name);
                processing_errors.push(format!("{}: {e}", artifact.name));
            }
        }
    }

    let trend_analysis = frequency::analyze_values(&extracted_items);
    Ok(TrendExtractionReport {
        query_type: "xml_trend_extraction".to_string(),
        description: "Trend data extracted from multiple XML files".to_string(),
        executed_at: Utc::now(),
        directory: directory.display().to_string(),
        selector: expression.to_string(),
        files_processed: artifacts.len(),
        extracted_count: extracted_items.len(),
        extracted_items,
        trend_analysis,
        processing_errors,
    })
}

/// Structural metrics for every artifact plus cross-file aggregates.
pub fn business_metrics(directory: &Path) -> Result<BusinessMetricsReport> {
    let artifacts = discovery::list_artifacts(directory)?;
    info!(
        "Measuring {} artifacts in {}",
        artifacts.len(),
        directory.display()
    );

    let mut file_metrics: Vec<FileMetrics> = Vec::new();
    let mut processing_errors: Vec<String> = Vec::new();
    for artifact in &artifacts {
        match measure_artifact(artifact) {
            Ok(metrics) => file_metrics.push(metrics),
            Err(e) => {
                warn!("Failed to measure {}: {e}", artifact.name);
                processing_errors.push(format!("{}: {e}", artifact.name));
            }
        }
    }

    let aggregated_trends = aggregate_metrics(&file_metrics);
    Ok(BusinessMetricsReport {
        query_type: "xml_business_metrics".to_string(),
        description: "Business metrics trends from XML files".to_string(),
        executed_at: Utc::now(),
        directory: directory.display().to_string(),
        files_processed: artifacts.len(),
        file_metrics,
        aggregated_trends,
        processing_errors,
    })
}

/// Runs a set of named selectors over every artifact. Each file gets one
/// result entry; a selector that fails to compile is reported under a
/// `<name>_error` key so the remaining selectors still run.
pub fn custom_elements(
    directory: &Path,
    selectors: &IndexMap<String, String>,
) -> Result<CustomExtractionReport> {
    let artifacts = discovery::list_artifacts(directory)?;
    info!(
        "Running {} selectors over {} artifacts",
        selectors.len(),
        artifacts.len()
    );

    let results: Vec<FileExtraction> = artifacts
        .iter()
        .map(|artifact| extract_named(artifact, selectors))
        .collect();

    Ok(CustomExtractionReport {
        query_type: "xml_custom_extraction".to_string(),
        description: "Custom element extraction from XML files".to_string(),
        executed_at: Utc::now(),
        directory: directory.display().to_string(),
        selectors: selectors.clone(),
        files_processed: artifacts.len(),
        results,
    })
}

fn extract_from_artifact(artifact: &ArtifactFile, expression: &str) -> Result<Vec<ExtractedItem>> {
    let xml = artifacts::read_artifact(artifact)?;
    let root = document::parse_document(&artifact.name, &xml)?;
    let selector = Selector::compile(expression)?;
    let modified = DateTime::<Utc>::from(artifact.modified);

    Ok(selector
        .evaluate(&root)
        .iter()
        .map(|matched| ExtractedItem {
            file_name: artifact.name.clone(),
            file_modified: modified,
            value: matched.value(),
            attributes: matched.attributes(),
        })
        .collect())
}

fn measure_artifact(artifact: &ArtifactFile) -> Result<FileMetrics> {
    let xml = artifacts::read_artifact(artifact)?;
    let root = document::parse_document(&artifact.name, &xml)?;

    Ok(FileMetrics {
        file_name: artifact.name.clone(),
        file_modified: DateTime::<Utc>::from(artifact.modified),
        root_element: root.name.clone(),
        total_elements: structural::count_elements(&root),
        element_types: structural::element_type_counts(&root),
        error_count: structural::count_tags_containing(&root, "error"),
        warning_count: structural::count_tags_containing(&root, "warning"),
        config_count: structural::count_tags_containing(&root, "config"),
        record_count: structural::count_tags_containing(&root, "record"),
    })
}

fn aggregate_metrics(metrics: &[FileMetrics]) -> AggregatedMetrics {
    let total_elements: usize = metrics.iter().map(|m| m.total_elements).sum();
    #[allow(clippy::cast_precision_loss)]
    let average_elements_per_file = if metrics.is_empty() {
        0.0
    } else {
        total_elements as f64 / metrics.len() as f64
    };

    let mut root_element_types: IndexMap<String, usize> = IndexMap::new();
    for file in metrics {
        *root_element_types
            .entry(file.root_element.clone())
            .or_insert(0) += 1;
    }

    AggregatedMetrics {
        average_elements_per_file,
        total_errors_across_files: metrics.iter().map(|m| m.error_count).sum(),
        total_warnings_across_files: metrics.iter().map(|m| m.warning_count).sum(),
        files_with_errors: metrics.iter().filter(|m| m.error_count > 0).count(),
        root_element_types,
    }
}

fn extract_named(artifact: &ArtifactFile, selectors: &IndexMap<String, String>) -> FileExtraction {
    let root = match artifacts::read_artifact(artifact)
        .and_then(|xml| document::parse_document(&artifact.name, &xml))
    {
        Ok(root) => root,
        Err(e) => {
            warn!("Failed to parse {}: {e}", artifact.name);
            return FileExtraction {
                file_name: artifact.name.clone(),
                error: Some(e.to_string()),
                selections: IndexMap::new(),
            };
        }
    };

    let mut selections: IndexMap<String, SelectorOutcome> = IndexMap::new();
    for (name, expression) in selectors {
        match Selector::compile(expression) {
            Ok(selector) => {
                let values = selector.evaluate(&root).iter().map(Match::value).collect();
                selections.insert(name.clone(), SelectorOutcome::Values(values));
            }
            Err(e) => {
                selections.insert(format!("{name}_error"), SelectorOutcome::Error(e.to_string()));
            }
        }
    }

    FileExtraction {
        file_name: artifact.name.clone(),
        error: None,
        selections,
    }
}
