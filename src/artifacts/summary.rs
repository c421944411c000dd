use crate::artifacts::types::{ArtifactFile, TestRunRecord};
use crate::artifacts::{modified_date, read_artifact, success_rate, zero_record};
use crate::error::Result;
use crate::xml::document::{parse_document, Element};

const SUMMARY_ROOTS: [&str; 2] = ["test-results", "test-run"];

/// Parses a summary-format report: counts live in attributes on the root
/// element.
pub fn parse_artifact(artifact: &ArtifactFile) -> Result<TestRunRecord> {
    let content = read_artifact(artifact)?;
    let root = parse_document(&artifact.name, &content)?;
    Ok(build_record(artifact, &root))
}

fn build_record(artifact: &ArtifactFile, root: &Element) -> TestRunRecord {
    if !SUMMARY_ROOTS.contains(&root.name.as_str()) {
        return zero_record(artifact);
    }

    let total = root.int_attr("total");
    let passed = root.int_attr("passed");
    // A time attribute that fails to parse still counts as present.
    let execution_time_seconds = root
        .attr("time")
        .map(|raw| raw.trim().parse().unwrap_or(0.0));
    let file_date = root
        .attr("date")
        .map_or_else(|| modified_date(artifact), str::to_string);

    TestRunRecord {
        file_name: artifact.name.clone(),
        file_date,
        total,
        passed,
        failed: root.int_attr("failed"),
        skipped: root.int_attr("skipped"),
        errors: root.int_attr("errors"),
        inconclusive: root.int_attr("inconclusive"),
        execution_time_seconds,
        success_rate: success_rate(passed, total),
    }
}
