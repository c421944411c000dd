use crate::artifacts::types::{ArtifactFile, TestRunRecord};
use crate::artifacts::{modified_date, read_artifact, success_rate, zero_record};
use crate::error::Result;
use crate::xml::document::{parse_document, Element};

const UNITTEST_ROOTS: [&str; 2] = ["TestResults", "tSQLt"];

/// Parses a unit-test-format report: one `TestCase` element per test,
/// classified by its `Result` attribute.
pub fn parse_artifact(artifact: &ArtifactFile) -> Result<TestRunRecord> {
    let content = read_artifact(artifact)?;
    let root = parse_document(&artifact.name, &content)?;
    Ok(build_record(artifact, &root))
}

fn build_record(artifact: &ArtifactFile, root: &Element) -> TestRunRecord {
    if !UNITTEST_ROOTS.contains(&root.name.as_str()) {
        return zero_record(artifact);
    }

    let cases: Vec<&Element> = root
        .descendants()
        .into_iter()
        .filter(|element| element.name == "TestCase")
        .collect();

    #[allow(clippy::cast_possible_wrap)]
    let total = cases.len() as i64;
    let mut passed = 0;
    let mut failed = 0;
    for case in &cases {
        match case.attr("Result").map(str::to_lowercase).as_deref() {
            Some("success" | "pass") => passed += 1,
            Some("failure" | "fail") => failed += 1,
            _ => {}
        }
    }

    TestRunRecord {
        file_name: artifact.name.clone(),
        file_date: modified_date(artifact),
        total,
        passed,
        failed,
        skipped: total - passed - failed,
        errors: 0,
        inconclusive: 0,
        execution_time_seconds: execution_time(root),
        success_rate: success_rate(passed, total),
    }
}

/// Wall time from the first `Duration` element, if the report carries one.
fn execution_time(root: &Element) -> Option<f64> {
    root.descendants()
        .into_iter()
        .find(|element| element.name == "Duration")
        .map(|duration| duration.text_content().trim().parse().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn artifact(name: &str) -> ArtifactFile {
        ArtifactFile {
            path: PathBuf::from(name),
            name: name.to_string(),
            // 2023-11-14 UTC
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            size_bytes: 0,
        }
    }

    fn record_from(xml: &str) -> TestRunRecord {
        let root = parse_document("cases.xml", xml).unwrap();
        build_record(&artifact("cases.xml"), &root)
    }

    #[test]
    fn test_counts_test_cases_by_result() {
        let record = record_from(
            r#"<TestResults>
                <TestCase Result="Success"/>
                <TestCase Result="Failure"/>
                <TestCase Result="Pass"/>
                <TestCase/>
            </TestResults>"#,
        );
        assert_eq!(record.total, 4);
        assert_eq!(record.passed, 2);
        assert_eq!(record.failed, 1);
        assert_eq!(record.skipped, 1);
        assert!((record.success_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_result_values_match_case_insensitively() {
        let record = record_from(
            r#"<TestResults>
                <TestCase Result="SUCCESS"/>
                <TestCase Result="fail"/>
            </TestResults>"#,
        );
        assert_eq!(record.passed, 1);
        assert_eq!(record.failed, 1);
    }

    #[test]
    fn test_nested_test_cases_counted() {
        let record = record_from(
            r#"<TestResults>
                <TestSuite>
                    <TestCase Result="Success"/>
                    <TestSuite><TestCase Result="Success"/></TestSuite>
                </TestSuite>
            </TestResults>"#,
        );
        assert_eq!(record.total, 2);
        assert_eq!(record.passed, 2);
    }

    #[test]
    fn test_tsqlt_root_recognized() {
        let record = record_from(r#"<tSQLt><TestCase Result="Success"/></tSQLt>"#);
        assert_eq!(record.total, 1);
        assert!((record.success_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_root_yields_zero_record() {
        let record = record_from(r#"<results><TestCase Result="Success"/></results>"#);
        assert_eq!(record.total, 0);
        assert_eq!(record.success_rate, 0.0);
    }

    #[test]
    fn test_empty_results_have_zero_rate() {
        let record = record_from("<TestResults/>");
        assert_eq!(record.total, 0);
        assert_eq!(record.skipped, 0);
        assert_eq!(record.success_rate, 0.0);
    }

    #[test]
    fn test_duration_element_parsed() {
        let record = record_from(
            r#"<TestResults>
                <Duration>3.25</Duration>
                <TestCase Result="Success"/>
                <Duration>9.0</Duration>
            </TestResults>"#,
        );
        assert_eq!(record.execution_time_seconds, Some(3.25));
    }

    #[test]
    fn test_unparsable_duration_becomes_zero() {
        let record = record_from("<TestResults><Duration>slow</Duration></TestResults>");
        assert_eq!(record.execution_time_seconds, Some(0.0));
    }

    #[test]
    fn test_absent_duration_stays_none() {
        let record = record_from("<TestResults><TestCase Result=\"Success\"/></TestResults>");
        assert!(record.execution_time_seconds.is_none());
    }

    #[test]
    fn test_file_date_comes_from_modification_time() {
        let record = record_from("<TestResults/>");
        assert_eq!(record.file_date, "2023-11-14");
    }
}
