use crate::artifacts::types::TestRunRecord;
use crate::insights::{TrendAnalysis, TrendDirection};

/// How far the first and last success rates may drift and still count as
/// stable.
const STABLE_BAND: f64 = 5.0;

pub fn analyze_records(records: &[TestRunRecord]) -> TrendAnalysis {
    if records.is_empty() {
        return TrendAnalysis {
            average_success_rate: 0.0,
            total_tests: 0,
            total_passed: 0,
            days_with_data: 0,
            trend: TrendDirection::NoData,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let average_success_rate =
        records.iter().map(|r| r.success_rate).sum::<f64>() / records.len() as f64;

    TrendAnalysis {
        average_success_rate,
        total_tests: records.iter().map(|r| r.total).sum(),
        total_passed: records.iter().map(|r| r.passed).sum(),
        days_with_data: records.len(),
        trend: direction(records),
    }
}

/// Compares the earliest and latest runs by report date.
fn direction(records: &[TestRunRecord]) -> TrendDirection {
    if records.len() < 2 {
        return TrendDirection::InsufficientData;
    }

    let mut ordered: Vec<&TestRunRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.file_date.cmp(&b.file_date));

    let first = ordered[0].success_rate;
    let last = ordered[ordered.len() - 1].success_rate;
    let change = last - first;

    if change > STABLE_BAND {
        TrendDirection::Improving
    } else if change < -STABLE_BAND {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, success_rate: f64) -> TestRunRecord {
        TestRunRecord {
            file_name: format!("{date}.xml"),
            file_date: date.to_string(),
            total: 10,
            passed: 8,
            failed: 2,
            skipped: 0,
            errors: 0,
            inconclusive: 0,
            execution_time_seconds: None,
            success_rate,
        }
    }

    #[test]
    fn test_no_records_means_no_data() {
        let analysis = analyze_records(&[]);
        assert_eq!(analysis.trend, TrendDirection::NoData);
        assert_eq!(analysis.average_success_rate, 0.0);
        assert_eq!(analysis.total_tests, 0);
        assert_eq!(analysis.days_with_data, 0);
    }

    #[test]
    fn test_single_record_is_insufficient_data() {
        let analysis = analyze_records(&[record("2024-05-01", 90.0)]);
        assert_eq!(analysis.trend, TrendDirection::InsufficientData);
        assert!((analysis.average_success_rate - 90.0).abs() < f64::EPSILON);
        assert_eq!(analysis.days_with_data, 1);
    }

    #[test]
    fn test_rising_rate_is_improving() {
        let records = vec![record("2024-05-01", 50.0), record("2024-05-02", 90.0)];
        assert_eq!(analyze_records(&records).trend, TrendDirection::Improving);
    }

    #[test]
    fn test_falling_rate_is_declining() {
        let records = vec![record("2024-05-01", 90.0), record("2024-05-02", 50.0)];
        assert_eq!(analyze_records(&records).trend, TrendDirection::Declining);
    }

    #[test]
    fn test_small_change_is_stable() {
        let records = vec![record("2024-05-01", 80.0), record("2024-05-02", 82.0)];
        assert_eq!(analyze_records(&records).trend, TrendDirection::Stable);
    }

    #[test]
    fn test_change_of_exactly_five_is_stable() {
        let up = vec![record("2024-05-01", 80.0), record("2024-05-02", 85.0)];
        let down = vec![record("2024-05-01", 85.0), record("2024-05-02", 80.0)];
        assert_eq!(analyze_records(&up).trend, TrendDirection::Stable);
        assert_eq!(analyze_records(&down).trend, TrendDirection::Stable);
    }

    #[test]
    fn test_direction_sorts_by_date_not_input_order() {
        // Latest run first in the input; the trend still reads 50 -> 90.
        let records = vec![record("2024-05-03", 90.0), record("2024-05-01", 50.0)];
        assert_eq!(analyze_records(&records).trend, TrendDirection::Improving);
    }

    #[test]
    fn test_totals_and_average() {
        let records = vec![record("2024-05-01", 60.0), record("2024-05-02", 80.0)];
        let analysis = analyze_records(&records);
        assert_eq!(analysis.total_tests, 20);
        assert_eq!(analysis.total_passed, 16);
        assert!((analysis.average_success_rate - 70.0).abs() < f64::EPSILON);
        assert_eq!(analysis.days_with_data, 2);
    }
}
