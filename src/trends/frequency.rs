use std::collections::HashSet;

use indexmap::IndexMap;

use crate::insights::{ExtractedItem, FrequencyAnalysis};

const MOST_COMMON_LIMIT: usize = 10;

/// Frequency statistics over the values pulled out by a selector.
pub fn analyze_values(items: &[ExtractedItem]) -> FrequencyAnalysis {
    let file_count = items
        .iter()
        .map(|item| item.file_name.as_str())
        .collect::<HashSet<_>>()
        .len();
    let total_data_points = items.len();

    #[allow(clippy::cast_precision_loss)]
    let average_data_points_per_file = total_data_points as f64 / file_count.max(1) as f64;

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for item in items {
        *counts.entry(item.value.as_str()).or_insert(0) += 1;
    }
    let unique_values = counts.len();

    // Stable sort keeps first-encountered order between equal counts.
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let most_common_values = ranked
        .into_iter()
        .take(MOST_COMMON_LIMIT)
        .map(|(value, count)| (value.to_string(), count))
        .collect();

    FrequencyAnalysis {
        file_count,
        total_data_points,
        average_data_points_per_file,
        unique_values,
        most_common_values,
    }
}
