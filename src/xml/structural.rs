use indexmap::IndexMap;

use crate::xml::document::Element;

/// Number of elements in the subtree, the element itself included.
pub fn count_elements(element: &Element) -> usize {
    element.descendants().len()
}

/// Per-tag occurrence counts, keyed in document order of first appearance.
pub fn element_type_counts(element: &Element) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for descendant in element.descendants() {
        *counts.entry(descendant.name.clone()).or_insert(0) += 1;
    }
    counts
}

/// Counts elements whose tag name contains `needle`, case-insensitively.
pub fn count_tags_containing(element: &Element, needle: &str) -> usize {
    let needle = needle.to_lowercase();
    element
        .descendants()
        .iter()
        .filter(|descendant| descendant.name.to_lowercase().contains(&needle))
        .count()
}
