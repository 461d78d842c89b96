//! Method usage summaries
//!
//! Collapses the raw list of `Class#method` entries collected on a node into
//! the short, human-readable list shown in the graph tooltips.

use std::collections::BTreeMap;

/// Count each distinct usage and render it, in alphabetical order of the
/// usage itself, as `usage` or `usage (xN)` when seen more than once.
///
/// e.g. `foo, bar, bar, foo, foo, abc` becomes `abc, bar (x2), foo (x3)`.
pub fn convert_to_usage_count<S: AsRef<str>>(usages: &[S]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for usage in usages {
        *counts.entry(usage.as_ref()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(usage, count)| {
            if count > 1 {
                format!("{} (x{})", usage, count)
            } else {
                usage.to_string()
            }
        })
        .collect()
}
