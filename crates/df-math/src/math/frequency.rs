//! Category frequency tables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Number of times a category was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyCount<T> {
    pub value: T,
    pub count: usize,
}

/// Count categories, listing them in order of first appearance.
pub fn count_in_encounter_order<T, I>(items: I) -> Vec<FrequencyCount<T>>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut slots: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<FrequencyCount<T>> = Vec::new();
    for item in items {
        match slots.get(&item) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(item.clone(), counts.len());
                counts.push(FrequencyCount {
                    value: item,
                    count: 1,
                });
            }
        }
    }
    counts
}

/// The `k` most frequent categories, most frequent first.
///
/// Equal counts keep their input order.
pub fn top_k_by_frequency<T: Clone>(counts: &[FrequencyCount<T>], k: usize) -> Vec<T> {
    let mut ranked: Vec<&FrequencyCount<T>> = counts.iter().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.into_iter().take(k).map(|c| c.value.clone()).collect()
}

/// Largest count in the table, or 0 when empty.
pub fn max_count<T>(counts: &[FrequencyCount<T>]) -> usize {
    counts.iter().map(|c| c.count).max().unwrap_or(0)
}
