//! Class balancing by resampling with replacement.
//!
//! The accepted categories are an explicit list, the `top_k` most frequent
//! labels, or every label present. Each accepted category is then sampled
//! with replacement up to a common count.
//!
//! # Resolved count
//!
//! Unless [`BalanceConfig::honor_sample_count`] is set, the common count is
//! the size of the largest retained category and any requested
//! `sample_count_per_category` is overridden (a warning is logged when the
//! two differ). With `honor_sample_count`, the requested count is used as is.

use df_common::{Error, Result, Value};
use df_math::{count_in_encounter_order, max_count, top_k_by_frequency, FrequencyCount};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::table::Table;

/// Per-call balancing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Keep only these labels. Exclusive with `top_k`.
    pub accepted_labels: Option<Vec<Value>>,
    /// Keep only the `k` most frequent labels. Exclusive with `accepted_labels`.
    pub top_k: Option<usize>,
    pub sample_count_per_category: Option<usize>,
    pub honor_sample_count: bool,
    /// Uniformly permute the result instead of grouping rows by category.
    pub shuffle: bool,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            accepted_labels: None,
            top_k: None,
            sample_count_per_category: None,
            honor_sample_count: false,
            shuffle: true,
        }
    }
}

impl BalanceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.accepted_labels.is_some() && self.top_k.is_some() {
            return Err(Error::Config(
                "accepted_labels and top_k cannot be combined".to_string(),
            ));
        }
        if self.top_k == Some(0) {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        if self.honor_sample_count && self.sample_count_per_category.is_none() {
            return Err(Error::Config(
                "honor_sample_count requires sample_count_per_category".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary of a balancing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    /// Retained categories with their counts before resampling, in encounter order.
    pub categories: Vec<FrequencyCount<Value>>,
    /// Rows drawn per category.
    pub resolved_count: usize,
    /// Whether a requested count was replaced by the largest category size.
    pub requested_count_overridden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Balanced {
    pub table: Table,
    pub report: BalanceReport,
}

/// Resample `table` so every accepted category of `column` has the same count.
///
/// Rows with a missing label never take part.
pub fn balance_by_label<R: Rng + ?Sized>(
    table: Table,
    column: &str,
    config: &BalanceConfig,
    rng: &mut R,
) -> Result<Balanced> {
    config.validate()?;
    let idx = table.column_index(column)?;
    let rows_in = table.len();

    let table = table.retain_rows(|row| !row[idx].is_missing());
    let table = match (&config.accepted_labels, config.top_k) {
        (Some(accepted), _) => table.retain_rows(|row| accepted.contains(&row[idx])),
        (None, Some(k)) => {
            let counts = count_in_encounter_order(table.column(idx).cloned());
            let top = top_k_by_frequency(&counts, k);
            debug!(k, kept = top.len(), "selected most frequent labels");
            table.retain_rows(|row| top.contains(&row[idx]))
        }
        (None, None) => table,
    };

    let categories = count_in_encounter_order(table.column(idx).cloned());
    let largest = max_count(&categories);
    let (resolved_count, requested_count_overridden) =
        match (config.sample_count_per_category, config.honor_sample_count) {
            (Some(requested), true) => (requested, false),
            (Some(requested), false) => {
                if requested != largest {
                    warn!(
                        requested,
                        resolved = largest,
                        "requested sample count overridden by largest category size"
                    );
                }
                (largest, requested != largest)
            }
            (None, _) => (largest, false),
        };

    let total = resolved_count
        .checked_mul(categories.len())
        .ok_or_else(|| too_many_rows(resolved_count, categories.len()))?;
    let mut picked: Vec<usize> = Vec::new();
    picked
        .try_reserve_exact(total)
        .map_err(|_| too_many_rows(resolved_count, categories.len()))?;
    for category in &categories {
        let members: Vec<usize> = table
            .column(idx)
            .enumerate()
            .filter(|(_, label)| **label == category.value)
            .map(|(i, _)| i)
            .collect();
        picked.extend((0..resolved_count).map(|_| members[rng.random_range(0..members.len())]));
        debug!(
            label = %category.value,
            observed = category.count,
            sampled = resolved_count,
            "resampled category"
        );
    }
    if config.shuffle {
        picked.shuffle(rng);
    }

    let balanced = table.select_rows(&picked);
    info!(
        column,
        rows_in,
        rows_out = balanced.len(),
        categories = categories.len(),
        resolved_count,
        "table balanced"
    );
    Ok(Balanced {
        table: balanced,
        report: BalanceReport {
            categories,
            resolved_count,
            requested_count_overridden,
        },
    })
}

fn too_many_rows(per_category: usize, categories: usize) -> Error {
    Error::Config(format!(
        "sample count {per_category} across {categories} categories is too large to materialize"
    ))
}
