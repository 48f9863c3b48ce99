//! Semantic validation of pipeline configurations.
//!
//! Validation never stops at the first problem: every issue is collected so a
//! broken config file can be fixed in one pass.

use std::fmt;

use df_common::schema::is_compatible;
use df_common::NotFoundPolicy;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineConfig;

/// One problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collect every semantic issue in `config`.
pub fn validate(config: &PipelineConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !is_compatible(&config.schema_version) {
        issues.push(ValidationIssue::new(
            "schema_version",
            format!("unsupported schema version {}", config.schema_version),
        ));
    }

    for (field, name) in [
        ("columns.id", &config.columns.id),
        ("columns.timestamp", &config.columns.timestamp),
        ("columns.label", &config.columns.label),
    ] {
        if name.trim().is_empty() {
            issues.push(ValidationIssue::new(field, "column name must not be blank"));
        }
    }

    if let Some(ramp) = &config.ramp {
        if !(ramp.anticipation_window.is_finite() && ramp.anticipation_window > 0.0) {
            issues.push(ValidationIssue::new(
                "ramp.anticipation_window",
                format!("must be a positive number, got {}", ramp.anticipation_window),
            ));
        }
        if ramp.number_of_classes < 2 {
            issues.push(ValidationIssue::new(
                "ramp.number_of_classes",
                format!("must be at least 2, got {}", ramp.number_of_classes),
            ));
        }
    }

    if let Some(mapping) = &config.mapping {
        if mapping.groups.is_empty() && mapping.pairs.is_empty() {
            issues.push(ValidationIssue::new("mapping", "needs at least one group or pair"));
        }
        match (mapping.not_found_policy, &mapping.default_value) {
            (NotFoundPolicy::Default, None) => issues.push(ValidationIssue::new(
                "mapping.default_value",
                "required by the default policy",
            )),
            (NotFoundPolicy::Ignore | NotFoundPolicy::Exception, Some(_)) => {
                issues.push(ValidationIssue::new(
                    "mapping.default_value",
                    format!(
                        "only allowed with the default policy, not {}",
                        mapping.not_found_policy
                    ),
                ))
            }
            _ => {}
        }
    }

    if let Some(balance) = &config.balance {
        if balance.accepted_labels.is_some() && balance.top_k.is_some() {
            issues.push(ValidationIssue::new(
                "balance",
                "accepted_labels and top_k are mutually exclusive",
            ));
        }
        if balance.top_k == Some(0) {
            issues.push(ValidationIssue::new("balance.top_k", "must be at least 1"));
        }
        if balance.honor_sample_count && balance.sample_count_per_category.is_none() {
            issues.push(ValidationIssue::new(
                "balance.sample_count_per_category",
                "required when honor_sample_count is set",
            ));
        }
    }

    issues
}
