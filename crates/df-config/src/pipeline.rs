//! Pipeline configuration types.
//!
//! A pipeline file names the table columns and configures up to three
//! stages, always run in the order ramp → mapping → balance:
//!
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "columns": { "id": "subject", "timestamp": "ts", "label": "event" },
//!   "ramp": { "anticipation_window": 30.0, "number_of_classes": 5 },
//!   "mapping": {
//!     "groups": [{ "parent": "walk", "children": ["stroll", "hike"] }],
//!     "not_found_policy": "ignore"
//!   },
//!   "balance": { "top_k": 3, "shuffle": true, "seed": 7 }
//! }
//! ```

use std::path::Path;

use df_common::{NotFoundPolicy, Value, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::validate::{validate, ValidationIssue};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    pub columns: ColumnNames,

    #[serde(default)]
    pub ramp: Option<RampStage>,

    #[serde(default)]
    pub mapping: Option<MappingStage>,

    #[serde(default)]
    pub balance: Option<BalanceStage>,
}

/// Names of the columns every stage works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    /// Entity (subject) identifier column.
    pub id: String,
    pub timestamp: String,
    pub label: String,
}

/// Ramp-and-quantize stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampStage {
    /// Width of the anticipation window, in timestamp units.
    pub anticipation_window: f64,

    #[serde(default = "default_number_of_classes")]
    pub number_of_classes: usize,

    /// Label assigned to rows still missing after ramping. `null` keeps them missing.
    #[serde(default = "default_fill_value")]
    pub fill_value: Option<Value>,
}

/// One parent label and the child labels folded into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub parent: Value,
    pub children: Vec<Value>,
}

/// Relabeling stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingStage {
    /// Many-to-one groups; each child maps to its parent, each parent to itself.
    #[serde(default)]
    pub groups: Vec<LabelGroup>,

    /// Explicit `[from, to]` pairs, merged with `groups`.
    #[serde(default)]
    pub pairs: Vec<(Value, Value)>,

    #[serde(default = "default_not_found_policy")]
    pub not_found_policy: NotFoundPolicy,

    /// Substitute label for the `default` policy.
    #[serde(default)]
    pub default_value: Option<Value>,
}

/// Class balancing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceStage {
    #[serde(default)]
    pub accepted_labels: Option<Vec<Value>>,

    #[serde(default)]
    pub top_k: Option<usize>,

    #[serde(default)]
    pub sample_count_per_category: Option<usize>,

    /// Use `sample_count_per_category` as given instead of matching the largest category.
    #[serde(default)]
    pub honor_sample_count: bool,

    #[serde(default = "default_shuffle")]
    pub shuffle: bool,

    /// Seed for sampling and shuffling; drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_number_of_classes() -> usize {
    2
}

fn default_fill_value() -> Option<Value> {
    Some(Value::Int(0))
}

fn default_not_found_policy() -> NotFoundPolicy {
    NotFoundPolicy::Ignore
}

fn default_shuffle() -> bool {
    true
}

/// Errors that can occur while loading a pipeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pipeline configuration: {}", join_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

impl From<ConfigError> for df_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => df_common::Error::Io(e),
            other => df_common::Error::Config(other.to_string()),
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PipelineConfig {
    /// Minimal configuration with no stages enabled.
    pub fn new(columns: ColumnNames) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            description: None,
            columns,
            ramp: None,
            mapping: None,
            balance: None,
        }
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Every semantic problem with this configuration.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        validate(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    /// SHA-256 hex digest of the canonical JSON form.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
