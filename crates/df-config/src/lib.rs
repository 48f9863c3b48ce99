//! DataFlame pipeline configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for pipeline configuration files
//! - Config path resolution (CLI → env)
//! - Semantic validation that reports every problem at once
//! - A stable fingerprint of the effective configuration

pub mod pipeline;
pub mod resolve;
pub mod validate;

pub use pipeline::{
    BalanceStage, ColumnNames, ConfigError, LabelGroup, MappingStage, PipelineConfig, RampStage,
};
pub use resolve::{resolve_config_path, resolve_config_path_from, CONFIG_ENV_VAR};
pub use validate::ValidationIssue;
