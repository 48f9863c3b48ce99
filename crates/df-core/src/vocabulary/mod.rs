//! Label vocabularies: policy enforcement and relabeling.

pub mod enforcer;
pub mod mapping;

pub use enforcer::LabelPolicy;
pub use mapping::{apply_mapping, LabelMapping};
