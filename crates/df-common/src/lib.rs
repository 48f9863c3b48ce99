//! DataFlame common types and errors.
//!
//! This crate provides foundational types shared across df-core modules:
//! - The discriminated cell [`Value`] used for identifiers, timestamps and labels
//! - The [`NotFoundPolicy`] vocabulary rule
//! - Common error types
//! - Configuration schema versioning

pub mod error;
pub mod policy;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use policy::NotFoundPolicy;
pub use schema::SCHEMA_VERSION;
pub use value::Value;
