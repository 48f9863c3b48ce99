//! Core math modules.

pub mod bins;
pub mod frequency;
pub mod ramp;
