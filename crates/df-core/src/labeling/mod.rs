//! Label construction: anticipation ramps, ordinal quantization, and tag
//! vector reformatting.
//!
//! The usual flow is a raw table with a sparse 0/1 event column going through
//! [`binary_label_regression`], which ramps each entity's events and
//! quantizes the result into `N` ordinal classes.

pub mod quantize;
pub mod ramp;
pub mod reformat;

pub use quantize::ClassQuantizer;
pub use ramp::{binary_label_regression, build_ramp, RampParams};
pub use reformat::multi_hot;
