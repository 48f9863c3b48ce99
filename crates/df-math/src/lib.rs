//! DataFlame math utilities.

pub mod math;

pub use math::bins::*;
pub use math::frequency::*;
pub use math::ramp::*;
