//! Ordinal quantization of ramp values.

use df_common::{Error, Result};
use df_math::{linspace, nearest_bin};

/// Maps a score in `[0, 1]` to one of `N` equally spaced ordinal bins.
///
/// The bins are `{0, 1/(N-1), ..., 1}`; a score goes to the nearest bin by
/// absolute distance, ties going to the lower index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassQuantizer {
    bins: Vec<f64>,
}

impl ClassQuantizer {
    pub fn new(number_of_classes: usize) -> Result<Self> {
        if number_of_classes < 2 {
            return Err(Error::Config(format!(
                "number of classes must be at least 2, got {number_of_classes}"
            )));
        }
        Ok(Self {
            bins: linspace(0.0, 1.0, number_of_classes),
        })
    }

    pub fn number_of_classes(&self) -> usize {
        self.bins.len()
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Bin index of `v`. NaN scores land in bin 0.
    pub fn quantize(&self, v: f64) -> usize {
        nearest_bin(v, &self.bins).unwrap_or(0)
    }
}
