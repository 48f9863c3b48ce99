//! Pairwise correlation of numeric columns through a caller-supplied [`Correlator`].

use std::fmt;
use std::str::FromStr;

use df_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Kendall,
    Spearman,
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationMethod::Pearson => write!(f, "pearson"),
            CorrelationMethod::Kendall => write!(f, "kendall"),
            CorrelationMethod::Spearman => write!(f, "spearman"),
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "kendall" => Ok(CorrelationMethod::Kendall),
            "spearman" => Ok(CorrelationMethod::Spearman),
            other => Err(format!("unknown correlation method '{other}'")),
        }
    }
}

/// Pairwise statistic over numeric columns; `None` marks a missing value.
///
/// Implementations return a square matrix with one row per input column.
pub trait Correlator {
    fn correlate(
        &self,
        columns: &[Vec<Option<f64>>],
        method: CorrelationMethod,
    ) -> Result<Vec<Vec<f64>>>;
}

/// Correlation matrix with its column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Correlate the named columns of `table`, optionally replacing NaN with 0.0.
///
/// Non-numeric cells are treated as missing.
pub fn correlation_matrix(
    table: &Table,
    columns: &[String],
    method: CorrelationMethod,
    correlator: &dyn Correlator,
    zero_nans: bool,
) -> Result<CorrelationMatrix> {
    let series = columns
        .iter()
        .map(|name| -> Result<Vec<Option<f64>>> {
            let idx = table.column_index(name)?;
            Ok(table.column(idx).map(|v| v.as_f64()).collect())
        })
        .collect::<Result<Vec<Vec<Option<f64>>>>>()?;

    let mut values = correlator.correlate(&series, method)?;
    let n = columns.len();
    if values.len() != n || values.iter().any(|row| row.len() != n) {
        return Err(Error::InternalConsistency(format!(
            "{method} correlator returned a non-{n}x{n} matrix"
        )));
    }
    if zero_nans {
        for v in values.iter_mut().flatten() {
            if v.is_nan() {
                *v = 0.0;
            }
        }
    }
    Ok(CorrelationMatrix {
        labels: columns.to_vec(),
        values,
    })
}
