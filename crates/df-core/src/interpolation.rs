//! Per-entity gap filling of feature columns.
//!
//! The interpolation algorithm itself is supplied by the caller through
//! [`Interpolator`]; this module only partitions the table by entity, hands
//! each feature series over, and writes the results back.

use std::fmt;

use df_common::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::table::Table;

/// Which side of a gap may be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitDirection {
    Forward,
    Backward,
    Both,
}

impl fmt::Display for LimitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitDirection::Forward => write!(f, "forward"),
            LimitDirection::Backward => write!(f, "backward"),
            LimitDirection::Both => write!(f, "both"),
        }
    }
}

/// Parameters passed through to the [`Interpolator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationParams {
    /// Method name understood by the interpolator (e.g. `linear`, `time`).
    pub method: String,
    /// Maximum number of consecutive gaps to fill.
    pub limit: usize,
    pub limit_direction: LimitDirection,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            method: "time".to_string(),
            limit: 1000,
            limit_direction: LimitDirection::Both,
        }
    }
}

/// Gap-filling routine for one numeric series. `None` marks a gap.
///
/// Implementations must return a series of the same length.
pub trait Interpolator {
    fn interpolate(
        &self,
        series: &[Option<f64>],
        params: &InterpolationParams,
    ) -> Result<Vec<Option<f64>>>;
}

/// Interpolate `features` entity by entity, then fill what is left with `nan_fill`.
///
/// Only the feature columns change; label and identifier columns are never
/// handed to the interpolator. Nothing is written unless every series
/// succeeds.
pub fn interpolate_features(
    mut table: Table,
    id_column: &str,
    features: &[String],
    params: &InterpolationParams,
    nan_fill: Option<f64>,
    interpolator: &dyn Interpolator,
) -> Result<Table> {
    let id_col = table.column_index(id_column)?;
    let feature_cols = features
        .iter()
        .map(|name| table.column_index(name))
        .collect::<Result<Vec<usize>>>()?;

    for (&col, name) in feature_cols.iter().zip(features) {
        if let Some((row, value)) = table
            .column(col)
            .enumerate()
            .find(|(_, v)| !v.is_missing() && v.as_f64().is_none())
        {
            return Err(Error::ColumnType {
                column: name.clone(),
                row,
                expected: "number",
                found: format!("{} {}", value.type_name(), value),
            });
        }
    }

    let partitions = table.partitions(id_col);
    let mut writes: Vec<(usize, usize, Value)> = Vec::new();
    for partition in &partitions {
        for (&col, name) in feature_cols.iter().zip(features) {
            let series: Vec<Option<f64>> = partition
                .rows
                .iter()
                .map(|&r| table.value(r, col).as_f64())
                .collect();
            let filled = interpolator.interpolate(&series, params)?;
            if filled.len() != series.len() {
                return Err(Error::InternalConsistency(format!(
                    "interpolator returned {} values for {} rows of '{name}'",
                    filled.len(),
                    series.len()
                )));
            }
            for (&r, v) in partition.rows.iter().zip(filled) {
                writes.push((r, col, Value::from(v.or(nan_fill))));
            }
        }
        debug!(entity = %partition.entity, rows = partition.rows.len(), "interpolated entity");
    }

    for (r, col, value) in writes {
        table.set_value(r, col, value);
    }
    info!(
        entities = partitions.len(),
        features = features.len(),
        method = %params.method,
        limit = params.limit,
        direction = %params.limit_direction,
        "features interpolated"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Carries the last seen value forward, at most `limit` steps.
    struct ForwardFill;

    impl Interpolator for ForwardFill {
        fn interpolate(
            &self,
            series: &[Option<f64>],
            params: &InterpolationParams,
        ) -> Result<Vec<Option<f64>>> {
            let mut last = None;
            let mut run = 0;
            Ok(series
                .iter()
                .map(|v| match v {
                    Some(x) => {
                        last = Some(*x);
                        run = 0;
                        Some(*x)
                    }
                    None => {
                        run += 1;
                        if run <= params.limit {
                            last
                        } else {
                            None
                        }
                    }
                })
                .collect())
        }
    }

    struct Truncating;

    impl Interpolator for Truncating {
        fn interpolate(
            &self,
            series: &[Option<f64>],
            _params: &InterpolationParams,
        ) -> Result<Vec<Option<f64>>> {
            Ok(series.iter().skip(1).copied().collect())
        }
    }

    fn table() -> Table {
        Table::from_rows(
            ["id", "hr", "label"],
            vec![
                vec![Value::from("p1"), Value::Float(60.0), Value::Null],
                vec![Value::from("p2"), Value::Null, Value::Null],
                vec![Value::from("p1"), Value::Null, Value::Int(1)],
                vec![Value::from("p2"), Value::Int(80), Value::Null],
                vec![Value::from("p1"), Value::Null, Value::Null],
            ],
        )
        .unwrap()
    }

    fn params(limit: usize) -> InterpolationParams {
        InterpolationParams {
            method: "ffill".into(),
            limit,
            limit_direction: LimitDirection::Forward,
        }
    }

    #[test]
    fn fills_within_entity_only() {
        let out = interpolate_features(
            table(),
            "id",
            &["hr".to_string()],
            &params(1),
            Some(-10.0),
            &ForwardFill,
        )
        .unwrap();
        let hr: Vec<Value> = out.column(1).cloned().collect();
        assert_eq!(
            hr,
            vec![
                Value::Float(60.0),
                // p2 has nothing before its first reading
                Value::Float(-10.0),
                Value::Float(60.0),
                Value::Float(80.0),
                // past the limit of one step
                Value::Float(-10.0),
            ]
        );
        // labels untouched
        assert_eq!(out.value(2, 2), &Value::Int(1));
        assert!(out.value(0, 2).is_null());
    }

    #[test]
    fn no_fill_leaves_gaps_missing() {
        let out =
            interpolate_features(table(), "id", &["hr".to_string()], &params(0), None, &ForwardFill)
                .unwrap();
        assert!(out.value(1, 1).is_null());
        assert!(out.value(2, 1).is_null());
    }

    #[test]
    fn wrong_length_from_collaborator_rejected() {
        let err = interpolate_features(
            table(),
            "id",
            &["hr".to_string()],
            &params(1),
            None,
            &Truncating,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InternalConsistency(_)));
    }

    #[test]
    fn text_feature_rejected() {
        let mut t = table();
        t.set_value(4, 1, Value::from("n/a"));
        let err =
            interpolate_features(t, "id", &["hr".to_string()], &params(1), None, &ForwardFill)
                .unwrap_err();
        assert!(matches!(err, Error::ColumnType { row: 4, .. }));
    }

    #[test]
    fn defaults_match_time_interpolation() {
        let p = InterpolationParams::default();
        assert_eq!(p.method, "time");
        assert_eq!(p.limit, 1000);
        assert_eq!(p.limit_direction.to_string(), "both");
    }
}
