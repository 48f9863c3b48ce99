//! Anticipation ramps from sparse binary events.
//!
//! Each entity's rows are scanned for occurrences (label == 1). Rows within
//! `anticipation_window` before an occurrence receive a linear ramp rising
//! from 0 at `occurrence - window` to 1 at the occurrence itself.
//!
//! # Overwrite semantics
//!
//! Occurrences are visited latest first and every visit recomputes the whole
//! partition from that single occurrence, replacing what the previous visit
//! wrote. Contributions are never merged, so the earliest occurrence of the
//! entity decides every ramp value. A row that fell inside a later
//! occurrence's window but not the earliest one's ends up missing; a row
//! outside every window keeps its original label.

use df_common::{Error, Result, Value};
use df_config::ColumnNames;
use df_math::ramp_value;
use tracing::{debug, info};

use super::quantize::ClassQuantizer;
use crate::table::Table;

/// Validated parameters for [`binary_label_regression`].
#[derive(Debug, Clone, PartialEq)]
pub struct RampParams {
    anticipation_window: f64,
    quantizer: ClassQuantizer,
    fill_value: Option<f64>,
}

impl RampParams {
    /// `fill_value` replaces labels still missing after ramping; `None` leaves them missing.
    pub fn new(
        anticipation_window: f64,
        number_of_classes: usize,
        fill_value: Option<Value>,
    ) -> Result<Self> {
        if !(anticipation_window.is_finite() && anticipation_window > 0.0) {
            return Err(Error::Config(format!(
                "anticipation window must be a positive number, got {anticipation_window}"
            )));
        }
        let quantizer = ClassQuantizer::new(number_of_classes)?;
        let fill_value = match fill_value {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_f64().ok_or_else(|| {
                Error::Config(format!("fill value must be numeric, got {} {}", v.type_name(), v))
            })?),
        };
        Ok(Self {
            anticipation_window,
            quantizer,
            fill_value,
        })
    }

    pub fn anticipation_window(&self) -> f64 {
        self.anticipation_window
    }

    pub fn quantizer(&self) -> &ClassQuantizer {
        &self.quantizer
    }
}

/// Ramp one entity's labels.
///
/// `timestamps` and `labels` are parallel slices for the entity's rows. The
/// result holds `Value::Float` ramp values, `Value::Null` for rows whose
/// contribution was overwritten, and the original label elsewhere.
pub fn build_ramp(timestamps: &[i64], labels: &[Value], window: f64) -> Vec<Value> {
    let mut occurrences: Vec<i64> = timestamps
        .iter()
        .zip(labels)
        .filter(|(_, label)| label.is_occurrence())
        .map(|(t, _)| *t)
        .collect();
    occurrences.sort_unstable_by(|a, b| b.cmp(a));

    let mut current: Vec<Option<f64>> = vec![None; timestamps.len()];
    let mut touched = vec![false; timestamps.len()];
    for &occurrence in &occurrences {
        for (i, &t) in timestamps.iter().enumerate() {
            let v = ramp_value(t, occurrence, window);
            touched[i] |= v.is_some();
            current[i] = v;
        }
    }

    current
        .into_iter()
        .zip(touched)
        .zip(labels)
        .map(|((ramp, touched), original)| match ramp {
            Some(v) => Value::Float(v),
            None if touched => Value::Null,
            None => original.clone(),
        })
        .collect()
}

/// Turn a sparse binary label column into quantized ordinal labels.
///
/// The timestamp column is cast to integers and the table is stably sorted
/// by it. Ramps are built per entity, missing labels are then filled with
/// the configured fill value, and finally every label is replaced by its bin
/// index. Labels still missing after the fill stay `Null`.
///
/// Fails before touching the table if a column is absent, a timestamp is not
/// numeric, or a label is not numeric.
pub fn binary_label_regression(
    mut table: Table,
    columns: &ColumnNames,
    params: &RampParams,
) -> Result<Table> {
    let id_col = table.column_index(&columns.id)?;
    let ts_col = table.column_index(&columns.timestamp)?;
    let label_col = table.column_index(&columns.label)?;

    if let Some((row, label)) = table
        .column(label_col)
        .enumerate()
        .find(|(_, v)| !v.is_missing() && v.as_f64().is_none())
    {
        return Err(Error::ColumnType {
            column: columns.label.clone(),
            row,
            expected: "number",
            found: format!("{} {}", label.type_name(), label),
        });
    }

    table.cast_column_to_int(ts_col)?;
    table.stable_sort_by_column(ts_col);

    let partitions = table.partitions(id_col);
    let mut occurrences_total = 0usize;
    for partition in &partitions {
        let timestamps: Vec<i64> = partition
            .rows
            .iter()
            .map(|&r| table.value(r, ts_col).as_i64().unwrap_or_default())
            .collect();
        let labels: Vec<Value> = partition
            .rows
            .iter()
            .map(|&r| table.value(r, label_col).clone())
            .collect();
        let occurrences = labels.iter().filter(|l| l.is_occurrence()).count();
        occurrences_total += occurrences;

        let ramped = build_ramp(&timestamps, &labels, params.anticipation_window);
        for (&r, value) in partition.rows.iter().zip(ramped) {
            table.set_value(r, label_col, value);
        }
        debug!(
            entity = %partition.entity,
            rows = partition.rows.len(),
            occurrences,
            "ramped entity"
        );
    }

    let quantizer = &params.quantizer;
    let fill = params.fill_value;
    let table = table.map_column(label_col, |label| {
        let score = label.as_f64().or(fill);
        match score {
            Some(v) => Value::Int(quantizer.quantize(v) as i64),
            None => Value::Null,
        }
    });

    info!(
        rows = table.len(),
        entities = partitions.len(),
        occurrences = occurrences_total,
        classes = quantizer.number_of_classes(),
        "label regression complete"
    );
    Ok(table)
}
