//! Row-oriented in-memory table.
//!
//! A [`Table`] is an ordered list of rows over a fixed list of named columns.
//! Its serde form `{ "columns": [...], "rows": [[...], ...] }` is also the
//! interchange format of the `dataflame` CLI.

use std::collections::HashMap;

use df_common::{Error, Result, Value};
use serde::{Deserialize, Serialize};

/// Ordered rows of [`Value`]s under named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawTable> for Table {
    type Error = Error;

    fn try_from(raw: RawTable) -> Result<Self> {
        Table::from_rows(raw.columns, raw.rows)
    }
}

/// Rows belonging to one entity, as indices into the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub entity: Value,
    pub rows: Vec<usize>,
}

impl Table {
    /// Empty table with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Table from columns and rows; every row must match the column count.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in &rows {
            table.check_arity(row.len())?;
        }
        table.rows = rows;
        Ok(table)
    }

    /// Parse the interchange form.
    ///
    /// Malformed JSON is [`Error::Json`]; well-formed JSON with a row that does
    /// not match the column count is [`Error::RowArity`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTable = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    fn check_arity(&self, actual: usize) -> Result<()> {
        if actual != self.columns.len() {
            return Err(Error::RowArity {
                expected: self.columns.len(),
                actual,
            });
        }
        Ok(())
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        self.check_arity(row.len())?;
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    pub fn set_value(&mut self, row: usize, column: usize, value: Value) {
        self.rows[row][column] = value;
    }

    /// Cast a column to `Value::Int`, truncating floats.
    ///
    /// Every cell is checked before any is rewritten, so on error the
    /// table is unchanged.
    pub fn cast_column_to_int(&mut self, column: usize) -> Result<()> {
        let mut cast = Vec::with_capacity(self.rows.len());
        for (row, value) in self.column(column).enumerate() {
            match value.as_i64() {
                Some(i) => cast.push(i),
                None => {
                    return Err(Error::ColumnType {
                        column: self.columns[column].clone(),
                        row,
                        expected: "integer",
                        found: format!("{} {}", value.type_name(), value),
                    })
                }
            }
        }
        for (row, i) in self.rows.iter_mut().zip(cast) {
            row[column] = Value::Int(i);
        }
        Ok(())
    }

    /// Stable sort of the rows by a column's value.
    ///
    /// Rows with equal keys keep their relative order.
    pub fn stable_sort_by_column(&mut self, column: usize) {
        self.rows.sort_by(|a, b| a[column].cmp(&b[column]));
    }

    /// Group row indices by the value in `column`.
    ///
    /// Partitions are listed in order of first appearance and rows keep
    /// table order inside each partition.
    pub fn partitions(&self, column: usize) -> Vec<Partition> {
        let mut slots: HashMap<&Value, usize> = HashMap::new();
        let mut partitions: Vec<Partition> = Vec::new();
        for (i, value) in self.column(column).enumerate() {
            match slots.get(value) {
                Some(&slot) => partitions[slot].rows.push(i),
                None => {
                    slots.insert(value, partitions.len());
                    partitions.push(Partition {
                        entity: value.clone(),
                        rows: vec![i],
                    });
                }
            }
        }
        partitions
    }

    /// Keep only rows satisfying `keep`.
    pub fn retain_rows<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
        self
    }

    /// New table holding copies of the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Apply `f` to every value of one column.
    pub fn map_column<F>(mut self, column: usize, mut f: F) -> Self
    where
        F: FnMut(Value) -> Value,
    {
        for row in &mut self.rows {
            let value = std::mem::take(&mut row[column]);
            row[column] = f(value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            ["id", "ts", "label"],
            vec![
                vec![Value::from("b"), Value::Float(3.7), Value::Null],
                vec![Value::from("a"), Value::Int(1), Value::Int(1)],
                vec![Value::from("b"), Value::Int(1), Value::Int(0)],
                vec![Value::from("a"), Value::Int(3), Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn arity_is_checked() {
        let err = Table::from_rows(["a", "b"], vec![vec![Value::Null]]).unwrap_err();
        assert!(matches!(err, Error::RowArity { expected: 2, actual: 1 }));

        let mut table = Table::new(["a"]);
        assert!(table.push_row(vec![Value::Int(1), Value::Int(2)]).is_err());
        assert!(table.push_row(vec![Value::Int(1)]).is_ok());
    }

    #[test]
    fn missing_column_named() {
        let err = sample().column_index("nope").unwrap_err();
        assert_eq!(err.to_string(), "column 'nope' not found");
    }

    #[test]
    fn cast_then_stable_sort() {
        let mut table = sample();
        table.cast_column_to_int(1).unwrap();
        assert_eq!(table.value(0, 1), &Value::Int(3));
        table.stable_sort_by_column(1);
        let ids: Vec<&Value> = table.column(0).collect();
        // ties at ts=1 and ts=3 keep original relative order
        assert_eq!(
            ids,
            vec![&Value::from("a"), &Value::from("b"), &Value::from("b"), &Value::from("a")]
        );
    }

    #[test]
    fn failed_cast_leaves_table_untouched() {
        let mut table = sample();
        table.set_value(3, 1, Value::from("noon"));
        let before = table.clone();
        let err = table.cast_column_to_int(1).unwrap_err();
        assert!(matches!(err, Error::ColumnType { row: 3, .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn partitions_in_first_appearance_order() {
        let parts = sample().partitions(0);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].entity, Value::from("b"));
        assert_eq!(parts[0].rows, vec![0, 2]);
        assert_eq!(parts[1].rows, vec![1, 3]);
    }

    #[test]
    fn serde_rejects_ragged_rows() {
        let ok: Table = serde_json::from_str(r#"{"columns":["a"],"rows":[[1],[null]]}"#).unwrap();
        assert_eq!(ok.len(), 2);
        let bad = serde_json::from_str::<Table>(r#"{"columns":["a"],"rows":[[1,2]]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn from_json_keeps_arity_errors_distinct() {
        let err = Table::from_json(r#"{"columns":["a","b"],"rows":[[1,2],[3]]}"#).unwrap_err();
        assert!(matches!(err, Error::RowArity { expected: 2, actual: 1 }));
        assert!(err.is_data_error());

        let err = Table::from_json(r#"{"columns":["a"],"rows":[[1]"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        let table = Table::from_json(r#"{"columns":["a"]}"#).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn select_and_retain() {
        let table = sample();
        let picked = table.select_rows(&[3, 3, 0]);
        assert_eq!(picked.len(), 3);
        assert_eq!(picked.value(1, 1), &Value::Int(3));
        let kept = table.retain_rows(|row| !row[2].is_null());
        assert_eq!(kept.len(), 2);
    }
}
