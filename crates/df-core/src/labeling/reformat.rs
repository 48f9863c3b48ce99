//! Tag sequences as fixed-layout binary vectors.

use std::collections::HashMap;

use df_common::{Error, Result, Value};

/// Multi-hot encoding of `tags` against `layout`.
///
/// The output has one slot per layout entry, set to 1.0 when the tag at that
/// position occurs in the sequence. Repeated tags are harmless; a tag absent
/// from the layout is rejected.
pub fn multi_hot(tags: &[Value], layout: &[Value]) -> Result<Vec<f64>> {
    let positions: HashMap<&Value, usize> = layout
        .iter()
        .enumerate()
        .rev()
        .map(|(i, v)| (v, i))
        .collect();
    let mut output = vec![0.0; layout.len()];
    for tag in tags {
        let slot = positions.get(tag).ok_or_else(|| Error::UnacceptableLabel {
            column: "layout".to_string(),
            label: tag.to_string(),
        })?;
        output[*slot] = 1.0;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn sets_tag_positions() {
        let layout = values(&["cough", "fever", "rash", "nausea"]);
        let out = multi_hot(&values(&["rash", "cough", "rash"]), &layout).unwrap();
        assert_eq!(out, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn empty_sequence_is_all_zero() {
        let out = multi_hot(&[], &values(&["a", "b"])).unwrap();
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = multi_hot(&values(&["sneeze"]), &values(&["cough"])).unwrap_err();
        assert!(matches!(err, Error::UnacceptableLabel { label, .. } if label == "sneeze"));
    }

    #[test]
    fn duplicate_layout_entries_use_first_slot() {
        let layout = vec![Value::Int(7), Value::Int(3), Value::Int(7)];
        let out = multi_hot(&[Value::Int(7)], &layout).unwrap();
        assert_eq!(out, vec![1.0, 0.0, 0.0]);
    }
}
