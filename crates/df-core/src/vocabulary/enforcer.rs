//! Vocabulary enforcement on a label column.
//!
//! A [`LabelPolicy`] pairs a [`NotFoundPolicy`] with an optional accepted
//! vocabulary and, for the `default` policy, a substitute label. Without a
//! vocabulary, the only unacceptable label is a missing one.
//!
//! | Policy      | Effect on an unacceptable label            |
//! |-------------|--------------------------------------------|
//! | `ignore`    | row dropped                                |
//! | `exception` | `UnacceptableLabel` naming the label       |
//! | `default`   | label replaced with the substitute         |

use std::collections::BTreeSet;

use df_common::{Error, NotFoundPolicy, Result, Value};
use tracing::{debug, info};

use crate::table::Table;

/// Validated per-call vocabulary rule.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPolicy {
    policy: NotFoundPolicy,
    accepted: Option<BTreeSet<Value>>,
    default: Option<Value>,
}

impl LabelPolicy {
    /// Build a policy, rejecting contradictory settings.
    ///
    /// The `default` policy needs a substitute that is itself acceptable;
    /// the other policies must not be given one.
    pub fn new(
        policy: NotFoundPolicy,
        accepted: Option<BTreeSet<Value>>,
        default: Option<Value>,
    ) -> Result<Self> {
        match (policy, &default) {
            (NotFoundPolicy::Default, None) => {
                return Err(Error::Config(
                    "the default policy requires a default value".to_string(),
                ))
            }
            (NotFoundPolicy::Default, Some(substitute)) => {
                let acceptable = match &accepted {
                    Some(set) => set.contains(substitute),
                    None => !substitute.is_missing(),
                };
                if !acceptable {
                    return Err(Error::Config(format!(
                        "default value {substitute} is not an accepted label"
                    )));
                }
            }
            (_, Some(substitute)) => {
                return Err(Error::Config(format!(
                    "default value {substitute} given with the {policy} policy; \
                     only the default policy takes one"
                )))
            }
            (_, None) => {}
        }
        Ok(Self {
            policy,
            accepted,
            default,
        })
    }

    /// Policy with no accepted vocabulary: only missing labels are unacceptable.
    pub fn without_vocabulary(policy: NotFoundPolicy, default: Option<Value>) -> Result<Self> {
        Self::new(policy, None, default)
    }

    pub fn policy(&self) -> NotFoundPolicy {
        self.policy
    }

    pub fn accepted(&self) -> Option<&BTreeSet<Value>> {
        self.accepted.as_ref()
    }

    /// Whether `label` is inside the vocabulary.
    pub fn accepts(&self, label: &Value) -> bool {
        match &self.accepted {
            Some(set) => set.contains(label),
            None => !label.is_missing(),
        }
    }

    /// Apply the policy to `column`.
    pub fn enforce(&self, table: Table, column: &str) -> Result<Table> {
        let idx = table.column_index(column)?;
        let rows_in = table.len();

        let table = match self.policy {
            NotFoundPolicy::Ignore => table.retain_rows(|row| self.accepts(&row[idx])),
            NotFoundPolicy::Exception => {
                if let Some(label) = table.column(idx).find(|label| !self.accepts(label)) {
                    debug!(column, label = %label, "unacceptable label");
                    return Err(Error::UnacceptableLabel {
                        column: column.to_string(),
                        label: label.to_string(),
                    });
                }
                table
            }
            NotFoundPolicy::Default => {
                let substitute = self.default.clone().ok_or_else(|| {
                    Error::InternalConsistency("default policy without a default value".into())
                })?;
                let mut replaced = 0usize;
                let table = table.map_column(idx, |label| {
                    if self.accepts(&label) {
                        label
                    } else {
                        replaced += 1;
                        substitute.clone()
                    }
                });
                debug!(column, replaced, "substituted default label");
                table
            }
        };

        info!(
            policy = %self.policy,
            column,
            rows_in,
            rows_out = table.len(),
            "label policy enforced"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(labels: &[&str]) -> Option<BTreeSet<Value>> {
        Some(labels.iter().map(|s| Value::from(*s)).collect())
    }

    fn table(labels: &[Value]) -> Table {
        Table::from_rows(
            ["row", "label"],
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| vec![Value::from(i), l.clone()])
                .collect(),
        )
        .unwrap()
    }

    fn labels(table: &Table) -> Vec<Value> {
        table.column(1).cloned().collect()
    }

    #[test]
    fn default_policy_needs_acceptable_default() {
        let err = LabelPolicy::new(NotFoundPolicy::Default, set(&["A"]), None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err =
            LabelPolicy::new(NotFoundPolicy::Default, set(&["A"]), Some("B".into())).unwrap_err();
        assert!(err.to_string().contains("not an accepted label"));

        let err = LabelPolicy::without_vocabulary(NotFoundPolicy::Default, Some(Value::Null))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn default_under_other_policies_rejected() {
        for policy in [NotFoundPolicy::Ignore, NotFoundPolicy::Exception] {
            let err = LabelPolicy::new(policy, set(&["A"]), Some("A".into())).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{policy} accepted a default");
        }
    }

    #[test]
    fn exception_names_offending_label() {
        let policy = LabelPolicy::new(NotFoundPolicy::Exception, set(&["A", "B"]), None).unwrap();
        let input = table(&["A".into(), "B".into(), "C".into(), "A".into()]);
        match policy.enforce(input, "label") {
            Err(Error::UnacceptableLabel { column, label }) => {
                assert_eq!(column, "label");
                assert_eq!(label, "C");
            }
            other => panic!("expected UnacceptableLabel, got {other:?}"),
        }
    }

    #[test]
    fn exception_without_vocabulary_rejects_missing() {
        let policy = LabelPolicy::without_vocabulary(NotFoundPolicy::Exception, None).unwrap();
        assert!(policy.enforce(table(&["x".into()]), "label").is_ok());
        let err = policy
            .enforce(table(&["x".into(), Value::Null]), "label")
            .unwrap_err();
        assert!(matches!(err, Error::UnacceptableLabel { label, .. } if label == "null"));
    }

    #[test]
    fn default_substitutes_only_outsiders() {
        let policy =
            LabelPolicy::new(NotFoundPolicy::Default, set(&["A", "B", "UNK"]), Some("UNK".into()))
                .unwrap();
        let out = policy
            .enforce(table(&["C".into(), "A".into(), Value::Null]), "label")
            .unwrap();
        assert_eq!(
            labels(&out),
            vec![Value::from("UNK"), Value::from("A"), Value::from("UNK")]
        );
    }

    #[test]
    fn ignore_drops_and_is_idempotent() {
        let policy = LabelPolicy::new(NotFoundPolicy::Ignore, set(&["A", "B"]), None).unwrap();
        let once = policy
            .enforce(
                table(&["A".into(), "C".into(), Value::Null, "B".into()]),
                "label",
            )
            .unwrap();
        assert_eq!(labels(&once), vec![Value::from("A"), Value::from("B")]);

        let twice = policy.enforce(once.clone(), "label").unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn ignore_without_vocabulary_drops_missing() {
        let policy = LabelPolicy::without_vocabulary(NotFoundPolicy::Ignore, None).unwrap();
        let out = policy
            .enforce(table(&[Value::Int(3), Value::Null, Value::Float(f64::NAN)]), "label")
            .unwrap();
        assert_eq!(labels(&out), vec![Value::Int(3)]);
    }

    #[test]
    fn missing_column_is_reported() {
        let policy = LabelPolicy::without_vocabulary(NotFoundPolicy::Ignore, None).unwrap();
        let err = policy.enforce(table(&[]), "tag").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "tag"));
    }
}
