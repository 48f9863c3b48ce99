//! Relabeling through a finite vocabulary mapping.
//!
//! A [`LabelMapping`] is idempotent: every target label is also a key that
//! maps to itself, so re-applying a mapping to its own output is a no-op.
//! Mappings are usually authored as groups, `{parent: [child, ...]}`, with
//! [`LabelMapping::form_mapping`].

use std::collections::{BTreeMap, BTreeSet};

use df_common::{Error, NotFoundPolicy, Result, Value};
use tracing::info;

use super::enforcer::LabelPolicy;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelMapping {
    map: BTreeMap<Value, Value>,
}

impl LabelMapping {
    /// Build a mapping from `(from, to)` pairs.
    ///
    /// Targets that are not keys yet are added as self-mappings. Fails if a
    /// key is given two different targets or a target maps somewhere else.
    pub fn new(pairs: impl IntoIterator<Item = (Value, Value)>) -> Result<Self> {
        let mut map: BTreeMap<Value, Value> = BTreeMap::new();
        for (from, to) in pairs {
            match map.get(&from) {
                Some(existing) if *existing != to => {
                    return Err(Error::Config(format!(
                        "label {from} is mapped to both {existing} and {to}"
                    )))
                }
                Some(_) => {}
                None => {
                    map.insert(from, to);
                }
            }
        }

        let targets: BTreeSet<Value> = map.values().cloned().collect();
        for target in targets {
            match map.get(&target) {
                Some(next) if *next != target => {
                    return Err(Error::Config(format!(
                        "mapping is not idempotent: {target} is a target but maps to {next}"
                    )))
                }
                Some(_) => {}
                None => {
                    map.insert(target.clone(), target);
                }
            }
        }
        Ok(Self { map })
    }

    /// Many-to-one mapping from groups: each child maps to its parent and
    /// each parent maps to itself.
    pub fn form_mapping(groups: impl IntoIterator<Item = (Value, Vec<Value>)>) -> Result<Self> {
        let pairs = groups.into_iter().flat_map(|(parent, children)| {
            let parent_pair = (parent.clone(), parent.clone());
            children
                .into_iter()
                .map(move |child| (child, parent.clone()))
                .chain(std::iter::once(parent_pair))
        });
        Self::new(pairs)
    }

    /// The accepted vocabulary: every key.
    pub fn accepted_labels(&self) -> BTreeSet<Value> {
        self.map.keys().cloned().collect()
    }

    pub fn get(&self, label: &Value) -> Option<&Value> {
        self.map.get(label)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.map.iter()
    }
}

/// Enforce the mapping's vocabulary on `column`, then relabel every row.
///
/// `policy` and `default` decide what happens to labels that are not keys of
/// the mapping; see [`LabelPolicy`]. A retained label without a key after
/// enforcement is an internal consistency error and leaves no partial output.
pub fn apply_mapping(
    table: Table,
    column: &str,
    mapping: &LabelMapping,
    policy: NotFoundPolicy,
    default: Option<Value>,
) -> Result<Table> {
    let enforcer = LabelPolicy::new(policy, Some(mapping.accepted_labels()), default)?;
    let table = enforcer.enforce(table, column)?;
    let idx = table.column_index(column)?;

    let mapped = table
        .column(idx)
        .map(|label| {
            mapping.get(label).cloned().ok_or_else(|| {
                Error::InternalConsistency(format!(
                    "label {label} in column '{column}' survived {policy} enforcement without a mapping"
                ))
            })
        })
        .collect::<Result<Vec<Value>>>()?;

    let mut mapped = mapped.into_iter();
    let table = table.map_column(idx, |_| mapped.next().unwrap_or_default());
    info!(column, rows = table.len(), vocabulary = mapping.len(), "labels mapped");
    Ok(table)
}
