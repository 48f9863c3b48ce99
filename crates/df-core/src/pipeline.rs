//! Configured stage sequence: ramp → mapping → balance.
//!
//! Each stage present in the [`PipelineConfig`] runs once, in that fixed
//! order, on the output of the previous one. Every stage parameter is
//! converted and checked before the first stage runs, so a bad mapping or
//! balance section fails without doing any ramping work.

use df_common::{Result, Value};
use df_config::{BalanceStage, MappingStage, PipelineConfig, RampStage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::balance::{balance_by_label, BalanceConfig, BalanceReport};
use crate::labeling::{binary_label_regression, RampParams};
use crate::table::Table;
use crate::vocabulary::{apply_mapping, LabelMapping};

/// Outcome of [`run_pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub table: Table,
    /// SHA-256 fingerprint of the configuration that produced `table`.
    pub fingerprint: String,
    pub rows_in: usize,
    /// Names of the stages that ran, in order.
    pub stages: Vec<&'static str>,
    pub balance: Option<BalanceReport>,
}

impl TryFrom<&RampStage> for RampParams {
    type Error = df_common::Error;

    fn try_from(stage: &RampStage) -> Result<Self> {
        RampParams::new(
            stage.anticipation_window,
            stage.number_of_classes,
            stage.fill_value.clone(),
        )
    }
}

impl TryFrom<&MappingStage> for LabelMapping {
    type Error = df_common::Error;

    /// Groups and explicit pairs merged into one mapping.
    fn try_from(stage: &MappingStage) -> Result<Self> {
        let mut pairs: Vec<(Value, Value)> = Vec::new();
        for group in &stage.groups {
            pairs.extend(
                group
                    .children
                    .iter()
                    .map(|child| (child.clone(), group.parent.clone())),
            );
            pairs.push((group.parent.clone(), group.parent.clone()));
        }
        pairs.extend(stage.pairs.iter().cloned());
        LabelMapping::new(pairs)
    }
}

impl From<&BalanceStage> for BalanceConfig {
    fn from(stage: &BalanceStage) -> Self {
        BalanceConfig {
            accepted_labels: stage.accepted_labels.clone(),
            top_k: stage.top_k,
            sample_count_per_category: stage.sample_count_per_category,
            honor_sample_count: stage.honor_sample_count,
            shuffle: stage.shuffle,
        }
    }
}

/// Random source for the balance stage: seeded when the config names a seed.
pub fn rng_for(config: &PipelineConfig) -> StdRng {
    match config.balance.as_ref().and_then(|b| b.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Run every configured stage on `table`.
pub fn run_pipeline<R: Rng + ?Sized>(
    table: Table,
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<PipelineReport> {
    config.validate()?;
    let fingerprint = config.fingerprint()?;
    let columns = &config.columns;

    let ramp = config.ramp.as_ref().map(RampParams::try_from).transpose()?;
    let mapping = config
        .mapping
        .as_ref()
        .map(|stage| LabelMapping::try_from(stage).map(|m| (stage, m)))
        .transpose()?;
    let balance = config.balance.as_ref().map(BalanceConfig::from);
    if let Some(balance) = &balance {
        balance.validate()?;
    }

    info!(
        fingerprint = %fingerprint,
        ramp = ramp.is_some(),
        mapping = mapping.is_some(),
        balance = balance.is_some(),
        "pipeline starting"
    );

    let rows_in = table.len();
    let mut stages = Vec::new();
    let mut table = table;

    if let Some(params) = &ramp {
        table = binary_label_regression(table, columns, params)?;
        stages.push("ramp");
    }
    if let Some((stage, mapping)) = &mapping {
        table = apply_mapping(
            table,
            &columns.label,
            mapping,
            stage.not_found_policy,
            stage.default_value.clone(),
        )?;
        stages.push("mapping");
    }
    let mut balance_report = None;
    if let Some(balance) = &balance {
        let balanced = balance_by_label(table, &columns.label, balance, rng)?;
        table = balanced.table;
        balance_report = Some(balanced.report);
        stages.push("balance");
    }

    info!(rows_in, rows_out = table.len(), stages = ?stages, "pipeline finished");
    Ok(PipelineReport {
        table,
        fingerprint,
        rows_in,
        stages,
        balance: balance_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_common::{Error, NotFoundPolicy};
    use df_config::{ColumnNames, LabelGroup};

    fn columns() -> ColumnNames {
        ColumnNames {
            id: "id".into(),
            timestamp: "ts".into(),
            label: "label".into(),
        }
    }

    fn events() -> Table {
        let mut table = Table::new(["id", "ts", "label"]);
        for (id, ts, label) in [
            ("a", 0, 0),
            ("a", 5, 0),
            ("a", 10, 1),
            ("b", 0, 0),
            ("b", 20, 0),
        ] {
            table
                .push_row(vec![Value::from(id), Value::from(ts), Value::from(label)])
                .unwrap();
        }
        table
    }

    #[test]
    fn empty_config_is_identity() {
        let config = PipelineConfig::new(columns());
        let mut rng = StdRng::seed_from_u64(1);
        let report = run_pipeline(events(), &config, &mut rng).unwrap();
        assert_eq!(report.table, events());
        assert!(report.stages.is_empty());
        assert_eq!(report.fingerprint, config.fingerprint().unwrap());
    }

    #[test]
    fn stages_run_in_order() {
        let mut config = PipelineConfig::new(columns());
        config.ramp = Some(RampStage {
            anticipation_window: 10.0,
            number_of_classes: 2,
            fill_value: Some(Value::Int(0)),
        });
        config.mapping = Some(MappingStage {
            groups: vec![LabelGroup {
                parent: Value::from("event"),
                children: vec![Value::Int(1)],
            }],
            pairs: vec![(Value::Int(0), Value::from("quiet"))],
            not_found_policy: NotFoundPolicy::Exception,
            default_value: None,
        });
        config.balance = Some(BalanceStage {
            accepted_labels: None,
            top_k: None,
            sample_count_per_category: None,
            honor_sample_count: false,
            shuffle: false,
            seed: Some(3),
        });

        let mut rng = rng_for(&config);
        let report = run_pipeline(events(), &config, &mut rng).unwrap();
        assert_eq!(report.stages, vec!["ramp", "mapping", "balance"]);
        assert_eq!(report.rows_in, 5);

        // with 2 classes the 0.5 ramp rounds down: 1 event and 4 quiet rows
        let balance = report.balance.unwrap();
        assert_eq!(balance.resolved_count, 4);
        assert_eq!(report.table.len(), 8);
        let label_col = report.table.column_index("label").unwrap();
        assert!(report
            .table
            .column(label_col)
            .all(|v| *v == Value::from("event") || *v == Value::from("quiet")));
    }

    #[test]
    fn bad_mapping_fails_before_ramping() {
        let mut config = PipelineConfig::new(columns());
        config.ramp = Some(RampStage {
            anticipation_window: 10.0,
            number_of_classes: 2,
            fill_value: None,
        });
        config.mapping = Some(MappingStage {
            groups: vec![],
            pairs: vec![
                (Value::from("x"), Value::from("y")),
                (Value::from("y"), Value::from("z")),
            ],
            not_found_policy: NotFoundPolicy::Ignore,
            default_value: None,
        });
        let mut rng = StdRng::seed_from_u64(1);
        let err = run_pipeline(events(), &config, &mut rng).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_config_is_config_error() {
        let mut config = PipelineConfig::new(columns());
        config.columns.label = " ".into();
        let mut rng = StdRng::seed_from_u64(1);
        let err = run_pipeline(events(), &config, &mut rng).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn seeded_config_is_reproducible() {
        let mut config = PipelineConfig::new(columns());
        config.balance = Some(BalanceStage {
            accepted_labels: None,
            top_k: None,
            sample_count_per_category: None,
            honor_sample_count: false,
            shuffle: true,
            seed: Some(42),
        });
        let a = run_pipeline(events(), &config, &mut rng_for(&config)).unwrap();
        let b = run_pipeline(events(), &config, &mut rng_for(&config)).unwrap();
        assert_eq!(a, b);
    }
}
