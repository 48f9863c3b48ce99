//! DataFlame core library.
//!
//! Label preparation for entity-partitioned time series tables:
//! - [`labeling`]: anticipation ramps from sparse events and ordinal quantization
//! - [`vocabulary`]: accepted-label policies and many-to-one relabeling
//! - [`balance`]: class balancing by resampling with replacement
//! - [`interpolation`] and [`correlation`]: seams for caller-supplied numerics
//! - [`pipeline`]: the configured ramp → mapping → balance sequence

pub mod balance;
pub mod correlation;
pub mod exit_codes;
pub mod interpolation;
pub mod labeling;
pub mod logging;
pub mod pipeline;
pub mod table;
pub mod vocabulary;

pub use balance::{balance_by_label, BalanceConfig, BalanceReport, Balanced};
pub use correlation::{correlation_matrix, CorrelationMatrix, CorrelationMethod, Correlator};
pub use df_common::{Error, NotFoundPolicy, Result, Value};
pub use df_config::{ColumnNames, PipelineConfig};
pub use exit_codes::ExitCode;
pub use interpolation::{interpolate_features, InterpolationParams, Interpolator, LimitDirection};
pub use labeling::{binary_label_regression, build_ramp, multi_hot, ClassQuantizer, RampParams};
pub use pipeline::{run_pipeline, PipelineReport};
pub use table::{Partition, Table};
pub use vocabulary::{apply_mapping, LabelMapping, LabelPolicy};
