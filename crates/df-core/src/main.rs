//! dataflame - label preparation for entity-partitioned time series tables.
//!
//! Tables are read and written as JSON (`{"columns": [...], "rows": [[...]]}`),
//! from `--input` or stdin and to `--output` or stdout. Logs go to stderr.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use df_common::{Error, NotFoundPolicy, Result, Value};
use df_config::{resolve_config_path, ColumnNames, LabelGroup, MappingStage, PipelineConfig};
use df_core::balance::{balance_by_label, BalanceConfig};
use df_core::exit_codes::ExitCode;
use df_core::labeling::{binary_label_regression, RampParams};
use df_core::logging::{self, LogFormat};
use df_core::pipeline::{rng_for, run_pipeline};
use df_core::table::Table;
use df_core::vocabulary::{apply_mapping, LabelMapping};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "dataflame",
    version,
    about = "Label ramping, vocabulary mapping and class balancing"
)]
struct Cli {
    /// Log output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ramp sparse binary events and quantize them into ordinal classes
    Ramp {
        #[command(flatten)]
        columns: ColumnArgs,
        /// Anticipation window, in timestamp units
        #[arg(long)]
        window: f64,
        /// Number of ordinal classes
        #[arg(long, default_value = "2")]
        classes: usize,
        /// Label for rows still missing after ramping
        #[arg(long, default_value = "0", value_parser = parse_value)]
        fill: Value,
        /// Leave rows missing after ramping as null
        #[arg(long, conflicts_with = "fill")]
        no_fill: bool,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Relabel a column through a many-to-one mapping
    Map {
        /// Label column
        #[arg(long, default_value = "label")]
        column: String,
        /// Group of labels folded into a parent (PARENT=CHILD,CHILD,...)
        #[arg(long = "group", value_name = "PARENT=CHILDREN", value_parser = parse_group)]
        groups: Vec<(Value, Vec<Value>)>,
        /// Single relabeling pair (FROM=TO)
        #[arg(long = "pair", value_name = "FROM=TO", value_parser = parse_pair)]
        pairs: Vec<(Value, Value)>,
        /// What to do with labels outside the mapping (ignore, exception, default)
        #[arg(long, default_value = "ignore")]
        policy: NotFoundPolicy,
        /// Substitute label for the default policy
        #[arg(long, value_parser = parse_value)]
        default: Option<Value>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Resample so every accepted label has the same number of rows
    Balance {
        /// Label column
        #[arg(long, default_value = "label")]
        column: String,
        /// Keep only these labels
        #[arg(
            long = "accept",
            value_name = "LABEL",
            value_parser = parse_value,
            conflicts_with = "top_k"
        )]
        accepted: Vec<Value>,
        /// Keep only the K most frequent labels
        #[arg(long)]
        top_k: Option<usize>,
        /// Requested rows per category
        #[arg(long)]
        sample_count: Option<usize>,
        /// Use --sample-count as given instead of the largest category size
        #[arg(long, requires = "sample_count")]
        honor_sample_count: bool,
        /// Keep rows grouped by category instead of shuffling
        #[arg(long)]
        no_shuffle: bool,
        /// Seed for sampling and shuffling
        #[arg(long)]
        seed: Option<u64>,
        /// Write the balance report (JSON) to this file
        #[arg(long)]
        report: Option<PathBuf>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Run the stages configured in a pipeline file
    Run {
        /// Pipeline config file (falls back to DATAFLAME_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write a run summary (JSON) to this file
        #[arg(long)]
        report: Option<PathBuf>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Check a pipeline file and list every problem found
    ValidateConfig {
        /// Pipeline config file (falls back to DATAFLAME_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ColumnArgs {
    /// Entity identifier column
    #[arg(long, default_value = "id")]
    id: String,
    /// Timestamp column
    #[arg(long, default_value = "timestamp")]
    timestamp: String,
    /// Label column
    #[arg(long, default_value = "label")]
    label: String,
}

impl From<ColumnArgs> for ColumnNames {
    fn from(args: ColumnArgs) -> Self {
        ColumnNames {
            id: args.id,
            timestamp: args.timestamp,
            label: args.label,
        }
    }
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input table (JSON); stdin when absent
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output table (JSON); stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Summary written by `run --report`.
#[derive(Serialize)]
struct RunSummary<'a> {
    fingerprint: &'a str,
    rows_in: usize,
    rows_out: usize,
    stages: &'a [&'static str],
    balance: Option<&'a df_core::BalanceReport>,
}

/// A label given on the command line: JSON scalars keep their type, anything else is text.
fn parse_value(s: &str) -> std::result::Result<Value, String> {
    Ok(serde_json::from_str::<Value>(s).unwrap_or_else(|_| Value::Str(s.to_string())))
}

fn parse_pair(s: &str) -> std::result::Result<(Value, Value), String> {
    let (from, to) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FROM=TO, got '{s}'"))?;
    Ok((parse_value(from)?, parse_value(to)?))
}

fn parse_group(s: &str) -> std::result::Result<(Value, Vec<Value>), String> {
    let (parent, children) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PARENT=CHILD,CHILD, got '{s}'"))?;
    let children = children
        .split(',')
        .filter(|c| !c.is_empty())
        .map(parse_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((parse_value(parent)?, children))
}

fn read_table(path: Option<&Path>) -> Result<Table> {
    let content = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let table = Table::from_json(&content)?;
    debug!(rows = table.len(), columns = table.columns().len(), "table read");
    Ok(table)
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => fs::write(path, json + "\n")?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn load_config(cli_path: Option<&Path>) -> Result<PipelineConfig> {
    let path = resolve_config_path(cli_path).ok_or_else(|| {
        Error::Config("no pipeline config given (use --config or DATAFLAME_CONFIG)".to_string())
    })?;
    Ok(PipelineConfig::load_from_file(&path)?)
}

fn validate_config(cli_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(cli_path).ok_or_else(|| {
        Error::Config("no pipeline config given (use --config or DATAFLAME_CONFIG)".to_string())
    })?;
    let content = fs::read_to_string(&path)?;
    let config: PipelineConfig = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    let issues = config.issues();
    if !issues.is_empty() {
        for issue in &issues {
            println!("{issue}");
        }
        return Err(Error::Config(format!(
            "{} problem(s) in {}",
            issues.len(),
            path.display()
        )));
    }
    println!("ok {}", config.fingerprint()?);
    Ok(())
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Ramp {
            columns,
            window,
            classes,
            fill,
            no_fill,
            io,
        } => {
            let fill = if no_fill { None } else { Some(fill) };
            let params = RampParams::new(window, classes, fill)?;
            let table = read_table(io.input.as_deref())?;
            let table = binary_label_regression(table, &columns.into(), &params)?;
            write_json(&table, io.output.as_deref())
        }
        Commands::Map {
            column,
            groups,
            pairs,
            policy,
            default,
            io,
        } => {
            if groups.is_empty() && pairs.is_empty() {
                return Err(Error::Config("at least one --group or --pair is required".into()));
            }
            let stage = MappingStage {
                groups: groups
                    .into_iter()
                    .map(|(parent, children)| LabelGroup { parent, children })
                    .collect(),
                pairs,
                not_found_policy: policy,
                default_value: default,
            };
            let mapping = LabelMapping::try_from(&stage)?;
            let table = read_table(io.input.as_deref())?;
            let table = apply_mapping(
                table,
                &column,
                &mapping,
                stage.not_found_policy,
                stage.default_value,
            )?;
            write_json(&table, io.output.as_deref())
        }
        Commands::Balance {
            column,
            accepted,
            top_k,
            sample_count,
            honor_sample_count,
            no_shuffle,
            seed,
            report,
            io,
        } => {
            let config = BalanceConfig {
                accepted_labels: (!accepted.is_empty()).then_some(accepted),
                top_k,
                sample_count_per_category: sample_count,
                honor_sample_count,
                shuffle: !no_shuffle,
            };
            config.validate()?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let table = read_table(io.input.as_deref())?;
            let balanced = balance_by_label(table, &column, &config, &mut rng)?;
            if let Some(path) = report {
                write_json(&balanced.report, Some(path.as_path()))?;
            }
            write_json(&balanced.table, io.output.as_deref())
        }
        Commands::Run { config, report, io } => {
            let config = load_config(config.as_deref())?;
            let table = read_table(io.input.as_deref())?;
            let mut rng = rng_for(&config);
            let outcome = run_pipeline(table, &config, &mut rng)?;
            if let Some(path) = report {
                let summary = RunSummary {
                    fingerprint: &outcome.fingerprint,
                    rows_in: outcome.rows_in,
                    rows_out: outcome.table.len(),
                    stages: &outcome.stages,
                    balance: outcome.balance.as_ref(),
                };
                write_json(&summary, Some(path.as_path()))?;
            }
            write_json(&outcome.table, io.output.as_deref())
        }
        Commands::ValidateConfig { config } => validate_config(config.as_deref()),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::Clean.into(),
        Err(err) => {
            eprintln!("dataflame: error {}: {err}", err.code());
            ExitCode::from_error(&err).into()
        }
    }
}
