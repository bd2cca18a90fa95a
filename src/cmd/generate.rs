//! Generate command: turn tables into seeder classes.

use crate::config::{ConnectionConfig, SeederConfig};
use crate::generator::{GeneratorSettings, SeedGenerator, SeedReport, SeedRequest};
use crate::source::{DuckDbSource, FetchOptions, OrderDirection, RowSource};
use crate::storage::{FileStore, LocalFileStore};
use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// Generate seeder classes from table data
#[derive(Args, Debug)]
#[command(after_help = "Examples:
  sql-seeder generate users
  sql-seeder generate users,posts --max 100 --order-by id --direction desc
  sql-seeder generate users --exclude password,remember_token --where \"active = true\"
  sql-seeder generate users --database legacy --prefix Legacy --force
  sql-seeder generate users,posts --prerun App\\\\Events\\\\UsersSeeding,")]
pub struct GenerateArgs {
    /// Table names (comma-separated)
    #[arg(value_name = "TABLES")]
    pub tables: String,

    /// Maximum number of rows per table (0 = all)
    #[arg(long)]
    pub max: Option<usize>,

    /// Rows per insert statement (default from config, 500)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Columns to leave out (comma-separated)
    #[arg(short, long)]
    pub exclude: Option<String>,

    /// Column to order rows by
    #[arg(long)]
    pub order_by: Option<String>,

    /// Order direction: asc or desc
    #[arg(long, default_value = "asc")]
    pub direction: String,

    /// Raw SQL filter appended after WHERE
    #[arg(long = "where", value_name = "CONDITION")]
    pub where_clause: Option<String>,

    /// Number of rows to skip
    #[arg(long)]
    pub skip: Option<usize>,

    /// Prefix for class and file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Suffix for class and file names
    #[arg(long)]
    pub suffix: Option<String>,

    /// Emit a plain list instead of index-keyed entries
    #[arg(long)]
    pub no_index: bool,

    /// Event classes fired before each seeder runs (comma-separated, one per table)
    #[arg(long)]
    pub prerun: Option<String>,

    /// Event classes fired after each seeder runs (comma-separated, one per table)
    #[arg(long)]
    pub postrun: Option<String>,

    /// Connection name from the config file
    #[arg(short, long)]
    pub database: Option<String>,

    /// DuckDB database file (overrides the connection's path)
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// SQL script to run against the database before reading
    #[arg(long, value_name = "FILE")]
    pub init: Option<PathBuf>,

    /// Directory for the generated seeders
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Aggregator file to register seeders in
    #[arg(long, value_name = "FILE")]
    pub seeder_path: Option<PathBuf>,

    /// Do not register seeders in the aggregator
    #[arg(long)]
    pub no_register: bool,

    /// Empty the aggregator's seeder section first
    #[arg(long)]
    pub clean: bool,

    /// Overwrite existing seeders without asking
    #[arg(short, long)]
    pub force: bool,

    /// YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Show progress across tables
    #[arg(short, long)]
    pub progress: bool,

    /// Run `composer dump-autoload` after generating
    #[arg(long)]
    pub dump_autoload: bool,
}

/// JSON output for the generate command
#[derive(Serialize, JsonSchema)]
pub(crate) struct GenerateJsonOutput {
    connection: String,
    output_dir: String,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    elapsed_secs: f64,
    results: Vec<TableResult>,
}

#[derive(Serialize, JsonSchema)]
pub(crate) struct TableResult {
    table: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    registered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TableResult {
    fn created(report: &SeedReport) -> Self {
        Self {
            table: report.table.clone(),
            status: "created".to_string(),
            class_name: Some(report.class_name.clone()),
            file: Some(report.path.display().to_string()),
            rows: Some(report.rows),
            chunks: Some(report.chunks),
            registered: Some(report.registered),
            error: None,
        }
    }

    fn failed(table: &str, error: String) -> Self {
        Self::bare(table, "failed", Some(error))
    }

    fn skipped(table: &str) -> Self {
        Self::bare(table, "skipped", None)
    }

    fn bare(table: &str, status: &str, error: Option<String>) -> Self {
        Self {
            table: table.to_string(),
            status: status.to_string(),
            class_name: None,
            file: None,
            rows: None,
            chunks: None,
            registered: None,
            error,
        }
    }
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let start = Instant::now();
    let config = SeederConfig::discover(args.config.as_deref())?;

    let direction: OrderDirection = args
        .direction
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let connection_name = args
        .database
        .clone()
        .unwrap_or_else(|| config.default_connection.clone());
    let connection = config.connection(&connection_name)?;
    let source = open_source(&connection, args.source.as_ref(), args.init.as_ref())?;

    let mut settings = GeneratorSettings::from_config(&config, !args.no_index).with_connection(
        if config.is_default_connection(&connection_name) {
            None
        } else {
            Some(connection_name.clone())
        },
    );
    if let Some(ref dir) = args.output_dir {
        settings = settings.with_output_dir(dir.clone());
    }
    if let Some(ref path) = args.seeder_path {
        settings.seeder_path = path.clone();
    }
    if args.no_register {
        settings = settings.with_register(false);
    }

    let output_dir = settings.output_dir.display().to_string();
    let generator = SeedGenerator::new(source, LocalFileStore, settings);

    if args.clean {
        generator
            .clean_section()
            .context("Failed to clean the seeder section")?;
        if !args.json {
            println!("Cleaned seeder section");
        }
    }

    let requests = build_requests(&args, direction)?;
    if requests.is_empty() {
        anyhow::bail!("No table names given");
    }

    let pb = if args.progress && !args.json {
        let pb = ProgressBar::new(requests.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tables {msg}",
            )
            .unwrap()
            .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut results = Vec::with_capacity(requests.len());
    for request in &requests {
        if let Some(ref pb) = pb {
            pb.set_message(request.table.clone());
        }

        if needs_overwrite_prompt(&generator, request, args.force) {
            let file_name = format!("{}.php", request.class_name());
            let overwrite = match pb {
                Some(ref pb) => pb.suspend(|| confirm_overwrite(&file_name))?,
                None => confirm_overwrite(&file_name)?,
            };
            if !overwrite {
                results.push(TableResult::skipped(&request.table));
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                continue;
            }
        }

        let result = match generator.generate(request) {
            Ok(report) => {
                if !args.json {
                    print_line(&pb, format!("Created a seed file from table {}", report.table));
                }
                TableResult::created(&report)
            }
            Err(e) => {
                if !args.json {
                    print_line(
                        &pb,
                        format!("Could not create seed file from table {}: {}", request.table, e),
                    );
                }
                TableResult::failed(&request.table, e.to_string())
            }
        };
        results.push(result);

        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let succeeded = results.iter().filter(|r| r.status == "created").count();
    let failed = results.iter().filter(|r| r.status == "failed").count();
    let skipped = results.iter().filter(|r| r.status == "skipped").count();

    if args.dump_autoload && succeeded > 0 {
        dump_autoload();
    }

    if args.json {
        let output = GenerateJsonOutput {
            connection: connection_name,
            output_dir,
            succeeded,
            failed,
            skipped,
            elapsed_secs: start.elapsed().as_secs_f64(),
            results,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if skipped > 0 {
        println!("Skipped {} existing seeder(s)", skipped);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} table(s) failed", failed, requests.len());
    }

    Ok(())
}

/// Ask before overwriting only when the table exists; a missing table fails
/// in `generate` without prompting.
fn needs_overwrite_prompt<S: RowSource, F: FileStore>(
    generator: &SeedGenerator<S, F>,
    request: &SeedRequest,
    force: bool,
) -> bool {
    !force
        && matches!(generator.has_table(&request.table), Ok(true))
        && generator.output_exists(request)
}

fn print_line(pb: &Option<ProgressBar>, line: String) {
    match pb {
        Some(pb) => pb.println(line),
        None => println!("{}", line),
    }
}

/// Open the configured DuckDB database, applying CLI overrides.
fn open_source(
    connection: &ConnectionConfig,
    path_override: Option<&PathBuf>,
    init_override: Option<&PathBuf>,
) -> Result<DuckDbSource> {
    let source = match path_override.or(connection.path.as_ref()) {
        Some(path) => DuckDbSource::open(path)?,
        None => DuckDbSource::open_in_memory()?,
    };

    if let Some(script) = init_override.or(connection.init.as_ref()) {
        source
            .run_script(script)
            .with_context(|| format!("Failed to run init script: {}", script.display()))?;
    }

    Ok(source)
}

/// Split a comma-separated option into trimmed, non-empty entries.
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Split a comma-separated option keeping positions, so entry `i` belongs to table `i`.
pub(crate) fn split_positional(value: Option<&str>) -> Vec<Option<String>> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| {
                    let s = s.trim();
                    if s.is_empty() {
                        None
                    } else {
                        Some(s.to_string())
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn build_requests(args: &GenerateArgs, direction: OrderDirection) -> Result<Vec<SeedRequest>> {
    let tables = split_list(Some(args.tables.as_str()));
    let prerun = split_positional(args.prerun.as_deref());
    let postrun = split_positional(args.postrun.as_deref());

    let fetch = FetchOptions {
        max_rows: args.max.filter(|&n| n > 0),
        exclude: split_list(args.exclude.as_deref()),
        order_by: args.order_by.clone().filter(|c| !c.trim().is_empty()),
        direction,
        where_clause: args.where_clause.clone(),
        skip: args.skip,
    };

    Ok(tables
        .into_iter()
        .enumerate()
        .map(|(i, table)| SeedRequest {
            table,
            prefix: args.prefix.clone(),
            suffix: args.suffix.clone(),
            fetch: fetch.clone(),
            chunk_size: args.chunk_size.filter(|&n| n > 0),
            prerun: prerun.get(i).cloned().flatten(),
            postrun: postrun.get(i).cloned().flatten(),
        })
        .collect())
}

fn confirm_overwrite(file_name: &str) -> Result<bool> {
    let mut rl = DefaultEditor::new()?;
    match rl.readline(&format!(
        "File {} already exists. Overwrite? [yes|no] ",
        file_name
    )) {
        Ok(answer) => Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        )),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn dump_autoload() {
    match std::process::Command::new("composer")
        .arg("dump-autoload")
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => warn!(%status, "composer dump-autoload failed"),
        Err(e) => warn!(error = %e, "could not run composer"),
    }
}
