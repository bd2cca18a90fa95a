mod clean;
pub(crate) mod generate;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate as generate_completions, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sql-seeder")]
#[command(version)]
#[command(about = "Generate Laravel seeder classes from database table data", long_about = None)]
pub struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate seeder classes from one or more tables
    Generate(generate::GenerateArgs),

    /// Remove every registered seeder call from the aggregator section
    Clean {
        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Aggregator file (default from config)
        #[arg(long, value_name = "FILE")]
        seeder_path: Option<PathBuf>,
    },

    /// Print the JSON schema of the --json output
    Schema {
        /// Command to print the schema for (all when omitted)
        command: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => generate::run(args),
        Commands::Clean {
            config,
            seeder_path,
        } => clean::run(config, seeder_path),
        Commands::Schema { command } => print_schema(command),
        Commands::Completions { shell } => {
            generate_completions(shell, &mut Cli::command(), "sql-seeder", &mut io::stdout());
            Ok(())
        }
    }
}

fn print_schema(command: Option<String>) -> anyhow::Result<()> {
    match command {
        Some(name) => {
            let schema = crate::json_schema::get_schema(&name).ok_or_else(|| {
                anyhow::anyhow!(
                    "No schema for command: {}. Available: {}",
                    name,
                    crate::json_schema::schema_names().join(", ")
                )
            })?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        None => {
            let schemas = crate::json_schema::all_schemas();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
    }
    Ok(())
}
