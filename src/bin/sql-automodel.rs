//! sql-automodel — model generator CLI
//!
//! # Usage
//!
//! ```bash
//! # Generate Java models
//! sql-automodel generate dump.sql --package com.acme.model --out ./src/main/java
//!
//! # Several dumps at once, Rust structs, stop at the first bad table
//! sql-automodel generate a.sql b.sql --target rust --policy abort --out ./models
//!
//! # Look at what would be generated
//! sql-automodel inspect dump.sql
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sql_automodel::generator::{decode_dump, shared_outputs};
use sql_automodel::prelude::*;
use sql_automodel::types::{ALIASES, TYPE_MAPPING};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sql-automodel")]
#[command(version)]
#[command(about = "Generate model classes from the CREATE TABLE statements of an SQL dump", long_about = None)]
#[command(after_help = "EXAMPLES:
    sql-automodel generate dump.sql --package com.acme.model --out ./src/main/java
    sql-automodel generate a.sql b.sql --target rust --out ./models
    sql-automodel inspect dump.sql --format json")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one model file per table
    Generate {
        /// SQL dump files
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Package or namespace of the generated models
        #[arg(short, long)]
        package: Option<String>,

        /// Destination directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Target language
        #[arg(short, long, value_enum)]
        target: Option<Target>,

        /// What to do when a table fails to parse
        #[arg(long, value_enum)]
        policy: Option<ErrorPolicy>,

        /// How column declarations are split
        #[arg(long, value_enum)]
        tokenizer: Option<Tokenizer>,

        /// Config file (defaults to ./automodel.toml, then the user config)
        #[arg(short, long, env = "SQL_AUTOMODEL_CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Parse a dump and show its tables without writing anything
    Inspect {
        /// SQL dump file
        source: PathBuf,

        /// How column declarations are split
        #[arg(long, value_enum, default_value = "naive")]
        tokenizer: Tokenizer,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show the SQL type lookup table
    Types,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            sources,
            package,
            out,
            target,
            policy,
            tokenizer,
            config,
            format,
        } => {
            let overrides = Overrides {
                package,
                out,
                target,
                policy,
                tokenizer,
            };
            generate(sources, config, overrides, format).await
        }
        Commands::Inspect {
            source,
            tokenizer,
            format,
        } => inspect(&source, tokenizer, format),
        Commands::Types => {
            show_types();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "sql_automodel=debug"
    } else {
        "sql_automodel=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line values that win over the config file.
struct Overrides {
    package: Option<String>,
    out: Option<PathBuf>,
    target: Option<Target>,
    policy: Option<ErrorPolicy>,
    tokenizer: Option<Tokenizer>,
}

impl Overrides {
    fn apply(self, config: &mut GeneratorConfig) {
        if let Some(package) = self.package {
            config.package = package;
        }
        if let Some(out) = self.out {
            config.destination = Some(out);
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(policy) = self.policy {
            config.error_policy = policy;
        }
        if let Some(tokenizer) = self.tokenizer {
            config.tokenizer = tokenizer;
        }
    }
}

async fn generate(
    sources: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    format: OutputFormat,
) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let mut config = GeneratorConfig::discover(&cwd, config_path.as_deref())?;
    overrides.apply(&mut config);

    let destination = config.destination.clone().ok_or_else(|| {
        anyhow!("No destination directory. Use --out or set `destination` in automodel.toml")
    })?;
    let generator = Arc::new(Generator::new(config));

    // Each dump runs its own pipeline; only the static type table is shared.
    let mut set = JoinSet::new();
    for (index, source) in sources.into_iter().enumerate() {
        let generator = Arc::clone(&generator);
        let destination = destination.clone();
        set.spawn_blocking(move || {
            let result = generator.generate(&source, &destination);
            (index, source, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        results.push(joined?);
    }
    results.sort_by_key(|(index, _, _)| *index);

    // Dumps run concurrently, so the surviving copy of a shared file is arbitrary.
    let shared = shared_outputs(results.iter().filter_map(|(_, _, result)| result.as_ref().ok()));
    for path in &shared {
        eprintln!(
            "{} {} was generated from more than one dump; the last to finish won",
            "⚠".yellow(),
            path.display().to_string().yellow()
        );
    }

    let mut failures = 0;
    for (_, source, result) in results {
        match result {
            Ok(report) => print_report(&source, &report, format)?,
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {}", "✗".red(), source.display().to_string().yellow(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} dump(s) failed", failures);
    }
    Ok(())
}

fn inspect(source: &Path, tokenizer: Tokenizer, format: OutputFormat) -> Result<()> {
    let bytes = std::fs::read(source)
        .with_context(|| format!("Failed to read SQL dump '{}'", source.display()))?;
    let generator = Generator::new(GeneratorConfig {
        tokenizer,
        ..GeneratorConfig::default()
    });
    let report = generator.run_text(&decode_dump(&bytes))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!("{} {}", "Inspecting:".cyan().bold(), source.display().to_string().yellow());
            println!();
            for table in &report.tables {
                println!("{}", table.name.white().bold());
                for col in &table.columns {
                    println!(
                        "  {:24} {:12} {}",
                        col.name,
                        col.sql_type_name.dimmed(),
                        col.resolved_type.to_string().cyan()
                    );
                }
                println!();
            }
            for error in report.errors() {
                println!("{} {}", "✗".red(), error);
            }
            println!("{} table(s)", report.tables.len().to_string().cyan());
        }
    }
    Ok(())
}

fn print_report(source: &Path, report: &GenerationReport, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        let value = serde_json::json!({
            "source": source,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} {}", "Dump:".cyan().bold(), source.display().to_string().yellow());
    for outcome in &report.outcomes {
        match outcome {
            TableOutcome::Generated { table, columns } => {
                println!("  {} {} ({} columns)", "✓".green(), table.white(), columns);
            }
            TableOutcome::Superseded { table } => {
                println!("  {} {} {}", "↻".yellow(), table.white(), "replaced by a later definition".dimmed());
            }
            TableOutcome::Failed { table, error } => {
                let table = table.as_deref().unwrap_or("<unknown>");
                println!("  {} {}: {}", "✗".red(), table.white(), error);
            }
        }
    }
    for path in &report.collisions {
        println!(
            "  {} {} {}",
            "⚠".yellow(),
            path.display().to_string().yellow(),
            "written by more than one table".dimmed()
        );
    }
    println!(
        "{} Wrote {} file(s)",
        "✓".green(),
        report.written.len().to_string().cyan()
    );
    Ok(())
}

fn show_types() {
    println!("{}", "SQL Type Lookup".cyan().bold());
    println!();
    println!("{:12} {}", "SQL".white().bold(), "Value type".white().bold());
    println!("{}", "─".repeat(30).dimmed());
    for (name, value_type) in TYPE_MAPPING {
        println!("{:12} {}", name.yellow(), value_type);
    }
    for (alias, canonical) in ALIASES {
        println!("{:12} {}", alias.yellow(), format!("alias of {}", canonical).dimmed());
    }
}
