use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod ingest;
mod pipeline;
mod scan;
mod writer;

use config::Config;
use pipeline::{RunOptions, RunOutcome, RunSummary, SkipReason};

/// Print a styled status line
fn print_status(label: &str, value: &str, icon: &str) {
    println!(
        "  {} {} {}",
        icon,
        format!("{}:", label).dimmed(),
        value.cyan()
    );
}

#[derive(Parser)]
#[command(name = "docs-context")]
#[command(about = "Concatenate reference documents (Markdown, text, PDF, Excel) into one Markdown file")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory to scan (default: docs/reference)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Output file name, written inside the scanned directory
    #[arg(short, long)]
    output: Option<String>,

    /// Title line of the generated document
    #[arg(short, long)]
    title: Option<String>,

    /// Additional file names to leave out (repeatable)
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// TOML config file (default: ./docs-context.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only print the final summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Load the config file, then apply command-line overrides
    fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(dir) = &self.dir {
            config.target_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            config.output_name = output.clone();
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        config.exclude.extend(self.exclude.iter().cloned());
        config.validate()?;

        Ok(config)
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_logging();

    let config = cli.resolve_config()?;
    tracing::debug!(?config, "resolved configuration");

    let options = RunOptions { quiet: cli.quiet };
    match pipeline::run(&config, &options)? {
        RunOutcome::Completed(summary) => print_summary(&summary),
        RunOutcome::DirectoryNotFound(dir) => {
            eprintln!(
                "{} Directory not found: {}",
                "✗".red(),
                dir.display().to_string().bold()
            );
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("{}", "─".repeat(50).dimmed());
    println!(
        "{} Created '{}' ({} files)",
        "✓".green(),
        summary.output_path.display(),
        summary.files_processed
    );

    if summary.placeholders > 0 {
        print_status(
            "With extraction errors",
            &summary.placeholders.to_string(),
            "⚠",
        );
    }

    let failed: Vec<&str> = summary
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::ReadFailed(_)))
        .map(|s| s.name.as_str())
        .collect();
    if !failed.is_empty() {
        print_status("Unreadable, left out", &failed.join(", "), "✗");
    }
}
