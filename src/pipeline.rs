use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::ingest::{self, Dispatch, SourceKind};
use crate::scan::{self, ScanError};
use crate::writer::ContextWriter;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Suppress per-file progress lines and spinners
    pub quiet: bool,
}

/// Why a discovered file produced no block
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Excluded,
    ReadFailed(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct RunSummary {
    pub output_path: PathBuf,
    /// Blocks written to the output
    pub files_processed: usize,
    /// Blocks whose body is an error placeholder (included in `files_processed`)
    pub placeholders: usize,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Nothing was written
    DirectoryNotFound(PathBuf),
}

/// Build the aggregate document for `config.target_dir`
pub fn run(config: &Config, options: &RunOptions) -> Result<RunOutcome> {
    let scan = match scan::scan(&config.target_dir, &config.exclusions()) {
        Ok(scan) => scan,
        Err(ScanError::DirectoryNotFound(dir)) => {
            warn!(dir = %dir.display(), "target directory not found");
            return Ok(RunOutcome::DirectoryNotFound(dir));
        }
        Err(e) => return Err(e.into()),
    };

    let output_path = config.output_path();
    let mut writer = ContextWriter::create(&output_path, &config.title, &config.target_dir)?;

    let mut skipped: Vec<Skipped> = scan
        .excluded
        .into_iter()
        .map(|name| {
            if !options.quiet {
                println!("{} Skipped (excluded): {}", "⚠".yellow(), name);
            }
            Skipped {
                name,
                reason: SkipReason::Excluded,
            }
        })
        .collect();
    let mut placeholders = 0;

    for source in &scan.sources {
        let spinner = (!options.quiet && source.kind.is_parsed()).then(|| {
            create_spinner(&format!(
                "Processing ({}): {} ...",
                kind_name(source.kind),
                source.name
            ))
        });
        let dispatch = ingest::dispatch(source);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match dispatch {
            Dispatch::Ignored => {}
            Dispatch::Skipped(err) => {
                warn!(file = %source.name, error = %err, "failed to read file, leaving it out");
                if !options.quiet {
                    println!("{} Error reading {}: {}", "✗".red(), source.name, err);
                }
                skipped.push(Skipped {
                    name: source.name.clone(),
                    reason: SkipReason::ReadFailed(err.to_string()),
                });
            }
            Dispatch::Content { content, failure } => {
                if let Some(err) = &failure {
                    warn!(file = %source.name, error = %err, "extraction failed, writing placeholder");
                }

                if writer.write_block(&content)? {
                    if failure.is_some() {
                        placeholders += 1;
                    }
                    info!(file = %source.name, kind = content.label(), "added");
                    if !options.quiet {
                        let mark = if failure.is_some() { "⚠".yellow() } else { "✓".green() };
                        println!("{} Added: {}", mark, source.name);
                    }
                } else {
                    skipped.push(Skipped {
                        name: source.name.clone(),
                        reason: SkipReason::Empty,
                    });
                    if !options.quiet {
                        println!("{} No text found: {}", "⚠".yellow(), source.name.dimmed());
                    }
                }
            }
        }
    }

    let files_processed = writer.blocks();
    writer.finish()?;

    Ok(RunOutcome::Completed(RunSummary {
        output_path,
        files_processed,
        placeholders,
        skipped,
    }))
}

fn kind_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Pdf => "PDF",
        SourceKind::Excel => "Excel",
        SourceKind::Text => "Text",
        SourceKind::Ignored => "Ignored",
    }
}

/// Create a spinner for indeterminate progress
fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
