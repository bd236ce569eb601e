use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::ingest::ExtractedContent;

const DELIMITER_WIDTH: usize = 40;

/// Writes the aggregate Markdown document: a preamble, then one block per file
pub struct ContextWriter<W: Write> {
    out: W,
    blocks: usize,
}

impl ContextWriter<BufWriter<File>> {
    /// Create (or truncate) the output file and write the preamble
    pub fn create(path: &Path, title: &str, source_dir: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {:?}", path))?;
        ContextWriter::new(BufWriter::new(file), title, source_dir)
    }
}

impl<W: Write> ContextWriter<W> {
    pub fn new(mut out: W, title: &str, source_dir: &Path) -> Result<Self> {
        write!(out, "# {}\nSource: {}\n\n", title, source_dir.display())
            .context("Failed to write preamble")?;
        Ok(Self { out, blocks: 0 })
    }

    /// Append a file block. Empty bodies are skipped and return `false`.
    pub fn write_block(&mut self, content: &ExtractedContent) -> Result<bool> {
        if content.body.is_empty() {
            return Ok(false);
        }

        let delimiter = "=".repeat(DELIMITER_WIDTH);
        write!(
            self.out,
            "\n{delimiter}\n## File: {} ({})\n{delimiter}\n\n{}\n",
            content.name,
            content.label(),
            content.body,
        )
        .with_context(|| format!("Failed to write block for {}", content.name))?;

        self.blocks += 1;
        Ok(true)
    }

    /// Number of blocks written so far
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.out.flush().context("Failed to flush output")?;
        Ok(self.out)
    }
}
