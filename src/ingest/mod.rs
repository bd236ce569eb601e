pub mod excel;
pub mod pdf;
pub mod text;

use std::any::Any;
use std::panic::{self, UnwindSafe};
use std::path::PathBuf;
use thiserror::Error;

use crate::scan::SourceFile;

/// Supported source kinds, decided by filename suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Pdf,
    Excel,
    Ignored,
}

/// What happens to a file whose extraction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and leave the file out of the output
    Skip,
    /// Write a placeholder block describing the failure
    Placeholder,
}

impl SourceKind {
    /// Classify by suffix. Matching is case-sensitive: `NOTES.MD` is ignored.
    pub fn from_name(name: &str) -> Self {
        const TEXT: [&str; 2] = [".md", ".txt"];
        const EXCEL: [&str; 5] = [".xlsx", ".xls", ".xlsm", ".xlsb", ".ods"];

        if TEXT.iter().any(|suffix| name.ends_with(suffix)) {
            SourceKind::Text
        } else if name.ends_with(".pdf") {
            SourceKind::Pdf
        } else if EXCEL.iter().any(|suffix| name.ends_with(suffix)) {
            SourceKind::Excel
        } else {
            SourceKind::Ignored
        }
    }

    /// Label shown in the block heading
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Text => "Text/Markdown",
            SourceKind::Pdf => "PDF Content",
            SourceKind::Excel => "Excel Content",
            SourceKind::Ignored => "Ignored",
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            SourceKind::Pdf | SourceKind::Excel => FailurePolicy::Placeholder,
            SourceKind::Text | SourceKind::Ignored => FailurePolicy::Skip,
        }
    }

    /// Single-line body substituted for content that could not be extracted
    pub fn placeholder(&self, err: &ExtractError) -> String {
        let reason = err.to_string().replace(['\r', '\n'], " ");
        match self {
            SourceKind::Pdf => format!("[PDF read error: {}]", reason),
            SourceKind::Excel => format!("[Excel read error: {}]", reason),
            SourceKind::Text | SourceKind::Ignored => format!("[Read error: {}]", reason),
        }
    }

    /// Spreadsheets and PDFs go through a third-party parser and may be slow
    pub fn is_parsed(&self) -> bool {
        matches!(self, SourceKind::Pdf | SourceKind::Excel)
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Pdf(String),

    #[error("{0}")]
    Excel(#[from] calamine::Error),

    #[error("parser crashed: {0}")]
    Panicked(String),
}

/// Extracted content from one source file
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub name: String,
    pub kind: SourceKind,
    pub body: String,
}

impl ExtractedContent {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Result of running the matching extractor on one file
#[derive(Debug)]
pub enum Dispatch {
    /// Real content, or a placeholder for a parser failure
    Content {
        content: ExtractedContent,
        failure: Option<ExtractError>,
    },
    /// Extraction failed and the kind's policy says to leave it out
    Skipped(ExtractError),
    /// Suffix not handled
    Ignored,
}

/// Run the extractor for the file's kind and apply its failure policy
pub fn dispatch(source: &SourceFile) -> Dispatch {
    let result = match source.kind {
        SourceKind::Text => text::extract(&source.path),
        SourceKind::Pdf => pdf::extract(&source.path),
        SourceKind::Excel => excel::extract(&source.path),
        SourceKind::Ignored => return Dispatch::Ignored,
    };

    let content = |body| ExtractedContent {
        name: source.name.clone(),
        kind: source.kind,
        body,
    };

    match result {
        Ok(body) => Dispatch::Content {
            content: content(body),
            failure: None,
        },
        Err(err) => match source.kind.failure_policy() {
            FailurePolicy::Skip => Dispatch::Skipped(err),
            FailurePolicy::Placeholder => Dispatch::Content {
                content: content(source.kind.placeholder(&err)),
                failure: Some(err),
            },
        },
    }
}

/// Run a parser call, turning a panic inside it into an extraction error
pub(crate) fn catch_panic<T, F>(f: F) -> Result<T, ExtractError>
where
    F: FnOnce() -> Result<T, ExtractError> + UnwindSafe,
{
    panic::catch_unwind(f)
        .unwrap_or_else(|payload| Err(ExtractError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
