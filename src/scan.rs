use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::ingest::SourceKind;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to list {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A candidate input discovered in the target directory
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Directory listing split into inputs and excluded names, both sorted by name
#[derive(Debug, Default)]
pub struct Scan {
    pub sources: Vec<SourceFile>,
    pub excluded: Vec<String>,
}

/// List the regular files directly inside `dir`, sorted by filename.
///
/// Subdirectories are not traversed. Names in `exclude` are reported in
/// `Scan::excluded` and never become sources.
pub fn scan(dir: &Path, exclude: &BTreeSet<String>) -> Result<Scan, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }

    let read_err = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, path));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut scan = Scan::default();
    for (name, path) in files {
        if exclude.contains(&name) {
            info!(file = %name, "skipping excluded file");
            scan.excluded.push(name);
            continue;
        }
        let kind = SourceKind::from_name(&name);
        scan.sources.push(SourceFile { name, path, kind });
    }

    Ok(scan)
}
