use std::path::Path;

use super::ExtractError;

/// Read a text/markdown file as UTF-8, unchanged
pub fn extract(path: &Path) -> Result<String, ExtractError> {
    std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })
}
