use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "docs-context.toml";

pub const DEFAULT_TARGET_DIR: &str = "docs/reference";
pub const DEFAULT_OUTPUT_NAME: &str = "agent_reference_context.md";
pub const DEFAULT_TITLE: &str = "Polimoney Ledger Reference Documentation (Full)";

/// Settings for one aggregation run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for source documents (one level, non-recursive)
    pub target_dir: PathBuf,
    /// Name of the aggregate file, written inside `target_dir`
    pub output_name: String,
    /// Title line of the output preamble
    pub title: String,
    /// Extra file names never read as input
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            title: DEFAULT_TITLE.to_string(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from an explicit file, the default file if present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Load config from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file {:?}", path))?;

        Ok(config)
    }

    /// The output must be a plain file name inside `target_dir`, so that it
    /// lands next to the inputs and matches its own exclusion entry
    pub fn validate(&self) -> Result<()> {
        if self.output_name.trim().is_empty() {
            anyhow::bail!("output_name must not be empty");
        }

        let mut components = Path::new(&self.output_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => anyhow::bail!(
                "output_name must be a file name without directories: {:?}",
                self.output_name
            ),
        }
    }

    /// Full path of the aggregate output file
    pub fn output_path(&self) -> PathBuf {
        self.target_dir.join(&self.output_name)
    }

    /// All names skipped by the scanner. Always contains the output name.
    pub fn exclusions(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.exclude.iter().cloned().collect();
        names.insert(self.output_name.clone());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_layout() {
        let config = Config::default();
        assert_eq!(
            config.output_path(),
            PathBuf::from("docs/reference/agent_reference_context.md")
        );
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_exclusions_always_contain_output() {
        let config = Config {
            output_name: "context.md".to_string(),
            exclude: vec!["notes.md".to_string()],
            ..Config::default()
        };
        let names = config.exclusions();
        assert!(names.contains("context.md"));
        assert!(names.contains("notes.md"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_load_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs-context.toml");
        std::fs::write(&path, "target_dir = \"refs\"\nexclude = [\"draft.md\"]\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.target_dir, PathBuf::from("refs"));
        assert_eq!(config.output_name, DEFAULT_OUTPUT_NAME);
        assert_eq!(config.exclude, vec!["draft.md".to_string()]);
    }

    #[test]
    fn test_load_rejects_empty_output_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "output_name = \"  \"\n").unwrap();

        assert!(Config::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_validate_rejects_paths_as_output_name() {
        for name in ["../x.md", "sub/out.md", "/tmp/out.md", "..", "."] {
            let config = Config {
                output_name: name.to_string(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{name} should be rejected");
        }
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_rejects_output_outside_target_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("escape.toml");
        std::fs::write(&path, "output_name = \"../context.md\"\n").unwrap();

        assert!(Config::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }
}
