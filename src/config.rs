//! YAML configuration file.
//!
//! Every key is optional; command-line flags win over file values, which
//! win over the built-in defaults.
//!
//! ```yaml
//! output_dir: output
//! max_rows_per_file: 1048576
//! write_batch_size: 100000
//! seed: 42
//! fields:
//!   - { name: file, kind: file_name }
//!   - { name: date, kind: date }
//! ```

use crate::generator::{FieldSpec, Schema};
use crate::writer::{RowBudget, DEFAULT_WRITE_BATCH_SIZE};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory generated and split files are written to
    pub output_dir: Option<PathBuf>,
    /// Row budget for `split`; `gen` only rotates when asked on the command line
    pub max_rows_per_file: Option<u64>,
    /// Records buffered per write
    pub write_batch_size: Option<usize>,
    /// RNG seed for generated data
    pub seed: Option<u64>,
    /// Columns of generated files
    pub fields: Option<Vec<FieldSpec>>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Load `path` if given, otherwise use an empty config.
    pub fn load_optional(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn output_dir(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Split row budget; defaults to the Excel worksheet row limit.
    pub fn row_budget(&self, cli: Option<u64>) -> anyhow::Result<RowBudget> {
        match cli.or(self.max_rows_per_file) {
            Some(rows) => Ok(RowBudget::new(rows)?),
            None => Ok(RowBudget::default()),
        }
    }

    pub fn write_batch_size(&self) -> usize {
        self.write_batch_size.unwrap_or(DEFAULT_WRITE_BATCH_SIZE)
    }

    pub fn seed(&self, cli: Option<u64>) -> u64 {
        cli.or(self.seed).unwrap_or_else(rand::random)
    }

    pub fn schema(&self) -> anyhow::Result<Schema> {
        match self.fields {
            Some(ref fields) => Ok(Schema::new(fields.clone())?),
            None => Ok(Schema::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FieldKind;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
output_dir: out
max_rows_per_file: 500
write_batch_size: 10
seed: 7
fields:
  - { name: owner, kind: name }
  - { name: created, kind: date }
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.output_dir(None), PathBuf::from("out"));
        assert_eq!(config.row_budget(None).unwrap().get(), 500);
        assert_eq!(config.write_batch_size(), 10);
        assert_eq!(config.seed(None), 7);

        let schema = config.schema().unwrap();
        assert_eq!(schema.field_names(), &["owner", "created"]);
        assert_eq!(schema.fields()[0].kind, FieldKind::Name);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = Config::from_yaml("output_dir: out\nmax_rows_per_file: 500\n").unwrap();

        assert_eq!(
            config.output_dir(Some(PathBuf::from("cli"))),
            PathBuf::from("cli")
        );
        assert_eq!(config.row_budget(Some(3)).unwrap().get(), 3);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.output_dir(None), PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.row_budget(None).unwrap(), RowBudget::default());
        assert_eq!(config.write_batch_size(), DEFAULT_WRITE_BATCH_SIZE);
        assert_eq!(config.schema().unwrap().field_names(), &["file", "date"]);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = Config::from_yaml("max_rows_per_file: 0\n").unwrap();
        assert!(config.row_budget(None).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_yaml("max_rows: 10\n").is_err());
    }
}
