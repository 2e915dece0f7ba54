use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

pub const DEFAULT_REPORT_PREFIX: &str = "aws_sentinel_report";
pub const DEFAULT_RECORD_LIMIT: usize = 20;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Report endpoint URL
    pub endpoint: Option<String>,
    /// Where `export` writes reports (default: current directory)
    pub export_dir: Option<PathBuf>,
    /// File name prefix for exported reports
    pub report_prefix: Option<String>,
    /// Rows shown by `records` when `--limit` is not given
    pub record_limit: Option<usize>,
}

impl Config {
    pub fn report_prefix(&self) -> &str {
        self.report_prefix.as_deref().unwrap_or(DEFAULT_REPORT_PREFIX)
    }

    pub fn record_limit(&self) -> usize {
        self.record_limit.unwrap_or(DEFAULT_RECORD_LIMIT)
    }
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cost-sentinel").map(|d| d.config_dir().join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

/// Missing files give defaults; invalid files are reported and ignored.
pub fn load_config_from(path: &Path) -> Config {
    let Ok(data) = fs::read_to_string(path) else {
        return Config::default();
    };

    match toml::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Invalid config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.report_prefix(), "aws_sentinel_report");
        assert_eq!(config.record_limit(), 20);
    }

    #[test]
    fn test_parses_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
endpoint = "https://example.execute-api.us-east-1.amazonaws.com/prod/costs"
export_dir = "/tmp/reports"
report_prefix = "aws_report"
record_limit = 50
"#,
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://example.execute-api.us-east-1.amazonaws.com/prod/costs")
        );
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/reports")));
        assert_eq!(config.report_prefix(), "aws_report");
        assert_eq!(config.record_limit(), 50);
    }

    #[test]
    fn test_invalid_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "record_limit = \"lots\"").unwrap();
        assert_eq!(load_config_from(&path), Config::default());
    }
}
