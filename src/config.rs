// User configuration loaded from YAML

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that overrides `store_path`
pub const STORE_PATH_ENV: &str = "VINSIGHT_STORE_PATH";

pub const DEFAULT_EXPORT_FILE: &str = "maintenance_export.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that contains the `.vinsight` store
    pub store_path: PathBuf,
    /// Destination used by `export` when `--file` is not given; its
    /// extension follows the export format
    pub export_file: PathBuf,
    pub currency: String,
    pub distance_unit: String,
    /// Styled terminal output; `false` forces plain text
    pub color: bool,
    /// One of error, warn, info, debug, trace
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("."),
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
            currency: "$".to_string(),
            distance_unit: "mi".to_string(),
            color: true,
            log_level: None,
        }
    }
}

impl Config {
    /// `~/.config/vinsight/config.yaml` (platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vinsight").join("config.yaml"))
    }

    /// Load from `path`, or from the default location when `path` is None
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error. The store path environment override is applied
    /// afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut config = match path {
            Some(p) if p.exists() => Self::from_file(&p)?,
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content).wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(file = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from the environment, looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(store_path) = lookup(STORE_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.store_path = PathBuf::from(store_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store_path, PathBuf::from("."));
        assert_eq!(config.export_file, PathBuf::from("maintenance_export.csv"));
        assert_eq!(config.currency, "$");
        assert!(config.color);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = Config::from_yaml("currency: \"€\"\ndistance_unit: km\nlog_level: debug\n").unwrap();
        assert_eq!(config.currency, "€");
        assert_eq!(config.distance_unit, "km");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.store_path, PathBuf::from("."));
    }

    #[test]
    fn test_from_yaml_color_off() {
        let config = Config::from_yaml("color: false\n").unwrap();
        assert!(!config.color);
        assert_eq!(
            config,
            Config {
                color: false,
                ..Config::default()
            }
        );
    }

    #[test]
    fn test_from_yaml_empty() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_file_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "color: [not, a, bool\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("missing.yaml"))).unwrap();
        assert_eq!(config.currency, "$");
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env(|key| (key == STORE_PATH_ENV).then(|| "/data/cars".to_string()));
        assert_eq!(config.store_path, PathBuf::from("/data/cars"));

        let mut config = Config::default();
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.store_path, PathBuf::from("."));
    }
}
