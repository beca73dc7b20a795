//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading import
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ImportError, ImportResult};

use super::types::{ImportConfig, LayoutConfig, MatchingConfig, ShiftsConfig};

/// Loads and provides access to import configuration.
///
/// # Directory Structure
///
/// ```text
/// config/roster/
/// ├── layout.yaml    # Header labels, markers and column fallbacks
/// ├── matching.yaml  # Suggestion floor, auto-apply threshold, placeholder markers
/// └── shifts.yaml    # Shift type labels and nominal hours
/// ```
///
/// # Example
///
/// ```no_run
/// use roster_import::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/roster").unwrap();
/// println!("Header scan rows: {}", loader.config().layout().header_scan_rows);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: ImportConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any of the three files is missing or is not valid
    /// YAML for its section.
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();

        let layout = Self::load_yaml::<LayoutConfig>(&path.join("layout.yaml"))?;
        let matching = Self::load_yaml::<MatchingConfig>(&path.join("matching.yaml"))?;
        let shifts = Self::load_yaml::<ShiftsConfig>(&path.join("shifts.yaml"))?;

        debug!(path = %path.display(), "Loaded import configuration");

        Ok(Self {
            config: ImportConfig::new(layout, matching, shifts),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> ImportResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| ImportError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ImportError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying import configuration.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;
    use rust_decimal::Decimal;

    fn temp_dir(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("roster-config-{}-{}", label, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_shipped_config() {
        let loader = ConfigLoader::load("./config/roster").unwrap();
        let config = loader.config();

        assert_eq!(config.layout().header_scan_rows, 10);
        assert_eq!(config.layout().labels.date, "FECHA");
        assert_eq!(config.layout().extra_driver_offsets, vec![1, 2]);
        assert_eq!(config.matching().suggestion_floor, 0.3);
        assert_eq!(config.shifts().hours(ShiftType::Third), Decimal::new(8, 0));
        assert!(config
            .shifts()
            .definition(ShiftType::Second)
            .unwrap()
            .labels
            .contains(&"SEGUNDO".to_string()));
    }

    #[test]
    fn test_missing_directory_is_config_not_found() {
        let result = ConfigLoader::load("/nonexistent/roster");
        match result {
            Err(ImportError::ConfigNotFound { path }) => assert!(path.ends_with("layout.yaml")),
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_files_fall_back_to_defaults() {
        let dir = temp_dir("partial");
        fs::write(dir.join("layout.yaml"), "header_scan_rows: 4\n").unwrap();
        fs::write(dir.join("matching.yaml"), "auto_apply_threshold: 0.9\n").unwrap();
        fs::write(
            dir.join("shifts.yaml"),
            "first:\n  labels: [MORNING]\n  hours: 6\n",
        )
        .unwrap();

        let loader = ConfigLoader::load(&dir).unwrap();
        let config = loader.config();
        assert_eq!(config.layout().header_scan_rows, 4);
        assert_eq!(config.layout().labels.shift_type, "TURNO");
        assert_eq!(config.matching().auto_apply_threshold, 0.9);
        assert_eq!(config.matching().suggestion_floor, 0.3);
        assert_eq!(config.shifts().hours(ShiftType::First), Decimal::new(6, 0));
        assert_eq!(config.shifts().hours(ShiftType::Second), Decimal::ZERO);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = temp_dir("invalid");
        fs::write(dir.join("layout.yaml"), "header_scan_rows: [not a number\n").unwrap();
        fs::write(dir.join("matching.yaml"), "{}\n").unwrap();
        fs::write(dir.join("shifts.yaml"), "{}\n").unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(ImportError::ConfigParseError { .. })));

        fs::remove_dir_all(dir).ok();
    }
}
