//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GazemapError, GazemapResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Aggregation and publishing parameters.
    pub heatmap: HeatmapConfig,

    /// Default viewing-surface bounds.
    pub surface: SurfaceConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Parameters of the attention-map aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Edge length of a square bucket, in surface units.
    pub grid_size: u32,

    /// Interval between snapshot publications (ms).
    pub publish_period_ms: u64,

    /// Buckets at or below this share of total dwell time (percent) are
    /// left out of snapshots.
    pub noise_floor_percent: f64,
}

/// Viewing-surface dimensions in surface units (usually CSS/logical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: f64,
    pub height: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "gazemap_tracker=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            publish_period_ms: 100,
            noise_floor_percent: 0.1,
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl HeatmapConfig {
    /// Reject parameters the aggregation cannot work with.
    pub fn validate(&self) -> GazemapResult<()> {
        if self.grid_size == 0 {
            return Err(GazemapError::config("heatmap.grid_size must be > 0"));
        }
        if self.publish_period_ms == 0 {
            return Err(GazemapError::config(
                "heatmap.publish_period_ms must be > 0",
            ));
        }
        if !self.noise_floor_percent.is_finite() || self.noise_floor_percent < 0.0 {
            return Err(GazemapError::config(format!(
                "heatmap.noise_floor_percent must be a finite value >= 0 (got {})",
                self.noise_floor_percent
            )));
        }
        Ok(())
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> GazemapResult<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.width) || !ok(self.height) {
            return Err(GazemapError::config(format!(
                "surface dimensions must be positive (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> GazemapResult<Self> {
        if !path.exists() {
            return Err(GazemapError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> GazemapResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> GazemapResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> GazemapResult<()> {
        self.heatmap.validate()?;
        self.surface.validate()
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("gazemap").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_policy() {
        let config = HeatmapConfig::default();
        assert_eq!(config.grid_size, 5);
        assert_eq!(config.publish_period_ms, 100);
        assert_eq!(config.noise_floor_percent, 0.1);
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"heatmap":{"grid_size":10}}"#).unwrap();
        assert_eq!(config.heatmap.grid_size, 10);
        assert_eq!(config.heatmap.publish_period_ms, 100);
        assert_eq!(config.surface, SurfaceConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.heatmap.grid_size = 0;
        assert!(matches!(
            config.validate(),
            Err(GazemapError::Config { .. })
        ));

        let mut config = AppConfig::default();
        config.heatmap.noise_floor_percent = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.surface.height = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = std::env::temp_dir().join("gazemap_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.heatmap.grid_size = 8;
        config.surface.width = 800.0;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("gazemap_test_config_missing.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(GazemapError::FileNotFound { .. })
        ));
    }
}
