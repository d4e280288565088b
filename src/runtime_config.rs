// =============================================================================
// Runtime Configuration — JSON settings with serde defaults and atomic save
// =============================================================================
//
// Every tunable lives here, including the folders the I/O collaborators write
// to (price cache, exports, action log). Nothing else in the crate hard-codes
// a path.
//
// All fields carry `#[serde(default)]` so that a partial or older config file
// still loads.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::AnalysisOptions;
use crate::forecast::DEFAULT_MA_WINDOW;
use crate::types::PriceField;

/// Config file read when no `--config` flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_ticker() -> String {
    "AAPL".to_string()
}

fn default_start() -> String {
    "2018-01-01".to_string()
}

fn default_end() -> String {
    "today".to_string()
}

fn default_forecast_days() -> usize {
    7
}

fn default_ma_window() -> usize {
    DEFAULT_MA_WINDOW
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs.csv")
}

fn default_market() -> String {
    "US".to_string()
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration for StockSense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ticker offered when the user leaves the prompt blank.
    #[serde(default = "default_ticker")]
    pub default_ticker: String,

    /// Start of the default date range (`YYYY-MM-DD`).
    #[serde(default = "default_start")]
    pub start: String,

    /// End of the default date range (`YYYY-MM-DD` or `today`).
    #[serde(default = "default_end")]
    pub end: String,

    /// Default forecast horizon in trading days.
    #[serde(default = "default_forecast_days")]
    pub forecast_days: usize,

    /// Look-back of the moving-average forecast.
    #[serde(default = "default_ma_window")]
    pub ma_window: usize,

    /// Read and write the on-disk price cache.
    #[serde(default = "default_true")]
    pub cache: bool,

    /// Analyze adjusted close (`true`) or raw close (`false`).
    #[serde(default = "default_true")]
    pub use_adjusted: bool,

    /// Annualize the 30-day volatility with √252.
    #[serde(default)]
    pub annualize_vol: bool,

    /// Folder holding cached price CSVs.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Folder receiving reports and charts.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// CSV file receiving one line per menu action.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Market label, informational only.
    #[serde(default = "default_market")]
    pub market: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_ticker: default_ticker(),
            start: default_start(),
            end: default_end(),
            forecast_days: default_forecast_days(),
            ma_window: default_ma_window(),
            cache: true,
            use_adjusted: true,
            annualize_vol: false,
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
            log_file: default_log_file(),
            market: default_market(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            ticker = %config.default_ticker,
            start = %config.start,
            end = %config.end,
            "config loaded"
        );

        Ok(config)
    }

    /// Write the configuration to `path` as pretty JSON.
    ///
    /// An existing file is left untouched unless `overwrite` is set. The
    /// write goes through a `.json.tmp` sibling that is renamed into place,
    /// and missing parent folders are created.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            anyhow::bail!("{} already exists (use --force to replace it)", path.display());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to move config into {}", path.display()))?;

        info!(path = %path.display(), ticker = %self.default_ticker, "config written");
        Ok(())
    }

    /// Apply `STOCKSENSE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(ticker) = std::env::var("STOCKSENSE_TICKER") {
            let ticker = ticker.trim().to_uppercase();
            if !ticker.is_empty() {
                self.default_ticker = ticker;
            }
        }
        if let Ok(dir) = std::env::var("STOCKSENSE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("STOCKSENSE_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
    }

    /// Analysis knobs derived from this config.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            annualize_volatility: self.annualize_vol,
            price_field: PriceField::from_use_adjusted(self.use_adjusted),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.default_ticker, "AAPL");
        assert_eq!(cfg.start, "2018-01-01");
        assert_eq!(cfg.end, "today");
        assert_eq!(cfg.forecast_days, 7);
        assert_eq!(cfg.ma_window, 5);
        assert!(cfg.cache);
        assert!(cfg.use_adjusted);
        assert!(!cfg.annualize_vol);
        assert_eq!(cfg.export_dir, PathBuf::from("exports"));
        assert_eq!(cfg.market, "US");
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "default_ticker": "MSFT", "annualize_vol": true, "forecast_days": 3 }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.default_ticker, "MSFT");
        assert!(cfg.annualize_vol);
        assert_eq!(cfg.forecast_days, 3);
        assert!(cfg.cache);
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn analysis_options_follow_flags() {
        let cfg = AppConfig {
            use_adjusted: false,
            annualize_vol: true,
            ..AppConfig::default()
        };
        let opts = cfg.analysis_options();
        assert!(opts.annualize_volatility);
        assert_eq!(opts.price_field, PriceField::Close);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = AppConfig {
            default_ticker: "NVDA".into(),
            ..AppConfig::default()
        };
        cfg.save(&path, false).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(AppConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn save_keeps_existing_file_unless_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_ticker": "MSFT" }"#).unwrap();

        let err = AppConfig::default().save(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(AppConfig::load(&path).unwrap().default_ticker, "MSFT");

        AppConfig::default().save(&path, true).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(dir.path().join("nope.json")).is_err());
    }
}
