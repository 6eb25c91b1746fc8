//! Tool configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user `config.toml` in the config directory overrides any
//! subset of keys; command-line flags override both for a single invocation.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [batch]
//! source = "placeholder"    # placeholder | search
//! count = 12                # Images per batch (clamped to 1-60)
//! size = 1000               # Full-resolution square edge in pixels
//!
//! [search]
//! query = ""                # Free-text search query
//! api_key = ""              # Access key, sent as "Client-ID <key>"
//! base_url = "https://api.unsplash.com"
//!
//! [placeholder]
//! base_url = "https://picsum.photos"
//!
//! [collage]
//! cell_size = 512           # Edge of each collage cell in pixels
//! padding = 6               # Gap between cells and around the border
//! corner_radius = 18        # Rounded-corner radius of each cell
//! background = "#0b1024"    # Canvas fill behind the cells
//!
//! [network]
//! timeout_secs = 30         # Per-request timeout
//! user_agent = "photo-batch"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{DEFAULT_CELL_SIZE, DEFAULT_OUTPUT_SIZE, Source};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Complete tool configuration. Every section has defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// What to fetch and at which size.
    pub batch: BatchConfig,
    /// Photo search API settings.
    pub search: SearchConfig,
    /// Placeholder image service settings.
    pub placeholder: PlaceholderConfig,
    /// Collage layout and colors.
    pub collage: CollageConfig,
    /// HTTP client settings.
    pub network: NetworkConfig,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "network.timeout_secs must be greater than 0".into(),
            ));
        }
        parse_hex_color(&self.collage.background)?;
        validate_base_url("search.base_url", &self.search.base_url)?;
        validate_base_url("placeholder.base_url", &self.placeholder.base_url)?;
        let cell = crate::types::size_or_default(Some(self.collage.cell_size), DEFAULT_CELL_SIZE);
        if self.collage.corner_radius.saturating_mul(2) > cell {
            return Err(ConfigError::Validation(format!(
                "collage.corner_radius ({}) must be at most half of collage.cell_size ({})",
                self.collage.corner_radius, cell
            )));
        }
        Ok(())
    }
}

/// Batch selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub source: Source,
    /// Requested image count; clamped at dispatch, not here.
    pub count: u32,
    /// Full-resolution square edge. Zero means the default.
    pub size: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source: Source::Placeholder,
            count: 12,
            size: DEFAULT_OUTPUT_SIZE,
        }
    }
}

/// Photo search API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub query: String,
    pub api_key: String,
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            api_key: String::new(),
            base_url: "https://api.unsplash.com".to_string(),
        }
    }
}

/// Placeholder image service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    pub base_url: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://picsum.photos".to_string(),
        }
    }
}

/// Collage layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageConfig {
    /// Cell edge in pixels. Zero means the default.
    pub cell_size: u32,
    pub padding: u32,
    pub corner_radius: u32,
    /// `#rrggbb`
    pub background: String,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            padding: 6,
            corner_radius: 18,
            background: "#0b1024".to_string(),
        }
    }
}

impl CollageConfig {
    /// Background as RGB. Only valid after [`StudioConfig::validate`].
    pub fn background_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_color(&self.background)
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "photo-batch".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Parse a `#rrggbb` color.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3], ConfigError> {
    let invalid = || ConfigError::Validation(format!("'{value}' is not a #rrggbb color"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn validate_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| ConfigError::Validation(format!("{key} '{value}' is not a URL: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{key} must be an http(s) URL, got '{value}'"
        )));
    }
    Ok(())
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StudioConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StudioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StudioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory over stock defaults.
pub fn load_config(dir: &Path) -> Result<StudioConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-batch configuration
# ========================
# Every key is optional. Values shown are the defaults.
# Command-line flags override these for a single run.

[batch]
# Where images come from: "placeholder" (seeded random images, no key
# needed) or "search" (photo search API, needs query and api_key).
source = "placeholder"
# Images per batch. Clamped to 1-60.
count = 12
# Edge of the square full-resolution images packed into the zip.
size = 1000

[search]
# Free-text query, e.g. "mountain lake".
query = ""
# API access key. Sent as "Authorization: Client-ID <key>".
api_key = ""
base_url = "https://api.unsplash.com"

[placeholder]
base_url = "https://picsum.photos"

[collage]
# Edge of each collage cell. Previews are scaled to exactly this size.
cell_size = 512
# Gap between cells and around the border.
padding = 6
# Rounded-corner radius; at most half of cell_size.
corner_radius = 18
# Canvas background behind the cells.
background = "#0b1024"

[network]
# Per-request timeout in seconds.
timeout_secs = 30
user_agent = "photo-batch"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = StudioConfig::default();
        assert_eq!(config.batch.source, Source::Placeholder);
        assert_eq!(config.batch.count, 12);
        assert_eq!(config.batch.size, 1000);
        assert_eq!(config.collage.cell_size, 512);
        assert_eq!(config.collage.padding, 6);
        assert_eq!(config.collage.corner_radius, 18);
        assert_eq!(config.collage.background, "#0b1024");
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(StudioConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[batch]
source = "search"
count = 30

[search]
query = "cats"
"#;
        let config: StudioConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.batch.source, Source::Search);
        assert_eq!(config.batch.count, 30);
        // Unspecified values keep their defaults
        assert_eq!(config.batch.size, 1000);
        assert_eq!(config.search.query, "cats");
        assert_eq!(config.search.base_url, "https://api.unsplash.com");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, StudioConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[collage]\nbackground = \"#ffffff\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.collage.background, "#ffffff");
        assert_eq!(config.collage.padding, 6);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not toml [[[").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[batch]\ncuont = 4\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<StudioConfig, _> = toml::from_str("[colors]\nbg = \"#000\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_source_rejected() {
        let result: Result<StudioConfig, _> = toml::from_str("[batch]\nsource = \"flickr\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_zero_timeout() {
        let mut config = StudioConfig::default();
        config.network.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_bad_background() {
        let mut config = StudioConfig::default();
        config.collage.background = "navy".into();
        assert!(config.validate().is_err());
        config.collage.background = "#12345".into();
        assert!(config.validate().is_err());
        config.collage.background = "#gg0000".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bad_base_url() {
        let mut config = StudioConfig::default();
        config.placeholder.base_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = StudioConfig::default();
        config.search.base_url = "ftp://api.example.test".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_radius_against_cell() {
        let mut config = StudioConfig::default();
        config.collage.cell_size = 30;
        config.collage.corner_radius = 15;
        assert!(config.validate().is_ok());
        config.collage.corner_radius = 16;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_hex_color_values() {
        assert_eq!(parse_hex_color("#0b1024").unwrap(), [0x0b, 0x10, 0x24]);
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), [255, 255, 255]);
        assert!(parse_hex_color("0b1024").is_err());
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("[batch]\ncount = 12\nsize = 1000\n").unwrap();
        let overlay: toml::Value = toml::from_str("[batch]\ncount = 4\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["batch"]["count"].as_integer(), Some(4));
        assert_eq!(merged["batch"]["size"].as_integer(), Some(1000));
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[network]\ntimeout_secs = 0\n").unwrap();
        assert!(resolve_config(stock_defaults_value(), Some(overlay)).is_err());
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: StudioConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, StudioConfig::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value();
        let table = value.as_table().unwrap();
        for section in ["batch", "search", "placeholder", "collage", "network"] {
            assert!(table.contains_key(section), "missing [{section}]");
        }
    }
}
