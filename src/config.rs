// ⚙️ Configuration - Optional TOML file, every key has a default
// CLI flags override whatever is loaded here

use crate::filter::DEFAULT_CATCH_ALL_LABELS;
use crate::loader::DataSource;
use crate::palette::{DEFAULT_MARKER_COLOR, DEFAULT_PALETTE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Default file looked up when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "business-map.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Title shown above the header counts
    pub title: String,

    /// Path or http(s) URL of the data file
    pub data_source: String,

    /// Industry values treated as the catch-all "other" category
    pub catch_all_industries: Vec<String>,

    /// Delay after the last keystroke before search is applied
    pub search_debounce_ms: u64,

    pub map: MapConfig,
    pub colors: ColorConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub max_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub max_cluster_radius: u32,
    pub cluster_by_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub palette: Vec<String>,
    pub default_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Directory served under /static
    pub static_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            title: "Stavanger Uncovered".to_string(),
            data_source: "data_enriched.json".to_string(),
            catch_all_industries: DEFAULT_CATCH_ALL_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            search_debounce_ms: 500,
            map: MapConfig::default(),
            colors: ColorConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        // Stavanger city centre
        MapConfig {
            center_lat: 58.97,
            center_lon: 5.73,
            zoom: 12,
            max_zoom: 20,
            tile_url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors &copy; CARTO".to_string(),
            max_cluster_radius: 50,
            cluster_by_default: true,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
            default_color: DEFAULT_MARKER_COLOR.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:3000".to_string(),
            static_dir: "web".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path (must exist) or the default file (optional)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    warn!("Configuration file not found, using defaults");
                    Ok(AppConfig::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        debug!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn data_source(&self) -> DataSource {
        match self.data_source.parse::<DataSource>() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert_eq!(config.colors.palette.len(), 10);
        assert_eq!(config.colors.default_color, "#6c757d");
        assert_eq!(config.catch_all_industries, vec!["Annet", "Other"]);
        assert!(config.map.cluster_by_default);
        assert_eq!(
            config.data_source(),
            DataSource::File("data_enriched.json".into())
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r##"
            title = "Sandnes Uncovered"
            search_debounce_ms = 250

            [map]
            center_lat = 58.85
            cluster_by_default = false

            [colors]
            palette = ["#111111", "#222222"]
            "##,
        )
        .unwrap();

        assert_eq!(config.title, "Sandnes Uncovered");
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.map.center_lat, 58.85);
        assert_eq!(config.map.center_lon, 5.73);
        assert!(!config.map.cluster_by_default);
        assert_eq!(config.colors.palette, vec!["#111111", "#222222"]);
        assert_eq!(config.colors.default_color, "#6c757d");
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_remote_data_source() {
        let config =
            AppConfig::from_toml(r#"data_source = "https://example.com/data.json""#).unwrap();
        assert!(config.data_source().is_remote());
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let config = AppConfig::from_toml(include_str!("../business-map.example.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AppConfig::from_toml("search_debounce_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "title = \"From File\"").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.title, "From File");

        assert!(AppConfig::load(Some(Path::new("/no/such/config.toml"))).is_err());
    }
}
