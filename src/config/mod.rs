use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Distance bands for heatmap coloring and local isochrones, in km
pub const DEFAULT_DISTANCE_BANDS_KM: [f64; 5] = [15.0, 30.0, 45.0, 60.0, 75.0];
/// Travel-time bands requested from the routing provider, in minutes
pub const DEFAULT_TRAVEL_BANDS_MINUTES: [f64; 4] = [15.0, 30.0, 45.0, 60.0];

fn default_distance_bands_km() -> Vec<f64> {
    DEFAULT_DISTANCE_BANDS_KM.to_vec()
}
fn default_travel_bands_minutes() -> Vec<f64> {
    DEFAULT_TRAVEL_BANDS_MINUTES.to_vec()
}
fn default_contour_step() -> f64 {
    10.0
}
fn default_contour_count() -> usize {
    6
}
fn default_grid_step_degrees() -> f64 {
    0.02
}
fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    800
}

#[derive(Debug, Deserialize, Clone)]
pub struct FileConfig {
    #[serde(default)]
    pub facilities: Option<PathBuf>,
    #[serde(default)]
    pub boundary: Option<PathBuf>,
    #[serde(default = "default_distance_bands_km")]
    pub distance_bands_km: Vec<f64>,
    #[serde(default = "default_travel_bands_minutes")]
    pub travel_bands_minutes: Vec<f64>,
    #[serde(default = "default_contour_step")]
    pub contour_step: f64,
    #[serde(default = "default_contour_count")]
    pub contour_count: usize,
    #[serde(default = "default_grid_step_degrees")]
    pub grid_step_degrees: f64,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    /// Ramer-Douglas-Peucker tolerance for written polygons, 0 = off
    #[serde(default)]
    pub simplify_tolerance: f64,
    #[serde(default)]
    pub exclude_removed: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub openroute: Option<OpenRouteConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            facilities: None,
            boundary: None,
            distance_bands_km: default_distance_bands_km(),
            travel_bands_minutes: default_travel_bands_minutes(),
            contour_step: default_contour_step(),
            contour_count: default_contour_count(),
            grid_step_degrees: default_grid_step_degrees(),
            width: default_width(),
            height: default_height(),
            simplify_tolerance: 0.0,
            exclude_removed: false,
            verbose: false,
            openroute: None,
        }
    }
}

fn default_openroute_url() -> String {
    "https://api.openrouteservice.org/v2/isochrones".to_string()
}

fn default_profile() -> String {
    "driving-car".to_string()
}

fn default_batch_size() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "ORS_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OpenRouteConfig {
    #[serde(default = "default_openroute_url")]
    pub url: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for OpenRouteConfig {
    fn default() -> Self {
        Self {
            url: default_openroute_url(),
            profile: default_profile(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl FileConfig {
    /// Load the first config file found in the standard locations
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        log::warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("reachmap.toml"), PathBuf::from(".reachmap.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("reachmap").join("config.toml"));
        paths.push(config_dir.join("reachmap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".reachmap.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.distance_bands_km, DEFAULT_DISTANCE_BANDS_KM.to_vec());
        assert_eq!(config.travel_bands_minutes, DEFAULT_TRAVEL_BANDS_MINUTES.to_vec());
        assert_eq!(config.contour_step, 10.0);
        assert_eq!(config.contour_count, 6);
        assert_eq!(config.grid_step_degrees, 0.02);
        assert!(config.openroute.is_none());
    }

    #[test]
    fn test_openroute_table() {
        let config: FileConfig = toml::from_str(
            r#"
            travel_bands_minutes = [10, 20]
            [openroute]
            batch_size = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.travel_bands_minutes, vec![10.0, 20.0]);
        let ors = config.openroute.unwrap();
        assert_eq!(ors.batch_size, 3);
        assert_eq!(ors.profile, "driving-car");
        assert_eq!(ors.api_key_env, "ORS_API_KEY");
    }

    #[test]
    fn test_load_from() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reachmap.toml");
        fs::write(&path, "width = 320\nheight = 200\nfacilities = \"hospitals.json\"\n").unwrap();

        let config = FileConfig::load_from(&path).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 200);
        assert_eq!(config.facilities, Some(PathBuf::from("hospitals.json")));

        assert!(FileConfig::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
