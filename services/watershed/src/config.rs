//! Configuration for the watershed service.
//!
//! Loaded from a YAML file, then overridden from the environment:
//!
//! ```yaml
//! data_dir: /srv/watershed/data
//! flow_path:
//!   high_res_max_steps: 1000
//!   low_res_max_steps: 16384
//! upstream_area:
//!   high_res_accumulation_threshold: 20
//!   default_tolerance: 0
//! layers:
//!   low_res_flow_direction: regional_fdr
//!   low_res_flow_accumulation: regional_fac
//!   flow_area: flow_area
//!   flow_line: main_stem.geojson
//!   high_res_index:
//!     - id: tile_07
//!       extent: { min_x: 0, min_y: 0, max_x: 5000, max_y: 5000 }
//!       flow_direction: tile_07_fdr
//!       flow_accumulation: tile_07_fac
//!   query:
//!     elevation: dem
//!   mosaics:
//!     lidar:
//!       - id: survey_2019
//!         extent: { min_x: 0, min_y: 0, max_x: 2500, max_y: 2500 }
//!         layer: lidar_2019
//! cache:
//!   capacity: 64
//! units:
//!   kind: linear
//!   meters_per_unit: 1.0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hydro_common::{CoordinateUnit, HydroError, HydroResult};
use raster_store::{Mosaic, TileIndex};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatershedConfig {
    /// Directory holding the ASCII grids named by the layer ids.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub flow_path: FlowPathConfig,

    #[serde(default)]
    pub upstream_area: UpstreamAreaConfig,

    pub layers: LayerConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Map units of the grids, reported in response attributes.
    #[serde(default)]
    pub units: CoordinateUnit,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Step limits for the two-tier flow path trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowPathConfig {
    pub high_res_max_steps: usize,
    pub low_res_max_steps: usize,
}

impl Default for FlowPathConfig {
    fn default() -> Self {
        Self {
            high_res_max_steps: 1000,
            low_res_max_steps: 16384,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamAreaConfig {
    /// Low-resolution accumulation at or above which the low-resolution grid
    /// is used even when a high-resolution tile covers the outlet.
    pub high_res_accumulation_threshold: f64,

    /// Snap tolerance in map units when a request gives none.
    pub default_tolerance: f64,
}

impl Default for UpstreamAreaConfig {
    fn default() -> Self {
        Self {
            high_res_accumulation_threshold: 20.0,
            default_tolerance: 0.0,
        }
    }
}

/// Layer ids, resolved against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    pub low_res_flow_direction: String,
    pub low_res_flow_accumulation: String,

    /// Raster whose data cells mark where the flow line applies.
    #[serde(default)]
    pub flow_area: Option<String>,

    /// GeoJSON file with the reference flow line, relative to `data_dir`.
    #[serde(default)]
    pub flow_line: Option<PathBuf>,

    #[serde(default)]
    pub high_res_index: TileIndex,

    /// Layers available to raster and point queries, by public name.
    #[serde(default)]
    pub query: BTreeMap<String, String>,

    /// Tiled layers available to point queries, by public name.
    #[serde(default)]
    pub mosaics: BTreeMap<String, Mosaic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of open rasters per cell type.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl WatershedConfig {
    /// Parse a YAML document without applying overrides.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse watershed configuration")
    }

    /// Load from a file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_yaml_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup.
    ///
    /// Recognised keys: `WATERSHED_DATA_DIR`, `FLOW_PATH_HIGH_RES_MAX_STEPS`,
    /// `FLOW_PATH_LOW_RES_MAX_STEPS`, `UPSTREAM_HIGH_RES_THRESHOLD`,
    /// `UPSTREAM_DEFAULT_TOLERANCE`, `RASTER_CACHE_CAPACITY`. Values that do
    /// not parse are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("WATERSHED_DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        override_parsed(&lookup, "FLOW_PATH_HIGH_RES_MAX_STEPS", &mut self.flow_path.high_res_max_steps);
        override_parsed(&lookup, "FLOW_PATH_LOW_RES_MAX_STEPS", &mut self.flow_path.low_res_max_steps);
        override_parsed(
            &lookup,
            "UPSTREAM_HIGH_RES_THRESHOLD",
            &mut self.upstream_area.high_res_accumulation_threshold,
        );
        override_parsed(
            &lookup,
            "UPSTREAM_DEFAULT_TOLERANCE",
            &mut self.upstream_area.default_tolerance,
        );
        override_parsed(&lookup, "RASTER_CACHE_CAPACITY", &mut self.cache.capacity);
    }

    /// Validate the configuration.
    pub fn validate(&self) -> HydroResult<()> {
        if self.flow_path.high_res_max_steps == 0 || self.flow_path.low_res_max_steps == 0 {
            return Err(HydroError::Config(
                "flow path step limits must be greater than 0".to_string(),
            ));
        }

        let tolerance = self.upstream_area.default_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(HydroError::Config(format!(
                "default snap tolerance must be finite and >= 0, got {}",
                tolerance
            )));
        }

        if self.upstream_area.high_res_accumulation_threshold.is_nan() {
            return Err(HydroError::Config(
                "high resolution accumulation threshold must be a number".to_string(),
            ));
        }

        if self.layers.low_res_flow_direction.trim().is_empty() {
            return Err(HydroError::MissingLayer(
                "low resolution flow direction".to_string(),
            ));
        }
        if self.layers.low_res_flow_accumulation.trim().is_empty() {
            return Err(HydroError::MissingLayer(
                "low resolution flow accumulation".to_string(),
            ));
        }

        if self.cache.capacity == 0 {
            return Err(HydroError::Config(
                "cache capacity must be greater than 0".to_string(),
            ));
        }

        for (name, mosaic) in &self.layers.mosaics {
            if self.layers.query.contains_key(name) {
                return Err(HydroError::Config(format!(
                    "layer name '{}' is used by both a query layer and a mosaic",
                    name
                )));
            }
            mosaic.validate(name)?;
        }

        self.layers.high_res_index.validate()
    }

    /// Full path of the reference flow line, if configured.
    pub fn flow_line_path(&self) -> Option<PathBuf> {
        self.layers
            .flow_line
            .as_ref()
            .map(|path| self.data_dir.join(path))
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(val) = lookup(key) {
        match val.trim().parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(key, value = %val, "Ignoring unparseable configuration override"),
        }
    }
}
