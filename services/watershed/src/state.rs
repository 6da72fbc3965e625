//! Shared service state: configuration, raster source and caches.

use std::sync::Arc;

use hydro_common::{HydroError, HydroResult, MapPoint, Polyline, Raster};
use raster_store::{read_polyline, AsciiGridSource, CacheStats, RasterCache, RasterSource, TileEntry};
use tracing::{info, warn};

use crate::config::WatershedConfig;

/// Everything a request needs, shared across requests.
///
/// Flow-direction grids and value grids are cached separately so direction
/// codes are converted to integers once per load rather than per request.
pub struct WatershedState {
    pub config: WatershedConfig,
    source: Arc<dyn RasterSource>,
    directions: RasterCache<i32>,
    values: RasterCache<f64>,
    flow_line: Option<Polyline>,
}

impl WatershedState {
    /// Build state over ASCII grids in the configured data directory.
    pub fn from_config(config: WatershedConfig) -> HydroResult<Self> {
        let source = Arc::new(AsciiGridSource::new(config.data_dir.clone()));
        let flow_line = match config.flow_line_path() {
            Some(path) => match read_polyline(&path) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Flow line unavailable, snapping to flow lines disabled");
                    None
                }
            },
            None => None,
        };
        Self::new(config, source, flow_line)
    }

    /// Build state over any raster source.
    ///
    /// The configuration is validated and both low-resolution layers are
    /// opened up front; a missing one is a configuration error.
    pub fn new(
        config: WatershedConfig,
        source: Arc<dyn RasterSource>,
        flow_line: Option<Polyline>,
    ) -> HydroResult<Self> {
        config.validate()?;

        let state = Self {
            directions: RasterCache::new(config.cache.capacity)?,
            values: RasterCache::new(config.cache.capacity)?,
            config,
            source,
            flow_line,
        };

        state.low_res_directions().map_err(|e| {
            HydroError::MissingLayer(format!("low resolution flow direction: {}", e))
        })?;
        state.low_res_accumulation().map_err(|e| {
            HydroError::MissingLayer(format!("low resolution flow accumulation: {}", e))
        })?;

        if state.config.layers.high_res_index.is_empty() {
            warn!("No high resolution tiles configured, using low resolution grids only");
        }

        info!(
            tiles = state.config.layers.high_res_index.len(),
            query_layers = state.config.layers.query.len(),
            flow_line = state.flow_line.is_some(),
            "Watershed state ready"
        );
        Ok(state)
    }

    /// Flow-direction grid for a layer id.
    pub fn directions(&self, layer_id: &str) -> HydroResult<Arc<Raster<i32>>> {
        self.directions.fetch(self.source.as_ref(), layer_id)
    }

    /// Value grid (accumulation, flow area, query layers) for a layer id.
    pub fn values(&self, layer_id: &str) -> HydroResult<Arc<Raster<f64>>> {
        self.values.fetch(self.source.as_ref(), layer_id)
    }

    pub fn low_res_directions(&self) -> HydroResult<Arc<Raster<i32>>> {
        self.directions(&self.config.layers.low_res_flow_direction)
    }

    pub fn low_res_accumulation(&self) -> HydroResult<Arc<Raster<f64>>> {
        self.values(&self.config.layers.low_res_flow_accumulation)
    }

    /// The high-resolution tile covering a point, if any.
    pub fn tile_for(&self, point: &MapPoint) -> Option<&TileEntry> {
        self.config.layers.high_res_index.find(point)
    }

    /// The flow-area raster, or `None` when it is not configured or cannot
    /// be opened.
    pub fn flow_area(&self) -> Option<Arc<Raster<f64>>> {
        let layer = self.config.layers.flow_area.as_deref()?;
        match self.values(layer) {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!(layer, error = %e, "Flow area unavailable");
                None
            }
        }
    }

    pub fn flow_line(&self) -> Option<&Polyline> {
        self.flow_line.as_ref()
    }

    /// Combined statistics of both caches.
    pub fn cache_stats(&self) -> CacheStats {
        let d = self.directions.stats();
        let v = self.values.stats();
        CacheStats {
            hits: d.hits + v.hits,
            misses: d.misses + v.misses,
            loads: d.loads + v.loads,
            entries: d.entries + v.entries,
        }
    }
}
