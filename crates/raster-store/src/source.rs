//! Raster sources: where grids come from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hydro_common::{HydroError, HydroResult, Raster};
use tracing::debug;

use crate::ascii_grid::read_ascii_grid;

/// Anything that can hand out rasters by layer id.
///
/// Implementations must be shareable across threads; the service keeps one
/// source behind a [`RasterCache`](crate::RasterCache) for all requests.
pub trait RasterSource: Send + Sync {
    /// Load the raster for a layer.
    ///
    /// Unknown layers are [`HydroError::RasterNotFound`].
    fn load(&self, layer_id: &str) -> HydroResult<Raster<f64>>;
}

/// Reads `<root>/<layer_id>.asc` files.
#[derive(Debug, Clone)]
pub struct AsciiGridSource {
    root: PathBuf,
}

impl AsciiGridSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a layer id.
    ///
    /// Ids are plain names; anything that could escape the data directory
    /// is rejected.
    pub fn path_for(&self, layer_id: &str) -> HydroResult<PathBuf> {
        if layer_id.is_empty()
            || layer_id.contains(['/', '\\'])
            || layer_id.contains("..")
        {
            return Err(HydroError::invalid_parameter(
                "layer_id",
                format!("'{}' is not a plain layer name", layer_id),
            ));
        }
        Ok(self.root.join(format!("{}.asc", layer_id)))
    }
}

impl RasterSource for AsciiGridSource {
    fn load(&self, layer_id: &str) -> HydroResult<Raster<f64>> {
        let path = self.path_for(layer_id)?;
        debug!(layer = layer_id, path = %path.display(), "Reading ASCII grid");
        read_ascii_grid(&path)
    }
}

/// Rasters held in memory, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rasters: HashMap<String, Raster<f64>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer, replacing any existing one with the same id.
    pub fn insert(&mut self, layer_id: impl Into<String>, raster: Raster<f64>) {
        self.rasters.insert(layer_id.into(), raster);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_layer(mut self, layer_id: impl Into<String>, raster: Raster<f64>) -> Self {
        self.insert(layer_id, raster);
        self
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

impl RasterSource for MemorySource {
    fn load(&self, layer_id: &str) -> HydroResult<Raster<f64>> {
        self.rasters
            .get(layer_id)
            .cloned()
            .ok_or_else(|| HydroError::RasterNotFound(layer_id.to_string()))
    }
}
