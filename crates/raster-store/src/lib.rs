//! Raster access for the watershed toolkit.
//!
//! The analysis crates only see dense grids. This crate is the layer that
//! produces them: it reads and writes ESRI ASCII grids, looks up which
//! high-resolution tile or mosaic tiles cover a point, loads reference flow lines, and keeps
//! opened rasters in a shared LRU cache so concurrent requests open each
//! layer at most once.

pub mod ascii_grid;
pub mod cache;
pub mod index;
pub mod source;
pub mod vector;

pub use ascii_grid::{parse_ascii_grid, read_ascii_grid, write_ascii_grid, write_mask};
pub use cache::{CacheStats, RasterCache};
pub use index::{Mosaic, MosaicTile, TileEntry, TileIndex};
pub use source::{AsciiGridSource, MemorySource, RasterSource};
pub use vector::{parse_polyline, read_polyline};
