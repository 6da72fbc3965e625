//! Common types shared by the watershed analysis crates.
//!
//! Everything here is plain data: dense grids, raster georeferencing,
//! map-space geometry and the D8 flow-direction encoding. No I/O happens
//! in this crate.

pub mod d8;
pub mod error;
pub mod extent;
pub mod geometry;
pub mod grid;
pub mod units;

pub use d8::FlowDirection;
pub use error::{HydroError, HydroResult};
pub use extent::Extent;
pub use geometry::{MapPoint, Polygon, Polyline, Ring};
pub use grid::{CellValue, Grid, PixelCoordinate, Raster, RasterMetadata};
pub use units::CoordinateUnit;
