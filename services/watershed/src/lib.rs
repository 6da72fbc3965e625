//! Watershed queries over D8 flow-direction grids.
//!
//! This crate composes the algorithms in `flow-analysis` with the raster
//! access in `raster-store`:
//!
//! - [`flow_path`]: two-tier downhill trace (high-resolution tile, then the
//!   regional grid)
//! - [`upstream_area`]: outlet snapping, resolution choice and watershed
//!   delineation
//! - [`raster_query`]: outline of the cells of a layer within a value range
//! - [`query_points`]: layer values under a batch of points
//!
//! Geometric results are rendered as GeoJSON features by [`response`].

pub mod config;
pub mod flow_path;
pub mod query_points;
pub mod raster_query;
pub mod response;
pub mod state;
pub mod upstream_area;

pub use config::WatershedConfig;
pub use flow_path::{compute_flow_path, FlowPathResult, TierSummary};
pub use query_points::{query_points, PointQuery, PointSample, QueryPointsResult};
pub use raster_query::{query_raster, RasterQueryResult};
pub use state::WatershedState;
pub use upstream_area::{compute_upstream_area, Resolution, UpstreamAreaResult};
