//! Hydrological algorithms over D8 flow-direction rasters.
//!
//! All functions here are synchronous and pure: they borrow the grids they
//! need and allocate their own working buffers, so any number of requests
//! may run them concurrently against shared rasters.
//!
//! - [`flow_path`]: follow the flow directions downhill from a seed point.
//! - [`snap`]: move a candidate outlet onto the drainage network.
//! - [`upstream`]: flood-fill every cell that drains into an outlet.
//! - [`boundary`]: turn a boolean cell mask into polygon rings.
//! - [`raster_query`]: build masks from value thresholds.
//! - [`sample`]: read values under a batch of points.

pub mod boundary;
pub mod flow_path;
pub mod raster_query;
pub mod sample;
pub mod snap;
pub mod upstream;

pub use boundary::{extract_boundary, extract_polygon, LatticePoint};
pub use flow_path::{trace_flow_path, FlowTrace, StopReason};
pub use raster_query::{threshold_mask, ValueRange};
pub use sample::{sample_points, SampleValue};
pub use snap::{snap_pour_point, SnapContext, SnapMethod, SnapOutcome};
pub use upstream::{upstream_area, upstream_cells};
