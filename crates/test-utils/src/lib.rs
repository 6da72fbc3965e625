//! Test support for the watershed crates.
//!
//! Flow-direction rasters are awkward to write by hand, so most tests build
//! them from [`generators`] (funnels, uniform grids, seeded random grids and
//! the matching accumulation) and compare map coordinates with the
//! tolerance macros below. Small ASCII grids and YAML snippets shared by
//! several crates live in [`fixtures`]; [`paths`] locates checked-in
//! `testdata/` files.
//!
//! ```ignore
//! use test_utils::{accumulation_for, funnel_flow_grid};
//!
//! let (directions, outlet) = funnel_flow_grid(9, 7);
//! let accumulation = accumulation_for(&directions);
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a testdata file with [`find_test_file`], or return early from
/// the calling test when it is absent.
///
/// Regional grids are too large to commit, so tests over them are opt-in
/// through `TEST_DATA_DIR`.
///
/// ```ignore
/// let path = test_utils::require_test_file!("regional_fdr.asc");
/// let raster = raster_store::read_ascii_grid(&path).unwrap();
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("skipping: '{}' not in any testdata directory or TEST_DATA_DIR", $name);
                return;
            }
        }
    }};
}

/// Assert two numbers differ by at most `epsilon`, comparing as `f64`.
///
/// ```ignore
/// test_utils::assert_approx_eq!(result.area, 63.0, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "values differ by more than {:?}: left {:?}, right {:?} (diff {:?})",
                epsilon, left, right, diff
            );
        }
    }};
}

/// [`assert_approx_eq!`] on both components of an `(x, y)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}
