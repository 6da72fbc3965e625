//! Locating checked-in and optional test rasters.
//!
//! Small grids live next to the crate that reads them (`testdata/`).
//! Regional grids stay out of the repository; point `TEST_DATA_DIR` at them.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an extra directory of test rasters.
pub const TEST_DATA_ENV: &str = "TEST_DATA_DIR";

/// The workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let here = Path::new(env!("CARGO_MANIFEST_DIR"));
    here.ancestors()
        .nth(2)
        .unwrap_or(here)
        .to_path_buf()
}

/// `crates/<name>/testdata`
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root().join("crates").join(crate_name).join("testdata")
}

/// `services/<name>/testdata`
pub fn service_testdata_dir(service_name: &str) -> PathBuf {
    workspace_root().join("services").join(service_name).join("testdata")
}

/// First existing copy of `name`, looking in `TEST_DATA_DIR`, then the
/// raster-store and watershed testdata directories, then `testdata/` at the
/// workspace root.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let extra = env::var_os(TEST_DATA_ENV).map(PathBuf::from);
    extra
        .into_iter()
        .chain([
            crate_testdata_dir("raster-store"),
            service_testdata_dir("watershed"),
            workspace_root().join("testdata"),
        ])
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

/// Scratch directory removed when the handle drops.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("temporary directory")
}
