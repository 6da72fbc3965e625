//! Common test fixtures for watershed tests.
//!
//! Small ESRI ASCII grids and configuration snippets that several crates
//! read back through their own parsers.

/// ESRI ASCII grid text samples.
pub mod ascii {
    /// 3x3 flow-direction grid draining to a sink in the bottom-right cell,
    /// with its lower-left corner at (100, 200) and 10 m cells.
    pub const FLOW_3X3: &str = "\
ncols         3
nrows         3
xllcorner     100.0
yllcorner     200.0
cellsize      10.0
NODATA_value  -9999
1 1 4
1 1 4
1 1 0
";

    /// Accumulation grid matching [`FLOW_3X3`].
    pub const ACCUMULATION_3X3: &str = "\
ncols         3
nrows         3
xllcorner     100.0
yllcorner     200.0
cellsize      10.0
NODATA_value  -9999
1 2 3
1 2 6
1 2 9
";

    /// Header using cell-centre registration and separate dx/dy.
    pub const CENTER_REGISTERED: &str = "\
NCOLS 2
NROWS 2
XLLCENTER 0.5
YLLCENTER 1.0
DX 1.0
DY 2.0
1.5 2.5
3.5 -9999
";

    /// Header missing the row count.
    pub const MISSING_NROWS: &str = "\
ncols 2
xllcorner 0
yllcorner 0
cellsize 1
1 2
";
}

/// Sample service configuration documents.
pub mod config {
    /// Minimal configuration naming only the required layers.
    pub const MINIMAL_YAML: &str = "\
data_dir: ./data
layers:
  low_res_flow_direction: flow_dir
  low_res_flow_accumulation: flow_acc
";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_fixture_has_nine_cells() {
        let body: Vec<&str> = ascii::FLOW_3X3
            .lines()
            .skip(6)
            .flat_map(|l| l.split_whitespace())
            .collect();
        assert_eq!(body.len(), 9);
    }

    #[test]
    fn test_minimal_config_names_required_layers() {
        assert!(config::MINIMAL_YAML.contains("low_res_flow_direction"));
        assert!(config::MINIMAL_YAML.contains("low_res_flow_accumulation"));
    }
}
