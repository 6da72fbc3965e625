//! Point sampling of value rasters.

use hydro_common::{CellValue, MapPoint, Raster};
use serde::{Deserialize, Serialize};

/// Value under each point, `None` where the point is off-grid or on
/// no-data (including NaN cells).
pub fn sample_points<T: CellValue>(raster: &Raster<T>, points: &[MapPoint]) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = points
        .iter()
        .map(|point| {
            raster
                .value_at(point)
                .map(CellValue::to_f64)
                .filter(|v| !v.is_nan())
        })
        .collect();

    tracing::debug!(
        points = points.len(),
        hits = values.iter().filter(|v| v.is_some()).count(),
        "Sampled raster"
    );
    values
}

/// What a point query reports for one point.
///
/// Serializes as `null`, a number, or an array when several overlapping
/// tiles each contributed a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Single(Option<f64>),
    Multiple(Vec<Option<f64>>),
}

impl SampleValue {
    /// Collapse per-tile samples: none is `null`, one is that value.
    pub fn from_tiles(mut values: Vec<Option<f64>>) -> Self {
        match values.len() {
            0 => SampleValue::Single(None),
            1 => SampleValue::Single(values.pop().flatten()),
            _ => SampleValue::Multiple(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydro_common::{Grid, RasterMetadata};

    #[test]
    fn test_sample_points() {
        let meta = RasterMetadata::new(MapPoint::new(0.0, 2.0), 1.0, 1.0, Some(-9999.0)).unwrap();
        let grid = Grid::from_rows(vec![vec![1.5, -9999.0], vec![f64::NAN, 4.0]]).unwrap();
        let raster = Raster::new(grid, meta);

        let values = sample_points(
            &raster,
            &[
                MapPoint::new(0.5, 1.5),
                MapPoint::new(1.5, 1.5),
                MapPoint::new(0.5, 0.5),
                MapPoint::new(1.5, 0.5),
                MapPoint::new(5.0, 5.0),
            ],
        );
        assert_eq!(values, vec![Some(1.5), None, None, Some(4.0), None]);
    }

    #[test]
    fn test_from_tiles() {
        assert_eq!(SampleValue::from_tiles(vec![]), SampleValue::Single(None));
        assert_eq!(SampleValue::from_tiles(vec![Some(2.0)]), SampleValue::Single(Some(2.0)));
        assert_eq!(
            SampleValue::from_tiles(vec![Some(2.0), None]),
            SampleValue::Multiple(vec![Some(2.0), None])
        );
    }
}
