//! Threshold queries that turn a value raster into a cell mask.

use hydro_common::{CellValue, Grid, HydroError, HydroResult, Raster};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Inclusive value bounds. At least one bound must be present.
///
/// A range whose minimum exceeds its maximum is accepted and selects
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValueRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> HydroResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> HydroResult<()> {
        if self.min.is_none() && self.max.is_none() {
            return Err(HydroError::MissingParameter("min or max".to_string()));
        }
        Ok(())
    }

    pub fn contains(&self, value: f64) -> bool {
        !value.is_nan()
            && self.min.map_or(true, |min| value >= min)
            && self.max.map_or(true, |max| value <= max)
    }
}

/// Mask of cells whose value falls inside `range`. No-data and NaN cells
/// are never selected.
pub fn threshold_mask<T: CellValue>(
    raster: &Raster<T>,
    range: &ValueRange,
) -> HydroResult<Grid<bool>> {
    range.validate()?;

    let meta = &raster.metadata;
    let data: Vec<bool> = raster
        .grid
        .data()
        .par_iter()
        .map(|v| {
            let value = v.to_f64();
            !meta.is_no_data(value) && range.contains(value)
        })
        .collect();
    let mask = Grid::new(raster.width(), raster.height(), data)?;

    tracing::debug!(
        min = ?range.min,
        max = ?range.max,
        selected = mask.count_true(),
        "Evaluated raster threshold"
    );
    Ok(mask)
}
