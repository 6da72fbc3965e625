//! Dense grids and their georeferencing.
//!
//! A [`Grid`] is a bare row-major array. A [`Raster`] pairs a grid with the
//! [`RasterMetadata`] needed to move between pixel and map coordinates.
//! Rows run north to south: row 0 is the top edge of the raster.

use serde::{Deserialize, Serialize};

use crate::{Extent, HydroError, HydroResult, MapPoint};

/// Integer cell address. Signed so that neighbours of edge cells and
/// off-grid map points can be represented and then rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoordinate {
    pub col: i64,
    pub row: i64,
}

impl PixelCoordinate {
    pub fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }

    /// The coordinate shifted by a column/row offset.
    pub fn offset(&self, dcol: i64, drow: i64) -> Self {
        Self {
            col: self.col + dcol,
            row: self.row + drow,
        }
    }
}

/// Dense 2D array stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Create a grid from row-major data.
    pub fn new(width: usize, height: usize, data: Vec<T>) -> HydroResult<Self> {
        if width == 0 || height == 0 {
            return Err(HydroError::InvalidDimensions { width, height });
        }
        if data.len() != width * height {
            return Err(HydroError::DataLength {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a grid from a list of rows (top row first).
    pub fn from_rows(rows: Vec<Vec<T>>) -> HydroResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(HydroError::DimensionMismatch(format!(
                "row of length {} in grid of width {}",
                bad.len(),
                width
            )));
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed grid; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major cell values.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Check whether a pixel lies inside the grid.
    pub fn contains(&self, pixel: PixelCoordinate) -> bool {
        pixel.col >= 0
            && pixel.row >= 0
            && (pixel.col as u64) < self.width as u64
            && (pixel.row as u64) < self.height as u64
    }

    /// Flat index of a pixel, or `None` when it lies outside the grid.
    pub fn index_of(&self, pixel: PixelCoordinate) -> Option<usize> {
        if self.contains(pixel) {
            Some(pixel.row as usize * self.width + pixel.col as usize)
        } else {
            None
        }
    }

    /// Pixel address of a flat index.
    pub fn pixel_of(&self, index: usize) -> PixelCoordinate {
        PixelCoordinate::new((index % self.width) as i64, (index / self.width) as i64)
    }

    /// Borrow the value at a pixel.
    pub fn get_ref(&self, pixel: PixelCoordinate) -> Option<&T> {
        self.index_of(pixel).map(|i| &self.data[i])
    }

    /// Overwrite the value at a pixel. Returns false when the pixel is off-grid.
    pub fn set(&mut self, pixel: PixelCoordinate, value: T) -> bool {
        match self.index_of(pixel) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Build a new grid of the same shape by mapping every cell.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Whether another grid has the same width and height.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> HydroResult<Self> {
        Self::new(width, height, vec![value; width * height])
    }
}

impl<T: Copy> Grid<T> {
    /// Value at a pixel, or `None` when it lies outside the grid.
    pub fn get(&self, pixel: PixelCoordinate) -> Option<T> {
        self.get_ref(pixel).copied()
    }
}

impl Grid<bool> {
    /// Number of `true` cells.
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Fill flag at (col, row), treating anything outside the grid as unfilled.
    pub fn is_filled(&self, col: i64, row: i64) -> bool {
        self.get(PixelCoordinate::new(col, row)).unwrap_or(false)
    }
}

/// Numeric cell types that can be stored in a [`Raster`].
///
/// Conversion through `f64` is used for no-data comparison and for loading
/// text rasters into typed grids.
pub trait CellValue: Copy + Send + Sync + 'static {
    /// Sentinel used when a no-data value cannot be stored as-is, such as
    /// NaN in an integer grid.
    const FALLBACK_NO_DATA: Self;

    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_cell_value {
    ($($t:ty => $fallback:expr),*) => {
        $(
            impl CellValue for $t {
                const FALLBACK_NO_DATA: Self = $fallback;

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_cell_value!(
    u8 => u8::MAX,
    i16 => i16::MIN,
    i32 => i32::MIN,
    i64 => i64::MIN,
    f32 => f32::NAN,
    f64 => f64::NAN
);

/// Georeferencing for a north-up raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    /// Map coordinate of the top-left corner of the top-left cell.
    pub origin: MapPoint,
    /// Cell width in map units (> 0).
    pub cell_width: f64,
    /// Cell height in map units (> 0).
    pub cell_height: f64,
    /// Value marking cells without a measurement.
    pub no_data: Option<f64>,
}

impl RasterMetadata {
    /// Create metadata, rejecting non-positive or non-finite cell sizes.
    pub fn new(
        origin: MapPoint,
        cell_width: f64,
        cell_height: f64,
        no_data: Option<f64>,
    ) -> HydroResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(cell_width) || !valid(cell_height) {
            return Err(HydroError::InvalidCellSize {
                dx: cell_width,
                dy: cell_height,
            });
        }
        Ok(Self {
            origin,
            cell_width,
            cell_height,
            no_data,
        })
    }

    /// Pixel containing a map point. The result may lie outside any grid.
    pub fn map_to_pixel(&self, point: &MapPoint) -> PixelCoordinate {
        PixelCoordinate::new(
            floor_index((point.x - self.origin.x) / self.cell_width),
            floor_index((self.origin.y - point.y) / self.cell_height),
        )
    }

    /// Map coordinate of a cell centre.
    pub fn pixel_to_map(&self, pixel: PixelCoordinate) -> MapPoint {
        MapPoint::new(
            self.origin.x + (pixel.col as f64 + 0.5) * self.cell_width,
            self.origin.y - (pixel.row as f64 + 0.5) * self.cell_height,
        )
    }

    /// Map coordinate of a cell-corner lattice point.
    pub fn corner_to_map(&self, x: i64, y: i64) -> MapPoint {
        MapPoint::new(
            self.origin.x + x as f64 * self.cell_width,
            self.origin.y - y as f64 * self.cell_height,
        )
    }

    /// Map extent covered by a grid of the given size.
    pub fn extent(&self, width: usize, height: usize) -> Extent {
        Extent::new(
            self.origin.x,
            self.origin.y - height as f64 * self.cell_height,
            self.origin.x + width as f64 * self.cell_width,
            self.origin.y,
        )
    }

    /// Area of a single cell.
    pub fn cell_area(&self) -> f64 {
        self.cell_width * self.cell_height
    }

    /// Whether a value equals the no-data sentinel.
    pub fn is_no_data(&self, value: f64) -> bool {
        match self.no_data {
            Some(nd) if nd.is_nan() => value.is_nan(),
            Some(nd) => value == nd,
            None => false,
        }
    }
}

fn floor_index(v: f64) -> i64 {
    if v.is_finite() {
        v.floor() as i64
    } else {
        i64::MIN
    }
}

/// A grid together with its georeferencing.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    pub grid: Grid<T>,
    pub metadata: RasterMetadata,
}

impl<T: CellValue> Raster<T> {
    pub fn new(grid: Grid<T>, metadata: RasterMetadata) -> Self {
        Self { grid, metadata }
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Map extent of the whole raster.
    pub fn extent(&self) -> Extent {
        self.metadata.extent(self.grid.width(), self.grid.height())
    }

    /// Cell value at a pixel, `None` when off-grid or no-data.
    pub fn cell(&self, pixel: PixelCoordinate) -> Option<T> {
        self.grid
            .get(pixel)
            .filter(|v| !self.metadata.is_no_data(v.to_f64()))
    }

    /// Cell value under a map point, `None` when off-grid or no-data.
    pub fn value_at(&self, point: &MapPoint) -> Option<T> {
        self.cell(self.metadata.map_to_pixel(point))
    }

    /// Convert to another cell type.
    ///
    /// No-data cells, and NaN cells, stay no-data. When the target type
    /// cannot hold the sentinel (NaN or a fractional value in an integer
    /// grid) they are rewritten to [`CellValue::FALLBACK_NO_DATA`] and the
    /// metadata is updated to match.
    pub fn cast<U: CellValue>(&self) -> Raster<U> {
        let holds_nan = U::from_f64(f64::NAN).to_f64().is_nan();
        if holds_nan {
            return Raster {
                grid: self.grid.map(|v| U::from_f64(v.to_f64())),
                metadata: self.metadata,
            };
        }

        let sentinel = match self.metadata.no_data {
            Some(nd) if U::from_f64(nd).to_f64() == nd => nd,
            _ => U::FALLBACK_NO_DATA.to_f64(),
        };
        let missing = |v: f64| v.is_nan() || self.metadata.is_no_data(v);
        let has_missing = self.metadata.no_data.is_some()
            || self.grid.data().iter().any(|v| v.to_f64().is_nan());

        let grid = self.grid.map(|v| {
            let v = v.to_f64();
            U::from_f64(if missing(v) { sentinel } else { v })
        });
        Raster {
            grid,
            metadata: RasterMetadata {
                no_data: has_missing.then_some(sentinel),
                ..self.metadata
            },
        }
    }
}
