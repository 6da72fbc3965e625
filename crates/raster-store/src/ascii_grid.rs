//! ESRI ASCII grid (`.asc`) reading and writing.
//!
//! The format is a short header of `key value` lines followed by the cell
//! values, whitespace separated, rows from north to south:
//!
//! ```text
//! ncols         3
//! nrows         2
//! xllcorner     100.0
//! yllcorner     200.0
//! cellsize      10.0
//! NODATA_value  -9999
//! 1 1 4
//! 1 1 0
//! ```
//!
//! Keys are case-insensitive. The lower-left reference may be given as a
//! corner (`xllcorner`) or a cell centre (`xllcenter`), and `cellsize` may be
//! replaced by separate `dx`/`dy` values.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use hydro_common::{CellValue, Grid, HydroError, HydroResult, MapPoint, Raster, RasterMetadata};
use tracing::debug;

/// Lower-left reference as written in the header.
#[derive(Debug, Clone, Copy)]
enum Registration {
    Corner(f64),
    Center(f64),
}

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<Registration>,
    yll: Option<Registration>,
    cellsize: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    no_data: Option<f64>,
}

impl Header {
    fn metadata(&self, source_name: &str) -> HydroResult<(usize, usize, RasterMetadata)> {
        let missing = |key: &str| HydroError::parse(source_name, format!("missing header key '{}'", key));

        let ncols = self.ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = self.nrows.ok_or_else(|| missing("nrows"))?;
        let dx = self.dx.or(self.cellsize).ok_or_else(|| missing("cellsize"))?;
        let dy = self.dy.or(self.cellsize).ok_or_else(|| missing("cellsize"))?;

        let left = match self.xll.ok_or_else(|| missing("xllcorner"))? {
            Registration::Corner(x) => x,
            Registration::Center(x) => x - dx / 2.0,
        };
        let bottom = match self.yll.ok_or_else(|| missing("yllcorner"))? {
            Registration::Corner(y) => y,
            Registration::Center(y) => y - dy / 2.0,
        };

        let origin = MapPoint::new(left, bottom + nrows as f64 * dy);
        let metadata = RasterMetadata::new(origin, dx, dy, self.no_data)?;
        Ok((ncols, nrows, metadata))
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str, source_name: &str) -> HydroResult<T> {
    value.parse().map_err(|_| {
        HydroError::parse(
            source_name,
            format!("invalid value '{}' for header key '{}'", value, key),
        )
    })
}

/// Parse an ASCII grid held in memory.
///
/// `source_name` only labels errors and log lines.
pub fn parse_ascii_grid(text: &str, source_name: &str) -> HydroResult<Raster<f64>> {
    let mut header = Header::default();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.peek() {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            lines.next();
            continue;
        };
        // The body starts at the first line that opens with a number
        if key.parse::<f64>().is_ok() {
            break;
        }
        let key = key.to_ascii_lowercase();
        let value = tokens
            .next()
            .ok_or_else(|| HydroError::parse(source_name, format!("header key '{}' has no value", key)))?;

        match key.as_str() {
            "ncols" => header.ncols = Some(parse_number(value, &key, source_name)?),
            "nrows" => header.nrows = Some(parse_number(value, &key, source_name)?),
            "xllcorner" => header.xll = Some(Registration::Corner(parse_number(value, &key, source_name)?)),
            "xllcenter" => header.xll = Some(Registration::Center(parse_number(value, &key, source_name)?)),
            "yllcorner" => header.yll = Some(Registration::Corner(parse_number(value, &key, source_name)?)),
            "yllcenter" => header.yll = Some(Registration::Center(parse_number(value, &key, source_name)?)),
            "cellsize" => header.cellsize = Some(parse_number(value, &key, source_name)?),
            "dx" => header.dx = Some(parse_number(value, &key, source_name)?),
            "dy" => header.dy = Some(parse_number(value, &key, source_name)?),
            "nodata_value" => header.no_data = Some(parse_number(value, &key, source_name)?),
            other => debug!(source = source_name, key = other, "Ignoring unknown header key"),
        }
        lines.next();
    }

    let (ncols, nrows, metadata) = header.metadata(source_name)?;

    let expected = ncols.checked_mul(nrows).ok_or_else(|| {
        HydroError::parse(
            source_name,
            format!("grid of {}x{} cells is too large", ncols, nrows),
        )
    })?;

    // Sized by the body rather than the header, which may be wrong
    let mut values = Vec::new();
    for token in lines.flat_map(str::split_whitespace) {
        let value: f64 = token.parse().map_err(|_| {
            HydroError::parse(source_name, format!("invalid cell value '{}'", token))
        })?;
        values.push(value);
    }

    if values.len() != expected {
        return Err(HydroError::parse(
            source_name,
            format!(
                "expected {} cell values for {}x{}, found {}",
                expected,
                ncols,
                nrows,
                values.len()
            ),
        ));
    }

    let grid = Grid::new(ncols, nrows, values)?;
    debug!(
        source = source_name,
        width = ncols,
        height = nrows,
        cell_width = metadata.cell_width,
        cell_height = metadata.cell_height,
        "Parsed ASCII grid"
    );
    Ok(Raster::new(grid, metadata))
}

/// Read an ASCII grid from disk.
///
/// A missing file is reported as [`HydroError::RasterNotFound`].
pub fn read_ascii_grid(path: &Path) -> HydroResult<Raster<f64>> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => HydroError::RasterNotFound(path.display().to_string()),
        _ => HydroError::from(e),
    })?;
    parse_ascii_grid(&text, &path.display().to_string())
}

/// Write a raster in ASCII grid format using corner registration.
///
/// `cellsize` is written for square cells, `dx`/`dy` otherwise.
pub fn write_ascii_grid<T: CellValue, W: Write>(raster: &Raster<T>, mut out: W) -> HydroResult<()> {
    let meta = &raster.metadata;
    let bottom = meta.origin.y - raster.height() as f64 * meta.cell_height;

    writeln!(out, "ncols         {}", raster.width())?;
    writeln!(out, "nrows         {}", raster.height())?;
    writeln!(out, "xllcorner     {}", meta.origin.x)?;
    writeln!(out, "yllcorner     {}", bottom)?;
    if meta.cell_width == meta.cell_height {
        writeln!(out, "cellsize      {}", meta.cell_width)?;
    } else {
        writeln!(out, "dx            {}", meta.cell_width)?;
        writeln!(out, "dy            {}", meta.cell_height)?;
    }
    if let Some(no_data) = meta.no_data {
        writeln!(out, "NODATA_value  {}", no_data)?;
    }

    let width = raster.width();
    for row in raster.grid.data().chunks(width) {
        let line: Vec<String> = row.iter().map(|v| v.to_f64().to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Write a boolean cell mask as a 1/0 ASCII grid with 0 as no-data.
pub fn write_mask<W: Write>(mask: &Grid<bool>, metadata: &RasterMetadata, out: W) -> HydroResult<()> {
    let grid = mask.map(|&filled| u8::from(filled));
    let metadata = RasterMetadata {
        no_data: Some(0.0),
        ..*metadata
    };
    write_ascii_grid(&Raster::new(grid, metadata), out)
}
