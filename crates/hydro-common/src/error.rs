//! Error types for watershed analysis.

use thiserror::Error;

/// Result type alias using HydroError.
pub type HydroResult<T> = Result<T, HydroError>;

/// Primary error type for the watershed toolkit.
///
/// Only configuration problems and unreadable inputs are errors. Reaching a
/// sink, a no-data cell or the edge of a grid is a normal outcome and is
/// reported through result values instead.
#[derive(Debug, Error)]
pub enum HydroError {
    // === Configuration Errors ===
    #[error("Invalid cell size: dx={dx}, dy={dy} (both must be finite and > 0)")]
    InvalidCellSize { dx: f64, dy: f64 },

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Grid data length {actual} does not match {width}x{height}")]
    DataLength {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Grids do not share dimensions: {0}")]
    DimensionMismatch(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Missing or invalid data layer: {0}")]
    MissingLayer(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // === Data Access Errors ===
    #[error("Raster not found: {0}")]
    RasterNotFound(String),

    #[error("Failed to parse raster '{source_name}': {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HydroError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a Parse error.
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Whether the error means the toolkit was set up wrongly, as opposed to
    /// a data source failing at request time.
    ///
    /// Callers use this to decide between refusing to start and running in a
    /// degraded mode (for example without high-resolution tiles).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HydroError::InvalidCellSize { .. }
                | HydroError::InvalidDimensions { .. }
                | HydroError::DataLength { .. }
                | HydroError::DimensionMismatch(_)
                | HydroError::MissingParameter(_)
                | HydroError::InvalidParameter { .. }
                | HydroError::MissingLayer(_)
                | HydroError::Config(_)
        )
    }
}

impl From<std::io::Error> for HydroError {
    fn from(err: std::io::Error) -> Self {
        HydroError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HydroError {
    fn from(err: serde_json::Error) -> Self {
        HydroError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(HydroError::InvalidCellSize { dx: 0.0, dy: 1.0 }.is_configuration_error());
        assert!(HydroError::MissingLayer("low resolution flow".into()).is_configuration_error());
        assert!(!HydroError::RasterNotFound("tile_07".into()).is_configuration_error());
        assert!(!HydroError::Io("boom".into()).is_configuration_error());
    }

    #[test]
    fn test_io_conversion() {
        let err: HydroError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, HydroError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
