//! Coordinate unit labels for response attributes.

use serde::{Deserialize, Serialize};

/// Unit of the raster's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoordinateUnit {
    /// Projected coordinates; `meters_per_unit` is 1.0 for metres.
    Linear { meters_per_unit: f64 },
    /// Geographic coordinates; `radians_per_unit` is π/180 for degrees.
    Angular { radians_per_unit: f64 },
    #[default]
    Unknown,
}

impl CoordinateUnit {
    pub fn meters() -> Self {
        Self::Linear {
            meters_per_unit: 1.0,
        }
    }

    pub fn degrees() -> Self {
        Self::Angular {
            radians_per_unit: std::f64::consts::PI / 180.0,
        }
    }

    /// Label such as `"1 m"` or `"0.01745329 rad"`.
    pub fn describe(&self) -> String {
        match self {
            Self::Linear { meters_per_unit } => format!("{} m", trim_decimals(*meters_per_unit)),
            Self::Angular { radians_per_unit } => {
                format!("{} rad", trim_decimals(*radians_per_unit))
            }
            Self::Unknown => String::new(),
        }
    }
}

/// Up to eight decimals, trailing zeros removed.
fn trim_decimals(value: f64) -> String {
    let s = format!("{:.8}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
