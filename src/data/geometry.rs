use std::f64::consts::PI;

use crate::error::ProcessingError;

/// Vacuum permittivity (F/m), as used by the instrument workbooks.
pub const EPSILON_0: f64 = 8.854e-12;

const MM_PER_M: f64 = 1000.0;

/// Sample geometry in SI units. Computed once per batch, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConstants {
    pub thickness_m: f64,
    pub diameter_m: f64,
    /// Electrode surface `π·d²/4`, m².
    pub area_m2: f64,
    /// Empty-cell capacitance `ε0·S/h`, F.
    pub vacuum_capacitance_f: f64,
}

impl GeometryConstants {
    /// Build the constants from millimetre inputs.
    ///
    /// Rejects non-positive and non-finite values; the caller decides whether
    /// to ask again.
    pub fn compute(thickness_mm: f64, diameter_mm: f64) -> Result<Self, ProcessingError> {
        let thickness_m = validate("thickness", thickness_mm)? / MM_PER_M;
        let diameter_m = validate("diameter", diameter_mm)? / MM_PER_M;

        let area_m2 = PI * diameter_m.powi(2) / 4.0;
        let vacuum_capacitance_f = EPSILON_0 * area_m2 / thickness_m;

        Ok(Self {
            thickness_m,
            diameter_m,
            area_m2,
            vacuum_capacitance_f,
        })
    }
}

/// Parse a user-supplied millimetre value. Empty or non-numeric text is an
/// `InvalidGeometry` error, same as a non-positive number.
pub fn parse_dimension(parameter: &'static str, text: &str) -> Result<f64, ProcessingError> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|_| ProcessingError::InvalidGeometry {
            parameter,
            value: format!("'{}'", text.trim()),
        })?;
    validate(parameter, value)
}

fn validate(parameter: &'static str, value: f64) -> Result<f64, ProcessingError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ProcessingError::InvalidGeometry {
            parameter,
            value: value.to_string(),
        })
    }
}
