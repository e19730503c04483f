//! Conversión de coordenadas GPS EXIF (grados/minutos/segundos) a grados decimales.

use crate::error::{MetadataError, Result};

/// Componente racional de una coordenada (grados, minutos o segundos).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RationalValue {
    pub numerator: u32,
    pub denominator: u32,
}

impl RationalValue {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn to_f64(self) -> Result<f64> {
        if self.denominator == 0 {
            return Err(MetadataError::MalformedRational {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(f64::from(self.numerator) / f64::from(self.denominator))
    }
}

impl From<exif::Rational> for RationalValue {
    fn from(value: exif::Rational) -> Self {
        Self::new(value.num, value.denom)
    }
}

impl From<(u32, u32)> for RationalValue {
    fn from((numerator, denominator): (u32, u32)) -> Self {
        Self::new(numerator, denominator)
    }
}

/// Convierte `[grados, minutos, segundos]` y la referencia de hemisferio
/// (`N`, `S`, `E`, `W`) a grados decimales. `S` y `W` son negativos.
pub fn convert(values: &[RationalValue], reference: &str) -> Result<f64> {
    let [degrees, minutes, seconds] = values else {
        return Err(MetadataError::InvalidCoordinateShape {
            found: values.len(),
        });
    };

    let magnitude =
        degrees.to_f64()? + minutes.to_f64()? / 60.0 + seconds.to_f64()? / 3600.0;

    match reference.trim() {
        "S" | "W" => Ok(-magnitude),
        _ => Ok(magnitude),
    }
}
