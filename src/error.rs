//! Errores del motor de extracción.
//!
//! Solo `FileNotFound` e `Io` sobre la ruta principal llegan al llamador de
//! [`crate::metadata::extract`]; el resto se degrada a entradas del registro.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Decode(#[from] image::ImageError),

    #[error("EXIF parse error: {0}")]
    ExifParse(#[from] exif::Error),

    #[error("Malformed rational value {numerator}/{denominator}")]
    MalformedRational { numerator: u32, denominator: u32 },

    #[error("Expected 3 rational values for a coordinate, found {found}")]
    InvalidCoordinateShape { found: usize },

    #[error("No parser available for this content")]
    DeepScanUnavailable,

    #[error("{0}")]
    DeepScan(String),

    #[error("Could not write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

impl MetadataError {
    /// Clasifica un fallo de `stat` sobre la ruta de entrada.
    pub fn from_stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            MetadataError::FileNotFound { path }
        } else {
            MetadataError::Io { path, source }
        }
    }

    pub fn deep_scan(message: impl Into<String>) -> Self {
        MetadataError::DeepScan(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;
