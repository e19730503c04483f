//! Escaneo profundo de metadata sobre los bytes crudos del contenedor.
//!
//! Cada formato tiene su propio recorrido binario; todos exportan líneas
//! `Clave: Valor` que se aplanan en pares. El escaneo nunca falla hacia
//! afuera: la ausencia de parser y los errores se convierten en una entrada.

mod bmp;
mod gif;
mod isobmff;
mod jpeg;
mod plaintext;
mod png;
mod riff;
mod tiff;

pub use plaintext::ExtractedMetadata;

use crate::error::{MetadataError, Result};
use crate::metadata::MetadataRecord;
use crate::metadata::mime::mime_type;
use log::{debug, warn};
use std::fs;
use std::path::Path;

pub const HIDDEN_METADATA: &str = "Hidden Metadata";
pub const UNABLE_TO_PARSE: &str = "Unable to parse";
pub const HIDDEN_METADATA_ERROR: &str = "Hidden Metadata Error";

const UNKNOWN_VALUE: &str = "Unknown";

/// Un lector de metadata para una familia de contenedores.
pub trait ContainerParser {
    fn name(&self) -> &'static str;

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata>;
}

pub fn scan_deep(path: &Path) -> Vec<(String, String)> {
    let outcome = fs::read(path)
        .map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|data| scan_bytes(&data));

    match outcome {
        Ok(record) => {
            debug!("Escaneo profundo: {} entradas", record.len());
            record.into_iter().collect()
        }
        Err(MetadataError::DeepScanUnavailable) => {
            debug!("Sin parser para `{}`", path.display());
            vec![(HIDDEN_METADATA.to_string(), UNABLE_TO_PARSE.to_string())]
        }
        Err(error) => {
            warn!("Escaneo profundo fallido para `{}`: {error}", path.display());
            vec![(HIDDEN_METADATA_ERROR.to_string(), error.to_string())]
        }
    }
}

/// Ejecuta el parser adecuado y agrupa sus líneas (la última clave gana).
pub fn scan_bytes(data: &[u8]) -> Result<MetadataRecord> {
    let parser = create_parser(data).ok_or(MetadataError::DeepScanUnavailable)?;
    debug!("Escaneo profundo con el parser {}", parser.name());

    let metadata = parser.extract(data)?;
    Ok(metadata
        .export_plaintext()
        .iter()
        .map(|line| split_line(line))
        .collect())
}

/// Separa en el primer `": "`; una línea sin separador queda con valor `Unknown`.
pub fn split_line(line: &str) -> (String, String) {
    match line.split_once(": ") {
        Some((key, value)) => (key.to_string(), value.to_string()),
        None => (line.to_string(), UNKNOWN_VALUE.to_string()),
    }
}

pub fn create_parser(data: &[u8]) -> Option<Box<dyn ContainerParser>> {
    let parser: Box<dyn ContainerParser> = match mime_type(data) {
        Some("image/png") => Box::new(png::PngParser),
        Some("image/jpeg") => Box::new(jpeg::JpegParser),
        Some("image/gif") => Box::new(gif::GifParser),
        Some("image/bmp") => Box::new(bmp::BmpParser),
        Some("image/tiff" | "image/x-canon-cr2") => Box::new(tiff::TiffParser),
        Some("image/webp" | "audio/x-wav" | "video/x-msvideo") => Box::new(riff::RiffParser),
        Some(
            "image/heif" | "image/heif-sequence" | "image/heic" | "image/heic-sequence"
            | "image/avif" | "video/mp4" | "video/quicktime" | "audio/m4a",
        ) => Box::new(isobmff::IsoBmffParser),
        _ => return sniff_magic(data),
    };
    Some(parser)
}

fn sniff_magic(data: &[u8]) -> Option<Box<dyn ContainerParser>> {
    if data.len() >= 12 && data.starts_with(b"RIFF") {
        return Some(Box::new(riff::RiffParser));
    }
    if data.get(4..8) == Some(b"ftyp".as_slice()) {
        return Some(Box::new(isobmff::IsoBmffParser));
    }
    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        return Some(Box::new(tiff::TiffParser));
    }
    None
}

/// Error de parser con el nombre del formato como prefijo.
pub(crate) fn truncated(format: &str, what: &str) -> MetadataError {
    MetadataError::deep_scan(format!("{format}: truncated {what}"))
}
