//! imglens: extracción de metadata de imágenes.
//!
//! Combina atributos del sistema de archivos, la cabecera del contenedor, las
//! etiquetas EXIF (con coordenadas GPS) y un escaneo profundo de metadata
//! oculta en un único registro ordenado, exportable como reporte.

pub mod advanced_metadata;
pub mod app;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod metadata;

#[cfg(test)]
mod test_support;

pub use error::{MetadataError, Result};
pub use metadata::{ExtractOptions, MergePolicy, MetadataRecord, extract, extract_with};

pub const APP_NAME: &str = "Image Metadata Extractor";
pub const PUBLISHER: &str = "SrJ Solutions";
