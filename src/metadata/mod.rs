//! Registro de metadata, etapas de sistema de archivos y exportación del reporte.

pub mod export;
mod extractor;
pub mod filesystem;
pub mod mime;
mod options;
mod record;

#[cfg(test)]
mod tests;

pub use export::{DEFAULT_REPORT_NAME, ExportFormat, parse_export_format, write_report};
pub use extractor::{EXIF_ERROR, Stage, extract, extract_with};
pub use options::{ExtractOptions, MergePolicy};
pub use record::MetadataRecord;
