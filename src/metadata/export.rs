//! Exportación del registro de metadata a disco.

use super::MetadataRecord;
use crate::error::{MetadataError, Result};
use log::info;
use std::fs;
use std::path::Path;

/// Nombre del reporte cuando no se indica otro.
pub const DEFAULT_REPORT_NAME: &str = "metadata.txt";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExportFormat {
    #[default]
    Txt,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Txt => "TXT",
            ExportFormat::Json => "JSON",
        }
    }
}

pub fn parse_export_format(input: &str) -> Result<ExportFormat> {
    match input.to_lowercase().as_str() {
        "txt" | "text" => Ok(ExportFormat::Txt),
        "json" => Ok(ExportFormat::Json),
        other => Err(MetadataError::Usage(format!(
            "Formato de exportación no reconocido: `{other}`"
        ))),
    }
}

/// Una línea `Clave: Valor` por entrada, en el orden del registro.
pub fn render_text(record: &MetadataRecord) -> String {
    let mut output = String::new();
    for (key, value) in record.iter() {
        output.push_str(key);
        output.push_str(": ");
        output.push_str(value);
        output.push('\n');
    }
    output
}

pub fn render_json(record: &MetadataRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Escribe (o reemplaza) el reporte en `path`.
pub fn write_report(record: &MetadataRecord, path: &Path, format: ExportFormat) -> Result<()> {
    let contents = match format {
        ExportFormat::Txt => render_text(record),
        ExportFormat::Json => render_json(record)?,
    };
    fs::write(path, contents).map_err(|source| MetadataError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Reporte {} guardado en `{}` ({} entradas)",
        format.label(),
        path.display(),
        record.len()
    );
    Ok(())
}
