//! Orquesta las etapas de extracción y combina sus entradas en un registro.

use super::filesystem::file_attributes;
use super::options::{ExtractOptions, MergePolicy};
use super::record::MetadataRecord;
use crate::advanced_metadata::{exif_tags, read_header, scan_deep};
use crate::error::Result;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

pub const EXIF_ERROR: &str = "EXIF Error";

/// Etapa que aportó una entrada al registro.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Filesystem,
    Header,
    Exif,
    DeepScan,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Filesystem => "filesystem",
            Stage::Header => "header",
            Stage::Exif => "exif",
            Stage::DeepScan => "deep scan",
        }
    }
}

pub fn extract(path: &Path) -> Result<MetadataRecord> {
    extract_with(path, &ExtractOptions::default())
}

/// Ejecuta sistema de archivos, cabecera, EXIF y escaneo profundo en ese orden.
///
/// Solo la lectura de atributos del sistema de archivos puede fallar; las
/// demás etapas degradan a entradas de error dentro del registro.
pub fn extract_with(path: &Path, options: &ExtractOptions) -> Result<MetadataRecord> {
    let mut merger = Merger::new(options.merge);
    merger.merge(Stage::Filesystem, file_attributes(path)?);
    merger.merge(Stage::Header, read_header(path).into_entries());

    match skipped_extension(path, options) {
        Some(extension) => debug!("EXIF omitido para la extensión `{extension}`"),
        None => merger.merge(Stage::Exif, exif_entries(path)),
    }

    if options.deep_scan {
        merger.merge(Stage::DeepScan, scan_deep(path));
    } else {
        debug!("Escaneo profundo desactivado");
    }

    let record = merger.finish();
    debug!("`{}`: {} entradas", path.display(), record.len());
    Ok(record)
}

fn skipped_extension<'a>(path: &Path, options: &'a ExtractOptions) -> Option<&'a str> {
    let name = path.file_name()?.to_string_lossy();
    options.skipped_exif_extension(&name)
}

fn exif_entries(path: &Path) -> Vec<(String, String)> {
    match exif_tags::decode_path(path) {
        Ok(set) => set.into_entries(),
        Err(error) => {
            warn!("EXIF no legible en `{}`: {error}", path.display());
            vec![(EXIF_ERROR.to_string(), error.to_string())]
        }
    }
}

/// Aplica la política de fusión recordando qué etapa escribió cada clave.
struct Merger {
    record: MetadataRecord,
    origins: HashMap<String, Stage>,
    policy: MergePolicy,
}

impl Merger {
    fn new(policy: MergePolicy) -> Self {
        Self {
            record: MetadataRecord::new(),
            origins: HashMap::new(),
            policy,
        }
    }

    fn merge(&mut self, stage: Stage, entries: impl IntoIterator<Item = (String, String)>) {
        let mut count = 0;
        for (key, value) in entries {
            count += 1;
            let previous = self.record.insert(key.clone(), value.clone());
            if self.policy == MergePolicy::KeepShadowed
                && let Some(previous) = previous
                && previous != value
                && let Some(origin) = self.origins.get(&key).copied()
            {
                self.record
                    .insert(format!("{key} ({})", origin.label()), previous);
            }
            self.origins.insert(key, stage);
        }
        debug!("Etapa {}: {count} entradas", stage.label());
    }

    fn finish(self) -> MetadataRecord {
        self.record
    }
}
