//! Opciones de extracción.

use serde::{Deserialize, Serialize};

/// Qué hacer cuando una etapa posterior escribe una clave ya presente.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// La última etapa gana y el valor anterior se pierde.
    #[default]
    Overwrite,
    /// La última etapa gana, pero el valor anterior se guarda como
    /// `"<Clave> (<etapa>)"`.
    KeepShadowed,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Extensiones (sin punto, comparadas sin distinguir mayúsculas) para las
    /// que no se intenta decodificar EXIF.
    pub skip_exif_extensions: Vec<String>,
    pub deep_scan: bool,
    pub merge: MergePolicy,
}

impl ExtractOptions {
    /// Extensión de la lista que termina el nombre de archivo, si hay alguna.
    ///
    /// Compara el sufijo `.{extensión}` del nombre en minúsculas, así que un
    /// archivo llamado solo `.heic` también cuenta.
    pub fn skipped_exif_extension(&self, file_name: &str) -> Option<&str> {
        let name = file_name.to_lowercase();
        self.skip_exif_extensions
            .iter()
            .map(String::as_str)
            .find(|skipped| name.ends_with(&format!(".{}", skipped.to_lowercase())))
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            skip_exif_extensions: vec!["heic".to_string()],
            deep_scan: true,
            merge: MergePolicy::Overwrite,
        }
    }
}
