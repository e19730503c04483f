//! Atributos del sistema de archivos que abren cada registro.

use crate::error::{MetadataError, Result};
use crate::formatting::format_optional_time;
use std::fs::{self, Metadata};
use std::path::Path;
use std::time::SystemTime;

pub const FILE_NAME: &str = "File Name";
pub const FILE_SIZE: &str = "File Size (bytes)";
pub const CREATION_TIME: &str = "Creation Time";
pub const MODIFICATION_TIME: &str = "Modification Time";

/// Lee nombre, tamaño y fechas. Es el único paso cuyo fallo aborta la extracción.
pub fn file_attributes(path: &Path) -> Result<Vec<(String, String)>> {
    let metadata = fs::metadata(path).map_err(|error| MetadataError::from_stat(path, error))?;

    if metadata.is_dir() {
        return Err(MetadataError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other("the path is a directory, not a file"),
        });
    }

    let name = path
        .file_name()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(vec![
        (FILE_NAME.to_string(), name),
        (FILE_SIZE.to_string(), metadata.len().to_string()),
        (
            CREATION_TIME.to_string(),
            format_optional_time(creation_time(&metadata)),
        ),
        (
            MODIFICATION_TIME.to_string(),
            format_optional_time(metadata.modified().ok()),
        ),
    ])
}

/// Fecha de creación; en Unix, si el sistema de archivos no expone `btime`,
/// se usa el último cambio de inodo.
fn creation_time(metadata: &Metadata) -> Option<SystemTime> {
    metadata
        .created()
        .ok()
        .or_else(|| inode_change_time(metadata))
}

#[cfg(unix)]
fn inode_change_time(metadata: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let seconds = u64::try_from(metadata.ctime()).ok()?;
    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    UNIX_EPOCH.checked_add(Duration::new(seconds, nanos))
}

#[cfg(not(unix))]
fn inode_change_time(_metadata: &Metadata) -> Option<SystemTime> {
    None
}
