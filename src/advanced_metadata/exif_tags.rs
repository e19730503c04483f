//! Decodificación de etiquetas EXIF, incluidas las coordenadas GPS.

use super::gps::{self, RationalValue};
use crate::error::{MetadataError, Result};
use crate::metadata::MetadataRecord;
use crate::metadata::mime::{may_carry_exif, mime_type};
use exif::{Context, Exif, Field, In, Reader, Tag, Value};
use log::{debug, warn};
use std::fs;
use std::io::Cursor;
use std::path::Path;

pub const GPS_COORDINATES: &str = "GPS Coordinates";
pub const CAMERA_MODEL: &str = "Camera Model";
pub const SOFTWARE: &str = "Software";

const UNKNOWN: &str = "Unknown";
const MAX_UNDEFINED_LEN: usize = 64;

/// Etiquetas EXIF decodificadas más los valores derivados de ellas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExifTagSet {
    pub tags: MetadataRecord,
    pub gps_coordinates: Option<(f64, f64)>,
    pub camera_model: Option<String>,
    pub software: Option<String>,
}

impl ExifTagSet {
    /// `true` cuando el contenido no tenía ninguna etiqueta EXIF.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }

    /// Etiquetas en orden, seguidas de `GPS Coordinates` (si se pudo derivar),
    /// `Camera Model` y `Software` (con `Unknown` por defecto).
    pub fn into_entries(self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self.tags.into_iter().collect();
        if let Some((latitude, longitude)) = self.gps_coordinates {
            entries.push((
                GPS_COORDINATES.to_string(),
                format!("{latitude}, {longitude}"),
            ));
        }
        entries.push((
            CAMERA_MODEL.to_string(),
            self.camera_model.unwrap_or_else(|| UNKNOWN.to_string()),
        ));
        entries.push((
            SOFTWARE.to_string(),
            self.software.unwrap_or_else(|| UNKNOWN.to_string()),
        ));
        entries
    }
}

pub fn decode_path(path: &Path) -> Result<ExifTagSet> {
    let bytes = fs::read(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes)
}

/// Decodifica el segmento EXIF de `bytes`.
///
/// Un contenido sin EXIF (o un formato que no lo admite) da un conjunto
/// vacío; solo una estructura EXIF dañada produce error.
pub fn decode(bytes: &[u8]) -> Result<ExifTagSet> {
    match mime_type(bytes) {
        Some(mime) if may_carry_exif(mime) => {}
        other => {
            debug!("Sin contenedor EXIF reconocible ({other:?})");
            return Ok(ExifTagSet::default());
        }
    }

    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            debug!("El contenedor no tiene segmento EXIF");
            return Ok(ExifTagSet::default());
        }
        Err(error) => return Err(error.into()),
    };

    let mut set = ExifTagSet::default();
    for field in exif.fields() {
        set.tags
            .insert(qualified_name(field), render_value(field, &exif));
    }

    set.gps_coordinates = match gps_coordinates(&exif) {
        Ok(coordinates) => coordinates,
        Err(error) => {
            warn!("Coordenadas GPS descartadas: {error}");
            None
        }
    };
    set.camera_model = set.tags.get("Image Model").map(str::to_string);
    set.software = set.tags.get("Image Software").map(str::to_string);

    debug!("{} etiquetas EXIF decodificadas", set.tags.len());
    Ok(set)
}

/// `"<IFD> <Etiqueta>"`, por ejemplo `"GPS GPSLatitude"` o `"Image Model"`.
fn qualified_name(field: &Field) -> String {
    let ifd = match field.tag.context() {
        Context::Exif => "EXIF",
        Context::Gps => "GPS",
        Context::Interop => "Interoperability",
        _ if field.ifd_num == In::THUMBNAIL => "Thumbnail",
        _ => "Image",
    };

    if field.tag.description().is_some() {
        format!("{ifd} {}", field.tag)
    } else {
        format!("{ifd} Tag 0x{:04X}", field.tag.number())
    }
}

pub(crate) fn render_value(field: &Field, exif: &Exif) -> String {
    match &field.value {
        Value::Ascii(lines) => lines
            .iter()
            .map(|line| {
                String::from_utf8_lossy(line)
                    .trim_end_matches('\0')
                    .trim()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Undefined(bytes, _) if bytes.len() > MAX_UNDEFINED_LEN => {
            format!("[{} bytes]", bytes.len())
        }
        _ => field.display_value().with_unit(exif).to_string(),
    }
}

/// `Ok(None)` si falta alguna de las cuatro etiquetas GPS.
fn gps_coordinates(exif: &Exif) -> Result<Option<(f64, f64)>> {
    let (Some(latitude), Some(longitude), Some(latitude_ref), Some(longitude_ref)) = (
        exif.get_field(Tag::GPSLatitude, In::PRIMARY),
        exif.get_field(Tag::GPSLongitude, In::PRIMARY),
        exif.get_field(Tag::GPSLatitudeRef, In::PRIMARY),
        exif.get_field(Tag::GPSLongitudeRef, In::PRIMARY),
    ) else {
        return Ok(None);
    };

    let latitude = gps::convert(&rationals(latitude), &render_value(latitude_ref, exif))?;
    let longitude = gps::convert(&rationals(longitude), &render_value(longitude_ref, exif))?;
    Ok(Some((latitude, longitude)))
}

fn rationals(field: &Field) -> Vec<RationalValue> {
    match &field.value {
        Value::Rational(values) => values.iter().copied().map(RationalValue::from).collect(),
        _ => Vec::new(),
    }
}
