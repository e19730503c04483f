use super::{ContainerParser, ExtractedMetadata};
use crate::advanced_metadata::exif_tags::render_value;
use crate::advanced_metadata::header::tiff_compression_name;
use crate::error::{MetadataError, Result};
use exif::{Exif, In, Tag};

/// Etiquetas TIFF/EXIF que se resumen con nombres legibles.
const SUMMARY_TAGS: &[(Tag, &str)] = &[
    (Tag::Make, "Camera manufacturer"),
    (Tag::Model, "Camera model"),
    (Tag::Software, "Producer"),
    (Tag::Artist, "Author"),
    (Tag::Copyright, "Copyright"),
    (Tag::ImageDescription, "Description"),
    (Tag::DateTime, "Creation date"),
    (Tag::DateTimeOriginal, "Date-time original"),
    (Tag::Orientation, "Image orientation"),
    (Tag::ExposureTime, "Camera exposure"),
    (Tag::FNumber, "Camera aperture"),
    (Tag::FocalLength, "Camera focal"),
    (Tag::PhotographicSensitivity, "ISO speed rating"),
];

pub struct TiffParser;

impl ContainerParser for TiffParser {
    fn name(&self) -> &'static str {
        "TIFF"
    }

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        let endianness = match data.get(..2) {
            Some(b"II") => "Little endian",
            Some(b"MM") => "Big endian",
            _ => return Err(MetadataError::deep_scan("TIFF: invalid byte order mark")),
        };
        let exif = exif::Reader::new()
            .read_raw(data.to_vec())
            .map_err(|error| MetadataError::deep_scan(format!("TIFF: {error}")))?;

        let mut metadata = ExtractedMetadata::default();
        metadata.add_opt(
            "Image width",
            primary_uint(&exif, Tag::ImageWidth).map(|width| format!("{width} pixels")),
        );
        metadata.add_opt(
            "Image height",
            primary_uint(&exif, Tag::ImageLength).map(|height| format!("{height} pixels")),
        );
        metadata.add_opt("Bits/pixel", bits_per_pixel(&exif));
        metadata.add_opt(
            "Pixel format",
            primary_uint(&exif, Tag::PhotometricInterpretation).map(photometric_name),
        );
        metadata.add_opt(
            "Compression",
            primary_uint(&exif, Tag::Compression).map(tiff_compression_name),
        );
        summarize_exif(&mut metadata, &exif);
        metadata.add("MIME type", "image/tiff");
        metadata.add("Endianness", endianness);
        Ok(metadata)
    }
}

/// Resume las etiquetas más reveladoras de un bloque EXIF ya decodificado.
pub(super) fn summarize_exif(metadata: &mut ExtractedMetadata, exif: &Exif) {
    for &(tag, label) in SUMMARY_TAGS {
        if let Some(field) = exif.get_field(tag, In::PRIMARY) {
            metadata.add(label, render_value(field, exif));
        }
    }
    if exif.get_field(Tag::GPSLatitude, In::PRIMARY).is_some() {
        metadata.add("Location", "GPS position embedded");
    }
}

/// Lee un bloque TIFF embebido (APP1 de JPEG, chunk `EXIF` de WebP).
pub(super) fn summarize_embedded(metadata: &mut ExtractedMetadata, tiff: &[u8]) {
    let tiff = tiff.strip_prefix(b"Exif\0\0").unwrap_or(tiff);
    match exif::Reader::new().read_raw(tiff.to_vec()) {
        Ok(exif) => summarize_exif(metadata, &exif),
        Err(error) => metadata.add("EXIF", format!("Unreadable ({error})")),
    }
}

fn primary_uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

fn bits_per_pixel(exif: &Exif) -> Option<u32> {
    let field = exif.get_field(Tag::BitsPerSample, In::PRIMARY)?;
    let mut total = 0;
    let mut index = 0;
    while let Some(bits) = field.value.get_uint(index) {
        total += bits;
        index += 1;
    }
    (index > 0).then_some(total)
}

fn photometric_name(code: u32) -> String {
    let name = match code {
        0 => "WhiteIsZero",
        1 => "BlackIsZero",
        2 => "RGB",
        3 => "Palette",
        4 => "Transparency mask",
        5 => "CMYK",
        6 => "YCbCr",
        8 => "CIELab",
        other => return format!("Unknown ({other})"),
    };
    name.to_string()
}
