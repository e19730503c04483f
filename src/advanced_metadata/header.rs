//! Campos de cabecera del contenedor (formato, modo, dimensiones, ...) leídos
//! con el decodificador de `image`.

use super::bytes::read_u32_le;
use crate::error::{MetadataError, Result};
use exif::{In, Tag};
use image::{ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

pub const DECODE_ERROR: &str = "Decode Error";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerAttributes {
    pub format: String,
    pub mode: String,
    pub width: u32,
    pub height: u32,
    /// Bits por canal; `None` cuando el decodificador no lo conoce.
    pub bit_depth: Option<u8>,
    /// Identificador de compresión declarado en la cabecera, si el formato lo tiene.
    pub compression: Option<String>,
    pub icc_profile: bool,
}

impl ContainerAttributes {
    pub fn to_entries(&self) -> Vec<(String, String)> {
        vec![
            ("Format".to_string(), self.format.clone()),
            ("Mode".to_string(), self.mode.clone()),
            (
                "Size (pixels)".to_string(),
                format!("{}x{}", self.width, self.height),
            ),
            (
                "Bit Depth".to_string(),
                self.bit_depth
                    .map(|depth| depth.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            (
                "Compression".to_string(),
                self.compression.clone().unwrap_or_else(|| "None".to_string()),
            ),
            (
                "ICC Profile".to_string(),
                if self.icc_profile { "Present" } else { "None" }.to_string(),
            ),
        ]
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HeaderOutcome {
    Attributes(ContainerAttributes),
    DecodeError(String),
}

impl HeaderOutcome {
    pub fn into_entries(self) -> Vec<(String, String)> {
        match self {
            HeaderOutcome::Attributes(attributes) => attributes.to_entries(),
            HeaderOutcome::DecodeError(message) => vec![(DECODE_ERROR.to_string(), message)],
        }
    }
}

/// Nunca falla: un error de decodificación se devuelve como [`HeaderOutcome::DecodeError`].
pub fn read_header(path: &Path) -> HeaderOutcome {
    match try_read_header(path) {
        Ok(attributes) => {
            debug!("Cabecera leída: {} {}x{}", attributes.format, attributes.width, attributes.height);
            HeaderOutcome::Attributes(attributes)
        }
        Err(error) => {
            warn!("No se pudo decodificar la cabecera de `{}`: {error}", path.display());
            HeaderOutcome::DecodeError(error.to_string())
        }
    }
}

fn try_read_header(path: &Path) -> Result<ContainerAttributes> {
    let io_error = |source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?;
    let format = reader.format();
    let mut decoder = reader.into_decoder()?;

    let (width, height) = decoder.dimensions();
    let color = decoder.original_color_type();
    let icc_profile = decoder
        .icc_profile()
        .ok()
        .flatten()
        .is_some_and(|profile| !profile.is_empty());

    Ok(ContainerAttributes {
        format: format
            .map(format_name)
            .unwrap_or_else(|| "Unknown".to_string()),
        mode: color_mode(color),
        width,
        height,
        bit_depth: bit_depth(color),
        compression: format.and_then(|format| header_compression(path, format)),
        icc_profile,
    })
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Ico => "ICO".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

/// Modo de píxel con la nomenclatura habitual (`1`, `L`, `LA`, `RGB`, `RGBA`, `I;16`).
fn color_mode(color: ExtendedColorType) -> String {
    use ExtendedColorType::*;

    let mode = match color {
        L1 => "1",
        L2 | L4 | L8 => "L",
        L16 => "I;16",
        La1 | La2 | La4 | La8 | La16 => "LA",
        Rgb1 | Rgb2 | Rgb4 | Rgb8 | Rgb16 | Bgr8 | Rgb32F => "RGB",
        Rgba1 | Rgba2 | Rgba4 | Rgba8 | Rgba16 | Bgra8 | Rgba32F => "RGBA",
        other => return format!("{other:?}"),
    };
    mode.to_string()
}

fn bit_depth(color: ExtendedColorType) -> Option<u8> {
    use ExtendedColorType::*;

    match color {
        L1 | La1 | Rgb1 | Rgba1 => Some(1),
        L2 | La2 | Rgb2 | Rgba2 => Some(2),
        L4 | La4 | Rgb4 | Rgba4 => Some(4),
        L8 | La8 | Rgb8 | Rgba8 | Bgr8 | Bgra8 => Some(8),
        L16 | La16 | Rgb16 | Rgba16 => Some(16),
        Rgb32F | Rgba32F => Some(32),
        _ => None,
    }
}

fn header_compression(path: &Path, format: ImageFormat) -> Option<String> {
    match format {
        ImageFormat::Tiff => tiff_compression(path),
        ImageFormat::Bmp => bmp_compression(path),
        _ => None,
    }
}

fn tiff_compression(path: &Path) -> Option<String> {
    let data = fs::read(path).ok()?;
    let exif = exif::Reader::new().read_raw(data).ok()?;
    let code = exif
        .get_field(Tag::Compression, In::PRIMARY)?
        .value
        .get_uint(0)?;
    Some(tiff_compression_name(code))
}

fn bmp_compression(path: &Path) -> Option<String> {
    let mut header = [0_u8; 34];
    File::open(path).ok()?.read_exact(&mut header).ok()?;
    bmp_compression_from_header(&header)
}

pub(crate) fn bmp_compression_from_header(header: &[u8]) -> Option<String> {
    // BITMAPCOREHEADER (12 bytes) no declara compresión.
    if read_u32_le(header, 14)? < 40 {
        return None;
    }
    Some(bmp_compression_name(read_u32_le(header, 30)?))
}

pub(crate) fn bmp_compression_name(code: u32) -> String {
    match code {
        0 => "raw".to_string(),
        1 => "bmp_rle8".to_string(),
        2 => "bmp_rle4".to_string(),
        3 => "bitfields".to_string(),
        4 => "jpeg".to_string(),
        5 => "png".to_string(),
        6 => "alpha_bitfields".to_string(),
        other => format!("unknown ({other})"),
    }
}

pub(crate) fn tiff_compression_name(code: u32) -> String {
    let name = match code {
        1 => "raw",
        2 => "tiff_ccitt",
        3 => "group3",
        4 => "group4",
        5 => "tiff_lzw",
        6 => "tiff_jpeg",
        7 => "jpeg",
        8 => "tiff_adobe_deflate",
        32771 => "tiff_raw_16",
        32773 => "packbits",
        32809 => "tiff_thunderscan",
        32946 => "tiff_deflate",
        34676 => "tiff_sgilog",
        34677 => "tiff_sgilog24",
        34925 => "lzma",
        50000 => "zstd",
        50001 => "webp",
        other => return format!("unknown ({other})"),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::encoded_image;
    use tempfile::tempdir;

    fn write_fixture(name: &str, bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_png_header() {
        let (_dir, path) = write_fixture("tiny.png", &encoded_image(4, 3, ImageFormat::Png));
        let HeaderOutcome::Attributes(attributes) = read_header(&path) else {
            panic!("el PNG debería decodificarse");
        };

        assert_eq!(attributes.format, "PNG");
        assert_eq!(attributes.mode, "RGB");
        assert_eq!((attributes.width, attributes.height), (4, 3));
        assert_eq!(attributes.bit_depth, Some(8));
        assert_eq!(attributes.compression, None);
        assert!(!attributes.icc_profile);

        let entries = attributes.to_entries();
        assert_eq!(
            entries,
            vec![
                ("Format".to_string(), "PNG".to_string()),
                ("Mode".to_string(), "RGB".to_string()),
                ("Size (pixels)".to_string(), "4x3".to_string()),
                ("Bit Depth".to_string(), "8".to_string()),
                ("Compression".to_string(), "None".to_string()),
                ("ICC Profile".to_string(), "None".to_string()),
            ]
        );
    }

    #[test]
    fn bmp_reports_header_compression() {
        let (_dir, path) = write_fixture("tiny.bmp", &encoded_image(5, 2, ImageFormat::Bmp));
        let HeaderOutcome::Attributes(attributes) = read_header(&path) else {
            panic!("el BMP debería decodificarse");
        };
        assert_eq!(attributes.format, "BMP");
        assert_eq!((attributes.width, attributes.height), (5, 2));
        assert_eq!(attributes.compression.as_deref(), Some("raw"));
    }

    #[test]
    fn tiff_reports_compression_tag() {
        let (_dir, path) = write_fixture("tiny.tif", &encoded_image(3, 3, ImageFormat::Tiff));
        let HeaderOutcome::Attributes(attributes) = read_header(&path) else {
            panic!("el TIFF debería decodificarse");
        };
        assert_eq!(attributes.format, "TIFF");
        assert_eq!(attributes.compression.as_deref(), Some("raw"));
    }

    #[test]
    fn undecodable_content_degrades_to_error_entry() {
        let (_dir, path) = write_fixture("broken.png", b"definitely not an image");
        let entries = read_header(&path).into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, DECODE_ERROR);
        assert!(!entries[0].1.is_empty());
    }

    #[test]
    fn missing_depth_and_compression_use_defaults() {
        let attributes = ContainerAttributes {
            format: "HEIF".to_string(),
            mode: "RGB".to_string(),
            width: 1,
            height: 1,
            bit_depth: None,
            compression: None,
            icc_profile: true,
        };
        let entries = attributes.to_entries();
        assert_eq!(entries[3].1, "Unknown");
        assert_eq!(entries[4].1, "None");
        assert_eq!(entries[5].1, "Present");
    }

    #[test]
    fn compression_names() {
        assert_eq!(tiff_compression_name(5), "tiff_lzw");
        assert_eq!(tiff_compression_name(9999), "unknown (9999)");
        assert_eq!(bmp_compression_name(1), "bmp_rle8");
    }
}
