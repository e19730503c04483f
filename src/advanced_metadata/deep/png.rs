use super::{ContainerParser, ExtractedMetadata};
use crate::advanced_metadata::bytes::{read_fourcc, read_u32_be};
use crate::advanced_metadata::xmp;
use crate::error::{MetadataError, Result};
use png::{BitDepth, ColorType, Unit};
use std::io::Cursor;

const SIGNATURE_LEN: usize = 8;
const XMP_KEYWORD: &str = "XML:com.adobe.xmp";

pub struct PngParser;

impl ContainerParser for PngParser {
    fn name(&self) -> &'static str {
        "PNG"
    }

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_ignore_text_chunk(false);
        let reader = decoder
            .read_info()
            .map_err(|error| MetadataError::deep_scan(format!("PNG: {error}")))?;
        let info = reader.info();

        let mut metadata = ExtractedMetadata::default();
        metadata.add("Image width", format!("{} pixels", info.width));
        metadata.add("Image height", format!("{} pixels", info.height));
        metadata.add(
            "Bits/pixel",
            bit_depth(info.bit_depth) * info.color_type.samples() as u32,
        );
        metadata.add("Pixel format", pixel_format(info.color_type));
        metadata.add("Interlaced", if info.interlaced { "Yes" } else { "No" });
        metadata.add("Compression", "deflate");

        if let Some(dims) = info.pixel_dims
            && dims.unit == Unit::Meter
        {
            metadata.add("Horizontal resolution", format!("{} DPI", dpi(dims.xppu)));
            metadata.add("Vertical resolution", format!("{} DPI", dpi(dims.yppu)));
        }
        if let Some(profile) = &info.icc_profile {
            metadata.add("ICC profile", format!("Present ({} bytes)", profile.len()));
        }

        let chunks = chunk_names(data);
        if let Some(gamma) = gamma(data) {
            metadata.add("Gamma", format!("{gamma:.5}"));
        }

        for chunk in &info.uncompressed_latin1_text {
            add_text(&mut metadata, &chunk.keyword, &chunk.text);
        }
        for chunk in &info.compressed_latin1_text {
            if let Ok(text) = chunk.get_text() {
                add_text(&mut metadata, &chunk.keyword, &text);
            }
        }
        for chunk in &info.utf8_text {
            if let Ok(text) = chunk.get_text() {
                add_text(&mut metadata, &chunk.keyword, &text);
            }
        }

        if !chunks.is_empty() {
            metadata.add("Chunks", chunks.join(", "));
        }
        metadata.add("MIME type", "image/png");
        metadata.add("Endianness", "Big endian");
        Ok(metadata)
    }
}

fn add_text(metadata: &mut ExtractedMetadata, keyword: &str, text: &str) {
    if keyword == XMP_KEYWORD {
        if let Some(entries) = xmp::parse_packet(text) {
            metadata.extend(entries);
        }
        return;
    }
    let key = match keyword {
        "Title" => "Title",
        "Author" => "Author",
        "Description" | "Comment" => "Comment",
        "Copyright" => "Copyright",
        "Creation Time" => "Creation date",
        "Software" => "Producer",
        "Disclaimer" => "Disclaimer",
        "Warning" => "Warning",
        "Source" => "Camera model",
        other => other,
    };
    metadata.add(key, text);
}

fn bit_depth(depth: BitDepth) -> u32 {
    match depth {
        BitDepth::One => 1,
        BitDepth::Two => 2,
        BitDepth::Four => 4,
        BitDepth::Eight => 8,
        BitDepth::Sixteen => 16,
    }
}

fn pixel_format(color: ColorType) -> &'static str {
    match color {
        ColorType::Grayscale => "Grayscale",
        ColorType::GrayscaleAlpha => "Grayscale with alpha",
        ColorType::Rgb => "RGB",
        ColorType::Rgba => "RGBA",
        ColorType::Indexed => "Color palette",
    }
}

fn dpi(pixels_per_meter: u32) -> u32 {
    (f64::from(pixels_per_meter) * 0.0254).round() as u32
}

/// Nombres de todos los chunks en orden, sin interpretar su contenido.
fn chunk_names(data: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut offset = SIGNATURE_LEN;
    while let (Some(length), Some(kind)) = (read_u32_be(data, offset), read_fourcc(data, offset + 4)) {
        names.push(kind.clone());
        if kind == "IEND" {
            break;
        }
        let Some(next) = offset.checked_add(12 + length as usize) else {
            break;
        };
        offset = next;
    }
    names
}

fn gamma(data: &[u8]) -> Option<f64> {
    let mut offset = SIGNATURE_LEN;
    while let Some(length) = read_u32_be(data, offset) {
        match data.get(offset + 4..offset + 8)? {
            b"gAMA" => return read_u32_be(data, offset + 8).map(|value| f64::from(value) / 100_000.0),
            b"IDAT" | b"IEND" => return None,
            _ => offset = offset.checked_add(12 + length as usize)?,
        }
    }
    None
}
