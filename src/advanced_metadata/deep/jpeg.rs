use super::{ContainerParser, ExtractedMetadata, tiff, truncated};
use crate::advanced_metadata::bytes::{read_u8, read_u16_be};
use crate::advanced_metadata::xmp;
use crate::error::{MetadataError, Result};

const XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const ICC_SIGNATURE: &[u8] = b"ICC_PROFILE\0";

pub struct JpegParser;

impl ContainerParser for JpegParser {
    fn name(&self) -> &'static str {
        "JPEG"
    }

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        if !data.starts_with(&[0xFF, 0xD8]) {
            return Err(MetadataError::deep_scan("JPEG: missing start of image"));
        }

        let mut metadata = ExtractedMetadata::default();
        let mut offset = 2;
        while offset < data.len() {
            if data[offset] != 0xFF {
                return Err(MetadataError::deep_scan(format!(
                    "JPEG: expected marker at offset {offset}"
                )));
            }
            let marker = read_u8(data, offset + 1).ok_or_else(|| truncated("JPEG", "marker"))?;
            offset += 2;
            match marker {
                // relleno entre marcadores
                0xFF => {
                    offset -= 1;
                    continue;
                }
                0x01 | 0xD0..=0xD7 => continue,
                0xD9 | 0xDA => break,
                _ => {}
            }

            let length = read_u16_be(data, offset).ok_or_else(|| truncated("JPEG", "segment"))?
                as usize;
            let payload = length
                .checked_sub(2)
                .and_then(|size| data.get(offset + 2..offset + 2 + size))
                .ok_or_else(|| truncated("JPEG", "segment"))?;
            read_segment(&mut metadata, marker, payload);
            offset += length;
        }

        metadata.add("MIME type", "image/jpeg");
        metadata.add("Endianness", "Big endian");
        Ok(metadata)
    }
}

fn read_segment(metadata: &mut ExtractedMetadata, marker: u8, payload: &[u8]) {
    match marker {
        0xE0 if payload.starts_with(b"JFIF\0") => read_jfif(metadata, payload),
        0xE1 if payload.starts_with(b"Exif\0\0") => {
            tiff::summarize_embedded(metadata, &payload[6..]);
        }
        0xE1 if payload.starts_with(XMP_SIGNATURE) => {
            let packet = String::from_utf8_lossy(&payload[XMP_SIGNATURE.len()..]);
            if let Some(entries) = xmp::parse_packet(&packet) {
                metadata.extend(entries);
            }
        }
        0xE2 if payload.starts_with(ICC_SIGNATURE) => metadata.add("ICC profile", "Present"),
        0xEE if payload.starts_with(b"Adobe") => {
            if let Some(transform) = read_u8(payload, 11) {
                metadata.add("Adobe color transform", adobe_transform(transform));
            }
        }
        0xFE => metadata.add("Comment", String::from_utf8_lossy(payload)),
        0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
            read_frame_header(metadata, marker, payload);
        }
        _ => {}
    }
}

fn read_jfif(metadata: &mut ExtractedMetadata, payload: &[u8]) {
    let (Some(major), Some(minor)) = (read_u8(payload, 5), read_u8(payload, 6)) else {
        return;
    };
    metadata.add("Format version", format!("JFIF {major}.{minor:02}"));

    let (Some(units), Some(x_density), Some(y_density)) = (
        read_u8(payload, 7),
        read_u16_be(payload, 8),
        read_u16_be(payload, 10),
    ) else {
        return;
    };
    let to_dpi = |density: u16| match units {
        1 => Some(u32::from(density)),
        2 => Some((f64::from(density) * 2.54).round() as u32),
        _ => None,
    };
    metadata.add_opt("Horizontal resolution", to_dpi(x_density).map(|dpi| format!("{dpi} DPI")));
    metadata.add_opt("Vertical resolution", to_dpi(y_density).map(|dpi| format!("{dpi} DPI")));
}

fn read_frame_header(metadata: &mut ExtractedMetadata, marker: u8, payload: &[u8]) {
    let (Some(precision), Some(height), Some(width), Some(components)) = (
        read_u8(payload, 0),
        read_u16_be(payload, 1),
        read_u16_be(payload, 3),
        read_u8(payload, 5),
    ) else {
        return;
    };
    metadata.add("Image width", format!("{width} pixels"));
    metadata.add("Image height", format!("{height} pixels"));
    metadata.add("Bits/pixel", u32::from(precision) * u32::from(components));
    metadata.add("Pixel format", pixel_format(components));
    metadata.add("Compression", compression(marker));
}

fn compression(marker: u8) -> &'static str {
    match marker {
        0xC0 => "JPEG (Baseline)",
        0xC1 => "JPEG (Extended sequential, Huffman)",
        0xC2 => "JPEG (Progressive, Huffman)",
        0xC3 => "JPEG (Lossless, Huffman)",
        0xC5..=0xC7 => "JPEG (Differential, Huffman)",
        0xC9 => "JPEG (Extended sequential, arithmetic)",
        0xCA => "JPEG (Progressive, arithmetic)",
        0xCB => "JPEG (Lossless, arithmetic)",
        _ => "JPEG (Differential, arithmetic)",
    }
}

fn pixel_format(components: u8) -> String {
    match components {
        1 => "Grayscale".to_string(),
        3 => "YCbCr".to_string(),
        4 => "CMYK".to_string(),
        other => format!("{other} components"),
    }
}

fn adobe_transform(code: u8) -> &'static str {
    match code {
        1 => "YCbCr",
        2 => "YCCK",
        _ => "None (RGB or CMYK)",
    }
}
