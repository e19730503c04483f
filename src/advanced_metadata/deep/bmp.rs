use super::{ContainerParser, ExtractedMetadata, truncated};
use crate::advanced_metadata::bytes::{read_i32_le, read_u16_le, read_u32_le};
use crate::advanced_metadata::header::bmp_compression_name;
use crate::error::{MetadataError, Result};

pub struct BmpParser;

impl ContainerParser for BmpParser {
    fn name(&self) -> &'static str {
        "BMP"
    }

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        if !data.starts_with(b"BM") {
            return Err(MetadataError::deep_scan("BMP: missing signature"));
        }
        let header_size = read_u32_le(data, 14).ok_or_else(|| truncated("BMP", "header"))?;

        let mut metadata = ExtractedMetadata::default();
        metadata.add("Format version", header_version(header_size));

        if header_size == 12 {
            let (Some(width), Some(height), Some(bpp)) = (
                read_u16_le(data, 18),
                read_u16_le(data, 20),
                read_u16_le(data, 24),
            ) else {
                return Err(truncated("BMP", "core header"));
            };
            metadata.add("Image width", format!("{width} pixels"));
            metadata.add("Image height", format!("{height} pixels"));
            metadata.add("Bits/pixel", bpp);
            add_palette(&mut metadata, bpp, 0);
        } else {
            let (Some(width), Some(height), Some(bpp), Some(compression)) = (
                read_i32_le(data, 18),
                read_i32_le(data, 22),
                read_u16_le(data, 28),
                read_u32_le(data, 30),
            ) else {
                return Err(truncated("BMP", "info header"));
            };
            metadata.add("Image width", format!("{} pixels", width.unsigned_abs()));
            metadata.add("Image height", format!("{} pixels", height.unsigned_abs()));
            if height < 0 {
                metadata.add("Row order", "Top-down");
            }
            metadata.add("Bits/pixel", bpp);
            metadata.add("Compression", bmp_compression_name(compression));

            if let (Some(x_ppm), Some(y_ppm)) = (read_i32_le(data, 38), read_i32_le(data, 42))
                && x_ppm > 0
                && y_ppm > 0
            {
                metadata.add("Horizontal resolution", format!("{} DPI", dpi(x_ppm)));
                metadata.add("Vertical resolution", format!("{} DPI", dpi(y_ppm)));
            }
            add_palette(&mut metadata, bpp, read_u32_le(data, 46).unwrap_or(0));
        }

        metadata.add("MIME type", "image/bmp");
        metadata.add("Endianness", "Little endian");
        Ok(metadata)
    }
}

fn header_version(header_size: u32) -> String {
    match header_size {
        12 => "OS/2 BMP (v1)".to_string(),
        40 => "Windows BMP (v3)".to_string(),
        52 | 56 => "Windows BMP (v3, extended masks)".to_string(),
        64 => "OS/2 BMP (v2)".to_string(),
        108 => "Windows BMP (v4)".to_string(),
        124 => "Windows BMP (v5)".to_string(),
        other => format!("Unknown BMP header ({other} bytes)"),
    }
}

fn add_palette(metadata: &mut ExtractedMetadata, bpp: u16, colors_used: u32) {
    if colors_used > 0 {
        metadata.add("Number of colors", colors_used);
    } else if bpp <= 8 {
        metadata.add("Number of colors", 1_u32 << bpp);
    }
}

fn dpi(pixels_per_meter: i32) -> u32 {
    (f64::from(pixels_per_meter) * 0.0254).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::encoded_image;
    use image::ImageFormat;

    #[test]
    fn reads_encoded_bmp() {
        let bmp = encoded_image(5, 2, ImageFormat::Bmp);
        let lines = BmpParser.extract(&bmp).unwrap().export_plaintext();
        assert!(lines.contains(&"Image width: 5 pixels".to_string()));
        assert!(lines.contains(&"Image height: 2 pixels".to_string()));
        assert!(lines.contains(&"Bits/pixel: 24".to_string()));
        assert!(lines.contains(&"Compression: raw".to_string()));
        assert!(lines.iter().any(|line| line.starts_with("Format version: Windows BMP")));
    }

    #[test]
    fn negative_height_means_top_down() {
        let mut bmp = encoded_image(2, 2, ImageFormat::Bmp);
        bmp[22..26].copy_from_slice(&(-2_i32).to_le_bytes());
        let lines = BmpParser.extract(&bmp).unwrap().export_plaintext();
        assert!(lines.contains(&"Row order: Top-down".to_string()));
        assert!(lines.contains(&"Image height: 2 pixels".to_string()));
    }

    #[test]
    fn truncated_header_is_an_error() {
        assert!(BmpParser.extract(b"BM\0\0\0\0").is_err());
    }
}
