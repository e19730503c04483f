use super::{ContainerParser, ExtractedMetadata, tiff, truncated};
use crate::advanced_metadata::bytes::{
    read_c_string, read_fourcc, read_u8, read_u16_le, read_u24_le, read_u32_le,
};
use crate::advanced_metadata::xmp;
use crate::error::{MetadataError, Result};

const RIFF_HEADER_LEN: usize = 12;

pub struct RiffParser;

impl ContainerParser for RiffParser {
    fn name(&self) -> &'static str {
        "RIFF"
    }

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        if !data.starts_with(b"RIFF") {
            return Err(MetadataError::deep_scan("RIFF: missing signature"));
        }
        let form = read_fourcc(data, 8).ok_or_else(|| truncated("RIFF", "header"))?;

        let mut metadata = ExtractedMetadata::default();
        let mut webp = WebpState::default();
        let mut names = Vec::new();
        for (kind, payload) in chunks(data, RIFF_HEADER_LEN)? {
            match (form.as_str(), kind.as_str()) {
                ("WEBP", _) => webp.read_chunk(&mut metadata, &kind, payload),
                ("WAVE", "fmt") => read_wave_format(&mut metadata, payload),
                (_, "LIST") => read_info_list(&mut metadata, payload)?,
                _ => {}
            }
            names.push(kind);
        }
        webp.finish(&mut metadata);

        if !names.is_empty() {
            metadata.add("Chunks", names.join(", "));
        }
        metadata.add("MIME type", mime_for(&form));
        metadata.add("Endianness", "Little endian");
        Ok(metadata)
    }
}

/// Recorre chunks `fourcc + tamaño LE + datos` con relleno a tamaño par.
fn chunks(data: &[u8], mut offset: usize) -> Result<Vec<(String, &[u8])>> {
    let mut found = Vec::new();
    while offset + 8 <= data.len() {
        let (Some(kind), Some(size)) = (read_fourcc(data, offset), read_u32_le(data, offset + 4))
        else {
            break;
        };
        let start = offset + 8;
        let payload = data
            .get(start..start + size as usize)
            .ok_or_else(|| truncated("RIFF", &format!("chunk `{kind}`")))?;
        found.push((kind, payload));
        offset = start + size as usize + (size as usize & 1);
    }
    Ok(found)
}

#[derive(Default)]
struct WebpState {
    frames: u32,
    canvas: Option<(u32, u32)>,
}

impl WebpState {
    fn read_chunk(&mut self, metadata: &mut ExtractedMetadata, kind: &str, payload: &[u8]) {
        match kind {
            "VP8X" => {
                let Some(flags) = read_u8(payload, 0) else {
                    return;
                };
                if let (Some(width), Some(height)) = (read_u24_le(payload, 4), read_u24_le(payload, 7)) {
                    self.canvas = Some((width + 1, height + 1));
                }
                metadata.add("Alpha channel", yes_no(flags & 0x10 != 0));
                metadata.add("Animation", yes_no(flags & 0x02 != 0));
            }
            "VP8" => {
                if payload.get(3..6) == Some([0x9D, 0x01, 0x2A].as_slice())
                    && let (Some(width), Some(height)) = (read_u16_le(payload, 6), read_u16_le(payload, 8))
                {
                    self.set_size(u32::from(width & 0x3FFF), u32::from(height & 0x3FFF));
                }
                metadata.add("Compression", "VP8 (lossy)");
            }
            "VP8L" => {
                if read_u8(payload, 0) == Some(0x2F)
                    && let Some(bits) = read_u32_le(payload, 1)
                {
                    self.set_size((bits & 0x3FFF) + 1, ((bits >> 14) & 0x3FFF) + 1);
                    metadata.add("Alpha channel", yes_no((bits >> 28) & 1 == 1));
                }
                metadata.add("Compression", "VP8L (lossless)");
            }
            "ANIM" => {
                metadata.add_opt(
                    "Loop count",
                    read_u16_le(payload, 4).map(|count| match count {
                        0 => "Infinite".to_string(),
                        count => count.to_string(),
                    }),
                );
            }
            "ANMF" => self.frames += 1,
            "ICCP" => metadata.add("ICC profile", format!("Present ({} bytes)", payload.len())),
            "EXIF" => tiff::summarize_embedded(metadata, payload),
            "XMP" => {
                if let Some(entries) = xmp::parse_packet(&String::from_utf8_lossy(payload)) {
                    metadata.extend(entries);
                }
            }
            _ => {}
        }
    }

    /// El lienzo VP8X manda sobre el tamaño del bitstream.
    fn set_size(&mut self, width: u32, height: u32) {
        if self.canvas.is_none() {
            self.canvas = Some((width, height));
        }
    }

    fn finish(self, metadata: &mut ExtractedMetadata) {
        if let Some((width, height)) = self.canvas {
            metadata.add("Image width", format!("{width} pixels"));
            metadata.add("Image height", format!("{height} pixels"));
        }
        if self.frames > 0 {
            metadata.add("Frame count", self.frames);
        }
    }
}

fn read_wave_format(metadata: &mut ExtractedMetadata, payload: &[u8]) {
    let (Some(format), Some(channels), Some(rate), Some(byte_rate), Some(bits)) = (
        read_u16_le(payload, 0),
        read_u16_le(payload, 2),
        read_u32_le(payload, 4),
        read_u32_le(payload, 8),
        read_u16_le(payload, 14),
    ) else {
        return;
    };
    let compression = match format {
        1 => "Microsoft PCM".to_string(),
        3 => "IEEE float".to_string(),
        6 => "A-law".to_string(),
        7 => "mu-law".to_string(),
        0xFFFE => "Extensible".to_string(),
        other => format!("Unknown (0x{other:04X})"),
    };
    metadata.add("Channel", channels);
    metadata.add("Sample rate", format!("{rate} Hz"));
    metadata.add("Bits/sample", bits);
    metadata.add("Bit rate", format!("{} Kbit/sec", u64::from(byte_rate) * 8 / 1000));
    metadata.add("Compression", compression);
}

/// Subchunks de una lista `LIST/INFO` (título, autor, software, ...).
fn read_info_list(metadata: &mut ExtractedMetadata, payload: &[u8]) -> Result<()> {
    if payload.get(..4) != Some(b"INFO".as_slice()) {
        return Ok(());
    }
    for (kind, value) in chunks(payload, 4)? {
        let label = match kind.as_str() {
            "INAM" => "Title",
            "IART" => "Author",
            "ICMT" => "Comment",
            "ICOP" => "Copyright",
            "ICRD" => "Creation date",
            "ISFT" => "Producer",
            "IGNR" => "Music genre",
            _ => continue,
        };
        metadata.add(label, read_c_string(value));
    }
    Ok(())
}

fn mime_for(form: &str) -> &'static str {
    match form {
        "WEBP" => "image/webp",
        "WAVE" => "audio/x-wav",
        "AVI" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}
