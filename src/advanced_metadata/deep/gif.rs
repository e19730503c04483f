use super::{ContainerParser, ExtractedMetadata, truncated};
use crate::advanced_metadata::bytes::{read_u8, read_u16_le};
use crate::error::{MetadataError, Result};

const HEADER_LEN: usize = 13;

pub struct GifParser;

#[derive(Default)]
struct Animation {
    frames: u32,
    total_delay_cs: u64,
    loop_count: Option<u16>,
}

impl ContainerParser for GifParser {
    fn name(&self) -> &'static str {
        "GIF"
    }

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        if data.len() < HEADER_LEN {
            return Err(truncated("GIF", "header"));
        }
        let version = match &data[..6] {
            b"GIF87a" => "87a",
            b"GIF89a" => "89a",
            _ => return Err(MetadataError::deep_scan("GIF: unknown signature")),
        };

        let mut metadata = ExtractedMetadata::default();
        metadata.add("Format version", format!("GIF version {version}"));
        if let (Some(width), Some(height)) = (read_u16_le(data, 6), read_u16_le(data, 8)) {
            metadata.add("Image width", format!("{width} pixels"));
            metadata.add("Image height", format!("{height} pixels"));
        }

        let flags = data[10];
        let bits = u32::from(flags & 0x07) + 1;
        metadata.add("Bits/pixel", bits);
        let mut offset = HEADER_LEN;
        if flags & 0x80 != 0 {
            metadata.add("Number of colors", 1_u32 << bits);
            offset += 3 * (1_usize << bits);
        }

        let mut animation = Animation::default();
        loop {
            let introducer = read_u8(data, offset).ok_or_else(|| truncated("GIF", "block"))?;
            offset += 1;
            match introducer {
                0x21 => {
                    let label = read_u8(data, offset).ok_or_else(|| truncated("GIF", "extension"))?;
                    let (blocks, next) = read_sub_blocks(data, offset + 1)?;
                    read_extension(&mut metadata, &mut animation, label, &blocks);
                    offset = next;
                }
                0x2C => {
                    let packed = read_u8(data, offset + 8).ok_or_else(|| truncated("GIF", "image descriptor"))?;
                    offset += 9;
                    if packed & 0x80 != 0 {
                        offset += 3 * (1_usize << ((packed & 0x07) + 1));
                    }
                    // tamaño mínimo de código LZW
                    offset += 1;
                    let (_, next) = read_sub_blocks(data, offset)?;
                    offset = next;
                    animation.frames = animation.frames.saturating_add(1);
                }
                0x3B => break,
                other => {
                    return Err(MetadataError::deep_scan(format!(
                        "GIF: unexpected block 0x{other:02X}"
                    )));
                }
            }
        }

        metadata.add("Frame count", animation.frames);
        if animation.frames > 1 {
            metadata.add("Duration", format!("{} ms", animation.total_delay_cs.saturating_mul(10)));
        }
        metadata.add_opt(
            "Loop count",
            animation.loop_count.map(|count| match count {
                0 => "Infinite".to_string(),
                count => count.to_string(),
            }),
        );
        metadata.add("Compression", "LZW");
        metadata.add("MIME type", "image/gif");
        metadata.add("Endianness", "Little endian");
        Ok(metadata)
    }
}

fn read_extension(metadata: &mut ExtractedMetadata, animation: &mut Animation, label: u8, blocks: &[&[u8]]) {
    match label {
        0xF9 => {
            if let Some(delay) = blocks.first().and_then(|block| read_u16_le(block, 1)) {
                animation.total_delay_cs = animation.total_delay_cs.saturating_add(u64::from(delay));
            }
        }
        0xFE => {
            let text: Vec<u8> = blocks.concat();
            metadata.add("Comment", String::from_utf8_lossy(&text));
        }
        0xFF => {
            let Some(identifier) = blocks.first() else {
                return;
            };
            match *identifier {
                b"NETSCAPE2.0" | b"ANIMEXTS1.0" => {
                    animation.loop_count = blocks
                        .get(1)
                        .filter(|block| block.first() == Some(&1))
                        .and_then(|block| read_u16_le(block, 1));
                }
                b"XMP DataXMP" => metadata.add("XMP", "Present"),
                other => metadata.add("Application", String::from_utf8_lossy(other)),
            }
        }
        _ => {}
    }
}

/// Devuelve los sub-bloques de datos y el offset tras el terminador.
fn read_sub_blocks(data: &[u8], mut offset: usize) -> Result<(Vec<&[u8]>, usize)> {
    let mut blocks = Vec::new();
    loop {
        let size = read_u8(data, offset).ok_or_else(|| truncated("GIF", "data sub-block"))? as usize;
        offset += 1;
        if size == 0 {
            return Ok((blocks, offset));
        }
        let block = data
            .get(offset..offset + size)
            .ok_or_else(|| truncated("GIF", "data sub-block"))?;
        blocks.push(block);
        offset += size;
    }
}
