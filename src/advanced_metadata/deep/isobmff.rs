use super::{ContainerParser, ExtractedMetadata, truncated};
use crate::advanced_metadata::bytes::{read_fourcc, read_u8, read_u32_be, read_u64_be};
use crate::error::{MetadataError, Result};
use chrono::{Duration, NaiveDate};

/// Cajas contenedoras que se recorren buscando `ispe`, `mvhd` y `hdlr`.
const CONTAINER_BOXES: &[&str] = &["moov", "trak", "mdia", "iprp", "ipco"];

/// Profundidad máxima de cajas anidadas que se recorre.
const MAX_BOX_DEPTH: usize = 16;

pub struct IsoBmffParser;

struct IsoBox<'a> {
    kind: String,
    payload: &'a [u8],
}

impl ContainerParser for IsoBmffParser {
    fn name(&self) -> &'static str {
        "ISO-BMFF"
    }

    fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        let boxes = read_boxes(data)?;
        let Some(ftyp) = boxes.iter().find(|item| item.kind == "ftyp") else {
            return Err(MetadataError::deep_scan("ISO-BMFF: missing `ftyp` box"));
        };
        let major = read_fourcc(ftyp.payload, 0).ok_or_else(|| truncated("ISO-BMFF", "`ftyp` box"))?;

        let mut metadata = ExtractedMetadata::default();
        metadata.add("Major brand", &major);
        metadata.add_opt("Minor version", read_u32_be(ftyp.payload, 4));
        let compatible: Vec<String> = (8..ftyp.payload.len())
            .step_by(4)
            .filter_map(|offset| read_fourcc(ftyp.payload, offset))
            .filter(|brand| !brand.is_empty())
            .collect();
        if !compatible.is_empty() {
            metadata.add("Compatible brands", compatible.join(", "));
        }

        let mut scan = Scan::default();
        for item in &boxes {
            scan.visit(item, 0)?;
        }
        if let Some((width, height)) = scan.largest_image {
            metadata.add("Image width", format!("{width} pixels"));
            metadata.add("Image height", format!("{height} pixels"));
        }
        if !scan.handlers.is_empty() {
            metadata.add("Handlers", scan.handlers.join(", "));
        }
        if let Some(header) = scan.movie {
            if header.timescale > 0 {
                let seconds = header.duration as f64 / f64::from(header.timescale);
                metadata.add("Duration", format!("{seconds:.2} sec"));
            }
            metadata.add_opt("Creation date", format_mac_time(header.created));
            metadata.add_opt("Last modification", format_mac_time(header.modified));
        }

        let names: Vec<&str> = boxes.iter().map(|item| item.kind.as_str()).collect();
        metadata.add("Boxes", names.join(", "));
        metadata.add("MIME type", mime_for(&major));
        metadata.add("Endianness", "Big endian");
        Ok(metadata)
    }
}

#[derive(Clone, Copy)]
struct MovieHeader {
    created: u64,
    modified: u64,
    timescale: u32,
    duration: u64,
}

#[derive(Default)]
struct Scan {
    largest_image: Option<(u32, u32)>,
    handlers: Vec<String>,
    movie: Option<MovieHeader>,
}

impl Scan {
    fn visit(&mut self, item: &IsoBox<'_>, depth: usize) -> Result<()> {
        match item.kind.as_str() {
            // `meta` es una full box: versión y flags antes de los hijos.
            "meta" => {
                let children = item.payload.get(4..).ok_or_else(|| truncated("ISO-BMFF", "`meta` box"))?;
                self.visit_children(children, depth + 1)?;
            }
            kind if CONTAINER_BOXES.contains(&kind) => self.visit_children(item.payload, depth + 1)?,
            "ispe" => {
                if let (Some(width), Some(height)) = (read_u32_be(item.payload, 4), read_u32_be(item.payload, 8)) {
                    let area = u64::from(width) * u64::from(height);
                    let current = self
                        .largest_image
                        .map_or(0, |(w, h)| u64::from(w) * u64::from(h));
                    if area > current {
                        self.largest_image = Some((width, height));
                    }
                }
            }
            "hdlr" => {
                if let Some(handler) = read_fourcc(item.payload, 8)
                    && !self.handlers.contains(&handler)
                {
                    self.handlers.push(handler);
                }
            }
            "mvhd" => self.movie = read_movie_header(item.payload),
            _ => {}
        }
        Ok(())
    }

    fn visit_children(&mut self, payload: &[u8], depth: usize) -> Result<()> {
        if depth > MAX_BOX_DEPTH {
            return Err(MetadataError::deep_scan("ISO-BMFF: box nesting too deep"));
        }
        for child in read_boxes(payload)? {
            self.visit(&child, depth)?;
        }
        Ok(())
    }
}

fn read_boxes(data: &[u8]) -> Result<Vec<IsoBox<'_>>> {
    let mut boxes = Vec::new();
    let mut offset = 0;
    while offset + 8 <= data.len() {
        let (Some(size), Some(kind)) = (read_u32_be(data, offset), read_fourcc(data, offset + 4)) else {
            break;
        };
        let (header_len, total) = match size {
            0 => (8, (data.len() - offset) as u64),
            1 => (
                16,
                read_u64_be(data, offset + 8).ok_or_else(|| truncated("ISO-BMFF", "box size"))?,
            ),
            size => (8, u64::from(size)),
        };
        let end = usize::try_from(total)
            .ok()
            .and_then(|total| offset.checked_add(total))
            .filter(|&end| end <= data.len() && end >= offset + header_len)
            .ok_or_else(|| truncated("ISO-BMFF", &format!("`{kind}` box")))?;
        boxes.push(IsoBox {
            kind,
            payload: &data[offset + header_len..end],
        });
        offset = end;
    }
    Ok(boxes)
}

fn read_movie_header(payload: &[u8]) -> Option<MovieHeader> {
    match read_u8(payload, 0)? {
        1 => Some(MovieHeader {
            created: read_u64_be(payload, 4)?,
            modified: read_u64_be(payload, 12)?,
            timescale: read_u32_be(payload, 20)?,
            duration: read_u64_be(payload, 24)?,
        }),
        _ => Some(MovieHeader {
            created: u64::from(read_u32_be(payload, 4)?),
            modified: u64::from(read_u32_be(payload, 8)?),
            timescale: read_u32_be(payload, 12)?,
            duration: u64::from(read_u32_be(payload, 16)?),
        }),
    }
}

/// Segundos desde 1904-01-01, la época de QuickTime.
fn format_mac_time(seconds: u64) -> Option<String> {
    if seconds == 0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1904, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let seconds = i64::try_from(seconds).ok()?;
    let timestamp = epoch.checked_add_signed(Duration::try_seconds(seconds)?)?;
    Some(timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn mime_for(major_brand: &str) -> &'static str {
    match major_brand {
        "heic" | "heix" | "heim" | "heis" | "hevc" | "hevx" | "hevm" | "hevs" => "image/heic",
        "mif1" | "msf1" => "image/heif",
        "avif" | "avis" => "image/avif",
        "qt" => "video/quicktime",
        "M4A" => "audio/mp4",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut bytes = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(kind);
        bytes.extend_from_slice(payload);
        bytes
    }

    fn ispe(width: u32, height: u32) -> Vec<u8> {
        let mut payload = vec![0; 4];
        payload.extend_from_slice(&width.to_be_bytes());
        payload.extend_from_slice(&height.to_be_bytes());
        iso_box(b"ispe", &payload)
    }

    fn heic() -> Vec<u8> {
        let mut ftyp = b"heic".to_vec();
        ftyp.extend_from_slice(&0_u32.to_be_bytes());
        ftyp.extend_from_slice(b"mif1heic");

        let mut hdlr = vec![0; 8];
        hdlr.extend_from_slice(b"pict");
        hdlr.extend_from_slice(&[0; 13]);

        let ipco = iso_box(b"ipco", &[ispe(512, 512), ispe(4032, 3024)].concat());
        let iprp = iso_box(b"iprp", &ipco);
        let mut meta = vec![0; 4];
        meta.extend_from_slice(&iso_box(b"hdlr", &hdlr));
        meta.extend_from_slice(&iprp);

        [
            iso_box(b"ftyp", &ftyp),
            iso_box(b"meta", &meta),
            iso_box(b"mdat", &[0; 16]),
        ]
        .concat()
    }

    #[test]
    fn reads_heic_structure() {
        let lines = IsoBmffParser.extract(&heic()).unwrap().export_plaintext();

        assert!(lines.contains(&"Major brand: heic".to_string()));
        assert!(lines.contains(&"Compatible brands: mif1, heic".to_string()));
        assert!(lines.contains(&"Image width: 4032 pixels".to_string()));
        assert!(lines.contains(&"Image height: 3024 pixels".to_string()));
        assert!(lines.contains(&"Handlers: pict".to_string()));
        assert!(lines.contains(&"Boxes: ftyp, meta, mdat".to_string()));
        assert!(lines.contains(&"MIME type: image/heic".to_string()));
    }

    #[test]
    fn reads_movie_header() {
        let mut mvhd = vec![0; 4];
        mvhd.extend_from_slice(&3_600_u32.to_be_bytes());
        mvhd.extend_from_slice(&3_600_u32.to_be_bytes());
        mvhd.extend_from_slice(&1_000_u32.to_be_bytes());
        mvhd.extend_from_slice(&2_500_u32.to_be_bytes());
        let mut ftyp = b"isom".to_vec();
        ftyp.extend_from_slice(&[0; 4]);
        let mp4 = [iso_box(b"ftyp", &ftyp), iso_box(b"moov", &iso_box(b"mvhd", &mvhd))].concat();

        let lines = IsoBmffParser.extract(&mp4).unwrap().export_plaintext();
        assert!(lines.contains(&"Duration: 2.50 sec".to_string()));
        assert!(lines.contains(&"Creation date: 1904-01-01 01:00:00".to_string()));
        assert!(lines.contains(&"MIME type: video/mp4".to_string()));
    }

    #[test]
    fn deep_box_nesting_is_an_error() {
        let mut nested = Vec::new();
        for _ in 0..200 {
            nested = iso_box(b"moov", &nested);
        }
        let mp4 = [iso_box(b"ftyp", b"isom\0\0\0\0"), nested].concat();
        let error = IsoBmffParser.extract(&mp4).err().unwrap();
        assert!(error.to_string().contains("box nesting too deep"));
    }

    #[test]
    fn shallow_nesting_is_walked() {
        let mut nested = iso_box(b"mvhd", &[0; 20]);
        for _ in 1..MAX_BOX_DEPTH {
            nested = iso_box(b"trak", &nested);
        }
        let mp4 = [iso_box(b"ftyp", b"isom\0\0\0\0"), iso_box(b"moov", &nested)].concat();
        assert!(IsoBmffParser.extract(&mp4).is_ok());
    }

    #[test]
    fn box_past_end_is_an_error() {
        let mut data = iso_box(b"ftyp", b"heic\0\0\0\0");
        data.extend_from_slice(&64_u32.to_be_bytes());
        data.extend_from_slice(b"meta");
        assert!(IsoBmffParser.extract(&data).is_err());
    }
}
