use super::*;
use crate::advanced_metadata::deep::{HIDDEN_METADATA, HIDDEN_METADATA_ERROR, UNABLE_TO_PARSE};
use crate::advanced_metadata::exif_tags::{CAMERA_MODEL, GPS_COORDINATES, SOFTWARE};
use crate::advanced_metadata::header::DECODE_ERROR;
use crate::error::MetadataError;
use crate::metadata::filesystem::{FILE_NAME, FILE_SIZE, MODIFICATION_TIME};
use crate::test_support::{ascii_field, exif_jpeg, gps_fields, png_bytes, png_chunk, png_with_chunks};
use exif::Tag;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn fixture(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    (dir, path)
}

fn camera_jpeg() -> Vec<u8> {
    let mut fields = vec![
        ascii_field(Tag::Model, "Pixel 7"),
        ascii_field(Tag::Software, "HDR+ 1.0"),
    ];
    fields.extend(gps_fields(
        [(35, 1), (30, 1), (0, 1)],
        "N",
        [(139, 1), (45, 1), (0, 1)],
        "W",
    ));
    exif_jpeg(&fields)
}

#[test]
fn missing_path_is_file_not_found() {
    let dir = tempdir().unwrap();
    let result = extract(&dir.path().join("nope.jpg"));
    assert!(matches!(result, Err(MetadataError::FileNotFound { .. })));
}

#[test]
fn minimal_png_yields_filesystem_and_container_attributes() {
    let png = png_bytes(4, 4);
    let (_dir, path) = fixture("tiny.png", &png);
    let record = extract(&path).unwrap();

    assert_eq!(record.get(FILE_NAME), Some("tiny.png"));
    assert_eq!(record.get(FILE_SIZE), Some(png.len().to_string().as_str()));
    assert!(record.contains_key(MODIFICATION_TIME));
    assert_eq!(record.get("Format"), Some("PNG"));
    assert_eq!(record.get("Size (pixels)"), Some("4x4"));
    assert_eq!(record.get(CAMERA_MODEL), Some("Unknown"));
    assert_eq!(record.get(SOFTWARE), Some("Unknown"));
    assert_eq!(record.get("Image width"), Some("4 pixels"));
    assert_eq!(record.keys().next(), Some(FILE_NAME));
}

#[test]
fn deep_scan_wins_for_shared_keys() {
    let (_dir, path) = fixture("tiny.png", &png_bytes(2, 2));

    let record = extract(&path).unwrap();
    assert_eq!(record.get("Compression"), Some("deflate"));
    assert!(!record.contains_key("Compression (header)"));

    let options = ExtractOptions {
        merge: MergePolicy::KeepShadowed,
        ..ExtractOptions::default()
    };
    let record = extract_with(&path, &options).unwrap();
    assert_eq!(record.get("Compression"), Some("deflate"));
    assert_eq!(record.get("Compression (header)"), Some("None"));
}

#[test]
fn deep_scan_comment_reaches_the_record() {
    let mut text = b"Comment".to_vec();
    text.push(0);
    text.extend_from_slice(b"shot on a rooftop");
    let png = png_with_chunks(2, 2, &[png_chunk(b"tEXt", &text)]);
    let (_dir, path) = fixture("note.png", &png);

    let record = extract(&path).unwrap();
    assert_eq!(record.get("Comment"), Some("shot on a rooftop"));
}

#[test]
fn jpeg_with_exif_reports_camera_and_gps() {
    let (_dir, path) = fixture("photo.jpg", &camera_jpeg());
    let record = extract(&path).unwrap();

    assert_eq!(record.get("Image Model"), Some("Pixel 7"));
    assert_eq!(record.get(CAMERA_MODEL), Some("Pixel 7"));
    assert_eq!(record.get(SOFTWARE), Some("HDR+ 1.0"));
    assert_eq!(record.get(GPS_COORDINATES), Some("35.5, -139.75"));
    // sin SOF el decodificador de cabecera no puede leer la imagen
    assert!(record.contains_key(DECODE_ERROR));
}

#[test]
fn heic_extension_skips_exif() {
    let (_dir, path) = fixture("photo.heic", &camera_jpeg());
    let record = extract(&path).unwrap();

    for key in [CAMERA_MODEL, SOFTWARE, GPS_COORDINATES, "Image Model", "GPS GPSLatitude"] {
        assert!(!record.contains_key(key), "`{key}` no debería estar presente");
    }
    assert!(record.contains_key(FILE_NAME));

    let upper = path.with_file_name("PHOTO.HEIC");
    fs::rename(&path, &upper).unwrap();
    assert!(!extract(&upper).unwrap().contains_key(CAMERA_MODEL));

    let bare = path.with_file_name(".heic");
    fs::rename(&upper, &bare).unwrap();
    assert!(!extract(&bare).unwrap().contains_key(CAMERA_MODEL));
}

#[test]
fn corrupted_exif_degrades_to_error_entry() {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x10];
    jpeg.extend_from_slice(b"Exif\0\0MM\0\x2A\xFF\xFF\xFF\xFF");
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    let (_dir, path) = fixture("broken.jpg", &jpeg);

    let record = extract(&path).unwrap();
    assert!(record.get(EXIF_ERROR).is_some_and(|message| !message.is_empty()));
    assert!(!record.contains_key(CAMERA_MODEL));
}

#[test]
fn unknown_content_degrades_every_stage() {
    let (_dir, path) = fixture("notes.txt", b"nothing to see here");
    let record = extract(&path).unwrap();

    assert!(record.contains_key(DECODE_ERROR));
    assert_eq!(record.get(CAMERA_MODEL), Some("Unknown"));
    assert_eq!(record.get(HIDDEN_METADATA), Some(UNABLE_TO_PARSE));
}

#[test]
fn deeply_nested_boxes_degrade_the_deep_scan() {
    fn iso_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut bytes = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(kind);
        bytes.extend_from_slice(payload);
        bytes
    }

    let mut nested = Vec::new();
    for _ in 0..500 {
        nested = iso_box(b"moov", &nested);
    }
    let mp4 = [iso_box(b"ftyp", b"isom\0\0\0\0"), nested].concat();
    let (_dir, path) = fixture("a.mp4", &mp4);

    let record = extract(&path).unwrap();
    assert!(
        record
            .get(HIDDEN_METADATA_ERROR)
            .is_some_and(|message| message.contains("box nesting"))
    );
}

#[test]
fn deep_scan_can_be_disabled() {
    let (_dir, path) = fixture("notes.txt", b"nothing to see here");
    let options = ExtractOptions {
        deep_scan: false,
        ..ExtractOptions::default()
    };
    let record = extract_with(&path, &options).unwrap();
    assert!(!record.contains_key(HIDDEN_METADATA));
}

#[test]
fn report_round_trip_through_disk() {
    let (dir, path) = fixture("tiny.png", &png_bytes(3, 3));
    let record = extract(&path).unwrap();
    let report = dir.path().join(DEFAULT_REPORT_NAME);
    write_report(&record, &report, ExportFormat::Txt).unwrap();

    let contents = fs::read_to_string(&report).unwrap();
    assert_eq!(contents.lines().count(), record.len());
    assert!(contents.starts_with("File Name: tiny.png\n"));
    assert!(Path::new(&report).exists());
}
