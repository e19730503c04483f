//! Generadores de archivos de prueba compartidos por los tests unitarios.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub fn ascii_field(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

pub fn dms_field(tag: Tag, dms: [(u32, u32); 3]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            dms.iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
    }
}

/// Campos GPS completos para la latitud/longitud indicadas.
pub fn gps_fields(
    latitude: [(u32, u32); 3],
    latitude_ref: &str,
    longitude: [(u32, u32); 3],
    longitude_ref: &str,
) -> Vec<Field> {
    vec![
        ascii_field(Tag::GPSLatitudeRef, latitude_ref),
        dms_field(Tag::GPSLatitude, latitude),
        ascii_field(Tag::GPSLongitudeRef, longitude_ref),
        dms_field(Tag::GPSLongitude, longitude),
    ]
}

/// Bloque TIFF con los campos indicados.
pub fn tiff_block(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buffer = Cursor::new(Vec::new());
    writer
        .write(&mut buffer, false)
        .expect("el bloque EXIF de prueba debería serializarse");
    buffer.into_inner()
}

/// JPEG mínimo: SOI, APP1 con el bloque EXIF y EOI. No contiene imagen.
pub fn exif_jpeg(fields: &[Field]) -> Vec<u8> {
    let tiff = tiff_block(fields);
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let length = u16::try_from(2 + 6 + tiff.len()).expect("bloque EXIF demasiado grande");
    jpeg.extend_from_slice(&length.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 40) as u8, (y * 40) as u8, 128])
    });
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .expect("la imagen de prueba debería codificarse");
    buffer.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}

/// Envuelve un payload como chunk PNG con su CRC.
pub fn png_chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(data.len() + 12);
    chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
    chunk.extend_from_slice(kind);
    chunk.extend_from_slice(data);
    let mut crc_input = kind.to_vec();
    crc_input.extend_from_slice(data);
    chunk.extend_from_slice(&crc32fast::hash(&crc_input).to_be_bytes());
    chunk
}

/// Inserta chunks justo después de IHDR.
pub fn png_with_chunks(width: u32, height: u32, chunks: &[Vec<u8>]) -> Vec<u8> {
    let png = png_bytes(width, height);
    // firma (8) + IHDR (4 + 4 + 13 + 4)
    let split = 8 + 25;
    let mut output = png[..split].to_vec();
    for chunk in chunks {
        output.extend_from_slice(chunk);
    }
    output.extend_from_slice(&png[split..]);
    output
}
