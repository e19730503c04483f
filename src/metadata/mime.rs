//! Detección de tipos MIME mediante inferencia heurística.

use infer::Infer;

/// Intenta detectar el tipo MIME a partir de los primeros bytes del contenido.
pub fn mime_type(bytes: &[u8]) -> Option<&'static str> {
    let infer = Infer::new();
    infer.get(bytes).map(|kind| kind.mime_type())
}

/// Contenedores donde el lector EXIF sabe buscar un segmento EXIF.
pub fn may_carry_exif(mime: &str) -> bool {
    matches!(
        mime,
        "image/jpeg"
            | "image/tiff"
            | "image/x-canon-cr2"
            | "image/png"
            | "image/webp"
            | "image/heif"
            | "image/heic"
            | "image/heif-sequence"
            | "image/heic-sequence"
            | "image/avif"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_signatures() {
        assert_eq!(mime_type(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), Some("image/png"));
        assert_eq!(mime_type(b"GIF89a\x01\0\x01\0"), Some("image/gif"));
        assert_eq!(mime_type(b"\xFF\xD8\xFF\xE0\0\x10JFIF\0"), Some("image/jpeg"));
        assert_eq!(mime_type(b"plain words"), None);
    }

    #[test]
    fn only_exif_containers_are_flagged() {
        assert!(may_carry_exif("image/jpeg"));
        assert!(may_carry_exif("image/heif"));
        assert!(may_carry_exif("image/x-canon-cr2"));
        assert!(!may_carry_exif("image/gif"));
        assert!(!may_carry_exif("image/bmp"));
    }
}
