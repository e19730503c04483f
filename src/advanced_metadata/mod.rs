//! Lectores de metadata que trabajan sobre el contenido de la imagen.

pub mod bytes;
pub mod deep;
pub mod exif_tags;
pub mod gps;
pub mod header;
pub mod xmp;

pub use deep::scan_deep;
pub use exif_tags::ExifTagSet;
pub use gps::RationalValue;
pub use header::{ContainerAttributes, HeaderOutcome, read_header};
