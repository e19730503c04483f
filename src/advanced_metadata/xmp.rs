//! Lectura de paquetes XMP embebidos (JPEG APP1, chunk iTXt de PNG, chunk `XMP ` de WebP).

use std::collections::HashSet;
use xmltree::{Element, XMLNode};

const MAX_XMP_VALUE_LEN: usize = 2048;

struct XmpField {
    label: &'static str,
    keys: &'static [&'static str],
}

const FIELDS: &[XmpField] = &[
    XmpField {
        label: "Author",
        keys: &["dc:creator", "creator"],
    },
    XmpField {
        label: "Title",
        keys: &["dc:title", "title"],
    },
    XmpField {
        label: "Description",
        keys: &["dc:description"],
    },
    XmpField {
        label: "Keywords",
        keys: &["dc:subject", "subject"],
    },
    XmpField {
        label: "Copyright",
        keys: &["dc:rights", "rights"],
    },
    XmpField {
        label: "Producer",
        keys: &["xmp:CreatorTool", "CreatorTool"],
    },
    XmpField {
        label: "Creation date",
        keys: &["xmp:CreateDate", "CreateDate"],
    },
    XmpField {
        label: "Last modification",
        keys: &["xmp:ModifyDate", "ModifyDate"],
    },
    XmpField {
        label: "Rating",
        keys: &["xmp:Rating", "Rating"],
    },
    XmpField {
        label: "Document ID",
        keys: &["xmpMM:DocumentID", "DocumentID"],
    },
    XmpField {
        label: "Latitude",
        keys: &["exif:GPSLatitude", "GPSLatitude"],
    },
    XmpField {
        label: "Longitude",
        keys: &["exif:GPSLongitude", "GPSLongitude"],
    },
    XmpField {
        label: "Altitude",
        keys: &["exif:GPSAltitude", "GPSAltitude"],
    },
];

/// Pares etiqueta/valor presentes en el paquete, en un orden fijo.
///
/// `None` si el texto no contiene un documento XMP bien formado.
pub fn parse_packet(packet: &str) -> Option<Vec<(&'static str, String)>> {
    let root = Element::parse(packet_xml(packet)?.as_bytes()).ok()?;
    let mut found = Vec::new();
    gather(&root, &mut found);

    let mut entries = Vec::new();
    if let Some(toolkit) = values_for(&found, &["xmptk"]).next() {
        entries.push(("XMP Toolkit", toolkit.to_string()));
    }
    for field in FIELDS {
        let mut seen = HashSet::new();
        let values: Vec<&str> = values_for(&found, field.keys)
            .filter(|value| value.len() <= MAX_XMP_VALUE_LEN && seen.insert(*value))
            .collect();
        if !values.is_empty() {
            entries.push((field.label, values.join(", ")));
        }
    }
    Some(entries)
}

/// Recorta el documento `x:xmpmeta` o, si falta, el `rdf:RDF` desnudo.
fn packet_xml(packet: &str) -> Option<&str> {
    [("<x:xmpmeta", "</x:xmpmeta>"), ("<rdf:RDF", "</rdf:RDF>")]
        .into_iter()
        .find_map(|(open, close)| {
            let start = packet.find(open)?;
            let end = start + packet[start..].find(close)? + close.len();
            Some(&packet[start..end])
        })
}

/// Aplana el árbol en pares `(nombre, valor)` en orden de documento: cada
/// atributo por su nombre local y cada elemento con texto por su nombre
/// cualificado.
fn gather(element: &Element, found: &mut Vec<(String, String)>) {
    for (name, value) in &element.attributes {
        found.push((name.clone(), value.trim().to_string()));
    }
    let mut text = Vec::new();
    text_of(element, &mut text);
    if !text.is_empty() {
        let name = match &element.prefix {
            Some(prefix) => format!("{prefix}:{}", element.name),
            None => element.name.clone(),
        };
        found.push((name, text.join(", ")));
    }
    for child in element.children.iter().filter_map(XMLNode::as_element) {
        gather(child, found);
    }
}

fn text_of(element: &Element, parts: &mut Vec<String>) {
    for node in &element.children {
        match node {
            XMLNode::Text(text) if !text.trim().is_empty() => parts.push(text.trim().to_string()),
            XMLNode::Element(child) => text_of(child, parts),
            _ => {}
        }
    }
}

/// Valores no vacíos cuyo nombre coincide con alguna de las claves.
fn values_for<'a>(
    found: &'a [(String, String)],
    keys: &'a [&str],
) -> impl Iterator<Item = &'a str> {
    found
        .iter()
        .filter(|(name, value)| !value.is_empty() && keys.iter().any(|key| key_matches(name, key)))
        .map(|(_, value)| value.as_str())
}

/// Una clave sin prefijo compara contra el nombre local.
fn key_matches(found: &str, wanted: &str) -> bool {
    if wanted.contains(':') {
        return found.eq_ignore_ascii_case(wanted);
    }
    found
        .rsplit(':')
        .next()
        .is_some_and(|local| local.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
pub(crate) const SAMPLE_PACKET: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/" x:xmptk="Adobe XMP Core 5.6">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:dc="http://purl.org/dc/elements/1.1/"
    xmlns:xmp="http://ns.adobe.com/xap/1.0/"
    xmp:CreatorTool="Darktable 4.6"
    xmp:CreateDate="2024-05-01T10:00:00">
   <dc:creator><rdf:Seq><rdf:li>Ana Pérez</rdf:li></rdf:Seq></dc:creator>
   <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Faro</rdf:li></rdf:Alt></dc:title>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;
