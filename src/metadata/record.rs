//! Registro ordenado de metadata que comparten todas las etapas.

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordEntry {
    pub key: String,
    pub value: String,
}

/// Mapa clave/valor que conserva el orden de inserción.
///
/// Escribir una clave existente reemplaza el valor en su posición original:
/// la última escritura gana.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetadataRecord {
    entries: Vec<RecordEntry>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta o sobrescribe. Devuelve el valor anterior si lo había.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.push(RecordEntry { key, value });
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for MetadataRecord {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = MetadataRecord::new();
        record.extend(iter);
        record
    }
}

fn into_pair(entry: RecordEntry) -> (String, String) {
    (entry.key, entry.value)
}

impl IntoIterator for MetadataRecord {
    type Item = (String, String);
    type IntoIter =
        std::iter::Map<std::vec::IntoIter<RecordEntry>, fn(RecordEntry) -> (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(into_pair as fn(RecordEntry) -> (String, String))
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}
