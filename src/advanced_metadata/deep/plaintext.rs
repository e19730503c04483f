/// Metadata descubierta por un parser de contenedor, en orden de aparición.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    items: Vec<(String, String)>,
}

impl ExtractedMetadata {
    /// Ignora valores vacíos; los saltos de línea se aplanan para que cada
    /// elemento ocupe una sola línea al exportarse.
    pub fn add(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        let value = value
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if value.is_empty() {
            return;
        }
        self.items.push((key.to_string(), value));
    }

    pub fn add_opt<T: ToString>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.add(key, value);
        }
    }

    pub fn extend<K: AsRef<str>>(&mut self, items: impl IntoIterator<Item = (K, String)>) {
        for (key, value) in items {
            self.add(key.as_ref(), value);
        }
    }

    /// Una línea `Clave: Valor` por elemento.
    pub fn export_plaintext(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect()
    }
}
