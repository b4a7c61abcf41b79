//! Document state and its persistence
//!
//! The held document is replaced wholesale on every change and the full
//! document is written back right away. Persistence is best-effort: a failed
//! write is logged and the in-memory document stays authoritative.

use serde_json::Value;

use super::model::Document;
use super::storage::KeyValueStore;

/// Storage key of the serialized document
pub const DOCUMENT_KEY: &str = "bioAppData_v1";

/// Load the document stored under `key`, falling back to the first-run
/// document when nothing usable is stored.
pub fn load(store: &dyn KeyValueStore, key: &str) -> Document {
    let Some(raw) = store.get(key) else {
        tracing::info!("No stored document under '{}', using defaults", key);
        return Document::first_run();
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Stored document is not valid JSON: {}", e);
            return Document::first_run();
        }
    };

    if value.get("sections").is_none() {
        tracing::warn!("Stored document has no sections, using defaults");
        return Document::first_run();
    }

    match serde_json::from_value(value) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Stored document failed to decode: {}", e);
            Document::first_run()
        }
    }
}

/// Write the full document under `key`. Failures are logged and swallowed.
pub fn save(store: &mut dyn KeyValueStore, key: &str, document: &Document) {
    let content = match serde_json::to_string(document) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Could not serialize document: {}", e);
            return;
        }
    };

    if let Err(e) = store.set(key, &content) {
        tracing::warn!("Could not persist document: {}", e);
    }
}

/// The live document plus the key it is persisted under
#[derive(Debug, Clone)]
pub struct DocumentState {
    key: String,
    document: Document,
}

impl DocumentState {
    /// Restore from the store
    pub fn load(store: &dyn KeyValueStore, key: impl Into<String>) -> Self {
        let key = key.into();
        let document = load(store, &key);
        Self { key, document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the document and persist it
    pub fn commit(&mut self, store: &mut dyn KeyValueStore, document: Document) {
        self.document = document;
        save(store, &self.key, &self.document);
    }
}
