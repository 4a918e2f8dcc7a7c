//! Offline word dictionary
//!
//! Consulted when the remote provider cannot be reached. Loaded once and read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::shared::error::{AppError, AppResult};

/// source code -> source word -> target code -> translated word
pub type FallbackTable = HashMap<String, HashMap<String, HashMap<String, String>>>;

const SEED: &[(&str, &str, &[(&str, &str)])] = &[
    ("en", "hello", &[("es", "hola"), ("fr", "bonjour"), ("de", "hallo"), ("ur", "ہیلو")]),
    ("en", "world", &[("es", "mundo"), ("fr", "monde"), ("de", "welt"), ("ur", "دنیا")]),
    ("es", "hola", &[("en", "hello"), ("fr", "bonjour"), ("de", "hallo"), ("ur", "ہیلو")]),
    ("es", "mundo", &[("en", "world"), ("fr", "monde"), ("de", "welt"), ("ur", "دنیا")]),
];

#[derive(Debug, Clone, Default)]
pub struct FallbackTranslationStore {
    table: FallbackTable,
}

impl FallbackTranslationStore {
    /// The small built-in table used whenever nothing better is available
    pub fn seed() -> Self {
        let mut table = FallbackTable::new();
        for (source, word, targets) in SEED {
            let translations = targets
                .iter()
                .map(|(target, translated)| (target.to_string(), translated.to_string()))
                .collect();
            table
                .entry(source.to_string())
                .or_default()
                .insert(word.to_string(), translations);
        }
        Self { table }
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        let table: FallbackTable = serde_json::from_str(content)?;
        Ok(Self { table })
    }

    /// Load the persisted dictionary, degrading to the seed table on any failure.
    pub async fn load(path: &Path) -> Self {
        match Self::try_load(path).await {
            Ok(store) if store.is_empty() => {
                warn!(path = %path.display(), "Fallback dictionary is empty, using default translations");
                Self::seed()
            }
            Ok(store) => {
                info!(path = %path.display(), words = store.len(), "Loaded fallback dictionary");
                store
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error loading translations, using default translations");
                Self::seed()
            }
        }
    }

    async fn try_load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Exact, case-sensitive lookup of a single word.
    pub fn lookup(&self, word: &str, source_code: &str, target_code: &str) -> Option<&str> {
        self.table
            .get(source_code)?
            .get(word)?
            .get(target_code)
            .map(String::as_str)
    }

    /// Number of source words across all source languages
    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
