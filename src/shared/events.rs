use serde::{Deserialize, Serialize};

use super::types::TranslationResult;

/// Everything the session hands back to the presentation layer asynchronously
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum SessionEvent {
    #[serde(rename = "translation://ready")]
    Translated(TranslationResult),

    /// The provider refused the pair; the user has to pick different languages
    #[serde(rename = "translation://unsupported-language")]
    UnsupportedLanguage {
        source_code: String,
        target_code: String,
    },
}
