use serde::{Deserialize, Serialize};

use super::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_code: String,
    pub target_code: String,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source_code: impl Into<String>, target_code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_code: source_code.into(),
            target_code: target_code.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Which tier produced the text of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Remote,
    Fallback,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
    pub origin: Origin,
    pub error_kind: Option<ErrorKind>,
}

impl TranslationResult {
    pub fn remote(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Remote,
            error_kind: None,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Fallback,
            error_kind: None,
        }
    }

    /// The original text handed back untouched, optionally tagged with why.
    pub fn unchanged(text: impl Into<String>, error_kind: Option<ErrorKind>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Unchanged,
            error_kind,
        }
    }

    pub fn empty() -> Self {
        Self::unchanged(String::new(), None)
    }
}
