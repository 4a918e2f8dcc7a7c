//! Language directory
//!
//! Bidirectional lookup between language codes and the display names shown in selection lists.

use std::collections::HashMap;

use isolang::Language;
use tracing::{debug, warn};

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::LanguageEntry;

/// Placeholder returned for codes the directory does not know
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("zh", "Chinese"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("ar", "Arabic"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
    ("hy", "Armenian"),
    ("fa", "Persian"),
    ("vi", "Vietnamese"),
    ("id", "Indonesian"),
    ("ko", "Korean"),
    ("bn", "Bengali"),
    ("ur", "Urdu"),
    ("th", "Thai"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("hu", "Hungarian"),
];

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct LanguageDirectory {
    entries: Vec<LanguageEntry>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    default_code: String,
}

impl LanguageDirectory {
    /// Build a directory from `(code, display name)` pairs, keeping load order.
    ///
    /// Later duplicates of a code or of a case-normalized name are dropped. The default code must
    /// name one of the entries, since unknown names resolve to it.
    pub fn new<I, C, N>(entries: I, default_code: impl Into<String>) -> AppResult<Self>
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut directory = Self {
            entries: Vec::new(),
            by_code: HashMap::new(),
            by_name: HashMap::new(),
            default_code: default_code.into(),
        };
        for (code, name) in entries {
            directory.insert(code.into(), name.into());
        }
        if !directory.contains_code(&directory.default_code) {
            return Err(AppError::Validation(format!(
                "Default language code {} is not in the language directory",
                directory.default_code
            )));
        }
        Ok(directory)
    }

    /// The built-in table, optionally extended with extra ISO 639-1 codes.
    ///
    /// Names for the extra codes come from the ISO 639 reference names; unknown codes are skipped.
    /// The default code may be a built-in or an extra one.
    pub fn builtin(default_code: &str, extra_codes: &[String]) -> AppResult<Self> {
        let mut entries: Vec<(String, String)> = LANGUAGES
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
        for code in extra_codes {
            let code = code.trim().to_ascii_lowercase();
            match Language::from_639_1(&code) {
                Some(lang) => entries.push((code, lang.to_name().to_string())),
                None => warn!(code = %code, "Ignoring extra language: not an ISO 639-1 code"),
            }
        }
        Self::new(entries, default_code)
    }

    fn insert(&mut self, code: String, display_name: String) {
        let key = normalize(&display_name);
        if self.by_code.contains_key(&code) || self.by_name.contains_key(&key) {
            debug!(code = %code, name = %display_name, "Skipping duplicate language entry");
            return;
        }
        let index = self.entries.len();
        self.by_code.insert(code.clone(), index);
        self.by_name.insert(key, index);
        self.entries.push(LanguageEntry { code, display_name });
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    /// Resolve a display name to its code, falling back to the default code.
    pub fn code_for_name(&self, name: &str) -> String {
        self.by_name
            .get(&normalize(name))
            .map(|&i| self.entries[i].code.clone())
            .unwrap_or_else(|| self.default_code.clone())
    }

    pub fn name_for_code(&self, code: &str) -> String {
        self.by_code
            .get(code)
            .map(|&i| self.entries[i].display_name.clone())
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn all_display_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.display_name.clone()).collect()
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }
}
