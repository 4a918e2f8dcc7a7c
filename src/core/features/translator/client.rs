//! Tiered translation: one remote attempt, then the offline dictionary.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::fallback::FallbackTranslationStore;
use super::provider::RemoteTranslator;
use crate::shared::error::AppError;
use crate::shared::types::{TranslationRequest, TranslationResult};

pub struct TranslationClient {
    remote: Arc<dyn RemoteTranslator>,
    fallback: Arc<FallbackTranslationStore>,
    timeout: Duration,
}

impl TranslationClient {
    pub fn new(
        remote: Arc<dyn RemoteTranslator>,
        fallback: Arc<FallbackTranslationStore>,
        timeout: Duration,
    ) -> Self {
        Self { remote, fallback, timeout }
    }

    /// Translate `req`, always producing usable text.
    ///
    /// Blank input short-circuits without touching the provider. Otherwise exactly one remote
    /// attempt is made; no retries.
    pub async fn translate(&self, req: &TranslationRequest) -> TranslationResult {
        if req.is_blank() {
            return TranslationResult::empty();
        }

        let error = match tokio::time::timeout(self.timeout, self.remote.translate(req)).await {
            Ok(Ok(translated)) => {
                debug!(provider = self.remote.name(), "Remote translation succeeded");
                return TranslationResult::remote(translated);
            }
            Ok(Err(e)) => e,
            Err(elapsed) => AppError::from(elapsed),
        };

        let kind = error.kind();
        if !kind.is_recoverable() {
            warn!(
                provider = self.remote.name(),
                source = %req.source_code,
                target = %req.target_code,
                error = %error,
                "Language pair not supported by provider"
            );
            return TranslationResult::unchanged(req.text.clone(), Some(kind));
        }

        match self.translate_offline(req) {
            Some(translated) => {
                debug!(error = %error, "Remote translation failed, answered from fallback dictionary");
                TranslationResult::fallback(translated)
            }
            None => {
                warn!(error = %error, "Remote translation failed and fallback dictionary has no full coverage");
                TranslationResult::unchanged(req.text.clone(), Some(kind))
            }
        }
    }

    /// Word-by-word substitution from the fallback dictionary.
    ///
    /// Whitespace between words is kept as-is. Returns `None` unless every word resolves.
    pub fn translate_offline(&self, req: &TranslationRequest) -> Option<String> {
        let mut translated = String::with_capacity(req.text.len());
        for token in tokens(&req.text) {
            if token.chars().all(char::is_whitespace) {
                translated.push_str(token);
            } else {
                translated.push_str(self.fallback.lookup(token, &req.source_code, &req.target_code)?);
            }
        }
        Some(translated)
    }
}

/// Split `text` into alternating runs of whitespace and non-whitespace, keeping every character.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let space = rest.chars().next()?.is_whitespace();
        let end = rest
            .find(|c: char| c.is_whitespace() != space)
            .unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}
