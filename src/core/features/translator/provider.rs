//! Remote translation providers
//!
//! A provider makes exactly one attempt and reports failures as `AppError`s; classification and
//! fallback happen in the client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::{ProviderKind, TranslatorSettings};
use crate::shared::types::TranslationRequest;

#[async_trait]
pub trait RemoteTranslator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Translate the whole request text in a single attempt.
    ///
    /// Implementations return `AppError::UnsupportedLanguage` when the pair cannot be serviced,
    /// `AppError::Timeout` when the transport gave up waiting, anything else for transient failures.
    async fn translate(&self, request: &TranslationRequest) -> AppResult<String>;
}

/// Build the provider selected in the settings
pub fn from_settings(settings: &TranslatorSettings) -> AppResult<Box<dyn RemoteTranslator>> {
    match settings.provider {
        ProviderKind::Google => Ok(Box::new(GoogleTranslator::new(
            settings.endpoint.clone(),
            settings.request_timeout(),
        )?)),
        ProviderKind::Offline => Ok(Box::new(OfflineTranslator)),
    }
}

/// Unofficial Google Translate endpoint (free tier, no API key)
pub struct GoogleTranslator {
    http: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: String, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("translator-session/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    fn build_url(&self, request: &TranslationRequest) -> String {
        format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.endpoint,
            urlencoding::encode(&request.source_code),
            urlencoding::encode(&request.target_code),
            urlencoding::encode(&request.text)
        )
    }
}

/// Pull the translated text out of the nested array response:
/// `[[["Translated Text", "Original", ...], ...], null, "en"]`
pub fn parse_google_response(json: &serde_json::Value) -> AppResult<String> {
    let sentences = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Validation("Invalid response format from Google".to_string()))?;

    let translated: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(|v| v.as_str()))
        .collect();

    if translated.is_empty() {
        return Err(AppError::Validation("Empty translation in Google response".to_string()));
    }
    Ok(translated)
}

#[async_trait]
impl RemoteTranslator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(&self, request: &TranslationRequest) -> AppResult<String> {
        let url = self.build_url(request);
        debug!(source = %request.source_code, target = %request.target_code, "Requesting Google translation");

        let res = self.http.get(&url).send().await?;

        let status = res.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(AppError::UnsupportedLanguage(format!(
                "{} -> {}",
                request.source_code, request.target_code
            )));
        }
        if !status.is_success() {
            return Err(AppError::Network(format!("Google API Error: {}", status)));
        }

        let raw_json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to parse JSON: {}", e)))?;

        parse_google_response(&raw_json)
    }
}

/// Provider that never reaches anything; every request goes to the fallback dictionary.
pub struct OfflineTranslator;

#[async_trait]
impl RemoteTranslator for OfflineTranslator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn translate(&self, _request: &TranslationRequest) -> AppResult<String> {
        Err(AppError::Network("offline mode".to_string()))
    }
}
