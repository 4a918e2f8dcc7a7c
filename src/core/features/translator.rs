//! Translator feature
//!
//! A translation session ties the language directory, the tiered translation client and the
//! auto-translate scheduler together behind the small API a presentation layer drives.

pub mod client;
pub mod fallback;
pub mod languages;
pub mod provider;
pub mod scheduler;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::shared::emit::EventSender;
use crate::shared::error::AppResult;
use crate::shared::settings::AppSettings;
use crate::shared::types::{TranslationRequest, TranslationResult};

use client::TranslationClient;
use fallback::FallbackTranslationStore;
use languages::LanguageDirectory;
use scheduler::{AutoTranslateScheduler, SchedulerHandle, SchedulerPhase};

/// Exchange source and target. Applying it twice gives back the original pair.
pub fn swap(source_name: &str, target_name: &str) -> (String, String) {
    (target_name.to_string(), source_name.to_string())
}

/// Foreground state of one translator window: the selected pair, the current text and whether
/// auto-translate is on. Results of auto-translation arrive on the event channel.
pub struct TranslationSession {
    directory: Arc<LanguageDirectory>,
    client: Arc<TranslationClient>,
    scheduler: SchedulerHandle,
    source_name: String,
    target_name: String,
    text: String,
    auto_translate: bool,
}

impl TranslationSession {
    /// Create a session with auto-translate off.
    ///
    /// Spawns the scheduler task, so this must run inside a tokio runtime.
    pub fn new(
        directory: Arc<LanguageDirectory>,
        client: Arc<TranslationClient>,
        debounce: Duration,
        source_name: &str,
        target_name: &str,
        events: EventSender,
    ) -> Self {
        let scheduler = AutoTranslateScheduler::spawn(Arc::clone(&client), debounce, events);
        let source_name = directory.name_for_code(&directory.code_for_name(source_name));
        let target_name = directory.name_for_code(&directory.code_for_name(target_name));

        Self {
            directory,
            client,
            scheduler,
            source_name,
            target_name,
            text: String::new(),
            auto_translate: false,
        }
    }

    /// Build everything from the user's settings.
    ///
    /// The fallback dictionary never fails to load. A broken provider setup or a default language
    /// code missing from the directory is an error.
    pub async fn from_settings(settings: &AppSettings, events: EventSender) -> AppResult<Self> {
        let translator = &settings.translator;
        let directory = Arc::new(LanguageDirectory::builtin(
            &translator.default_language_code,
            &settings.extra_languages,
        )?);

        let fallback = match settings.fallback_path() {
            Ok(path) => FallbackTranslationStore::load(&path).await,
            Err(e) => {
                warn!(error = %e, "No fallback dictionary location, using default translations");
                FallbackTranslationStore::seed()
            }
        };

        let remote = provider::from_settings(translator)?;
        info!(
            provider = remote.name(),
            languages = directory.entries().len(),
            default_code = directory.default_code(),
            "Translator ready"
        );

        let client = Arc::new(TranslationClient::new(
            Arc::from(remote),
            Arc::new(fallback),
            translator.request_timeout(),
        ));

        let mut session = Self::new(
            directory,
            client,
            translator.debounce(),
            &settings.preferences.default_source_lang,
            &settings.preferences.default_target_lang,
            events,
        );
        session.set_auto_translate(settings.preferences.auto_translate);
        Ok(session)
    }

    pub fn resolve_language(&self, name: &str) -> String {
        self.directory.code_for_name(name)
    }

    pub fn language_name(&self, code: &str) -> String {
        self.directory.name_for_code(code)
    }

    /// Names for the selection lists, in directory order
    pub fn language_names(&self) -> Vec<String> {
        self.directory.all_display_names()
    }

    pub fn selected_languages(&self) -> (&str, &str) {
        (&self.source_name, &self.target_name)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_auto_translate(&self) -> bool {
        self.auto_translate
    }

    pub fn set_source_language(&mut self, name: &str) {
        self.source_name = self.canonical_name(name);
        self.resubmit();
    }

    pub fn set_target_language(&mut self, name: &str) {
        self.target_name = self.canonical_name(name);
        self.resubmit();
    }

    /// Manual translation with explicit arguments. Bypasses the scheduler entirely.
    pub async fn translate(&self, text: &str, source_name: &str, target_name: &str) -> TranslationResult {
        let request = TranslationRequest::new(
            text,
            self.directory.code_for_name(source_name),
            self.directory.code_for_name(target_name),
        );
        self.client.translate(&request).await
    }

    /// Manual translation of the current text with the selected pair
    pub async fn translate_current(&self) -> TranslationResult {
        self.client.translate(&self.current_request()).await
    }

    /// Swap the selected languages and re-translate the current text when auto mode is on.
    pub fn swap_languages(&mut self) -> (String, String) {
        let (source, target) = swap(&self.source_name, &self.target_name);
        self.source_name = source;
        self.target_name = target;
        debug!(source = %self.source_name, target = %self.target_name, "Swapped languages");
        self.resubmit();
        (self.source_name.clone(), self.target_name.clone())
    }

    /// Turn auto-translate on or off. Turning it on translates the current text right away
    /// (after the debounce).
    pub fn set_auto_translate(&mut self, enabled: bool) {
        self.auto_translate = enabled;
        self.scheduler.set_auto_translate(enabled);
        if enabled {
            self.resubmit();
        }
    }

    pub fn on_text_changed(&mut self, text: &str) {
        self.text = text.to_string();
        self.scheduler.on_text_changed(self.current_request());
    }

    /// Append pasted text to the current text
    pub fn paste_text(&mut self, pasted: &str) {
        let mut text = std::mem::take(&mut self.text);
        text.push_str(pasted);
        self.on_text_changed(&text);
    }

    /// Empty the input. In auto mode the empty text is submitted so the output clears too.
    pub fn clear(&mut self) {
        self.on_text_changed("");
    }

    pub async fn scheduler_phase(&self) -> AppResult<SchedulerPhase> {
        self.scheduler.phase().await
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    fn canonical_name(&self, name: &str) -> String {
        self.directory.name_for_code(&self.directory.code_for_name(name))
    }

    fn current_request(&self) -> TranslationRequest {
        TranslationRequest::new(
            self.text.clone(),
            self.directory.code_for_name(&self.source_name),
            self.directory.code_for_name(&self.target_name),
        )
    }

    fn resubmit(&self) {
        if !self.text.trim().is_empty() {
            self.scheduler.on_text_changed(self.current_request());
        }
    }
}
