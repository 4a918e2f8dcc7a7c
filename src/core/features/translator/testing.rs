//! Scripted provider shared by the translator tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::provider::RemoteTranslator;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::TranslationRequest;

#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// Always answer with this text
    Fixed(&'static str),
    /// Answer with `"<target>:<text>"`
    Echo,
    Network,
    Unsupported,
    /// Never answer
    Hang,
    /// Panic inside the call
    Panic,
}

pub struct MockRemote {
    outcome: Outcome,
    delay: Duration,
    calls: Mutex<Vec<TranslationRequest>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    started: Option<UnboundedSender<String>>,
}

impl MockRemote {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            started: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report the text of every call as soon as it starts
    pub fn with_started(mut self, started: UnboundedSender<String>) -> Self {
        self.started = Some(started);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|r| r.text.clone()).collect()
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteTranslator for MockRemote {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, request: &TranslationRequest) -> AppResult<String> {
        self.calls.lock().unwrap().push(request.clone());
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        if let Some(started) = &self.started {
            let _ = started.send(request.text.clone());
        }

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }

        let result = match self.outcome {
            Outcome::Fixed(text) => Ok(text.to_string()),
            Outcome::Echo => Ok(format!("{}:{}", request.target_code, request.text)),
            Outcome::Network => Err(AppError::Network("connection refused".to_string())),
            Outcome::Unsupported => Err(AppError::UnsupportedLanguage(request.target_code.clone())),
            Outcome::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Outcome::Panic => {
                self.active.fetch_sub(1, Ordering::SeqCst);
                panic!("provider crashed on {:?}", request.text);
            }
        };
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
