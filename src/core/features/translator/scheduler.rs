//! Auto-translate scheduler
//!
//! A single task owns the scheduler state. The foreground talks to it through a non-blocking
//! command channel, translation calls run as their own tasks and report back over a second
//! channel, and results go out on the session event channel.
//!
//! ```text
//! Disabled --enable--> Idle --text--> Waiting --debounce--> InFlight --done--> Idle
//!                                       ^                      |
//!                                       |                    text
//!                                       |                      v
//!                                       +------done------ WaitingWithPending
//! ```
//!
//! Disabling is best-effort: a call already in flight runs to completion and its result is
//! dropped. Until it lands, no second call is started even if auto-translate is re-enabled.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::client::TranslationClient;
use crate::shared::emit::{emit_event, EventSender};
use crate::shared::error::{AppError, AppResult, ErrorKind};
use crate::shared::events::SessionEvent;
use crate::shared::types::{TranslationRequest, TranslationResult};

/// Default quiet period before a changed text is submitted
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulerPhase {
    Disabled,
    Idle,
    /// Debounce timer running
    Waiting,
    InFlight,
    /// A call is in flight and newer text arrived meanwhile
    WaitingWithPending,
}

enum SchedulerCommand {
    SetEnabled(bool),
    TextChanged(TranslationRequest),
    Phase(oneshot::Sender<SchedulerPhase>),
    Shutdown,
}

struct Completion {
    epoch: u64,
    request: TranslationRequest,
    result: TranslationResult,
}

/// Cheap, cloneable handle used by the foreground to drive the scheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<SchedulerCommand>,
}

impl SchedulerHandle {
    pub fn set_auto_translate(&self, enabled: bool) {
        self.send(SchedulerCommand::SetEnabled(enabled));
    }

    pub fn on_text_changed(&self, request: TranslationRequest) {
        self.send(SchedulerCommand::TextChanged(request));
    }

    /// Current state of the machine, mostly useful for diagnostics and tests
    pub async fn phase(&self) -> AppResult<SchedulerPhase> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SchedulerCommand::Phase(reply))
            .map_err(|_| AppError::System("Scheduler stopped".to_string()))?;
        rx.await
            .map_err(|_| AppError::System("Scheduler stopped".to_string()))
    }

    /// Stop the scheduler task. Any call in flight still finishes; its result is dropped.
    pub fn shutdown(&self) {
        self.send(SchedulerCommand::Shutdown);
    }

    fn send(&self, command: SchedulerCommand) {
        if self.tx.send(command).is_err() {
            warn!("Scheduler stopped, command dropped");
        }
    }
}

pub struct AutoTranslateScheduler {
    client: Arc<TranslationClient>,
    debounce: Duration,
    events: EventSender,
    done_tx: mpsc::UnboundedSender<Completion>,

    enabled: bool,
    /// Bumped on every disable so results from before it can be recognised
    epoch: u64,
    last_submitted: Option<TranslationRequest>,
    in_flight: bool,
    pending: Option<TranslationRequest>,
    /// Text waiting for the debounce deadline
    latest: Option<TranslationRequest>,
    deadline: Option<Instant>,
}

impl AutoTranslateScheduler {
    /// Start the scheduler task in the `Disabled` state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(client: Arc<TranslationClient>, debounce: Duration, events: EventSender) -> SchedulerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let scheduler = Self {
            client,
            debounce,
            events,
            done_tx,
            enabled: false,
            epoch: 0,
            last_submitted: None,
            in_flight: false,
            pending: None,
            latest: None,
            deadline: None,
        };
        tokio::spawn(scheduler.run(rx, done_rx));

        SchedulerHandle { tx }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SchedulerCommand>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        info!(debounce_ms = self.debounce.as_millis() as u64, "Auto-translate scheduler started");

        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SchedulerCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(done) = completions.recv() => self.complete(done),
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire();
                }
            }
        }

        info!("Auto-translate scheduler stopped");
    }

    fn phase(&self) -> SchedulerPhase {
        if !self.enabled {
            SchedulerPhase::Disabled
        } else if self.in_flight && self.pending.is_some() {
            SchedulerPhase::WaitingWithPending
        } else if self.in_flight {
            SchedulerPhase::InFlight
        } else if self.deadline.is_some() {
            SchedulerPhase::Waiting
        } else {
            SchedulerPhase::Idle
        }
    }

    fn handle(&mut self, command: SchedulerCommand) {
        match command {
            SchedulerCommand::SetEnabled(true) => {
                if !self.enabled {
                    self.enabled = true;
                    debug!("Auto-translate enabled");
                }
            }
            SchedulerCommand::SetEnabled(false) => {
                if self.enabled {
                    self.enabled = false;
                    self.epoch += 1;
                    self.deadline = None;
                    self.latest = None;
                    self.pending = None;
                    self.last_submitted = None;
                    debug!(in_flight = self.in_flight, "Auto-translate disabled");
                }
            }
            SchedulerCommand::TextChanged(request) => self.text_changed(request),
            SchedulerCommand::Phase(reply) => {
                let _ = reply.send(self.phase());
            }
            SchedulerCommand::Shutdown => {}
        }
    }

    fn text_changed(&mut self, request: TranslationRequest) {
        if !self.enabled {
            return;
        }
        if self.in_flight {
            debug!("Text changed during flight, queued as pending");
            self.pending = Some(request);
        } else {
            self.schedule(request);
        }
    }

    /// (Re)start the debounce timer for `request`
    fn schedule(&mut self, request: TranslationRequest) {
        self.latest = Some(request);
        self.deadline = Some(Instant::now() + self.debounce);
    }

    fn fire(&mut self) {
        self.deadline = None;
        let Some(request) = self.latest.take() else {
            return;
        };
        if self.in_flight {
            self.pending = Some(request);
            return;
        }
        if self.last_submitted.as_ref() == Some(&request) {
            debug!("Text unchanged since last translation, skipping");
            return;
        }
        self.submit(request);
    }

    fn submit(&mut self, request: TranslationRequest) {
        self.in_flight = true;
        self.last_submitted = Some(request.clone());

        let client = Arc::clone(&self.client);
        let done = self.done_tx.clone();
        let epoch = self.epoch;
        debug!(epoch, source = %request.source_code, target = %request.target_code, "Submitting translation");

        // The call gets its own task so a panicking provider still reports back and frees the slot
        let call = {
            let request = request.clone();
            tokio::spawn(async move { client.translate(&request).await })
        };
        tokio::spawn(async move {
            let result = match call.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(epoch, error = %e, "Translation task failed");
                    TranslationResult::unchanged(request.text.clone(), Some(ErrorKind::NetworkError))
                }
            };
            let _ = done.send(Completion { epoch, request, result });
        });
    }

    fn complete(&mut self, done: Completion) {
        self.in_flight = false;

        if !self.enabled || done.epoch != self.epoch {
            debug!(epoch = done.epoch, "Discarding result of a call started before auto-translate was disabled");
            if let Some(next) = self.pending.take() {
                self.schedule(next);
            }
            return;
        }

        let unsupported = done.result.error_kind == Some(ErrorKind::UnsupportedLanguage);
        if unsupported {
            emit_event(
                &self.events,
                SessionEvent::UnsupportedLanguage {
                    source_code: done.request.source_code.clone(),
                    target_code: done.request.target_code.clone(),
                },
            );
        }

        if let Some(next) = self.pending.take() {
            debug!("Discarding stale result, translating newer text");
            self.last_submitted = None;
            self.schedule(next);
            return;
        }

        emit_event(&self.events, SessionEvent::Translated(done.result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::translator::fallback::FallbackTranslationStore;
    use crate::core::features::translator::testing::{MockRemote, Outcome};

    const DEBOUNCE: Duration = Duration::from_secs(1);
    const CALL_TIME: Duration = Duration::from_secs(5);

    struct Harness {
        handle: SchedulerHandle,
        remote: Arc<MockRemote>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        started: mpsc::UnboundedReceiver<String>,
    }

    fn harness(outcome: Outcome) -> Harness {
        let (started_tx, started) = mpsc::unbounded_channel();
        let remote = Arc::new(MockRemote::new(outcome).with_delay(CALL_TIME).with_started(started_tx));
        let client = Arc::new(TranslationClient::new(
            remote.clone(),
            Arc::new(FallbackTranslationStore::seed()),
            Duration::from_secs(30),
        ));
        let (events_tx, events) = mpsc::unbounded_channel();
        let handle = AutoTranslateScheduler::spawn(client, DEBOUNCE, events_tx);
        Harness { handle, remote, events, started }
    }

    fn req(text: &str) -> TranslationRequest {
        TranslationRequest::new(text, "en", "es")
    }

    fn translated(text: &str) -> SessionEvent {
        SessionEvent::Translated(TranslationResult::remote(text))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_coalesce_into_one_call() {
        let mut h = harness(Outcome::Echo);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("t1"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        h.handle.on_text_changed(req("t2"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        h.handle.on_text_changed(req("t3"));

        assert_eq!(h.events.recv().await, Some(translated("es:t3")));
        assert_eq!(h.remote.calls(), vec!["t3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_during_flight_never_overlap() {
        let mut h = harness(Outcome::Echo);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("t1"));
        assert_eq!(h.started.recv().await.as_deref(), Some("t1"));

        h.handle.on_text_changed(req("t2"));
        h.handle.on_text_changed(req("t3"));
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::WaitingWithPending);

        // The t1 result is stale by the time it lands, so only t3 is delivered
        assert_eq!(h.events.recv().await, Some(translated("es:t3")));
        assert_eq!(h.remote.calls(), vec!["t1", "t3"]);
        assert_eq!(h.remote.max_concurrent(), 1);
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_transitions() {
        let mut h = harness(Outcome::Echo);
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::Disabled);

        h.handle.set_auto_translate(true);
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::Idle);

        h.handle.on_text_changed(req("hello"));
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::Waiting);

        h.started.recv().await;
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::InFlight);

        h.events.recv().await;
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::Idle);

        h.handle.set_auto_translate(false);
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::Disabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_ignored_while_disabled() {
        let mut h = harness(Outcome::Echo);
        h.handle.on_text_changed(req("hello"));
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(h.remote.calls().is_empty());
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_cancels_debounce() {
        let mut h = harness(Outcome::Echo);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("hello"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        h.handle.set_auto_translate(false);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(h.remote.calls().is_empty());
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_discards_in_flight_result() {
        let mut h = harness(Outcome::Echo);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("hello"));
        h.started.recv().await;

        h.handle.set_auto_translate(false);
        tokio::time::sleep(Duration::from_secs(30)).await;

        // The call ran to completion but nothing reached the consumer
        assert_eq!(h.remote.calls(), vec!["hello"]);
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenable_waits_for_orphaned_call() {
        let mut h = harness(Outcome::Echo);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("t1"));
        h.started.recv().await;

        h.handle.set_auto_translate(false);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("t2"));
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::WaitingWithPending);

        assert_eq!(h.events.recv().await, Some(translated("es:t2")));
        assert_eq!(h.remote.calls(), vec!["t1", "t2"]);
        assert_eq!(h.remote.max_concurrent(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_unsupported_result_is_still_reported() {
        let mut h = harness(Outcome::Unsupported);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("t1"));
        h.started.recv().await;
        h.handle.on_text_changed(req("t2"));

        let unsupported = SessionEvent::UnsupportedLanguage {
            source_code: "en".to_string(),
            target_code: "es".to_string(),
        };
        // Stale t1 still reports the category failure
        assert_eq!(h.events.recv().await, Some(unsupported.clone()));
        // Then t2 settles with the same failure and its own result
        assert_eq!(h.events.recv().await, Some(unsupported));
        assert_eq!(
            h.events.recv().await,
            Some(SessionEvent::Translated(TranslationResult::unchanged(
                "t2",
                Some(ErrorKind::UnsupportedLanguage)
            )))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_network_failure_is_silent() {
        let mut h = harness(Outcome::Network);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("t1"));
        h.started.recv().await;
        h.handle.on_text_changed(req("hello world"));

        // Only the newest text settles, answered from the fallback dictionary
        assert_eq!(
            h.events.recv().await,
            Some(SessionEvent::Translated(TranslationResult::fallback("hola mundo")))
        );
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_request_is_not_resubmitted() {
        let mut h = harness(Outcome::Echo);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("hello"));
        assert_eq!(h.events.recv().await, Some(translated("es:hello")));

        h.handle.on_text_changed(req("hello"));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(h.remote.calls(), vec!["hello"]);

        // A different pair is a different request
        h.handle.on_text_changed(TranslationRequest::new("hello", "en", "fr"));
        assert_eq!(h.events.recv().await, Some(translated("fr:hello")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_scheduler() {
        let h = harness(Outcome::Echo);
        h.handle.shutdown();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(h.handle.phase().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_provider_does_not_wedge_scheduler() {
        let mut h = harness(Outcome::Panic);
        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("a"));
        assert_eq!(h.started.recv().await.as_deref(), Some("a"));
        h.handle.on_text_changed(req("b"));

        // The crashed call for "a" is stale; "b" still gets its own call and a usable result
        assert_eq!(
            h.events.recv().await,
            Some(SessionEvent::Translated(TranslationResult::unchanged(
                "b",
                Some(ErrorKind::NetworkError)
            )))
        );
        assert_eq!(h.remote.calls(), vec!["a", "b"]);
        assert_eq!(h.handle.phase().await.unwrap(), SchedulerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_interleavings_keep_one_call_in_flight() {
        let mut h = harness(Outcome::Echo);
        // Small LCG so the sequence is repeatable
        let mut seed: u64 = 0x2545_f491;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (seed >> 33) % bound
        };

        for i in 0..300 {
            match next(6) {
                0 | 1 => h.handle.on_text_changed(req(&format!("t{}", i))),
                2 => h.handle.set_auto_translate(true),
                3 => h.handle.set_auto_translate(false),
                4 => tokio::time::sleep(Duration::from_millis(next(2_500))).await,
                _ => tokio::time::sleep(CALL_TIME).await,
            }
        }

        h.handle.set_auto_translate(true);
        h.handle.on_text_changed(req("last"));
        loop {
            match h.events.recv().await {
                Some(event) if event == translated("es:last") => break,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }

        assert!(h.remote.calls().len() > 1);
        assert_eq!(h.remote.max_concurrent(), 1);
    }
}
