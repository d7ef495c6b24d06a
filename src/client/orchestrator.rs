//! Plan generation flow: one validated submission, one SSE progress channel
//! with a fallback timer, and exactly one synchronous plan request no matter
//! which of the completion triggers fires first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::client::session::{SessionPersistence, SessionStore};
use crate::models::form::{TripFormData, ValidationError};
use crate::models::progress::ProgressEvent;
use crate::models::trip::TripPlan;

/// How long to wait for the progress channel before falling back to the
/// synchronous request on its own.
pub const DEFAULT_PROGRESS_TIMEOUT: Duration = Duration::from_secs(8);

// Perceived-progress ticker while the synchronous request is in flight.
const TICK_INTERVAL: Duration = Duration::from_millis(400);
const TICK_STEP: u8 = 2;
const TICK_CAP: u8 = 95;

// Short hold at 100% so the user sees completion before the view swaps.
const COMPLETE_HOLD: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    Streaming,
    Finalizing,
    Done,
    Failed,
}

/// Observable progress state; consumers watch it and render whatever the
/// latest value says. Out-of-order or duplicate channel steps just
/// overwrite it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProgress {
    pub step: Option<u32>,
    pub message: String,
    pub percent: u8,
    pub phase: GenerationPhase,
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self {
            step: None,
            message: String::new(),
            percent: 0,
            phase: GenerationPhase::Idle,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{detail}")]
    Server { status: u16, detail: String },
    #[error("network error while generating the itinerary, please try again")]
    Network(#[source] reqwest::Error),
    #[error("the server returned an unreadable plan document")]
    InvalidPlan(#[source] reqwest::Error),
}

/// One-shot gate arbitrating the generation completion triggers
/// (channel-completed, channel-error, fallback timer). The first caller to
/// settle wins; everyone else observes false and must not proceed.
#[derive(Debug, Default)]
pub struct SettleGate {
    settled: AtomicBool,
}

impl SettleGate {
    pub fn try_settle(&self) -> bool {
        !self.settled.swap(true, Ordering::SeqCst)
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::SeqCst)
    }
}

pub struct PlanGenerator {
    http: reqwest::Client,
    base_url: String,
    progress_timeout: Duration,
    complete_hold: Duration,
    progress_tx: watch::Sender<GenerationProgress>,
}

impl PlanGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let (progress_tx, _) = watch::channel(GenerationProgress::default());
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            progress_timeout: DEFAULT_PROGRESS_TIMEOUT,
            complete_hold: COMPLETE_HOLD,
            progress_tx,
        }
    }

    /// Tune the fallback timeout (tests use tens of milliseconds).
    pub fn with_progress_timeout(mut self, timeout: Duration) -> Self {
        self.progress_timeout = timeout;
        self
    }

    pub fn with_complete_hold(mut self, hold: Duration) -> Self {
        self.complete_hold = hold;
        self
    }

    /// Watch the generation progress. Valid across submits; each submit
    /// resets the state to Streaming.
    pub fn subscribe(&self) -> watch::Receiver<GenerationProgress> {
        self.progress_tx.subscribe()
    }

    /// Submit the finished draft. On success the plan is persisted and the
    /// draft cleared; on any failure the draft is left intact for a retry.
    pub async fn submit<S: SessionStore>(
        &self,
        form: &TripFormData,
        session: &mut SessionPersistence<S>,
    ) -> Result<TripPlan, GenerationError> {
        let today = chrono::Local::now().date_naive();
        self.submit_with_today(form, session, today).await
    }

    /// `submit` with an injected "today" so date rules are testable.
    pub async fn submit_with_today<S: SessionStore>(
        &self,
        form: &TripFormData,
        session: &mut SessionPersistence<S>,
        today: chrono::NaiveDate,
    ) -> Result<TripPlan, GenerationError> {
        // fail fast, zero network calls
        form.validate(today)?;

        let request_id = Uuid::new_v4();
        println!(
            "[{}] Generating plan for {} ({} guests)",
            request_id,
            form.destination(),
            form.guests
        );

        self.publish(GenerationProgress {
            step: None,
            message: "여행 계획 생성을 시작합니다...".to_string(),
            percent: 0,
            phase: GenerationPhase::Streaming,
        });

        self.stream_progress(form).await;

        // all completion paths converge here, channel already closed
        let mut finalizing = self.progress_tx.borrow().clone();
        finalizing.message = "최종 일정을 정리하고 있습니다...".to_string();
        finalizing.percent = finalizing.percent.max(90);
        finalizing.phase = GenerationPhase::Finalizing;
        self.publish(finalizing);

        let ticker = self.spawn_ticker();
        let result = self.request_plan(form).await;
        // the ticker must die with the response, success or failure
        ticker.abort();

        match result {
            Ok(plan) => {
                self.publish(GenerationProgress {
                    step: None,
                    message: "여행 계획이 완성되었습니다!".to_string(),
                    percent: 100,
                    phase: GenerationPhase::Done,
                });
                tokio::time::sleep(self.complete_hold).await;
                session.persist_plan(&plan);
                session.clear_draft();
                println!("[{}] Plan ready: {}", request_id, plan.destination);
                Ok(plan)
            }
            Err(err) => {
                eprintln!("[{}] Generation failed: {}", request_id, err);
                let mut failed = self.progress_tx.borrow().clone();
                failed.phase = GenerationPhase::Failed;
                self.publish(failed);
                Err(err)
            }
        }
    }

    /// Consume the progress channel until one of the three completion
    /// triggers settles the gate: the channel says completed, the channel
    /// errors or ends, or the fallback timer fires. The channel is closed
    /// before returning in every path.
    async fn stream_progress(&self, form: &TripFormData) {
        let gate = SettleGate::default();
        let query: [(&str, String); 6] = [
            ("destination", form.destination().to_string()),
            (
                "start_date",
                form.start_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            (
                "end_date",
                form.end_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            ("budget", form.budget.as_str().to_string()),
            ("guests", form.guests.to_string()),
            ("rooms", form.rooms.to_string()),
        ];
        let request = self
            .http
            .get(format!("{}/plan-trip-progress", self.base_url))
            .query(&query);

        let mut channel = match EventSource::new(request) {
            Ok(channel) => channel,
            Err(err) => {
                eprintln!("Progress channel could not be opened: {}", err);
                return;
            }
        };

        let fallback = tokio::time::sleep(self.progress_timeout);
        tokio::pin!(fallback);

        loop {
            tokio::select! {
                _ = &mut fallback => {
                    if gate.try_settle() {
                        println!("Progress channel fallback timer fired");
                        break;
                    }
                }
                event = channel.next() => match event {
                    Some(Ok(Event::Open)) => {}
                    Some(Ok(Event::Message(msg))) => {
                        let parsed = serde_json::from_str::<ProgressEvent>(&msg.data);
                        match parsed {
                            Ok(event) => {
                                if event.is_error() {
                                    if gate.try_settle() {
                                        eprintln!(
                                            "Progress channel reported an error: {:?}",
                                            event.error
                                        );
                                        break;
                                    }
                                } else {
                                    self.publish_event(&event);
                                    if event.is_completed() && gate.try_settle() {
                                        break;
                                    }
                                }
                            }
                            Err(err) => eprintln!("Skipping unreadable progress event: {}", err),
                        }
                    }
                    Some(Err(err)) => {
                        if gate.try_settle() {
                            eprintln!("Progress channel closed: {}", err);
                            break;
                        }
                    }
                    None => {
                        if gate.try_settle() {
                            break;
                        }
                    }
                }
            }
        }

        // hard invariant: the channel is closed before finalization starts
        channel.close();
    }

    fn publish_event(&self, event: &ProgressEvent) {
        let current = self.progress_tx.borrow().clone();
        self.publish(GenerationProgress {
            step: event.step.or(current.step),
            message: event.message.clone().unwrap_or(current.message),
            percent: event.progress.unwrap_or(current.percent),
            phase: GenerationPhase::Streaming,
        });
    }

    fn publish(&self, progress: GenerationProgress) {
        self.progress_tx.send_replace(progress);
    }

    /// Nudge the displayed percentage while the synchronous request runs.
    /// Aborted by the caller the instant the response settles.
    fn spawn_ticker(&self) -> tokio::task::JoinHandle<()> {
        let tx = self.progress_tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.tick().await; // first tick completes immediately
            loop {
                interval.tick().await;
                let mut current = tx.borrow().clone();
                if current.percent < TICK_CAP {
                    current.percent = (current.percent + TICK_STEP).min(TICK_CAP);
                    tx.send_replace(current);
                }
            }
        })
    }

    /// The synchronous plan request. Issued exactly once per submit.
    async fn request_plan(&self, form: &TripFormData) -> Result<TripPlan, GenerationError> {
        let response = self
            .http
            .post(format!("{}/plan-trip", self.base_url))
            .json(&form.to_request())
            .send()
            .await
            .map_err(GenerationError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("detail")
                        .and_then(|d| d.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "the server could not generate an itinerary".to_string());
            return Err(GenerationError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<TripPlan>()
            .await
            .map_err(GenerationError::InvalidPlan)
    }
}
