use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_web::{dev::ServerHandle, http::StatusCode, web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use tripforge::models::form::TripRequest;
use tripforge::models::progress::ProgressEvent;
use tripforge::models::trip::TripPlan;
use tripforge::routes::progress::sse_frame;
use tripforge::services::composer::{ComposerError, PlanComposer};

/// How the stubbed progress endpoint behaves.
#[derive(Clone, Copy)]
pub enum ProgressBehavior {
    /// Emits one progress event, then holds the channel open forever:
    /// never completes, never errors. Only the fallback timer can settle.
    Quiet,
    /// Emits one progress event, then a completed event after ~50ms, then
    /// holds the channel open.
    CompleteQuickly,
}

#[derive(Clone)]
pub struct StubConfig {
    pub progress: ProgressBehavior,
    pub plan_status: u16,
    pub plan_body: serde_json::Value,
    pub plan_calls: Arc<AtomicUsize>,
    pub modify_body: serde_json::Value,
}

impl StubConfig {
    pub fn ok_plan(progress: ProgressBehavior, plan: serde_json::Value) -> Self {
        Self {
            progress,
            plan_status: 200,
            plan_body: plan,
            plan_calls: Arc::new(AtomicUsize::new(0)),
            modify_body: json!({"success": false, "message": "not configured"}),
        }
    }
}

fn frame(event: &ProgressEvent) -> web::Bytes {
    web::Bytes::from(sse_frame(event))
}

async fn progress_handler(data: web::Data<StubConfig>) -> HttpResponse {
    let behavior = data.progress;
    let stream = futures::stream::unfold(0u32, move |idx| async move {
        match behavior {
            ProgressBehavior::Quiet => {
                if idx == 0 {
                    let event = ProgressEvent {
                        step: Some(1),
                        message: Some("검증 중...".to_string()),
                        progress: Some(10),
                        ..Default::default()
                    };
                    Some((Ok::<_, actix_web::Error>(frame(&event)), 1))
                } else {
                    // keep the channel open without completing or erroring
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    None
                }
            }
            ProgressBehavior::CompleteQuickly => match idx {
                0 => {
                    let event = ProgressEvent {
                        step: Some(1),
                        progress: Some(50),
                        ..Default::default()
                    };
                    Some((Ok::<_, actix_web::Error>(frame(&event)), 1))
                }
                1 => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let event = ProgressEvent {
                        step: Some(2),
                        progress: Some(90),
                        completed: Some(true),
                        ..Default::default()
                    };
                    Some((Ok::<_, actix_web::Error>(frame(&event)), 2))
                }
                _ => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    None
                }
            },
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .streaming(stream)
}

async fn plan_handler(
    data: web::Data<StubConfig>,
    _body: web::Json<TripRequest>,
) -> HttpResponse {
    data.plan_calls.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(data.plan_status).unwrap_or(StatusCode::OK);
    HttpResponse::build(status).json(data.plan_body.clone())
}

async fn modify_handler(
    data: web::Data<StubConfig>,
    _body: web::Json<serde_json::Value>,
) -> HttpResponse {
    HttpResponse::Ok().json(data.modify_body.clone())
}

/// Run the stub backend on an ephemeral port. Returns its origin and the
/// handle to stop it.
pub async fn spawn_backend(config: StubConfig) -> (String, ServerHandle) {
    let data = web::Data::new(config);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/plan-trip", web::post().to(plan_handler))
            .route("/plan-trip-progress", web::get().to(progress_handler))
            .route("/modify-trip-chat", web::post().to(modify_handler))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind stub backend");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{}", addr), handle)
}

/// A plan document in the current activities shape.
pub fn sample_plan_json(days: u32) -> serde_json::Value {
    let itinerary: Vec<serde_json::Value> = (1..=days)
        .map(|day| {
            json!({
                "day": day,
                "date": format!("2025-06-{:02}", day),
                "activities": [
                    {
                        "time": "09:00",
                        "title": format!("{}일차 오전 관광", day),
                        "location": "해운대해수욕장",
                        "description": "바다 산책",
                        "duration": "2시간"
                    },
                    {
                        "time": "18:00",
                        "title": "저녁 식사",
                        "location": "자갈치시장",
                        "description": "회 한 접시",
                        "duration": "1.5시간"
                    }
                ]
            })
        })
        .collect();

    json!({
        "destination": "부산",
        "duration": format!("{}일", days),
        "itinerary": itinerary,
        "total_cost": "1인당 412,500원",
        "tips": ["우산 챙기기"],
    })
}

pub fn sample_plan(days: u32) -> TripPlan {
    serde_json::from_value(sample_plan_json(days)).expect("sample plan parses")
}

/// Fixed clock for date-rule tests.
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
}

/// Composer stub returning canned text, mirroring the mock handlers the
/// route tests are built around.
pub struct StubComposer {
    pub compose_output: Option<String>,
    pub modify_output: Option<String>,
}

impl StubComposer {
    pub fn composing(output: &str) -> Self {
        Self {
            compose_output: Some(output.to_string()),
            modify_output: None,
        }
    }

    pub fn modifying(output: &str) -> Self {
        Self {
            compose_output: None,
            modify_output: Some(output.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            compose_output: None,
            modify_output: None,
        }
    }
}

#[async_trait]
impl PlanComposer for StubComposer {
    async fn compose_plan(
        &self,
        _request: &TripRequest,
        _travel_days: i64,
    ) -> Result<String, ComposerError> {
        self.compose_output
            .clone()
            .ok_or(ComposerError::EmptyResponse)
    }

    async fn modify_plan(
        &self,
        _message: &str,
        _current_plan: &serde_json::Value,
    ) -> Result<String, ComposerError> {
        self.modify_output
            .clone()
            .ok_or(ComposerError::EmptyResponse)
    }
}
