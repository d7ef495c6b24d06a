use std::time::Duration;

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::models::progress::ProgressEvent;

/// Scripted generation stages: (step, message, progress %, delay before the
/// next frame). The stream stops at 90%; the synchronous /plan-trip call
/// carries the rest.
const PROGRESS_SCRIPT: &[(u32, &str, u8, u64)] = &[
    (1, "여행 정보를 검증하고 있습니다...", 8, 800),
    (2, "여행 데이터를 분석하고 있습니다...", 15, 1000),
    (3, "AI 시스템을 준비하고 있습니다...", 25, 1200),
    (4, "목적지 기본 정보를 수집하고 있습니다...", 35, 1400),
    (5, "관광지 데이터베이스를 조회하고 있습니다...", 45, 1600),
    (6, "맞춤형 추천을 준비하고 있습니다...", 55, 1200),
    (7, "여행 패턴을 분석하고 있습니다...", 65, 1400),
    (8, "일정 최적화를 준비하고 있습니다...", 75, 1000),
    (9, "AI 모델을 로딩하고 있습니다...", 82, 800),
    (10, "여행 계획 생성을 준비하고 있습니다...", 88, 800),
    (11, "AI가 여행 계획을 생성하고 있습니다...", 90, 800),
];

pub const TOTAL_STEPS: u32 = PROGRESS_SCRIPT.len() as u32;

fn default_guests() -> u32 {
    2
}

fn default_rooms() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default = "default_guests")]
    pub guests: u32,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
}

/// The scripted events, in order. Shared with the handler and the tests.
pub fn scripted_events() -> Vec<ProgressEvent> {
    PROGRESS_SCRIPT
        .iter()
        .map(|(step, message, progress, _)| ProgressEvent {
            step: Some(*step),
            message: Some(message.to_string()),
            progress: Some(*progress),
            total_steps: Some(TOTAL_STEPS),
            completed: None,
            error: None,
        })
        .collect()
}

/// One wire frame of the event stream.
pub fn sse_frame(event: &ProgressEvent) -> String {
    format!(
        "data: {}\n\n",
        serde_json::to_string(event).unwrap_or_default()
    )
}

/*
    GET /plan-trip-progress
*/
pub async fn plan_trip_progress(query: web::Query<ProgressQuery>) -> impl Responder {
    println!(
        "Progress stream opened: {} {} ~ {}",
        query.destination, query.start_date, query.end_date
    );

    let stream = futures::stream::unfold(0usize, |idx| async move {
        if idx >= PROGRESS_SCRIPT.len() {
            return None;
        }
        if idx > 0 {
            // pacing between frames; the first one goes out immediately
            tokio::time::sleep(Duration::from_millis(PROGRESS_SCRIPT[idx - 1].3)).await;
        }
        let (step, message, progress, _) = PROGRESS_SCRIPT[idx];
        let event = ProgressEvent {
            step: Some(step),
            message: Some(message.to_string()),
            progress: Some(progress),
            total_steps: Some(TOTAL_STEPS),
            completed: None,
            error: None,
        };
        let frame = web::Bytes::from(sse_frame(&event));
        Some((Ok::<web::Bytes, actix_web::Error>(frame), idx + 1))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("Connection", "keep-alive"))
        .streaming(stream)
}
