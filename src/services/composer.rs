//! The AI collaborator that writes and rewrites itineraries.
//!
//! The planner treats the model as an external service returning a plan
//! document; everything here is the seam (trait), the HTTP wrapper, and the
//! salvage logic for responses that arrive wrapped in prose or code fences.

use std::{collections::HashSet, env, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::models::form::{TravelPace, TripRequest};
use crate::models::trip::{Activity, Day, DaySchedule, TripPlan};
use crate::services::cost_service::CostService;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const COMPOSE_MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 3000;
const COMPOSE_TEMPERATURE: f64 = 0.3;
const MODIFY_TEMPERATURE: f64 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("AI service request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("AI service returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("AI service returned an empty response")]
    EmptyResponse,
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingKey,
}

/// External collaborator producing plan documents as raw model text.
#[async_trait]
pub trait PlanComposer: Send + Sync {
    async fn compose_plan(
        &self,
        request: &TripRequest,
        travel_days: i64,
    ) -> Result<String, ComposerError>;

    async fn modify_plan(
        &self,
        message: &str,
        current_plan: &serde_json::Value,
    ) -> Result<String, ComposerError>;
}

pub struct OpenAiComposer {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiComposer {
    pub fn from_env() -> Result<Self, ComposerError> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| ComposerError::MissingKey)?;
        Ok(Self::with_key(api_key, OPENAI_BASE_URL.to_string()))
    }

    pub fn with_key(api_key: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            base_url,
            model: COMPOSE_MODEL.to_string(),
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
    ) -> Result<String, ComposerError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": temperature,
        });

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ComposerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ComposerError::EmptyResponse)
    }
}

#[async_trait]
impl PlanComposer for OpenAiComposer {
    async fn compose_plan(
        &self,
        request: &TripRequest,
        travel_days: i64,
    ) -> Result<String, ComposerError> {
        let pace = match request.travel_pace {
            Some(TravelPace::Tight) => "타이트하게 (하루 4개 활동)",
            Some(TravelPace::Relaxed) => "널널하게 (하루 3개 활동)",
            None => "보통 (하루 3개 활동)",
        };
        let interests = if request.interests.is_empty() {
            "일반적인 관광".to_string()
        } else {
            request.interests.join(", ")
        };

        let system = format!(
            "당신은 전문 여행 플래너입니다. {travel_days}일 여행 일정을 JSON으로만 작성하세요. \
             모든 장소는 실제 존재하는 고유명사를 사용하고, 전체 여행에서 같은 장소를 두 번 \
             추천하지 마세요. location에는 장소명만, title에는 화면에 표시할 활동명을 넣으세요."
        );
        let user = format!(
            "목적지: {destination}\n여행 기간: {start} ~ {end} (총 {travel_days}일)\n\
             인원수: {guests}명\n객실: {rooms}개\n예산: {budget}\n관심사: {interests}\n\
             여행 페이스: {pace}\n\n\
             JSON 형식:\n\
             {{\"destination\": \"{destination}\", \"duration\": \"{travel_days}일\", \
             \"itinerary\": [{{\"day\": 1, \"date\": \"{start}\", \"activities\": \
             [{{\"time\": \"09:00\", \"title\": \"활동명\", \"location\": \"장소명\", \
             \"description\": \"설명\", \"duration\": \"소요시간\"}}]}}], \
             \"total_cost\": \"1인당 XXX,XXX원\", \"tips\": [\"여행 팁\"]}}",
            destination = request.destination,
            start = request.start_date,
            end = request.end_date,
            guests = request.guests,
            rooms = request.rooms,
            budget = request.budget.as_str(),
        );

        self.chat(&system, &user, COMPOSE_TEMPERATURE).await
    }

    async fn modify_plan(
        &self,
        message: &str,
        current_plan: &serde_json::Value,
    ) -> Result<String, ComposerError> {
        let system = "당신은 여행 계획 수정 전문가입니다. 일정 추가, 제거, 교체, 이동, 변경 \
                      요청을 처리합니다. 새 장소는 실제 존재하는 관광지여야 하며 기존 장소와 \
                      중복되면 안 됩니다. 코드 블록이나 설명 없이 순수 JSON만 출력하세요.";
        let user = format!(
            "다음은 현재 여행 계획입니다:\n\n{plan}\n\n사용자의 수정 요청: \"{message}\"\n\n\
             위 요청에 따라 계획을 수정해주세요. destination, duration, total_cost, tips 등 \
             기본 정보는 그대로 유지하고 JSON 형식을 정확히 지켜주세요.",
            plan = serde_json::to_string_pretty(current_plan).unwrap_or_default(),
        );

        self.chat(system, &user, MODIFY_TEMPERATURE).await
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Pull the JSON document out of a model response that may carry code
/// fences or surrounding prose. Returns the `{...}` slice, or None when no
/// braces are present.
pub fn extract_json(content: &str) -> Option<String> {
    let mut text = content.trim();

    if text.starts_with("```") {
        let mut lines: Vec<&str> = text.lines().collect();
        if matches!(lines.first().map(|l| l.trim()), Some("```") | Some("```json")) {
            lines.remove(0);
        }
        if lines.last().map(|l| l.trim()) == Some("```") {
            lines.pop();
        }
        return extract_json(&lines.join("\n"));
    }

    if text.starts_with('"') && text.ends_with('"') && text.len() >= 2 {
        text = &text[1..text.len() - 1];
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}

/// Locations that appear more than once across the whole itinerary. The
/// composer is instructed not to repeat places; leftovers are logged by the
/// route so regressions in the prompt are visible.
pub fn duplicate_locations(plan: &TripPlan) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for day in &plan.itinerary {
        for activity in day.schedule.activities() {
            let location = activity.location.trim();
            if location.is_empty() {
                continue;
            }
            if !seen.insert(location.to_string()) && !duplicates.contains(&location.to_string()) {
                duplicates.push(location.to_string());
            }
        }
    }
    duplicates
}

/// Deterministic plan used when the composer output cannot be parsed: one
/// templated day per travel day, shaped by the requested pace.
pub fn fallback_plan(request: &TripRequest, start: NaiveDate, travel_days: i64) -> TripPlan {
    let destination = &request.destination;
    let mut itinerary = Vec::new();

    for day_number in 1..=travel_days {
        let date = start + chrono::Duration::days(day_number - 1);
        let activities = match request.travel_pace {
            Some(TravelPace::Tight) => vec![
                template_activity("09:00", &format!("{}일차 오전 관광", day_number), &format!("{} 주요 관광지", destination), "주요 관광지 방문", "2시간"),
                template_activity("12:00", "점심 및 현지 명소", &format!("{} 맛집", destination), "현지 음식 체험 후 명소 탐방", "2시간"),
                template_activity("15:00", "오후 체험 활동", &format!("{} 체험장소", destination), "액티비티 참여", "2.5시간"),
                template_activity("18:30", "저녁 식사", &format!("{} 음식점", destination), "저녁 식사 및 휴식", "1.5시간"),
            ],
            Some(TravelPace::Relaxed) => vec![
                template_activity("10:00", &format!("{}일차 여유로운 관광", day_number), &format!("{} 대표 관광지", destination), "천천히 둘러보며 여유있게 관광", "3시간"),
                template_activity("15:00", "점심 및 현지 체험", &format!("{} 유명 맛집", destination), "현지 특색 음식을 여유롭게 즐기고 문화 체험", "2.5시간"),
                template_activity("19:00", "저녁 식사 및 산책", &format!("{} 저녁 맛집", destination), "현지 음식을 즐기며 여유로운 저녁 산책", "2시간"),
            ],
            None => vec![
                template_activity("09:30", &format!("{}일차 오전 관광", day_number), &format!("{} 주요 관광지", destination), "주요 관광지 방문", "2.5시간"),
                template_activity("13:30", "점심 및 오후 활동", &format!("{} 맛집", destination), "현지 음식 체험 후 오후 활동", "3시간"),
                template_activity("18:00", "저녁 식사", &format!("{} 음식점", destination), "저녁 식사 및 휴식", "1.5시간"),
            ],
        };

        itinerary.push(Day {
            day: day_number as u32,
            date: date.format("%Y-%m-%d").to_string(),
            schedule: DaySchedule::Activities { activities },
        });
    }

    let cost = CostService::estimate_per_person(request.budget, travel_days, destination);

    TripPlan {
        destination: destination.clone(),
        duration: format!("{} ~ {}", request.start_date, request.end_date),
        itinerary,
        accommodation: Vec::new(),
        total_cost: CostService::format_per_person(cost),
        tips: vec![
            "여행 전 날짜 확인".to_string(),
            "필수품 준비".to_string(),
            "현지 교통 정보 파악".to_string(),
        ],
        trip_hotel_search: None,
    }
}

fn template_activity(
    time: &str,
    title: &str,
    location: &str,
    description: &str,
    duration: &str,
) -> Activity {
    Activity {
        time: time.to_string(),
        title: title.to_string(),
        location: location.to_string(),
        real_address: None,
        place_category: None,
        place_telephone: None,
        description: description.to_string(),
        duration: Some(duration.to_string()),
    }
}
