mod common;

use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::json;
use serial_test::serial;

use common::StubComposer;
use tripforge::routes::{self, AppState};

fn state_with(composer: StubComposer) -> AppState {
    AppState {
        composer: Arc::new(composer),
        geocoder: None,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .route("/", web::get().to(routes::health::root))
                .route("/health", web::get().to(routes::health::health_check))
                .route("/plan-trip", web::post().to(routes::plan::plan_trip))
                .route(
                    "/plan-trip-progress",
                    web::get().to(routes::progress::plan_trip_progress),
                )
                .route(
                    "/modify-trip-chat",
                    web::post().to(routes::modify::modify_trip_chat),
                )
                .route("/hotel-links", web::get().to(routes::hotel::hotel_links)),
        )
        .await
    };
}

fn composed_plan_text() -> String {
    format!(
        "```json\n{}\n```",
        json!({
            "destination": "부산",
            "duration": "3일",
            "itinerary": [
                {"day": 1, "date": "2030-08-01", "activities": [
                    {"time": "09:00", "title": "해운대 산책", "location": "해운대해수욕장",
                     "description": "아침 산책", "duration": "2시간"}
                ]},
                {"day": 2, "date": "2030-08-02", "activities": [
                    {"time": "10:00", "title": "시장 투어", "location": "자갈치시장",
                     "description": "수산시장 구경", "duration": "2시간"}
                ]},
                {"day": 3, "date": "2030-08-03", "activities": [
                    {"time": "09:30", "title": "문화마을 구경", "location": "감천문화마을",
                     "description": "골목 산책", "duration": "3시간"}
                ]}
            ],
            "total_cost": "1인당 400,000원",
            "tips": ["바닷바람 대비"]
        })
    )
}

fn trip_body(start: &str, end: &str) -> serde_json::Value {
    json!({
        "destination": "부산",
        "start_date": start,
        "end_date": end,
        "budget": "보통",
        "interests": ["자연 관광"],
        "guests": 2,
        "rooms": 1
    })
}

#[actix_rt::test]
#[serial]
async fn root_banner_responds() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "여행 플래너 AI API");
}

#[actix_rt::test]
#[serial]
async fn plan_trip_rejects_reversed_dates() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::post()
        .uri("/plan-trip")
        .set_json(trip_body("2030-08-03", "2030-08-01"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "the start date must come before the end date");
}

#[actix_rt::test]
#[serial]
async fn plan_trip_rejects_spans_over_four_nights() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::post()
        .uri("/plan-trip")
        .set_json(trip_body("2030-08-01", "2030-08-07"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "trips are limited to 4 nights (5 days)");
}

#[actix_rt::test]
#[serial]
async fn plan_trip_rejects_past_start_dates() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::post()
        .uri("/plan-trip")
        .set_json(trip_body("2020-08-01", "2020-08-03"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "the start date must not be in the past");
}

#[actix_rt::test]
#[serial]
async fn plan_trip_returns_the_composed_plan_with_hotel_links() {
    let app = init_app!(state_with(StubComposer::composing(&composed_plan_text())));
    let req = test::TestRequest::post()
        .uri("/plan-trip")
        .set_json(trip_body("2030-08-01", "2030-08-03"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "부산");
    assert_eq!(body["itinerary"].as_array().unwrap().len(), 3);

    let search = &body["trip_hotel_search"];
    assert_eq!(search["check_in"], "2030-08-01");
    assert_eq!(search["guests"], 2);
    let links = search["search_links"].as_object().unwrap();
    assert_eq!(links.len(), 4);
    assert!(links["hotels"]["url"]
        .as_str()
        .unwrap()
        .contains("%EB%B6%80%EC%82%B0"));
}

#[actix_rt::test]
#[serial]
async fn plan_trip_falls_back_when_composer_output_is_not_json() {
    let app = init_app!(state_with(StubComposer::composing(
        "죄송합니다, 일정을 표 형태로 정리해 드렸습니다."
    )));
    let req = test::TestRequest::post()
        .uri("/plan-trip")
        .set_json(trip_body("2030-08-01", "2030-08-03"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    // templated fallback: one day per travel day, costed for the region
    assert_eq!(body["itinerary"].as_array().unwrap().len(), 3);
    assert!(body["total_cost"].as_str().unwrap().starts_with("1인당"));
    assert!(body["trip_hotel_search"].is_object());
}

#[actix_rt::test]
#[serial]
async fn plan_trip_reports_composer_failures() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::post()
        .uri("/plan-trip")
        .set_json(trip_body("2030-08-01", "2030-08-03"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("itinerary generation failed"));
}

#[actix_rt::test]
#[serial]
async fn modify_chat_returns_the_replacement_plan() {
    let replacement = json!({
        "destination": "부산",
        "duration": "3일",
        "itinerary": [
            {"day": 1, "date": "2030-08-01", "activities": [
                {"time": "09:00", "title": "광안리 산책", "location": "광안리해수욕장",
                 "description": "요청에 따라 교체", "duration": "2시간"}
            ]}
        ],
        "total_cost": "1인당 400,000원",
        "tips": []
    });
    let app = init_app!(state_with(StubComposer::modifying(
        &replacement.to_string()
    )));

    let req = test::TestRequest::post()
        .uri("/modify-trip-chat")
        .set_json(json!({
            "message": "1일차 해운대를 광안리로 바꿔줘",
            "current_trip_plan": {"destination": "부산"}
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["modified_plan"]["itinerary"][0]["activities"][0]["location"],
        "광안리해수욕장"
    );
}

#[actix_rt::test]
#[serial]
async fn modify_chat_failure_carries_a_suggestion() {
    let app = init_app!(state_with(StubComposer::modifying(
        "일정을 수정했습니다. 즐거운 여행 되세요!"
    )));

    let req = test::TestRequest::post()
        .uri("/modify-trip-chat")
        .set_json(json!({
            "message": "더 재미있게",
            "current_trip_plan": {"destination": "부산"}
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("더 재미있게"));
    assert!(body["suggestion"].as_str().unwrap().contains("구체적으로"));
}

#[actix_rt::test]
#[serial]
async fn progress_endpoint_speaks_sse() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::get()
        .uri("/plan-trip-progress?destination=%EB%B6%80%EC%82%B0&start_date=2030-08-01&end_date=2030-08-03")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(content_type, "text/event-stream");
}

#[actix_rt::test]
#[serial]
async fn hotel_links_encode_korean_destinations() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::get()
        .uri("/hotel-links?destination=%EB%B6%80%EC%82%B0&check_in=2030-08-01&check_out=2030-08-03&guests=2&rooms=1")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "부산");
    let links = body["booking_links"].as_object().unwrap();
    assert_eq!(links.len(), 4);
    for site in links.values() {
        let url = site["url"].as_str().unwrap();
        assert!(url.contains("%EB%B6%80%EC%82%B0"), "{url}");
    }
}

#[actix_rt::test]
#[serial]
async fn health_reports_service_configuration() {
    let app = init_app!(state_with(StubComposer::failing()));
    let req = test::TestRequest::get().uri("/health").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["status"] == "ok" || body["status"] == "degraded");
    assert!(body["services"]["composer"].is_object());
    assert!(body["services"]["geocoder"].is_object());
    assert!(body["version"].is_string());
}
