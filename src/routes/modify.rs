use actix_web::{web, HttpResponse, Responder};

use crate::models::trip::{ChatModifyRequest, ChatModifyResponse, TripPlan};
use crate::routes::AppState;
use crate::services::composer;

const SUGGESTION: &str = "다음과 같이 더 구체적으로 요청해주세요: '3일차 마사지를 해운대 해변 산책으로 바꿔줘', '2일차 오후 일정을 맛집 투어로 바꿔줘'";

/*
    POST /modify-trip-chat
*/
pub async fn modify_trip_chat(
    body: web::Json<ChatModifyRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let request = body.into_inner();
    println!("Chat edit request: {}", request.message);

    let content = match data
        .composer
        .modify_plan(&request.message, &request.current_trip_plan)
        .await
    {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Composer edit call failed: {}", err);
            return HttpResponse::Ok().json(ChatModifyResponse {
                success: false,
                modified_plan: None,
                message: "일정 수정 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요."
                    .to_string(),
                suggestion: None,
            });
        }
    };

    let modified = composer::extract_json(&content)
        .and_then(|json| serde_json::from_str::<TripPlan>(&json).ok());

    match modified {
        Some(plan) => HttpResponse::Ok().json(ChatModifyResponse {
            success: true,
            modified_plan: Some(plan),
            message: "일정이 성공적으로 수정되었습니다.".to_string(),
            suggestion: None,
        }),
        None => {
            eprintln!("Composer edit output was not a plan document");
            HttpResponse::Ok().json(ChatModifyResponse {
                success: false,
                modified_plan: None,
                message: format!(
                    "'{}' 요청을 처리하는 중에 시스템 오류가 발생했습니다. 다시 시도해주세요.",
                    request.message
                ),
                suggestion: Some(SUGGESTION.to_string()),
            })
        }
    }
}
