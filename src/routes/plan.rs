use actix_web::{web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};

use crate::models::form::{TripRequest, MAX_TRIP_DAYS};
use crate::routes::{AppState, ErrorDetail};
use crate::services::composer;
use crate::services::hotel_link_service::HotelLinkService;
use crate::services::place_service::PlaceEnrichmentService;

/*
    POST /plan-trip
*/
pub async fn plan_trip(
    body: web::Json<TripRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let request = body.into_inner();

    if request.destination.trim().is_empty() {
        return bad_request("destination is required");
    }
    let Ok(start) = NaiveDate::parse_from_str(&request.start_date, "%Y-%m-%d") else {
        return bad_request("start_date must use the YYYY-MM-DD format");
    };
    let Ok(end) = NaiveDate::parse_from_str(&request.end_date, "%Y-%m-%d") else {
        return bad_request("end_date must use the YYYY-MM-DD format");
    };
    if start >= end {
        return bad_request("the start date must come before the end date");
    }
    let travel_days = (end - start).num_days() + 1;
    if travel_days > MAX_TRIP_DAYS {
        return bad_request("trips are limited to 4 nights (5 days)");
    }
    if start < Local::now().date_naive() {
        return bad_request("the start date must not be in the past");
    }

    println!(
        "Plan request: {} {} ~ {} ({} days, {} guests)",
        request.destination, request.start_date, request.end_date, travel_days, request.guests
    );

    let composed = match data.composer.compose_plan(&request, travel_days).await {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Composer call failed: {}", err);
            return HttpResponse::InternalServerError().json(ErrorDetail::new(format!(
                "itinerary generation failed: {}",
                err
            )));
        }
    };

    let mut plan = match composer::extract_json(&composed)
        .and_then(|json| serde_json::from_str(&json).ok())
    {
        Some(plan) => plan,
        None => {
            eprintln!("Composer output was not a plan document, using the fallback plan");
            composer::fallback_plan(&request, start, travel_days)
        }
    };

    let duplicates = composer::duplicate_locations(&plan);
    if !duplicates.is_empty() {
        eprintln!("Plan still repeats locations: {:?}", duplicates);
    }

    if let Some(geocoder) = &data.geocoder {
        PlaceEnrichmentService::new(geocoder.as_ref())
            .enrich_plan(&mut plan, &request.destination)
            .await;
    }

    plan.trip_hotel_search = Some(HotelLinkService::trip_hotel_search(
        &request.destination,
        &request.start_date,
        &request.end_date,
        request.guests,
        request.rooms,
    ));

    HttpResponse::Ok().json(plan)
}

fn bad_request(detail: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorDetail::new(detail))
}
