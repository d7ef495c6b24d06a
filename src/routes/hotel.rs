use std::collections::HashMap;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::models::trip::BookingSite;
use crate::services::hotel_link_service::HotelLinkService;

fn default_guests() -> u32 {
    2
}

fn default_rooms() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct HotelLinksQuery {
    pub destination: String,
    pub check_in: String,
    pub check_out: String,
    #[serde(default = "default_guests")]
    pub guests: u32,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
    #[serde(default)]
    pub hotel_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct HotelLinksResponse {
    destination: String,
    check_in: String,
    check_out: String,
    guests: u32,
    rooms: u32,
    booking_links: HashMap<String, BookingSite>,
}

/*
    GET /hotel-links
*/
pub async fn hotel_links(query: web::Query<HotelLinksQuery>) -> impl Responder {
    let query = query.into_inner();
    let booking_links = HotelLinkService::booking_links(
        &query.destination,
        &query.check_in,
        &query.check_out,
        query.guests,
        query.rooms,
        query.hotel_name.as_deref(),
    );

    HttpResponse::Ok().json(HotelLinksResponse {
        destination: query.destination,
        check_in: query.check_in,
        check_out: query.check_out,
        guests: query.guests,
        rooms: query.rooms,
        booking_links,
    })
}
