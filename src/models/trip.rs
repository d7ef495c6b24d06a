use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One scheduled activity inside a day. The place_* fields are filled in by
/// place enrichment when the geocoder recognizes the location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub time: String,
    pub title: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_telephone: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// The two day shapes the API has produced over time. Current responses
/// carry an ordered activity list; early ones used fixed time-slot strings.
/// Both must render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaySchedule {
    Activities { activities: Vec<Activity> },
    Slots {
        morning: String,
        afternoon: String,
        evening: String,
    },
}

impl DaySchedule {
    /// Activities of the day; empty for the legacy slot shape.
    pub fn activities(&self) -> &[Activity] {
        match self {
            DaySchedule::Activities { activities } => activities,
            DaySchedule::Slots { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub day: u32,
    pub date: String,
    #[serde(flatten)]
    pub schedule: DaySchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub hotel_type: String,
    pub price_range: String,
    pub booking_links: HashMap<String, BookingSite>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// A single booking site entry inside the hotel-search block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSite {
    pub name: String,
    pub url: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Trip-wide hotel search links, keyed by booking-site id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripHotelSearch {
    pub destination: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: u32,
    pub rooms: u32,
    pub search_links: HashMap<String, BookingSite>,
}

/// The finished plan document. Replaced wholesale on every regeneration or
/// chat edit; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub destination: String,
    pub duration: String,
    pub itinerary: Vec<Day>,
    #[serde(default)]
    pub accommodation: Vec<HotelInfo>,
    pub total_cost: String,
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_hotel_search: Option<TripHotelSearch>,
}

impl TripPlan {
    /// Day numbers must be unique and form a contiguous 1..=N range.
    pub fn has_contiguous_days(&self) -> bool {
        self.itinerary
            .iter()
            .enumerate()
            .all(|(idx, day)| day.day == idx as u32 + 1)
    }
}

/// Body for POST /modify-trip-chat. The current plan travels as raw JSON so
/// the server can hand it to the composer untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatModifyRequest {
    pub message: String,
    pub current_trip_plan: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatModifyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_plan: Option<TripPlan>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
