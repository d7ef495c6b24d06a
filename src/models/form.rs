use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest bookable trip: 4 nights / 5 days.
pub const MAX_TRIP_DAYS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    #[serde(alias = "저예산")]
    Low,
    #[serde(alias = "보통")]
    Medium,
    #[serde(alias = "고급")]
    High,
    #[serde(alias = "럭셔리")]
    Luxury,
}

impl Budget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::Low => "low",
            Budget::Medium => "medium",
            Budget::High => "high",
            Budget::Luxury => "luxury",
        }
    }

    /// Multiplier applied to the base daily cost for this budget tier
    pub fn cost_multiplier(&self) -> f64 {
        match self {
            Budget::Low => 0.7,
            Budget::Medium => 1.0,
            Budget::High => 1.8,
            Budget::Luxury => 3.0,
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelPace {
    #[serde(alias = "타이트하게")]
    Tight,
    #[serde(alias = "널널하게")]
    Relaxed,
}

impl TravelPace {
    /// Number of scheduled activities per itinerary day for this pace
    pub fn activities_per_day(&self) -> usize {
        match self {
            TravelPace::Tight => 4,
            TravelPace::Relaxed => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanionType {
    #[serde(alias = "연인")]
    Lover,
    #[serde(alias = "친구")]
    Friend,
    #[serde(alias = "가족")]
    Family,
    #[serde(alias = "동료")]
    Colleague,
    #[serde(alias = "혼자")]
    Solo,
    #[serde(alias = "기타")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transportation {
    #[serde(alias = "대중교통")]
    Public,
    #[serde(alias = "자가용")]
    Car,
    #[serde(alias = "렌터카")]
    Rental,
    #[serde(alias = "혼합")]
    Mixed,
}

/// Mutable draft of the trip wizard. Mirrors what the step handlers collect
/// before submission; serialized as-is into the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TripFormData {
    pub region: String,
    pub custom_region: String,
    pub guests: u32,
    pub companion_type: Option<CompanionType>,
    pub travel_style: String,
    pub travel_pace: Option<TravelPace>,
    pub budget: Budget,
    pub interests: Vec<String>,
    pub rooms: u32,
    pub transportation: Option<Transportation>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TripFormData {
    pub fn new() -> Self {
        Self {
            guests: 1,
            rooms: 1,
            ..Default::default()
        }
    }

    /// Free-text destination overrides the picked suggestion.
    pub fn destination(&self) -> &str {
        if self.custom_region.trim().is_empty() {
            &self.region
        } else {
            &self.custom_region
        }
    }

    /// Validate the draft against the submission rules. Returns the first
    /// violated field so the caller can show a blocking message without any
    /// network traffic.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.destination().trim().is_empty() {
            return Err(ValidationError::MissingDestination);
        }
        let start = self.start_date.ok_or(ValidationError::MissingStartDate)?;
        let end = self.end_date.ok_or(ValidationError::MissingEndDate)?;
        if end <= start {
            return Err(ValidationError::DateOrder);
        }
        let travel_days = (end - start).num_days() + 1;
        if travel_days > MAX_TRIP_DAYS {
            return Err(ValidationError::SpanTooLong);
        }
        if start < today {
            return Err(ValidationError::StartInPast);
        }
        if self.guests < 1 {
            return Err(ValidationError::GuestCount);
        }
        if self.rooms < 1 {
            return Err(ValidationError::RoomCount);
        }
        if self.interests.is_empty() {
            return Err(ValidationError::EmptyInterests);
        }
        Ok(())
    }

    /// Build the wire body for POST /plan-trip.
    pub fn to_request(&self) -> TripRequest {
        TripRequest {
            destination: self.destination().to_string(),
            start_date: self
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            end_date: self
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            budget: self.budget,
            interests: self.interests.clone(),
            guests: self.guests,
            companion_type: self.companion_type,
            rooms: self.rooms,
            travel_style: if self.travel_style.is_empty() {
                self.interests.join(",")
            } else {
                self.travel_style.clone()
            },
            travel_pace: self.travel_pace,
            transportation: self.transportation,
        }
    }
}

fn default_guests() -> u32 {
    2
}

fn default_rooms() -> u32 {
    1
}

/// Request body for POST /plan-trip. Field names follow the public API
/// (camelCase for the wizard-originated fields, snake_case for dates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default = "default_guests")]
    pub guests: u32,
    #[serde(default, rename = "companionType")]
    pub companion_type: Option<CompanionType>,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
    #[serde(default, rename = "travelStyle")]
    pub travel_style: String,
    #[serde(default, rename = "travelPace")]
    pub travel_pace: Option<TravelPace>,
    #[serde(default)]
    pub transportation: Option<Transportation>,
}

impl TripRequest {
    /// Inclusive day count of the trip, e.g. 2025-06-01 ~ 2025-06-03 is 3.
    pub fn travel_days(&self) -> Option<i64> {
        let start = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").ok()?;
        let end = NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d").ok()?;
        Some((end - start).num_days() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination is required")]
    MissingDestination,
    #[error("start date is required")]
    MissingStartDate,
    #[error("end date is required")]
    MissingEndDate,
    #[error("end date must come after the start date")]
    DateOrder,
    #[error("trips are limited to 4 nights (5 days)")]
    SpanTooLong,
    #[error("start date must not be in the past")]
    StartInPast,
    #[error("at least one guest is required")]
    GuestCount,
    #[error("at least one room is required")]
    RoomCount,
    #[error("select at least one interest")]
    EmptyInterests,
}

impl ValidationError {
    /// Name of the first violated field, for display next to the input.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingDestination => "destination",
            ValidationError::MissingStartDate | ValidationError::StartInPast => "start_date",
            ValidationError::MissingEndDate
            | ValidationError::DateOrder
            | ValidationError::SpanTooLong => "end_date",
            ValidationError::GuestCount => "guests",
            ValidationError::RoomCount => "rooms",
            ValidationError::EmptyInterests => "interests",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> TripFormData {
        TripFormData {
            region: "부산".to_string(),
            guests: 2,
            companion_type: Some(CompanionType::Friend),
            travel_pace: Some(TravelPace::Relaxed),
            interests: vec!["자연 관광".to_string()],
            rooms: 1,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 3),
            ..TripFormData::new()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    #[test]
    fn accepts_a_two_night_trip() {
        assert!(valid_form().validate(today()).is_ok());
    }

    #[test]
    fn rejects_reversed_dates() {
        let mut form = valid_form();
        form.end_date = NaiveDate::from_ymd_opt(2025, 5, 30);
        assert_eq!(form.validate(today()), Err(ValidationError::DateOrder));
    }

    #[test]
    fn rejects_spans_over_four_nights() {
        let mut form = valid_form();
        form.end_date = NaiveDate::from_ymd_opt(2025, 6, 6);
        assert_eq!(form.validate(today()), Err(ValidationError::SpanTooLong));
    }

    #[test]
    fn four_night_span_is_the_limit() {
        let mut form = valid_form();
        form.end_date = NaiveDate::from_ymd_opt(2025, 6, 5);
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn rejects_past_start_dates() {
        let form = valid_form();
        let late_today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(form.validate(late_today), Err(ValidationError::StartInPast));
    }

    #[test]
    fn custom_region_wins_over_suggestion() {
        let mut form = valid_form();
        form.custom_region = "경주 시내".to_string();
        assert_eq!(form.destination(), "경주 시내");
    }

    #[test]
    fn korean_wire_values_deserialize() {
        let req: TripRequest = serde_json::from_str(
            r#"{
                "destination": "부산",
                "start_date": "2025-06-01",
                "end_date": "2025-06-03",
                "budget": "보통",
                "travelPace": "널널하게",
                "companionType": "혼자"
            }"#,
        )
        .unwrap();
        assert_eq!(req.budget, Budget::Medium);
        assert_eq!(req.travel_pace, Some(TravelPace::Relaxed));
        assert_eq!(req.companion_type, Some(CompanionType::Solo));
        assert_eq!(req.guests, 2);
        assert_eq!(req.travel_days(), Some(3));
    }
}
