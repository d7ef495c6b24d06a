//! Place lookup against a Kakao-Local-style keyword search API.
//!
//! The external API is a thin collaborator: one GET per query, first
//! matching document wins. Everything interesting (cascades, fallbacks)
//! lives in the callers.

use std::{env, time::Duration};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::models::trip::TripPlan;

const KAKAO_BASE_URL: &str = "https://dapi.kakao.com";
const SEARCH_RESULT_SIZE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A resolved place from the keyword search.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceHit {
    pub name: String,
    pub road_address: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub coordinates: Coordinates,
}

impl PlaceHit {
    /// Road address when available, lot-number address otherwise.
    pub fn best_address(&self) -> Option<&str> {
        self.road_address.as_deref().or(self.address.as_deref())
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("place search request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("place search returned status {0}")]
    Status(u16),
    #[error("KAKAO_REST_API_KEY environment variable not set")]
    MissingKey,
}

/// Seam between itinerary code and the external place API. The client map
/// component and the server-side enrichment both talk through this.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best-effort lookup of a single query; Ok(None) when nothing matched.
    async fn search_place(
        &self,
        query: &str,
        region: Option<&str>,
    ) -> Result<Option<PlaceHit>, GeocodeError>;
}

pub struct KakaoLocalClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl KakaoLocalClient {
    pub fn new() -> Result<Self, GeocodeError> {
        let api_key = env::var("KAKAO_REST_API_KEY").map_err(|_| GeocodeError::MissingKey)?;
        Ok(Self::with_key(api_key, KAKAO_BASE_URL.to_string()))
    }

    pub fn with_key(api_key: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl Geocoder for KakaoLocalClient {
    async fn search_place(
        &self,
        query: &str,
        region: Option<&str>,
    ) -> Result<Option<PlaceHit>, GeocodeError> {
        let full_query = match region {
            Some(region) if !query.contains(region) => format!("{} {}", region, query),
            _ => query.to_string(),
        };

        let url = format!("{}/v2/local/search/keyword.json", self.base_url);
        let size = SEARCH_RESULT_SIZE.to_string();
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&[("query", full_query.as_str()), ("size", size.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body: KeywordSearchResponse = response.json().await?;
        let Some(doc) = body.documents.into_iter().next() else {
            return Ok(None);
        };

        let (Ok(lng), Ok(lat)) = (doc.x.parse::<f64>(), doc.y.parse::<f64>()) else {
            return Ok(None);
        };

        Ok(Some(PlaceHit {
            name: doc.place_name,
            road_address: none_if_empty(doc.road_address_name),
            address: none_if_empty(doc.address_name),
            category: none_if_empty(doc.category_group_name),
            phone: none_if_empty(doc.phone),
            coordinates: Coordinates { lat, lng },
        }))
    }
}

fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Deserialize)]
struct KeywordSearchResponse {
    documents: Vec<KeywordDocument>,
}

#[derive(Debug, Deserialize)]
struct KeywordDocument {
    place_name: String,
    #[serde(default)]
    road_address_name: String,
    #[serde(default)]
    address_name: String,
    #[serde(default)]
    category_group_name: String,
    #[serde(default)]
    phone: String,
    x: String,
    y: String,
}

/// Pull a concrete place name out of free text, e.g. "해운대 산책" has none
/// but "해운대해수욕장에서 일출" yields "해운대해수욕장". Suffix-based, so it
/// only matches proper nouns the booking and map layers can search for.
pub fn extract_place_name(text: &str) -> Option<String> {
    let pattern = Regex::new(
        "([가-힣]{2,}(?:해수욕장|테마파크|아쿠아리움|전망대|박물관|미술관|리조트|해변|폭포|호수|시장|공원|다리|거리|산|봉|강|굴|사|궁|성|탑|역|항))",
    )
    .expect("place-name pattern");
    pattern
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Fills real_address / place_category / place_telephone on every activity
/// the geocoder recognizes. Lookup failures leave the activity as generated.
pub struct PlaceEnrichmentService<'a> {
    geocoder: &'a dyn Geocoder,
}

impl<'a> PlaceEnrichmentService<'a> {
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self { geocoder }
    }

    pub async fn enrich_plan(&self, plan: &mut TripPlan, destination: &str) {
        for day in &mut plan.itinerary {
            let activities = match &mut day.schedule {
                crate::models::trip::DaySchedule::Activities { activities } => activities,
                crate::models::trip::DaySchedule::Slots { .. } => continue,
            };
            for activity in activities {
                let query = if activity.location.trim().is_empty() {
                    match extract_place_name(&activity.title) {
                        Some(name) => name,
                        None => continue,
                    }
                } else {
                    activity.location.clone()
                };

                match self.geocoder.search_place(&query, Some(destination)).await {
                    Ok(Some(hit)) => {
                        activity.real_address = hit.best_address().map(str::to_string);
                        activity.place_category = hit.category.clone();
                        activity.place_telephone = hit.phone.clone();
                    }
                    Ok(None) => {}
                    Err(err) => {
                        eprintln!("Place lookup failed for '{}': {}", query, err);
                    }
                }
            }
        }
    }
}
