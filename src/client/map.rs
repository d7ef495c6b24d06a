//! Map marker resolution for the itinerary view.
//!
//! Activities are geocoded best-effort through a cascade of queries; when
//! nothing resolves the map still centers on the destination city via a
//! built-in lookup table. SDK readiness is polled a bounded number of
//! times; map failure is the one place the user gets a blocking error
//! panel with reload/retry actions instead of silent degradation.

use std::time::Duration;

use thiserror::Error;

use crate::models::trip::Activity;
use crate::services::place_service::{Coordinates, Geocoder};

/// Activities whose location or title mentions lodging are not mapped.
/// Locale-specific and overridable via `with_lodging_keywords`.
pub const DEFAULT_LODGING_KEYWORDS: &[&str] =
    &["호텔", "숙소", "펜션", "게스트하우스", "리조트", "모텔", "체크인"];

/// Coarse city centers, matched by substring against the destination.
const CITY_FALLBACK: &[(&str, f64, f64)] = &[
    ("서울", 37.5665, 126.9780),
    ("부산", 35.1796, 129.0756),
    ("제주", 33.4996, 126.5312),
    ("인천", 37.4563, 126.7052),
    ("대구", 35.8714, 128.6014),
    ("광주", 35.1595, 126.8526),
    ("대전", 36.3504, 127.3845),
    ("울산", 35.5384, 129.3114),
    ("경주", 35.8562, 129.2247),
    ("강릉", 37.7519, 128.8761),
    ("속초", 38.2070, 128.5918),
    ("여수", 34.7604, 127.6622),
    ("전주", 35.8242, 127.1480),
    ("춘천", 37.8813, 127.7298),
];

const DEFAULT_POLL_ATTEMPTS: u32 = 20;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSource {
    Address,
    TitleWithDestination,
    Title,
    CityFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub title: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub resolved_from: MarkerSource,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map SDK did not become ready after {attempts} polling attempts")]
    SdkUnavailable { attempts: u32 },
    #[error("map SDK script failed to load")]
    ScriptLoad,
}

/// Turns a day's activities into map markers.
pub struct MarkerResolver<'a> {
    geocoder: &'a dyn Geocoder,
    lodging_keywords: Vec<String>,
}

impl<'a> MarkerResolver<'a> {
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self {
            geocoder,
            lodging_keywords: DEFAULT_LODGING_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }

    pub fn with_lodging_keywords(mut self, keywords: Vec<String>) -> Self {
        self.lodging_keywords = keywords;
        self
    }

    fn is_lodging(&self, activity: &Activity) -> bool {
        self.lodging_keywords
            .iter()
            .any(|k| activity.location.contains(k) || activity.title.contains(k))
    }

    /// Resolve each non-lodging activity through the query cascade: the
    /// address-like field first, then title scoped to the destination, then
    /// the bare title; first hit wins per activity. Zero hits fall back to
    /// the city table so the map always has something to center on.
    pub async fn resolve(&self, activities: &[Activity], destination: &str) -> Vec<Marker> {
        let mut markers = Vec::new();

        for activity in activities.iter().filter(|a| !self.is_lodging(a)) {
            if let Some(marker) = self.resolve_one(activity, destination).await {
                markers.push(marker);
            }
        }

        if markers.is_empty() {
            if let Some(coordinates) = city_fallback(destination) {
                markers.push(Marker {
                    title: destination.to_string(),
                    location: destination.to_string(),
                    coordinates,
                    resolved_from: MarkerSource::CityFallback,
                });
            }
        }

        markers
    }

    async fn resolve_one(&self, activity: &Activity, destination: &str) -> Option<Marker> {
        let mut attempts: Vec<(String, Option<&str>, MarkerSource)> = Vec::new();
        if let Some(address) = &activity.real_address {
            attempts.push((address.clone(), None, MarkerSource::Address));
        }
        attempts.push((
            activity.title.clone(),
            Some(destination),
            MarkerSource::TitleWithDestination,
        ));
        attempts.push((activity.title.clone(), None, MarkerSource::Title));

        for (query, region, source) in attempts {
            match self.geocoder.search_place(&query, region).await {
                Ok(Some(hit)) => {
                    return Some(Marker {
                        title: activity.title.clone(),
                        location: activity.location.clone(),
                        coordinates: hit.coordinates,
                        resolved_from: source,
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    // best-effort: a failed lookup is just a miss
                    eprintln!("Geocode failed for '{}': {}", query, err);
                }
            }
        }
        None
    }
}

/// Coarse coordinates for a destination string, if a known city name occurs
/// in it.
pub fn city_fallback(destination: &str) -> Option<Coordinates> {
    CITY_FALLBACK
        .iter()
        .find(|(city, _, _)| destination.contains(city))
        .map(|(_, lat, lng)| Coordinates {
            lat: *lat,
            lng: *lng,
        })
}

/// Probe for an externally injected map SDK becoming usable.
pub trait SdkProbe {
    fn is_ready(&self) -> bool;
}

/// Bounded readiness polling, replacing ad hoc "is the global there yet"
/// loops in rendering code.
pub struct ReadySignal {
    max_attempts: u32,
    poll_interval: Duration,
}

impl ReadySignal {
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_limits(max_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            max_attempts,
            poll_interval,
        }
    }

    pub async fn wait_for(&self, probe: &dyn SdkProbe) -> Result<(), MapError> {
        for _ in 0..self.max_attempts {
            if probe.is_ready() {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        Err(MapError::SdkUnavailable {
            attempts: self.max_attempts,
        })
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// View state of the map panel. Error is terminal until the user retries.
#[derive(Debug, Clone, PartialEq)]
pub enum MapViewState {
    Loading,
    Rendering,
    Done,
    Error(String),
}

#[derive(Debug)]
pub struct MapView {
    state: MapViewState,
}

impl MapView {
    pub fn new() -> Self {
        Self {
            state: MapViewState::Loading,
        }
    }

    pub fn state(&self) -> &MapViewState {
        &self.state
    }

    pub fn sdk_ready(&mut self) {
        if self.state == MapViewState::Loading {
            self.state = MapViewState::Rendering;
        }
    }

    pub fn markers_rendered(&mut self) {
        if self.state == MapViewState::Rendering {
            self.state = MapViewState::Done;
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = MapViewState::Error(reason.into());
    }

    /// Explicit user action; the only way out of Error.
    pub fn retry(&mut self) -> bool {
        if matches!(self.state, MapViewState::Error(_)) {
            self.state = MapViewState::Loading;
            true
        } else {
            false
        }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}
