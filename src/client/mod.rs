//! Client-side components of the trip planner: the wizard state machine,
//! session persistence, the generation orchestrator, the chat edit client,
//! and map marker resolution. Everything here talks to the backend through
//! a base URL picked by `ApiConfig`.

pub mod chat;
pub mod map;
pub mod orchestrator;
pub mod session;
pub mod wizard;

use std::env;

const PRODUCTION_BASE_URL: &str = "https://api.tripforge.app";
const DEVELOPMENT_BASE_URL: &str = "http://localhost:8000";

/// Backend origin selection: explicit override, otherwise the production
/// origin in release builds and the local dev server in debug builds.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("PLANNER_API_URL").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                DEVELOPMENT_BASE_URL.to_string()
            } else {
                PRODUCTION_BASE_URL.to_string()
            }
        });
        Self { base_url }
    }
}
