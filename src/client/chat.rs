use thiserror::Error;

use crate::models::trip::{ChatModifyRequest, ChatModifyResponse, TripPlan};

#[derive(Debug, Error)]
pub enum ChatEditError {
    /// The server processed the request but declined to produce a plan.
    /// `message` (and `suggestion`, when present) are display-ready.
    #[error("{message}")]
    Rejected {
        message: String,
        suggestion: Option<String>,
    },
    #[error("network error while sending the edit, please try again later")]
    Network(#[source] reqwest::Error),
    #[error("the edit service returned an unreadable response")]
    InvalidResponse(#[source] reqwest::Error),
    #[error("the edit service rejected the request (status {0})")]
    Status(u16),
    #[error("could not encode the current plan")]
    Encode(#[from] serde_json::Error),
}

/// Free-text edits against the current plan. Each call is independent; a
/// successful response replaces the plan wholesale on the caller's side.
pub struct TripChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl TripChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Send one natural-language instruction plus the full current plan.
    /// Ok(plan) is the replacement document; every Err leaves the caller's
    /// plan exactly as it was.
    pub async fn request_edit(
        &self,
        message: &str,
        current_plan: &TripPlan,
    ) -> Result<TripPlan, ChatEditError> {
        let body = ChatModifyRequest {
            message: message.to_string(),
            current_trip_plan: serde_json::to_value(current_plan)?,
        };

        let response = self
            .http
            .post(format!("{}/modify-trip-chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(ChatEditError::Network)?;

        if !response.status().is_success() {
            return Err(ChatEditError::Status(response.status().as_u16()));
        }

        let parsed: ChatModifyResponse = response
            .json()
            .await
            .map_err(ChatEditError::InvalidResponse)?;

        if !parsed.success {
            return Err(ChatEditError::Rejected {
                message: parsed.message,
                suggestion: parsed.suggestion,
            });
        }

        parsed.modified_plan.ok_or(ChatEditError::Rejected {
            message: parsed.message,
            suggestion: parsed.suggestion,
        })
    }
}
