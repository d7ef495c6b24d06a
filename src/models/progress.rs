use serde::{Deserialize, Serialize};

/// One message on the generation progress channel. Every field is optional
/// on the wire; the stream may redeliver or reorder steps and consumers just
/// overwrite what they display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
