use serde::{Deserialize, Serialize};

/// Result of one assistant question. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssistantReply {
    Answer(String),
    Error(String),
}

impl AssistantReply {
    pub fn is_error(&self) -> bool {
        matches!(self, AssistantReply::Error(_))
    }

    /// Text shown under "AI Says:".
    pub fn display_text(&self) -> String {
        match self {
            AssistantReply::Answer(text) => text.clone(),
            AssistantReply::Error(message) => format!("Error: {}", message),
        }
    }
}
