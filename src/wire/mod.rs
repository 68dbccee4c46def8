use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ========================================
/// Boundary payloads
/// ========================================

/// The two-question quick-tap context collected before a screenshot is
/// analyzed. Callers send free text; matching downstream is by substring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageContext {
    pub who: String,
    pub help: String,
}

/// Raw screenshot bytes plus the name they arrived under. The media type is
/// inferred from the file extension when the payload is encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Per-turn style overrides, mirroring the form fields the clients send
/// with every message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleParams {
    pub response_style: String,
    pub msg_length: Option<u8>,
    pub emoji_usage: Option<u8>,
    pub flirtiness: Option<u8>,
    pub user_samples: String,
}

/// A plain chat turn. An empty `message` with no image is the greeting turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub image: Option<ImageUpload>,
    #[serde(default)]
    pub style: StyleParams,
    #[serde(default)]
    pub context: ImageContext,
    #[serde(default)]
    pub is_trial: bool,
}

/// Keyboard quick-suggest: conversation context pasted from the host app.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestTurn {
    pub user_id: String,
    pub context: String,
    #[serde(default = "default_conversation_type")]
    pub conversation_type: String,
}

fn default_conversation_type() -> String {
    "dating".into()
}

/// Keyboard/share-extension screenshot analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTurn {
    pub user_id: String,
    pub image: Option<ImageUpload>,
    #[serde(default)]
    pub context: ImageContext,
    #[serde(default = "default_true")]
    pub from_keyboard: bool,
    #[serde(default)]
    pub is_trial: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    pub reply: String,
}

/// 1-3 sendable messages. Never empty at the boundary; the fallback policy
/// guarantees a replacement when extraction comes up dry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub suggestions: Vec<String>,
}

impl SuggestionSet {
    pub fn capped(mut suggestions: Vec<String>) -> Self {
        suggestions.truncate(3);
        Self { suggestions }
    }
}

/// Partial profile update with an explicit field per settable attribute.
/// Replaces the original's duck-typed JSON patches; unknown keys are
/// rejected at deserialization instead of silently dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
    pub text_samples: Option<String>,
    pub who: Option<Vec<String>>,
    pub struggles: Option<Vec<String>>,
    pub personality: Option<Vec<String>>,
    pub response_style: Option<String>,
    pub message_length: Option<u8>,
    pub emoji_usage: Option<u8>,
    pub flirtiness: Option<u8>,
    pub no_reply_thought: Option<String>,
    pub when_you_like_someone: Option<String>,
    pub what_kills_convos: Option<String>,
    pub quiet_convo_response: Option<String>,
    pub biggest_fear: Option<String>,
    pub how_things_end: Option<String>,
    pub confidence_level: Option<String>,
    pub what_you_want: Option<String>,
    pub is_premium: Option<bool>,
    pub trial_started_at: Option<DateTime<Utc>>,
}
