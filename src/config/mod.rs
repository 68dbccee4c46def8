use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: String,
    pub model: String,
    pub api_base: String,
    pub api_version: String,
    pub timeout_secs: u64,
    /// Token budgets per call shape. Image analysis needs the most headroom
    /// because the model quotes the screenshot before suggesting replies.
    pub max_tokens_chat: u32,
    pub max_tokens_image: u32,
    pub max_tokens_suggest: u32,
    pub max_tokens_keyboard_image: u32,
    /// How many of the user's own recent texts feed the help prompt.
    pub recent_window: usize,
    pub save_request: bool,
    pub save_response: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: ".".into(),
            model: "claude-sonnet-4-20250514".into(),
            api_base: "https://api.anthropic.com".into(),
            api_version: "2023-06-01".into(),
            timeout_secs: 60,
            max_tokens_chat: 300,
            max_tokens_image: 600,
            max_tokens_suggest: 300,
            max_tokens_keyboard_image: 350,
            recent_window: 4,
            save_request: false,
            save_response: false,
        }
    }
}
