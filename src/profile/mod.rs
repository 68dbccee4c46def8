use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use fs_err as fs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::WingmanError;
use crate::tone::{ResponseStyle, ToneSliders};
use crate::wire::{ProfilePatch, StyleParams};

pub const CHAT_HISTORY_CAP: usize = 100;
pub const TRIAL_DAYS: i64 = 7;
pub const TRIAL_PHOTO_LIMIT: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// Answers to the deep-personality settings questions. All optional; each
/// one the user fills in becomes another context line in the help prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeepAnswers {
    pub no_reply_thought: Option<String>,
    pub when_you_like_someone: Option<String>,
    pub what_kills_convos: Option<String>,
    pub quiet_convo_response: Option<String>,
    pub biggest_fear: Option<String>,
    pub how_things_end: Option<String>,
    pub confidence_level: Option<String>,
    pub what_you_want: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub about: String,
    /// Legacy onboarding answers; answers[0] mirrors the joined personality
    /// tags and doubles as the "comes across as" string.
    pub answers: Vec<String>,
    pub personality: Vec<String>,
    pub who: Vec<String>,
    pub struggles: Vec<String>,
    pub text_samples: String,
    pub style: ToneSliders,
    pub response_style: ResponseStyle,
    pub deep: DeepAnswers,
    /// The user's own sent texts, most-recent-last. Only a small recency
    /// window ever reaches a prompt.
    pub messages: Vec<String>,
    pub conversation_step: u8,
    pub chat_history: Vec<ChatEntry>,
    pub is_premium: bool,
    pub trial_started_at: Option<DateTime<Utc>>,
    pub trial_photo_uploads: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserProfile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            name: None,
            email: None,
            about: String::new(),
            answers: Vec::new(),
            personality: Vec::new(),
            who: Vec::new(),
            struggles: Vec::new(),
            text_samples: String::new(),
            style: ToneSliders::default(),
            response_style: ResponseStyle::default(),
            deep: DeepAnswers::default(),
            messages: Vec::new(),
            conversation_step: 0,
            chat_history: Vec::new(),
            is_premium: false,
            trial_started_at: None,
            trial_photo_uploads: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl UserProfile {
    /// How the user wants to come across. Defaults to "confident" when
    /// onboarding never filled it in.
    pub fn comes_across_as(&self) -> &str {
        self.answers
            .first()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("confident")
    }

    pub fn recent_messages(&self, window: usize) -> &[String] {
        let start = self.messages.len().saturating_sub(window);
        &self.messages[start..]
    }

    pub fn is_trial_expired(&self, now: DateTime<Utc>) -> bool {
        if self.is_premium {
            return false;
        }
        match self.trial_started_at {
            Some(start) => (now - start).num_days() >= TRIAL_DAYS,
            None => false,
        }
    }

    pub fn trial_days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.is_premium {
            return 0;
        }
        match self.trial_started_at {
            Some(start) => (TRIAL_DAYS - (now - start).num_days()).max(0),
            None => TRIAL_DAYS,
        }
    }

    pub fn can_upload_photo(&self) -> bool {
        self.is_premium || self.trial_photo_uploads < TRIAL_PHOTO_LIMIT
    }

    pub fn trial_photos_remaining(&self) -> u32 {
        if self.is_premium {
            return u32::MAX;
        }
        TRIAL_PHOTO_LIMIT.saturating_sub(self.trial_photo_uploads)
    }
}

/// Keyed profile storage shared by the turn handler. Injected by reference
/// so tests can substitute an isolated in-memory store; nothing here is a
/// process-wide singleton.
pub struct ProfileStore {
    path: Option<PathBuf>,
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl ProfileStore {
    pub fn in_memory() -> Self {
        Self { path: None, profiles: RwLock::new(HashMap::new()) }
    }

    /// Opens a file-backed store. A missing or corrupt file starts fresh
    /// rather than failing; profiles are client-editable state, not ground
    /// truth.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profiles = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    eprintln!("warning: could not parse {}: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path: Some(path), profiles: RwLock::new(profiles) }
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }

    /// Returns a snapshot of the profile, or a default-empty one for ids
    /// the store has never seen.
    pub fn get(&self, user_id: &str) -> UserProfile {
        self.profiles.read().get(user_id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.profiles.read().contains_key(user_id)
    }

    fn with_profile<R>(&self, user_id: &str, f: impl FnOnce(&mut UserProfile) -> R) -> R {
        let mut map = self.profiles.write();
        let profile = map.entry(user_id.to_string()).or_default();
        let out = f(profile);
        profile.updated_at = Utc::now();
        out
    }

    pub fn apply_patch(&self, user_id: &str, patch: &ProfilePatch) {
        self.with_profile(user_id, |p| {
            if let Some(v) = &patch.name {
                p.name = Some(v.clone());
            }
            if let Some(v) = &patch.email {
                p.email = Some(v.clone());
            }
            if let Some(v) = &patch.about {
                p.about = v.clone();
            }
            if let Some(v) = &patch.text_samples {
                p.text_samples = v.clone();
            }
            if let Some(v) = &patch.who {
                p.who = v.clone();
            }
            if let Some(v) = &patch.struggles {
                p.struggles = v.clone();
            }
            if let Some(v) = &patch.personality {
                p.personality = v.clone();
                if !v.is_empty() {
                    let joined = v.join(", ");
                    if p.answers.is_empty() {
                        p.answers.push(joined);
                    } else {
                        p.answers[0] = joined;
                    }
                }
            }
            if let Some(v) = &patch.response_style {
                p.response_style = ResponseStyle::parse(v);
            }
            if patch.message_length.is_some() || patch.emoji_usage.is_some() || patch.flirtiness.is_some() {
                p.style = ToneSliders::new(
                    patch.message_length.or(Some(p.style.length)),
                    patch.emoji_usage.or(Some(p.style.emoji)),
                    patch.flirtiness.or(Some(p.style.flirt)),
                );
            }
            let deep = &mut p.deep;
            if let Some(v) = &patch.no_reply_thought {
                deep.no_reply_thought = Some(v.clone());
            }
            if let Some(v) = &patch.when_you_like_someone {
                deep.when_you_like_someone = Some(v.clone());
            }
            if let Some(v) = &patch.what_kills_convos {
                deep.what_kills_convos = Some(v.clone());
            }
            if let Some(v) = &patch.quiet_convo_response {
                deep.quiet_convo_response = Some(v.clone());
            }
            if let Some(v) = &patch.biggest_fear {
                deep.biggest_fear = Some(v.clone());
            }
            if let Some(v) = &patch.how_things_end {
                deep.how_things_end = Some(v.clone());
            }
            if let Some(v) = &patch.confidence_level {
                deep.confidence_level = Some(v.clone());
            }
            if let Some(v) = &patch.what_you_want {
                deep.what_you_want = Some(v.clone());
            }
            if let Some(v) = patch.is_premium {
                p.is_premium = v;
            }
            if let Some(v) = patch.trial_started_at {
                p.trial_started_at = Some(v);
            }
        });
    }

    /// Folds the per-turn style form fields into the profile: sliders and
    /// response style always win, text samples only fill an empty slot.
    pub fn update_style(&self, user_id: &str, params: &StyleParams) {
        self.with_profile(user_id, |p| {
            p.style = ToneSliders::new(params.msg_length, params.emoji_usage, params.flirtiness);
            if !params.response_style.is_empty() {
                p.response_style = ResponseStyle::parse(&params.response_style);
            }
            if !params.user_samples.is_empty() && p.text_samples.is_empty() {
                p.text_samples = params.user_samples.clone();
            }
        });
    }

    pub fn append_message(&self, user_id: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.with_profile(user_id, |p| p.messages.push(text.to_string()));
    }

    /// FIFO-capped chat history: once full, the oldest entry is evicted.
    pub fn append_chat_entry(&self, user_id: &str, text: &str, is_user: bool) {
        self.with_profile(user_id, |p| {
            p.chat_history.push(ChatEntry {
                text: text.to_string(),
                is_user,
                timestamp: Utc::now(),
            });
            if p.chat_history.len() > CHAT_HISTORY_CAP {
                let excess = p.chat_history.len() - CHAT_HISTORY_CAP;
                p.chat_history.drain(..excess);
            }
        });
    }

    pub fn chat_history(&self, user_id: &str) -> Vec<ChatEntry> {
        self.profiles
            .read()
            .get(user_id)
            .map(|p| p.chat_history.clone())
            .unwrap_or_default()
    }

    pub fn clear_chat(&self, user_id: &str) {
        self.with_profile(user_id, |p| p.chat_history.clear());
    }

    pub fn advance_step(&self, user_id: &str) {
        self.with_profile(user_id, |p| {
            p.conversation_step = crate::flow::advance(p.conversation_step);
        });
    }

    pub fn record_photo_upload(&self, user_id: &str) {
        self.with_profile(user_id, |p| p.trial_photo_uploads += 1);
    }

    /// Full reset: everything goes, including the step counter.
    pub fn reset(&self, user_id: &str) {
        self.profiles.write().remove(user_id);
    }

    pub fn persist(&self) -> Result<(), WingmanError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| WingmanError::Storage(e.to_string()))?;
            }
        }
        let map = self.profiles.read();
        let raw = serde_json::to_string_pretty(&*map)
            .map_err(|e| WingmanError::Storage(e.to_string()))?;
        fs::write(path, raw)
            .map_err(|e| WingmanError::Storage(format!("writing {}: {e}", path.display())))?;
        Ok(())
    }
}
