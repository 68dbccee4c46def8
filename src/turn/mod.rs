use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::WingmanError;
use crate::extract;
use crate::fallback;
use crate::flow::{self, PromptMode};
use crate::gateway::{CompletionRequest, DynGateway, EncodedImage, GatewayError};
use crate::log;
use crate::profile::ProfileStore;
use crate::prompt;
use crate::wire::{ChatTurn, ImageTurn, SuggestTurn, SuggestionSet, TurnReply};

/// Orchestrates one user turn end to end: classify against the profile,
/// compose the prompt, call the model, recover suggestions, fall back when
/// the model is unavailable or unusable.
///
/// Profile bookkeeping (message append, step advance) happens BEFORE the
/// model call since it does not depend on generation succeeding; the
/// assistant's side of chat history is appended only once the final reply
/// (real or fallback) is known. Turns for the same user are serialized by a
/// per-key mutex so history ordering and step monotonicity hold under
/// concurrent client retries; different users run in parallel.
pub struct TurnHandler {
    store: Arc<ProfileStore>,
    gateway: DynGateway,
    cfg: Config,
    debug: bool,
    locks: parking_lot::Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TurnHandler {
    pub fn new(store: Arc<ProfileStore>, gateway: DynGateway, cfg: Config, debug: bool) -> Self {
        Self {
            store,
            gateway,
            cfg,
            debug,
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Plain chat turn, including the screenshot-in-chat branch. The reply
    /// is never empty.
    pub async fn handle_message(&self, turn: &ChatTurn) -> Result<TurnReply, WingmanError> {
        let user_id = valid_user_id(&turn.user_id)?;
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let turn_id = Uuid::new_v4();
        self.store.update_style(user_id, &turn.style);

        let message = turn.message.trim().to_string();
        let has_message = !message.is_empty();
        if has_message {
            self.store.append_message(user_id, &message);
            self.store.append_chat_entry(user_id, &message, true);
        }

        if let Some(upload) = &turn.image {
            // Screenshots bypass the step machine entirely; a screenshot
            // always means direct help.
            self.store.record_photo_upload(user_id);
            self.persist_best_effort();

            let profile = self.store.get(user_id);
            let system = if turn.is_trial {
                prompt::trial_image_system()
            } else {
                prompt::image_system(&profile, &turn.context)
            };
            let req = CompletionRequest {
                system: Some(system),
                user: prompt::image_user(&turn.context, turn_id),
                image: Some(EncodedImage::from_upload(upload)),
                max_tokens: self.cfg.max_tokens_image,
            };

            let result = self.complete_with_retry(&req).await;
            self.save_artifacts("image", turn_id, &req, result.as_deref().ok());
            let reply = match result {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => fallback::unreadable_image_reply().to_string(),
                Err(e) => {
                    self.note_unavailable("image", &e);
                    fallback::unreadable_image_reply().to_string()
                }
            };

            self.store.append_chat_entry(user_id, &reply, false);
            self.persist_best_effort();
            return Ok(TurnReply { reply });
        }

        let profile = self.store.get(user_id);
        let mode = flow::classify(profile.conversation_step, has_message);
        if has_message {
            self.store.advance_step(user_id);
        }
        self.persist_best_effort();

        let req = CompletionRequest {
            system: Some(prompt::chat_system(&profile, turn.is_trial)),
            user: match mode {
                PromptMode::Greeting => prompt::greeting_user(&profile),
                PromptMode::FollowUp => prompt::followup_user(&profile, &message),
                PromptMode::Transition => prompt::transition_user(&profile),
                PromptMode::Help => prompt::help_user(&profile, &message, self.cfg.recent_window),
            },
            image: None,
            max_tokens: self.cfg.max_tokens_chat,
        };

        let result = self.gateway.complete(&req, self.debug).await;
        self.save_artifacts("chat", turn_id, &req, result.as_deref().ok());
        let reply = match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback::chat_reply(&profile, mode, profile.messages.len()),
            Err(e) => {
                self.note_unavailable("chat", &e);
                fallback::chat_reply(&profile, mode, profile.messages.len())
            }
        };

        self.store.append_chat_entry(user_id, &reply, false);
        self.persist_best_effort();
        Ok(TurnReply { reply })
    }

    /// Keyboard quick-suggest over pasted conversation context. Read-only
    /// with respect to the profile.
    pub async fn handle_suggest(&self, turn: &SuggestTurn) -> Result<SuggestionSet, WingmanError> {
        let user_id = valid_user_id(&turn.user_id)?;
        if turn.context.trim().is_empty() {
            return Err(WingmanError::InvalidInput("context is required".into()));
        }
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let turn_id = Uuid::new_v4();
        let profile = self.store.get(user_id);
        let req = CompletionRequest {
            system: None,
            user: prompt::suggest_user(&profile, &turn.context, &turn.conversation_type),
            image: None,
            max_tokens: self.cfg.max_tokens_suggest,
        };

        let result = self.gateway.complete(&req, self.debug).await;
        self.save_artifacts("suggest", turn_id, &req, result.as_deref().ok());
        let suggestions = match result {
            Ok(text) => extract::extract_suggestions(&text),
            Err(e) => {
                self.note_unavailable("suggest", &e);
                Vec::new()
            }
        };
        let suggestions = if suggestions.is_empty() {
            fallback::suggest_suggestions()
        } else {
            suggestions
        };
        Ok(SuggestionSet::capped(suggestions))
    }

    /// Keyboard/share-extension screenshot analysis: always 1-3 sendable
    /// suggestions. One bounded retry on pure transport failure, re-sending
    /// the identical encoded image.
    pub async fn handle_image(&self, turn: &ImageTurn) -> Result<SuggestionSet, WingmanError> {
        let user_id = valid_user_id(&turn.user_id)?;
        let Some(upload) = &turn.image else {
            return Err(WingmanError::InvalidInput("image is required".into()));
        };
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let turn_id = Uuid::new_v4();
        self.store.record_photo_upload(user_id);
        self.persist_best_effort();

        let profile = self.store.get(user_id);
        let system = if turn.is_trial {
            prompt::trial_image_system()
        } else if turn.from_keyboard {
            prompt::keyboard_image_system(&profile, &turn.context)
        } else {
            prompt::image_system(&profile, &turn.context)
        };
        let req = CompletionRequest {
            system: Some(system),
            user: prompt::keyboard_image_user(&turn.context, turn_id),
            image: Some(EncodedImage::from_upload(upload)),
            max_tokens: self.cfg.max_tokens_keyboard_image,
        };

        let result = self.complete_with_retry(&req).await;
        self.save_artifacts("keyboard-image", turn_id, &req, result.as_deref().ok());
        let suggestions = match result {
            Ok(text) => extract::extract_suggestions(&text),
            Err(e) => {
                self.note_unavailable("keyboard-image", &e);
                Vec::new()
            }
        };
        let suggestions = if suggestions.is_empty() {
            fallback::image_suggestions(&turn.context.who)
        } else {
            suggestions
        };
        Ok(SuggestionSet::capped(suggestions))
    }

    async fn complete_with_retry(&self, req: &CompletionRequest) -> Result<String, GatewayError> {
        match self.gateway.complete(req, self.debug).await {
            Err(e) if e.is_transient() => {
                if self.debug {
                    eprintln!("debug/turn: retrying after transport failure: {e}");
                }
                self.gateway.complete(req, self.debug).await
            }
            other => other,
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn save_artifacts(&self, stage: &str, turn_id: Uuid, req: &CompletionRequest, response: Option<&str>) {
        match log::save_turn(stage, turn_id, req, response, &self.cfg) {
            Ok(saved) if self.debug => log::print_saved_paths(stage, &saved),
            Ok(_) => {}
            Err(e) => eprintln!("warning: could not save {stage} artifacts: {e:#}"),
        }
    }

    fn persist_best_effort(&self) {
        if let Err(e) = self.store.persist() {
            eprintln!("warning: failed to persist profiles: {e}");
        }
    }

    fn note_unavailable(&self, stage: &str, err: &GatewayError) {
        eprintln!("{stage}: model unavailable ({err}), using fallback");
    }
}

fn valid_user_id(user_id: &str) -> Result<&str, WingmanError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(WingmanError::InvalidInput("userId required".into()));
    }
    Ok(trimmed)
}
