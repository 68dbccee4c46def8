use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use wingman::config::Config;
use wingman::gateway::{CompletionRequest, DynGateway, GatewayError, ModelGateway, NoopGateway};
use wingman::profile::ProfileStore;
use wingman::turn::TurnHandler;
use wingman::wire::{ChatTurn, ImageContext, ImageUpload, StyleParams, SuggestTurn};

fn handler(gateway: DynGateway) -> TurnHandler {
    TurnHandler::new(Arc::new(ProfileStore::in_memory()), gateway, Config::default(), false)
}

fn chat(user: &str, message: &str) -> ChatTurn {
    ChatTurn {
        user_id: user.into(),
        message: message.into(),
        image: None,
        style: StyleParams::default(),
        context: ImageContext::default(),
        is_trial: false,
    }
}

/// Records every system prompt it is sent and answers with fixed text.
struct RecordingGateway {
    systems: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl ModelGateway for RecordingGateway {
    async fn complete(&self, req: &CompletionRequest, _debug: bool) -> Result<String, GatewayError> {
        self.systems.lock().push(req.system.clone());
        Ok("ok here's what i'd do".into())
    }
}

/// Answers slowly, to expose interleaving when turns are not serialized.
struct SlowGateway;

#[async_trait]
impl ModelGateway for SlowGateway {
    async fn complete(&self, _req: &CompletionRequest, _debug: bool) -> Result<String, GatewayError> {
        tokio::time::sleep(Duration::from_millis(25)).await;
        Ok("got you, try this".into())
    }
}

#[tokio::test]
async fn every_surface_answers_even_with_no_model() {
    let handler = handler(Arc::new(NoopGateway));

    let greeting = handler.handle_message(&chat("u", "")).await.unwrap();
    assert!(!greeting.reply.is_empty());

    let reply = handler.handle_message(&chat("u", "she left me on read")).await.unwrap();
    assert!(!reply.reply.is_empty());

    let suggest = handler
        .handle_suggest(&SuggestTurn {
            user_id: "u".into(),
            context: "them: hey stranger".into(),
            conversation_type: "dating".into(),
        })
        .await
        .unwrap();
    assert!(!suggest.suggestions.is_empty());
    assert!(suggest.suggestions.len() <= 3);

    let image = handler
        .handle_message(&ChatTurn {
            image: Some(ImageUpload { file_name: "shot.png".into(), bytes: vec![0xff] }),
            ..chat("u", "")
        })
        .await
        .unwrap();
    assert!(!image.reply.is_empty());
}

#[tokio::test]
async fn onboarding_steps_then_steady_state_forever() {
    let handler = handler(Arc::new(NoopGateway));
    let mut steps = Vec::new();
    for msg in ["", "hi", "ok cool"] {
        handler.handle_message(&chat("u", msg)).await.unwrap();
        steps.push(handler.store().get("u").conversation_step);
    }
    assert_eq!(steps, vec![0, 1, 2]);

    for _ in 0..5 {
        handler.handle_message(&chat("u", "help me reply")).await.unwrap();
        assert_eq!(handler.store().get("u").conversation_step, 3);
    }
}

#[tokio::test]
async fn trial_and_premium_chat_prompts_differ() {
    let gateway = Arc::new(RecordingGateway { systems: Mutex::new(Vec::new()) });
    let handler = handler(gateway.clone());

    handler.handle_message(&chat("premium-user", "hey")).await.unwrap();
    let mut trial_turn = chat("trial-user", "hey");
    trial_turn.is_trial = true;
    handler.handle_message(&trial_turn).await.unwrap();

    let systems = gateway.systems.lock();
    let premium = systems[0].as_deref().unwrap();
    let trial = systems[1].as_deref().unwrap();
    assert_ne!(premium, trial);
    assert!(trial.contains("upgrading"));
    assert!(!premium.contains("upgrading"));
}

#[tokio::test]
async fn same_user_turns_are_serialized() {
    let handler = Arc::new(handler(Arc::new(SlowGateway)));

    let a = {
        let h = handler.clone();
        tokio::spawn(async move { h.handle_message(&chat("u", "first thing")).await })
    };
    let b = {
        let h = handler.clone();
        tokio::spawn(async move { h.handle_message(&chat("u", "second thing")).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let history = handler.store().chat_history("u");
    assert_eq!(history.len(), 4);
    // strict user/assistant alternation: no turn's bookkeeping interleaves
    // with another's
    let pattern: Vec<bool> = history.iter().map(|e| e.is_user).collect();
    assert_eq!(pattern, vec![true, false, true, false]);
    assert_eq!(handler.store().get("u").conversation_step, 2);
}

#[tokio::test]
async fn style_knobs_flow_into_the_profile() {
    let handler = handler(Arc::new(NoopGateway));
    let mut turn = chat("u", "hey");
    turn.style = StyleParams {
        response_style: "spicy".into(),
        msg_length: Some(1),
        emoji_usage: Some(3),
        flirtiness: Some(3),
        user_samples: "lol bet".into(),
    };
    handler.handle_message(&turn).await.unwrap();

    let profile = handler.store().get("u");
    assert_eq!(profile.style.length, 1);
    assert_eq!(profile.style.emoji, 3);
    assert_eq!(profile.style.flirt, 3);
    assert_eq!(profile.text_samples, "lol bet");
    assert_eq!(profile.response_style.as_str(), "spicy");
}
