use crate::flow::PromptMode;
use crate::profile::UserProfile;
use crate::tone::ResponseStyle;

/// Canned replies for when the model is unavailable or its output is
/// unusable. The product contract is that the user always receives some
/// plausible, in-character reply; which entry of a bucket gets served is
/// not contractual, so selection rotates on the caller's turn count to
/// stay deterministic.

pub fn chat_reply(profile: &UserProfile, mode: PromptMode, seed: usize) -> String {
    let name_greet = profile
        .name
        .as_deref()
        .map(|n| format!("{}, ", n.to_lowercase()))
        .unwrap_or_default();
    let vibe = truncate(profile.comes_across_as(), 25);
    let bucket = bucket(profile.response_style, mode, &name_greet, vibe);
    bucket[seed % bucket.len()].clone()
}

fn bucket(style: ResponseStyle, mode: PromptMode, g: &str, v: &str) -> Vec<String> {
    use PromptMode::*;
    use ResponseStyle::*;
    match (style, mode) {
        (Normal, Greeting) => vec![
            format!("hey {g}{v} - i like that. so who are you usually texting... crush? someone from an app? ex?"),
            format!("{g}oh {v} vibes? i can work with that. so what kind of situations do you usually need help with?"),
        ],
        (Normal, FollowUp) => vec![
            "oh okay that makes sense. and when you text are you more short and sweet or do you go in with longer messages?".into(),
            "got it got it. so what's usually your struggle - starting convos, keeping them going, knowing what to say?".into(),
        ],
        (Normal, Transition) => vec![
            "perfect i think i got a feel for you. send me a screenshot or tell me what's happening and i'll help. btw fill out settings with examples of how you text and my responses will sound even more like you".into(),
        ],
        (Normal, Help) => vec![
            "okay so what do you want to say back?".into(),
            "got it. want me to give you some options?".into(),
            "so what's the goal here - just respond well or you trying to make something happen?".into(),
        ],
        (Bold, Greeting) => vec![
            format!("{g}{v} - respect. who's usually on the other end of these texts?"),
            format!("hey {g}{v}? okay i see you. so what kind of help you usually need?"),
        ],
        (Bold, FollowUp) => vec![
            "oh okay. you more of a short texter or you write paragraphs?".into(),
            "got it. what's your weak spot - starting convos? flirting? what?".into(),
        ],
        (Bold, Transition) => vec![
            "bet. send me a screenshot or tell me what's up. settings = better responses btw".into(),
        ],
        (Bold, Help) => vec![
            "what do you want to say".into(),
            "want me to give you options?".into(),
            "what's the play".into(),
        ],
        (SuperBold, Greeting) => vec![
            format!("{g}{v} - let's go. who are we texting?"),
            format!("hey {g}{v}. what kind of situations you need help with?"),
        ],
        (SuperBold, FollowUp) => vec![
            "okay. short texter or paragraphs?".into(),
            "got it. what do you struggle with most?".into(),
        ],
        (SuperBold, Transition) => vec![
            "say less. send me the screenshot or tell me what's happening. fill out settings for better responses".into(),
        ],
        (SuperBold, Help) => vec![
            "what do you need".into(),
            "want options?".into(),
            "what's the move".into(),
        ],
        (Spicy, Greeting) => vec![
            format!("hey {g}{v}... i like it 😏 so who's the lucky person you're usually texting?"),
            format!("{g}oh {v}? this is gonna be fun 🌶️ what kind of help you usually need?"),
        ],
        (Spicy, FollowUp) => vec![
            "okay okay 👀 and when you text are you playing it cool or going for it?".into(),
            "got it 😏 what's your weak spot - being too nice? not flirty enough?".into(),
        ],
        (Spicy, Transition) => vec![
            "perfect. send me what you got and let's make something happen. fill out settings for even spicier responses 🌶️".into(),
        ],
        (Spicy, Help) => vec![
            "so what do you want to say 👀".into(),
            "want me to give you some options? 😏".into(),
            "what's the goal here 🌶️".into(),
        ],
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Chat-path reply when the screenshot was received but analysis failed.
pub fn unreadable_image_reply() -> &'static str {
    "i can see you sent something but i'm having trouble reading it rn. can you tell me what's going on or try sending it again?"
}

/// Keyboard/share fallback suggestions, keyed by the coarse relationship
/// bucket: keep it warm for a crush, dry for an ex, neutral otherwise.
pub fn image_suggestions(who: &str) -> Vec<String> {
    if who.contains("crush") || who.contains("dating") {
        vec![
            "that's actually really cool".into(),
            "wait tell me more about that".into(),
            "lol you're interesting".into(),
        ]
    } else if who.contains("ex") {
        vec!["lol yeah".into(), "that's cool".into(), "nice".into()]
    } else {
        vec![
            "lol wait really?".into(),
            "that's actually pretty cool".into(),
            "tell me more".into(),
        ]
    }
}

/// Generic quick-suggest fallback when no context-specific table applies.
pub fn suggest_suggestions() -> Vec<String> {
    vec![
        "hey, that's actually really cool".into(),
        "lol no way, tell me more".into(),
        "wait i need to hear the full story".into(),
    ]
}
