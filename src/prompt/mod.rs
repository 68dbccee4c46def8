use uuid::Uuid;

use crate::profile::UserProfile;
use crate::tone;
use crate::wire::ImageContext;

/// Prompt construction. Everything here is pure string composition; the
/// gateway owns the network round-trip. Two independent builders: plain
/// text chat (mode-dependent user prompt under a fixed human-voice system
/// prompt) and screenshot analysis (vision prompt grounded in the image).

fn human_voice_rules() -> &'static str {
    r#"How to sound human:
- Use lowercase, minimal punctuation
- React naturally ("lol", "wait", "oh", "nah", "bet", "lowkey")
- Reference what they actually said, don't be generic
- Keep it short - 1-2 sentences max
- Don't explain yourself or use filler phrases like "I think" or "In my opinion"
- Never use phrases like "I understand" or "That makes sense" - just respond
- Be direct but warm, like you're texting your friend
- Match their energy - if they're stressed, acknowledge it briefly then help"#
}

/// System prompt for every plain chat turn. Trial callers get the degraded
/// generic-advice prompt with an upgrade nudge instead; this is a product
/// tier branch, not a quality fallback.
pub fn chat_system(profile: &UserProfile, is_trial: bool) -> String {
    if is_trial {
        return "Give brief, generic texting advice. Keep it short (1-2 sentences). \
                End with a subtle hint about upgrading for personalized suggestions."
            .to_string();
    }

    let mut system = format!(
        r#"You're texting a friend who needs help with their conversations. Sound like a real person - not an AI, not a therapist, not customer service.

IMPORTANT - Be inclusive:
- This app is for everyone - all genders, all orientations
- Pick up on context clues to understand who they're texting
- Don't assume - if unclear, use neutral language or ask naturally
- Adapt your advice based on who they're talking to and their situation

{rules}"#,
        rules = human_voice_rules()
    );

    if let Some(name) = &profile.name {
        system.push_str(&format!("\n\nUser's name: {name}"));
    }
    if !profile.personality.is_empty() {
        system.push_str(&format!("\nTheir vibe: {}", profile.personality.join(", ")));
    }
    if !profile.text_samples.is_empty() {
        system.push_str(&format!("\nHow they text: \"{}\"", truncate(&profile.text_samples, 150)));
    }
    system
}

/// Mode A: the very first turn after onboarding, before the user has said
/// anything.
pub fn greeting_user(profile: &UserProfile) -> String {
    let name = profile.name.as_deref().unwrap_or("Someone");
    let vibe = profile.comes_across_as();
    let tone = tone::directive(profile.response_style);
    format!(
        r#"{name} just joined. They want to come across as: "{vibe}"

VIBE: {tone}

Write a natural, friendly first message (2-3 sentences) that:
1. Greet them by name (or just "hey" if no name)
2. Acknowledge their vibe naturally - like "oh {vibe}? i can work with that"
3. Ask ONE casual question to get to know them better - something like who they're usually texting or what kind of situations they need help with

Frame it like a friend asking, NOT like an interview. Use "so" or "oh" to start questions - feels more natural.

Examples of natural questions:
- "so who's usually on the other end of these convos... crush? someone from an app?"
- "what kind of situations do you usually need help with - starting convos, keeping them going, what?"

Don't mention settings yet. Just get to know them first. lowercase, casual."#
    )
}

/// Mode B: react to their first answer, ask one more follow-up.
pub fn followup_user(profile: &UserProfile, message: &str) -> String {
    let name = profile.name.as_deref().unwrap_or("someone");
    let vibe = profile.comes_across_as();
    let tone = tone::directive(profile.response_style);
    format!(
        r#"You're talking to {name} who wants to come across as: "{vibe}"

They just told you: "{message}"

VIBE: {tone}

Write a natural response (2-3 sentences) that:
1. React to what they said - be genuine, not generic ("oh nice" or "okay cool" type reactions)
2. Ask ONE more follow-up question to understand them better - maybe about their texting style, what they struggle with, or what their goal usually is

Keep it conversational. You're getting to know them so you can help better. After this you'll get straight to helping.

Frame like a friend, not an interviewer. lowercase."#
    )
}

/// Mode C: acknowledge, pivot to helping, plug the settings screen once.
pub fn transition_user(profile: &UserProfile) -> String {
    let name = profile.name.as_deref().unwrap_or("this person");
    let vibe = profile.comes_across_as();
    let tone = tone::directive(profile.response_style);
    let recent = profile.recent_messages(2).join(" -> ");
    format!(
        r#"You now know {name}:
- Wants to come across as: "{vibe}"
- Context from convo: "{recent}"

VIBE: {tone}

Write a short message (2 sentences max) that:
1. Quick acknowledgment of what they shared
2. Tell them you're ready - ask them to send a screenshot or describe what's happening
3. Mention that the more they fill out in settings, the better you can match their actual texting style

Be direct now. You know enough about them. Time to help. lowercase."#
    )
}

/// Mode D, steady state: direct help with whatever they describe.
pub fn help_user(profile: &UserProfile, message: &str, recent_window: usize) -> String {
    let name = profile.name.as_deref().unwrap_or("someone");
    let vibe = profile.comes_across_as();
    let tone = tone::directive(profile.response_style);
    let style = tone::style_instructions(profile.style);

    let mut about = format!("{vibe} vibe");
    if !profile.personality.is_empty() {
        about.push_str(&format!(", {}", profile.personality.join(", ")));
    }
    if !profile.text_samples.is_empty() {
        about.push_str(&format!(". texts like: \"{}\"", truncate(&profile.text_samples, 100)));
    }
    about.push_str(&deep_context(profile));

    let recent = profile.recent_messages(recent_window);
    let recency = if recent.len() > 1 {
        format!("\nwhat they've said lately: \"{}\"", recent.join(" -> "))
    } else {
        String::new()
    };

    format!(
        r#"You're {name}'s friend helping them text. Talk like you're texting them back.

about them: {about}{recency}

they said: "{message}"

VIBE: {tone}
STYLE: {style}

respond like their friend would - give your honest take on the situation and a few options they could send. tell them which one you'd go with.

rules:
- no bullet points or numbered lists, just talk naturally
- lowercase, casual punctuation
- keep it brief - you're texting, not writing an essay
- the replies you suggest should sound like {name}, not you
- be real with them - if something seems off, say it
- don't say "I think" or "In my opinion" - just say it"#
    )
}

fn deep_context(profile: &UserProfile) -> String {
    let mut out = String::new();
    let deep = &profile.deep;
    if let Some(v) = &deep.no_reply_thought {
        out.push_str(&format!(" When no reply: \"{v}\"."));
    }
    if let Some(v) = &deep.when_you_like_someone {
        out.push_str(&format!(" When they like someone: \"{v}\"."));
    }
    if let Some(v) = &deep.what_kills_convos {
        out.push_str(&format!(" What kills their convos: \"{v}\"."));
    }
    if let Some(v) = &deep.confidence_level {
        out.push_str(&format!(" Confidence: \"{v}\"."));
    }
    if let Some(v) = &deep.what_you_want {
        out.push_str(&format!(" Looking for: \"{v}\"."));
    }
    out
}

/// Relationship framing derived from who the user says they're texting.
/// Matching is by substring because the who field is quick-tap text, not an
/// enum.
pub fn relationship_vibe(who: &str) -> Option<&'static str> {
    if who.contains("crush") || who.contains("dating") {
        Some("this is someone they like so the stakes feel high. help them be smooth but not try-hard.")
    } else if who.contains("ex") {
        Some("this is an ex so tread carefully. help them stay cool and unbothered, not desperate or bitter.")
    } else if who.contains("friend") || who.contains("talking") {
        Some("this is casual so keep it light and natural. no pressure.")
    } else {
        None
    }
}

/// Full screenshot-analysis system prompt for the chat surface: quote their
/// last message, one-line vibe read, then grounded reply options.
pub fn image_system(profile: &UserProfile, ctx: &ImageContext) -> String {
    let name = profile.name.as_deref().unwrap_or("bro");
    let name_upper = name.to_uppercase();
    let relationship = relationship_vibe(&ctx.who).unwrap_or("");
    let style_vibe = tone::image_style_vibe(profile.style);

    let mut personality = String::new();
    if !profile.text_samples.is_empty() {
        personality.push_str(&format!(
            "\n\nHOW {name_upper} ACTUALLY TEXTS (copy this style):\n\"{}\"",
            truncate(&profile.text_samples, 200)
        ));
    }
    if !profile.personality.is_empty() {
        personality.push_str(&format!("\n\nTHEIR VIBE: {}", profile.personality.join(", ")));
    }

    format!(
        r#"You're {name}'s friend helping them figure out what to text back. Read the screenshot first.

HOW TO HELP:
1. Look at what the other person said (their last message in the screenshot)
2. Give a quick read on the vibe - is it going well or nah?
3. Give 2-3 reply options that actually respond to what they said

YOUR REPLY OPTIONS SHOULD:
- Actually respond to their message, not be generic
- Sound like real texts (lowercase, casual, no periods at the end)
- Give variety: one chill, one more confident, one playful
- Match how {name} texts if you know their style

HOW TO TALK TO {name_upper}:
- Sound like their friend, not an AI or therapist
- Be direct - "ok so they said..." then get into it
- Use casual language (lol, nah, lowkey, bet, etc)
- Keep your commentary brief, focus on the options
- If the convo looks rough, be honest but helpful

{relationship}
{style_vibe}{personality}"#
    )
}

/// Trial tier: one basic observation, one generic suggestion, upgrade line.
pub fn trial_image_system() -> String {
    r#"read the screenshot and give quick advice.
- one sentence about what's happening
- one basic reply suggestion
end with: "upgrade for personalized replies that match your style""#
        .to_string()
}

/// Keyboard/share variant: machine-checkable output shape so extraction can
/// recover the options without the commentary.
pub fn keyboard_image_system(profile: &UserProfile, ctx: &ImageContext) -> String {
    let relationship = relationship_vibe(&ctx.who).unwrap_or("");
    let style_vibe = tone::keyboard_style_vibe(profile.style);

    let mut samples = String::new();
    if !profile.text_samples.is_empty() {
        samples.push_str(&format!(
            "\n\nMATCH THIS TEXTING STYLE:\n\"{}\"",
            truncate(&profile.text_samples, 150)
        ));
    }

    format!(
        r#"You analyze text message screenshots and generate replies.

IMPORTANT: You must READ the actual text in the image before responding.

Your response format MUST be:

THEIR MESSAGE: "[copy the exact text of their last message from the screenshot]"

REPLIES:
{{"suggestions": ["reply 1", "reply 2", "reply 3"]}}

Rules for replies:
- Each reply MUST respond to what they said in "THEIR MESSAGE"
- Be specific - reference their actual words/topic
- Sound human: lowercase, casual, 1-2 sentences
- 3 different vibes: chill, interested, playful
- NO generic responses like just "hey" or "that's cool"

{relationship}
{style_vibe}{samples}"#
    )
}

/// User half of the screenshot request. The turn id makes every request
/// textually unique so no layer can serve a stale analysis for a reused
/// file name.
pub fn image_user(ctx: &ImageContext, turn_id: Uuid) -> String {
    let intro = if !ctx.who.is_empty() && !ctx.help.is_empty() {
        format!("ok so this is {} and they need help with {}. ", ctx.who, ctx.help)
    } else if !ctx.who.is_empty() {
        format!("this is {}. ", ctx.who)
    } else {
        String::new()
    };

    format!(
        r#"[{turn_id}] {intro}

Read this screenshot carefully. I need help replying.

Tell me:
1. What did they say? (quote their last message from the image)
2. Is this going good or should I be worried?
3. Give me 2-3 replies that respond to what THEY said

Make sure your suggestions actually relate to their message, not just generic stuff."#
    )
}

pub fn keyboard_image_user(ctx: &ImageContext, turn_id: Uuid) -> String {
    let who = if ctx.who.is_empty() { String::new() } else { format!("This is a {}. ", ctx.who) };
    let help = if ctx.help.is_empty() { String::new() } else { format!("They want to {}.", ctx.help) };

    format!(
        r#"[{turn_id}] Read this text conversation screenshot.

{who}{help}

First, tell me: what is the other person's last message? (Read the actual text bubbles in the image - look for their most recent message)

Then give me 3 reply options in JSON format.

Format your response exactly like this:
THEIR MESSAGE: "[the exact text you read from their last message]"

{{"suggestions": ["reply 1", "reply 2", "reply 3"]}}"#
    )
}

/// Keyboard quick-suggest over pasted conversation context: asks for a bare
/// JSON suggestions object.
pub fn suggest_user(profile: &UserProfile, context: &str, conversation_type: &str) -> String {
    let name = profile.name.as_deref().unwrap_or("someone");
    let vibe = profile.comes_across_as();

    let personality = if profile.personality.is_empty() {
        String::new()
    } else {
        format!("\nPERSONALITY: {}", profile.personality.join(", "))
    };
    let struggles = if profile.struggles.is_empty() {
        String::new()
    } else {
        format!("\nSTRUGGLES WITH: {}", profile.struggles.join(", "))
    };
    let samples = if profile.text_samples.is_empty() {
        String::new()
    } else {
        format!("\nHOW THEY TEXT:\n{}", profile.text_samples)
    };

    let mut insights = String::new();
    if let Some(v) = &profile.deep.confidence_level {
        insights.push_str(&format!("\n- Confidence: {v}"));
    }
    if let Some(v) = &profile.deep.what_you_want {
        insights.push_str(&format!("\n- Looking for: {v}"));
    }
    if let Some(v) = &profile.deep.when_you_like_someone {
        insights.push_str(&format!("\n- When they like someone: {v}"));
    }
    let insights = if insights.is_empty() {
        String::new()
    } else {
        format!("\nHOW THEY THINK:{insights}")
    };

    format!(
        r#"You're helping {name} respond in a {conversation_type} conversation.

THEIR VIBE: {vibe}{personality}{struggles}{samples}{insights}

STYLE:
- Length: {length}
- Emojis: {emoji}
- Flirtiness: {flirt}

CONTEXT:
{context}

Give exactly 3 different response options they could send. Each should:
- Sound like {name} (match their vibe, style, and how they actually text)
- Be natural and conversational
- Be the actual message to send

Format your response as JSON:
{{"suggestions": ["response 1", "response 2", "response 3"]}}

Just the JSON, nothing else."#,
        length = tone::length_guide(profile.style.length),
        emoji = tone::emoji_guide(profile.style.emoji),
        flirt = tone::flirt_guide(profile.style.flirt),
    )
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::ResponseStyle;

    fn sample_profile() -> UserProfile {
        let mut p = UserProfile::default();
        p.name = Some("Riley".into());
        p.answers = vec!["confident, funny".into()];
        p.personality = vec!["confident".into(), "funny".into()];
        p.text_samples = "lol yeah for sure".into();
        p
    }

    #[test]
    fn relationship_vibe_buckets_by_substring() {
        let dating = relationship_vibe("dating app").unwrap();
        let crush = relationship_vibe("my crush").unwrap();
        assert_eq!(dating, crush);
        assert!(crush.contains("stakes feel high"));

        assert!(relationship_vibe("my ex").unwrap().contains("unbothered"));
        assert!(relationship_vibe("a friend").unwrap().contains("casual"));
        assert!(relationship_vibe("").is_none());
        assert!(relationship_vibe("coworker").is_none());
    }

    #[test]
    fn image_system_carries_relationship_framing() {
        let p = sample_profile();
        let with_crush = image_system(&p, &ImageContext { who: "my crush".into(), help: String::new() });
        assert!(with_crush.contains("stakes feel high"));

        let plain = image_system(&p, &ImageContext::default());
        assert!(!plain.contains("stakes feel high"));
        assert!(plain.contains("RILEY"));
        assert!(plain.contains("2-3 reply options"));
    }

    #[test]
    fn trial_prompts_differ_and_nudge_upgrade() {
        let p = sample_profile();
        let premium_chat = chat_system(&p, false);
        let trial_chat = chat_system(&p, true);
        assert_ne!(premium_chat, trial_chat);
        assert!(trial_chat.contains("upgrad"));

        let trial_image = trial_image_system();
        assert_ne!(trial_image, image_system(&p, &ImageContext::default()));
        assert!(trial_image.contains("upgrade for personalized replies"));
    }

    #[test]
    fn premium_chat_system_is_personalized() {
        let p = sample_profile();
        let system = chat_system(&p, false);
        assert!(system.contains("Riley"));
        assert!(system.contains("confident, funny"));
        assert!(system.contains("lol yeah for sure"));
    }

    #[test]
    fn help_prompt_embeds_tone_and_style() {
        let mut p = sample_profile();
        p.response_style = ResponseStyle::Spicy;
        p.deep.what_kills_convos = Some("overthinking".into());
        p.messages = vec!["a".into(), "b".into(), "she left me on read".into()];
        let prompt = help_user(&p, "she left me on read", 4);
        assert!(prompt.contains("flirty and playful"));
        assert!(prompt.contains("LENGTH: medium (1-2 sentences)"));
        assert!(prompt.contains("overthinking"));
        assert!(prompt.contains("she left me on read"));
    }

    #[test]
    fn greeting_mentions_name_and_vibe() {
        let p = sample_profile();
        let prompt = greeting_user(&p);
        assert!(prompt.contains("Riley just joined"));
        assert!(prompt.contains("confident, funny"));
    }

    #[test]
    fn image_user_prompts_are_unique_per_turn() {
        let ctx = ImageContext { who: "crush".into(), help: "respond".into() };
        let a = image_user(&ctx, Uuid::new_v4());
        let b = image_user(&ctx, Uuid::new_v4());
        assert_ne!(a, b);
        assert!(a.contains("ok so this is crush and they need help with respond"));
    }

    #[test]
    fn keyboard_image_system_demands_the_strict_format() {
        let p = sample_profile();
        let system = keyboard_image_system(&p, &ImageContext::default());
        assert!(system.contains("THEIR MESSAGE:"));
        assert!(system.contains(r#""suggestions""#));
    }

    #[test]
    fn suggest_prompt_requests_bare_json() {
        let p = sample_profile();
        let prompt = suggest_user(&p, "them: hey stranger", "dating");
        assert!(prompt.contains("them: hey stranger"));
        assert!(prompt.contains("Just the JSON, nothing else."));
        assert!(prompt.contains("Length: medium (1-2 sentences)"));
    }
}
