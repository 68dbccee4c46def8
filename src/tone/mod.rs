use serde::{Deserialize, Serialize};

/// ========================================
/// Tone knobs -> natural-language fragments
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseStyle {
    #[default]
    Normal,
    Bold,
    SuperBold,
    Spicy,
}

impl ResponseStyle {
    /// Client input is not strictly validated upstream; anything
    /// unrecognized lands on Normal.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "bold" => Self::Bold,
            "super-bold" | "superbold" => Self::SuperBold,
            "spicy" => Self::Spicy,
            _ => Self::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
            Self::SuperBold => "super-bold",
            Self::Spicy => "spicy",
        }
    }
}

/// The three 1-3 sliders. Out-of-range values resolve to the documented
/// defaults (length 2, emoji 2, flirt 1) rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneSliders {
    pub length: u8,
    pub emoji: u8,
    pub flirt: u8,
}

impl Default for ToneSliders {
    fn default() -> Self {
        Self { length: 2, emoji: 2, flirt: 1 }
    }
}

impl ToneSliders {
    pub fn new(length: Option<u8>, emoji: Option<u8>, flirt: Option<u8>) -> Self {
        Self {
            length: clamp_level(length, 2),
            emoji: clamp_level(emoji, 2),
            flirt: clamp_level(flirt, 1),
        }
    }
}

fn clamp_level(raw: Option<u8>, default: u8) -> u8 {
    match raw {
        Some(v @ 1..=3) => v,
        _ => default,
    }
}

pub fn directive(style: ResponseStyle) -> &'static str {
    match style {
        ResponseStyle::Normal => {
            "Keep the tone friendly, warm, and casual. Like texting a good friend."
        }
        ResponseStyle::Bold => {
            "Be confident and direct. Don't be afraid to make bold statements or give assertive suggestions."
        }
        ResponseStyle::SuperBold => {
            "Be daring and assertive. Push the conversation forward with strong energy and direct compliments."
        }
        ResponseStyle::Spicy => {
            "Be flirty and playful. Add some charm, wit, and subtle romantic energy. Keep it fun and enticing."
        }
    }
}

pub fn length_guide(level: u8) -> &'static str {
    match level {
        1 => "short (1 sentence)",
        3 => "longer (2-3 sentences)",
        _ => "medium (1-2 sentences)",
    }
}

pub fn emoji_guide(level: u8) -> &'static str {
    match level {
        1 => "no emojis",
        3 => "use emojis freely",
        _ => "occasional emoji",
    }
}

pub fn flirt_guide(level: u8) -> &'static str {
    match level {
        2 => "subtly flirty",
        3 => "openly flirty",
        _ => "friendly only",
    }
}

pub fn style_instructions(sliders: ToneSliders) -> String {
    format!(
        "LENGTH: {} | EMOJIS: {} | FLIRT: {}",
        length_guide(sliders.length),
        emoji_guide(sliders.emoji),
        flirt_guide(sliders.flirt)
    )
}

/// Lowercase fragment bundle used by the screenshot-analysis system prompt.
pub fn image_style_vibe(sliders: ToneSliders) -> String {
    let mut vibe = String::new();
    match sliders.flirt {
        3 => vibe.push_str("be flirty and playful. "),
        2 => vibe.push_str("subtle flirting is ok. "),
        _ => vibe.push_str("keep it friendly, not too flirty. "),
    }
    match sliders.emoji {
        3 => vibe.push_str("emojis are cool. "),
        1 => vibe.push_str("no emojis. "),
        _ => {}
    }
    match sliders.length {
        1 => vibe.push_str("keep responses short - 1 line max."),
        3 => vibe.push_str("can be a bit longer if needed."),
        _ => vibe.push_str("1-2 sentences is perfect."),
    }
    vibe
}

/// Terser variant for the keyboard path, where every token of commentary
/// competes with the three reply options.
pub fn keyboard_style_vibe(sliders: ToneSliders) -> String {
    let mut vibe = String::new();
    match sliders.flirt {
        3 => vibe.push_str("can be flirty/playful. "),
        2 => vibe.push_str("subtle flirting ok. "),
        _ => {}
    }
    match sliders.emoji {
        3 => vibe.push_str("emojis welcome. "),
        1 => vibe.push_str("no emojis. "),
        _ => {}
    }
    match sliders.length {
        1 => vibe.push_str("keep it short."),
        3 => vibe.push_str("can be longer."),
        _ => {}
    }
    vibe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_style_has_a_directive() {
        for style in [
            ResponseStyle::Normal,
            ResponseStyle::Bold,
            ResponseStyle::SuperBold,
            ResponseStyle::Spicy,
        ] {
            assert!(!directive(style).is_empty());
        }
    }

    #[test]
    fn every_slider_level_has_a_fragment() {
        for level in 1..=3u8 {
            assert!(!length_guide(level).is_empty());
            assert!(!emoji_guide(level).is_empty());
            assert!(!flirt_guide(level).is_empty());
        }
    }

    #[test]
    fn unknown_style_falls_back_to_normal() {
        assert_eq!(ResponseStyle::parse("chaotic"), ResponseStyle::Normal);
        assert_eq!(ResponseStyle::parse(""), ResponseStyle::Normal);
        assert_eq!(ResponseStyle::parse("SUPER-BOLD"), ResponseStyle::SuperBold);
    }

    #[test]
    fn out_of_range_sliders_use_documented_defaults() {
        let s = ToneSliders::new(Some(0), Some(9), None);
        assert_eq!(s, ToneSliders { length: 2, emoji: 2, flirt: 1 });
        assert_eq!(style_instructions(s), style_instructions(ToneSliders::default()));
    }

    #[test]
    fn image_vibe_reflects_each_axis() {
        let spicy = image_style_vibe(ToneSliders { length: 1, emoji: 3, flirt: 3 });
        assert!(spicy.contains("flirty"));
        assert!(spicy.contains("emojis are cool"));
        assert!(spicy.contains("1 line max"));

        let plain = image_style_vibe(ToneSliders { length: 2, emoji: 1, flirt: 1 });
        assert!(plain.contains("not too flirty"));
        assert!(plain.contains("no emojis"));
    }
}
