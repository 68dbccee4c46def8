use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Recovery of sendable reply options from unstructured model text. The
/// model is asked for a JSON `suggestions` object but is not guaranteed to
/// comply, so an ordered cascade of strategies trades precision for recall:
/// structured JSON block, then quoted strings, then numbered lists, then
/// bare line splitting. Each strategy stands alone and returns
/// `Option<Vec<String>>`; the first hit wins. An empty result means the
/// caller must engage the fallback policy - the user is never shown a raw
/// JSON blob or a commentary paragraph as a "reply".

const MAX_SUGGESTIONS: usize = 3;

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]{5,100})""#).expect("valid quoted-string regex"));

static NUMBERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*\d{1,2}[.)]\s*["']?([^"'\n]{5,100})["']?\s*$"#)
        .expect("valid numbered-list regex")
});

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s*").expect("valid leading-number regex"));

pub fn extract_suggestions(text: &str) -> Vec<String> {
    from_json_block(text)
        .or_else(|| from_quoted(text))
        .or_else(|| from_numbered(text))
        .or_else(|| from_lines(text))
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct SuggestionsBlock {
    suggestions: Vec<String>,
}

/// Strategy 1: a JSON object anywhere in the text whose `suggestions` field
/// is an array of strings. Candidate objects are found by balanced-brace
/// scanning, so surrounding prose or a `THEIR MESSAGE:` preamble does not
/// matter.
pub fn from_json_block(text: &str) -> Option<Vec<String>> {
    for candidate in balanced_objects(text) {
        if !candidate.contains("\"suggestions\"") {
            continue;
        }
        if let Ok(block) = serde_json::from_str::<SuggestionsBlock>(candidate) {
            let picks: Vec<String> = block
                .suggestions
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| s.len() > 3)
                .take(MAX_SUGGESTIONS)
                .collect();
            if !picks.is_empty() {
                return Some(picks);
            }
        }
    }
    None
}

/// Strategy 2: double-quoted substrings of plausible reply length, minus
/// the ones that quote the model's own scaffolding back at us.
pub fn from_quoted(text: &str) -> Option<Vec<String>> {
    let picks: Vec<String> = QUOTED
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .filter(|s| {
            let lower = s.to_lowercase();
            s.len() > 5
                && !lower.contains("their message")
                && !lower.contains("suggestion")
                && !lower.contains("reply ")
        })
        .collect();
    if picks.len() >= 2 {
        Some(picks.into_iter().take(MAX_SUGGESTIONS).collect())
    } else {
        None
    }
}

/// Strategy 3: numbered options like `1. text` or `2) "text"` at line
/// starts.
pub fn from_numbered(text: &str) -> Option<Vec<String>> {
    let picks: Vec<String> = NUMBERED
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect();
    if picks.len() >= 2 {
        Some(picks.into_iter().take(MAX_SUGGESTIONS).collect())
    } else {
        None
    }
}

/// Strategy 4: bare lines of plausible length, minus obvious meta-
/// commentary ("here are some options..."), with residual numbering and
/// quoting stripped.
pub fn from_lines(text: &str) -> Option<Vec<String>> {
    let picks: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.len() > 5 && l.len() < 100)
        .filter(|l| {
            let lower = l.to_lowercase();
            !lower.contains("here") && !lower.contains("option")
        })
        .map(|l| {
            let stripped = LEADING_NUMBER.replace(l, "");
            stripped.trim_matches(|c| c == '"' || c == '\'').trim().to_string()
        })
        .filter(|l| l.len() > 3)
        .take(MAX_SUGGESTIONS)
        .collect();
    if picks.is_empty() {
        None
    } else {
        Some(picks)
    }
}

/// Yields every balanced `{...}` substring, including nested ones, so an
/// inner suggestions object inside a larger malformed wrapper still
/// parses.
fn balanced_objects(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(i),
            b'}' => {
                if let Some(start) = stack.pop() {
                    out.push(&s[start..=i]);
                }
            }
            _ => {}
        }
    }
    // Outermost candidates first; they carry the suggestions key when the
    // model obeyed the format.
    out.sort_by_key(|obj| std::cmp::Reverse(obj.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_clean_json_object() {
        let out = extract_suggestions(r#"{"suggestions": ["a nice one", "b is fine", "c works"]}"#);
        assert_eq!(out, vec!["a nice one", "b is fine", "c works"]);
    }

    #[test]
    fn finds_json_embedded_in_commentary() {
        let text = "THEIR MESSAGE: \"wyd tonight\"\n\nREPLIES:\n{\"suggestions\": [\"nothing much, you?\", \"plotting my escape lol\", \"waiting on you to make plans\"]}";
        let out = extract_suggestions(text);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], "nothing much, you?");
    }

    #[test]
    fn json_block_drops_too_short_entries_and_caps_at_three() {
        let out = extract_suggestions(r#"{"suggestions": ["ok", "long enough here", "", "also long enough", "a third real one", "a fourth"]}"#);
        assert_eq!(out, vec!["long enough here", "also long enough", "a third real one"]);
    }

    #[test]
    fn falls_back_to_quoted_strings() {
        let out = extract_suggestions("here's my take: \"hey what's up\" and \"lol nice\"");
        assert!(out.len() >= 2);
        assert!(out.contains(&"hey what's up".to_string()));
        assert!(out.contains(&"lol nice".to_string()));
        assert!(!out.iter().any(|s| s.contains("my take")));
    }

    #[test]
    fn quoted_strategy_filters_scaffolding_quotes() {
        let text = r#"THEIR MESSAGE: "do you even lift" - "their message was clear". Try "yeah lowkey i do" or "wanna find out?""#;
        let out = from_quoted(text).unwrap();
        assert!(!out.iter().any(|s| s.to_lowercase().contains("their message")));
        assert!(out.contains(&"yeah lowkey i do".to_string()));
    }

    #[test]
    fn quoted_strategy_needs_two_survivors() {
        assert!(from_quoted("just one \"hello there\" quote").is_none());
    }

    #[test]
    fn parses_numbered_lists() {
        let text = "try these:\n1. \"so what are you really asking\"\n2) lowkey been thinking the same\n3. say less, when?";
        let out = from_numbered(text).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], "so what are you really asking");
        assert_eq!(out[1], "lowkey been thinking the same");
    }

    #[test]
    fn line_splitting_is_the_last_resort() {
        let text = "nah that works\nhonestly just ask them\nsounds good to me";
        let out = extract_suggestions(text);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], "nah that works");
    }

    #[test]
    fn line_splitting_drops_meta_lines() {
        let text = "Here are some ideas\nOption one is best\njust tell them straight up";
        let out = from_lines(text).unwrap();
        assert_eq!(out, vec!["just tell them straight up"]);
    }

    #[test]
    fn unusable_prose_yields_empty() {
        let text = "just some prose with no structure and no quotes at all that exceeds 100 chars total so it gets filtered away entirely";
        assert!(extract_suggestions(text).is_empty());
    }

    #[test]
    fn garbage_json_falls_through_the_cascade() {
        let text = r#"{"suggestions": "not an array"} but also "a real first option" and "a real second option""#;
        let out = extract_suggestions(text);
        assert!(out.contains(&"a real first option".to_string()));
    }
}
