/// Onboarding-to-chat step machine. A profile's `conversation_step` walks
/// 0 -> 1 -> 2 -> 3 and then stays at 3 for the life of the profile.
pub const STEADY_STATE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// First turn after onboarding: greet by name, acknowledge the vibe,
    /// ask one opening question. Triggered by an empty incoming message.
    Greeting,
    /// React to their first answer, ask one more follow-up.
    FollowUp,
    /// Acknowledge, pivot to helping, mention that settings improve
    /// personalization.
    Transition,
    /// Steady state: direct help with whatever they describe.
    Help,
}

/// Classifies the incoming turn against the step value as it was BEFORE the
/// turn. Screenshot turns never reach this; they always take the
/// image-analysis path.
pub fn classify(step: u8, has_message: bool) -> PromptMode {
    if !has_message {
        PromptMode::Greeting
    } else if step == 0 {
        PromptMode::FollowUp
    } else if step == 1 {
        PromptMode::Transition
    } else {
        PromptMode::Help
    }
}

/// Advances after the reply is composed, only for turns that carried a
/// message. The greeting turn leaves the step at 0 so the next message is
/// classified as the first follow-up.
pub fn advance(step: u8) -> u8 {
    (step + 1).min(STEADY_STATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_is_always_a_greeting() {
        for step in 0..=3 {
            assert_eq!(classify(step, false), PromptMode::Greeting);
        }
    }

    #[test]
    fn steps_map_to_modes() {
        assert_eq!(classify(0, true), PromptMode::FollowUp);
        assert_eq!(classify(1, true), PromptMode::Transition);
        assert_eq!(classify(2, true), PromptMode::Help);
        assert_eq!(classify(3, true), PromptMode::Help);
    }

    #[test]
    fn step_three_is_absorbing() {
        let mut step = 0;
        for _ in 0..8 {
            step = advance(step);
            assert!(step <= STEADY_STATE);
        }
        assert_eq!(step, STEADY_STATE);
        assert_eq!(advance(STEADY_STATE), STEADY_STATE);
    }
}
