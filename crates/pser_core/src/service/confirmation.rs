//! Confirmation gate for destructive operations.
//!
//! This is a guard against accidental taps, not access control: the phrase
//! is compared in plain text and anyone who can read the configuration can
//! pass it.

/// Decides whether user input confirms a destructive action.
pub trait ConfirmationPolicy {
    fn confirms(&self, input: &str) -> bool;
}

/// Accepts input equal to a shared phrase, ignoring surrounding whitespace.
#[derive(Debug, Clone)]
pub struct SharedPhraseConfirmation {
    phrase: String,
}

impl SharedPhraseConfirmation {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }
}

impl ConfirmationPolicy for SharedPhraseConfirmation {
    fn confirms(&self, input: &str) -> bool {
        let phrase = self.phrase.trim();
        !phrase.is_empty() && input.trim() == phrase
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfirmationPolicy, SharedPhraseConfirmation};

    #[test]
    fn matches_exact_phrase_with_whitespace_tolerance() {
        let policy = SharedPhraseConfirmation::new("wipe-surveys");
        assert!(policy.confirms("wipe-surveys"));
        assert!(policy.confirms("  wipe-surveys\n"));
        assert!(!policy.confirms("WIPE-SURVEYS"));
        assert!(!policy.confirms(""));
    }

    #[test]
    fn blank_phrase_never_confirms() {
        let policy = SharedPhraseConfirmation::new("   ");
        assert!(!policy.confirms(""));
        assert!(!policy.confirms("   "));
    }
}
