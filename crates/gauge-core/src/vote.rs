//! Chat vote parsing.
//!
//! A message votes up when its normalized text contains `+2` anywhere,
//! down when it contains `-2` anywhere. Matching is substring based, not
//! tokenized, and `+2` is checked first.

use std::fmt;

use crate::counter::CounterStore;

const UP_TOKEN: &str = "+2";
const DOWN_TOKEN: &str = "-2";

/// A single chat vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    /// `+2`
    Up,
    /// `-2`
    Down,
}

impl Vote {
    /// Parse a raw chat message.
    ///
    /// Returns `None` when the message contains neither token.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();

        if normalized.contains(UP_TOKEN) {
            Some(Self::Up)
        } else if normalized.contains(DOWN_TOKEN) {
            Some(Self::Down)
        } else {
            None
        }
    }

    /// Counter delta carried by this vote.
    pub fn delta(self) -> i64 {
        match self {
            Self::Up => 2,
            Self::Down => -2,
        }
    }

    /// Apply the vote to a store, returning the new counter value.
    pub fn apply(self, store: &CounterStore) -> i64 {
        store.increment(self.delta())
    }

    /// Stable label, used for metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(store: &CounterStore, messages: &[&str]) {
        for msg in messages {
            if let Some(vote) = Vote::parse(msg) {
                vote.apply(store);
            }
        }
    }

    #[test]
    fn test_parse_up_and_down() {
        assert_eq!(Vote::parse("+2"), Some(Vote::Up));
        assert_eq!(Vote::parse("-2"), Some(Vote::Down));
        assert_eq!(Vote::parse("   +2 nice  "), Some(Vote::Up));
        assert_eq!(Vote::parse("aw -2"), Some(Vote::Down));
    }

    #[test]
    fn test_parse_ignores_unmatched() {
        assert_eq!(Vote::parse("hello chat"), None);
        assert_eq!(Vote::parse(""), None);
        assert_eq!(Vote::parse("+1 -1 2"), None);
        assert_eq!(Vote::parse("+ 2"), None);
    }

    #[test]
    fn test_up_takes_priority() {
        assert_eq!(Vote::parse("+2 and -2"), Some(Vote::Up));
        assert_eq!(Vote::parse("-2 then +2"), Some(Vote::Up));
    }

    #[test]
    fn test_substring_matching_inside_longer_tokens() {
        assert_eq!(Vote::parse("+20"), Some(Vote::Up));
        assert_eq!(Vote::parse("x-2x"), Some(Vote::Down));
        assert_eq!(Vote::parse("1+2=3"), Some(Vote::Up));
    }

    #[test]
    fn test_delta() {
        assert_eq!(Vote::Up.delta(), 2);
        assert_eq!(Vote::Down.delta(), -2);
    }

    #[test]
    fn test_example_sequence() {
        let store = CounterStore::new();
        apply_all(&store, &["+2 nice", "-2 aw", "+2"]);
        assert_eq!(store.read(), 2);

        store.reset();
        assert_eq!(store.read(), 0);

        apply_all(&store, &["+2 and -2"]);
        assert_eq!(store.read(), 2);
    }

    #[test]
    fn test_unmatched_messages_leave_counter_unchanged() {
        let store = CounterStore::new();
        store.increment(4);
        apply_all(&store, &["gg", "lol", "2", "plus two"]);
        assert_eq!(store.read(), 4);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Vote::Up.to_string(), "up");
        assert_eq!(Vote::Down.to_string(), "down");
    }
}
