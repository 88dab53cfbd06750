//! Vote listener: turns chat events into counter mutations.

use gauge_chat::{ChatEvent, ChatMessage};
use gauge_core::{needle_angle, CounterStore, Vote};
use gauge_telemetry::Metrics;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Apply one chat line to the counter.
///
/// Returns the vote and the new counter value, or `None` when the line
/// carries no vote.
pub fn apply_chat_message(store: &CounterStore, message: &ChatMessage) -> Option<(Vote, i64)> {
    Metrics::chat_message();

    let Some(vote) = Vote::parse(&message.text) else {
        debug!(sender = %message.sender, "No vote in message");
        return None;
    };

    let counter = vote.apply(store);
    Metrics::vote_applied(vote.as_str(), counter);
    info!(
        sender = %message.sender,
        vote = %vote,
        delta = vote.delta(),
        counter,
        needle_deg = needle_angle(counter),
        "Vote applied"
    );
    Some((vote, counter))
}

/// Consume chat events until the sender side is dropped.
pub async fn run_vote_listener(store: CounterStore, mut events: mpsc::Receiver<ChatEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::Joined { nick, channel } => {
                Metrics::chat_connected();
                info!(%nick, %channel, "Listening for votes");
            }
            ChatEvent::Message(message) => {
                apply_chat_message(&store, &message);
            }
        }
    }
    debug!("Chat event channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            channel: "streamer".to_string(),
            sender: "viewer".to_string(),
            display_name: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_applies_votes() {
        let store = CounterStore::new();

        assert_eq!(
            apply_chat_message(&store, &message("+2 nice")),
            Some((Vote::Up, 2))
        );
        assert_eq!(
            apply_chat_message(&store, &message("-2 aw")),
            Some((Vote::Down, 0))
        );
        assert_eq!(store.read(), 0);
    }

    #[test]
    fn test_ignores_lines_without_votes() {
        let store = CounterStore::new();
        assert_eq!(apply_chat_message(&store, &message("hello")), None);
        assert_eq!(store.read(), 0);
    }

    #[test]
    fn test_up_wins_over_down() {
        let store = CounterStore::new();
        assert_eq!(
            apply_chat_message(&store, &message("+2 and -2")),
            Some((Vote::Up, 2))
        );
    }
}
