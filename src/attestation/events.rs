//! Score change broadcast hub
//!
//! Interested sessions subscribe explicitly instead of listening for an
//! ambient global signal. Publishing never blocks and never fails: with no
//! subscribers the event is simply dropped.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::trust::TrustScoreBreakdown;

/// Default buffered events per subscriber
const DEFAULT_CAPACITY: usize = 256;

/// A recomputed trust score for a subject
#[derive(Debug, Clone, Serialize)]
pub struct ScoreEvent {
    pub atom_id: String,
    pub score: f64,
    pub positive_stake: String,
    pub negative_stake: String,
    pub attestation_count: u64,
}

impl ScoreEvent {
    pub fn new(atom_id: &str, breakdown: &TrustScoreBreakdown) -> Self {
        Self {
            atom_id: atom_id.to_string(),
            score: breakdown.score,
            positive_stake: breakdown.positive_stake.to_string(),
            negative_stake: breakdown.negative_stake.to_string(),
            attestation_count: breakdown.count,
        }
    }
}

/// Session-scoped score event hub
#[derive(Clone)]
pub struct ScoreEvents {
    sender: broadcast::Sender<ScoreEvent>,
}

impl ScoreEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future score changes
    pub fn subscribe(&self) -> broadcast::Receiver<ScoreEvent> {
        self.sender.subscribe()
    }

    /// Publish a score change to all current subscribers
    pub fn publish(&self, event: ScoreEvent) {
        let receivers = self.sender.receiver_count();
        if self.sender.send(event).is_err() {
            debug!("Score event dropped: no subscribers");
        } else {
            debug!(receivers, "Score event published");
        }
    }
}

impl Default for ScoreEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let events = ScoreEvents::new();
        let mut rx = events.subscribe();

        let breakdown = TrustScoreBreakdown {
            score: 75.0,
            positive_stake: 300,
            negative_stake: 100,
            count: 4,
        };
        events.publish(ScoreEvent::new("atom-1", &breakdown));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.atom_id, "atom-1");
        assert_eq!(event.score, 75.0);
        assert_eq!(event.positive_stake, "300");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let events = ScoreEvents::new();
        events.publish(ScoreEvent {
            atom_id: "atom-1".into(),
            score: 0.0,
            positive_stake: "0".into(),
            negative_stake: "0".into(),
            attestation_count: 0,
        });
    }
}
