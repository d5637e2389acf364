//! Topic-based event bus.
//!
//! Engine notifications are fanned out by topic so a consumer that only
//! renders movement does not wade through prompt traffic. Publishing is
//! best-effort: a topic with no subscribers drops its events.

use std::collections::HashMap;

use tokio::sync::broadcast;

use tabula_core::EngineEvent;

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Turn lifecycle (began, skipped, ended, game over).
    Turn,
    /// Rolls, moves, and displacements.
    Movement,
    /// Parked input requests (rolls, choices, prompts).
    Request,
    /// Effects, player state changes, event actions.
    Effect,
}

/// Routes an engine notification to its topic.
pub fn topic_of(event: &EngineEvent) -> Topic {
    match event {
        EngineEvent::GameStarted { .. }
        | EngineEvent::TurnBegan { .. }
        | EngineEvent::TurnSkipped { .. }
        | EngineEvent::TurnEnded { .. }
        | EngineEvent::GameEnded { .. } => Topic::Turn,
        EngineEvent::RollResolved { .. }
        | EngineEvent::PlayerMoved { .. }
        | EngineEvent::PlayerDisplaced { .. } => Topic::Movement,
        EngineEvent::RollRequested { .. }
        | EngineEvent::ChoiceRequested { .. }
        | EngineEvent::PromptIssued { .. } => Topic::Request,
        EngineEvent::ActionStarting { .. }
        | EngineEvent::ActionCompleted { .. }
        | EngineEvent::EffectApplied { .. }
        | EngineEvent::PlayerStateChanged { .. } => Topic::Effect,
    }
}

/// Topic-based broadcast bus over engine notifications.
#[derive(Clone)]
pub struct EventBus {
    channels: HashMap<Topic, broadcast::Sender<EngineEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut channels = HashMap::new();
        for topic in [Topic::Turn, Topic::Movement, Topic::Request, Topic::Effect] {
            channels.insert(topic, broadcast::channel(capacity).0);
        }
        Self { channels }
    }

    /// Publishes to the event's topic. No subscribers is not an error.
    pub fn publish(&self, event: EngineEvent) {
        let topic = topic_of(&event);
        if let Some(tx) = self.channels.get(&topic) {
            if tx.send(event).is_err() {
                tracing::trace!(?topic, "no subscribers for topic");
            }
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EngineEvent> {
        self.channels
            .get(&topic)
            .map(|tx| tx.subscribe())
            .unwrap_or_else(|| broadcast::channel(1).1)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{PlayerId, SpaceId};

    #[tokio::test]
    async fn events_route_to_their_topic() {
        let bus = EventBus::new();
        let mut turn_rx = bus.subscribe(Topic::Turn);
        let mut movement_rx = bus.subscribe(Topic::Movement);

        bus.publish(EngineEvent::PlayerMoved {
            player: PlayerId(0),
            from: SpaceId(0),
            to: SpaceId(1),
        });
        bus.publish(EngineEvent::TurnBegan {
            turn_number: 1,
            player: PlayerId(0),
        });

        assert!(matches!(
            movement_rx.recv().await.unwrap(),
            EngineEvent::PlayerMoved { .. }
        ));
        assert!(matches!(
            turn_rx.recv().await.unwrap(),
            EngineEvent::TurnBegan { .. }
        ));
        // The movement subscriber never sees turn traffic.
        assert!(movement_rx.try_recv().is_err());
    }
}
