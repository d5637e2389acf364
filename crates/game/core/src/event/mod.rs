//! Space-attached game events and their lifecycle state machine.

mod pipeline;

pub use pipeline::{EventPipeline, EventRef};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::action::Action;
use crate::trigger::{Trigger, TriggerContext};

/// Scheduling priority. Higher fires first when several events are
/// pending on the same move.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPriority {
    Low,
    #[default]
    Mid,
    High,
    Critical,
}

/// Lifecycle state of an event.
///
/// The machine is sticky: once `Triggered`, the trigger is not re-evaluated
/// until the event is re-armed at the start of the owner's next turn, so a
/// condition that becomes false mid-processing cannot retract the event.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    #[default]
    Ready,
    CheckingTrigger,
    Triggered,
    ProcessingAction,
    CompletedAction,
    /// Terminal until content explicitly re-activates the event.
    Inactive,
}

/// One trigger-action pair declared on a space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub trigger: Trigger,
    pub action: Action,
    #[serde(default)]
    pub priority: EventPriority,
    #[serde(default)]
    pub state: EventState,
}

impl GameEvent {
    pub fn new(trigger: Trigger, action: Action) -> Self {
        Self {
            trigger,
            action,
            priority: EventPriority::default(),
            state: EventState::default(),
        }
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Evaluates the trigger if the event is armed. Idempotent: an event
    /// already past `Ready` keeps its verdict without re-evaluation.
    pub fn check_trigger(&mut self, ctx: &TriggerContext<'_>) -> bool {
        match self.state {
            EventState::Ready => {
                self.state = EventState::CheckingTrigger;
                if self.trigger.is_triggered(ctx) {
                    self.state = EventState::Triggered;
                    true
                } else {
                    self.state = EventState::Ready;
                    false
                }
            }
            EventState::Triggered | EventState::ProcessingAction => true,
            EventState::CheckingTrigger
            | EventState::CompletedAction
            | EventState::Inactive => false,
        }
    }

    /// Marks the action as in flight. Only valid from `Triggered`.
    pub fn begin_processing(&mut self) -> bool {
        if self.state == EventState::Triggered {
            self.state = EventState::ProcessingAction;
            true
        } else {
            false
        }
    }

    /// Marks the action done. The event stays spent until re-armed.
    pub fn complete(&mut self) {
        if self.state != EventState::Inactive {
            self.state = EventState::CompletedAction;
        }
    }

    /// Re-arms a spent or stuck event back to `Ready`. Inactive events
    /// stay inactive.
    pub fn rearm(&mut self) {
        if self.state != EventState::Inactive {
            self.state = EventState::Ready;
        }
    }

    /// Turns the event off permanently (until explicit re-activation).
    pub fn deactivate(&mut self) {
        self.state = EventState::Inactive;
    }

    pub fn activate(&mut self) {
        if self.state == EventState::Inactive {
            self.state = EventState::Ready;
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self.state,
            EventState::Triggered | EventState::ProcessingAction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Space, SpaceKind};
    use crate::env::BehaviorRegistry;
    use crate::state::{GameState, Player, PlayerId, SpaceId};

    fn fixture() -> (GameState, Space, BehaviorRegistry) {
        let mut state = GameState::new(1);
        let mut player = Player::new(PlayerId(0), "peer", "a");
        player.current_space = SpaceId(3);
        state.players.push(player);
        state.turn.current_player = PlayerId(0);
        state.turn.moves_this_turn = 1;
        let space = Space::new(SpaceId(3), "here", SpaceKind::Normal);
        (state, space, BehaviorRegistry::new())
    }

    fn landed_event() -> GameEvent {
        GameEvent::new(Trigger::OnEnter, Action::PromptAllPlayers {
            message: "hi".into(),
        })
    }

    #[test]
    fn trigger_verdict_is_sticky_across_rechecks() {
        let (mut state, space, registry) = fixture();
        let mut event = landed_event();

        let ctx = TriggerContext {
            state: &state,
            space: &space,
            player: state.player(PlayerId(0)).unwrap(),
            registry: &registry,
        };
        assert!(event.check_trigger(&ctx));
        assert_eq!(event.state, EventState::Triggered);

        // Condition goes false; the verdict must not retract.
        state.turn.moves_this_turn = 0;
        let ctx = TriggerContext {
            state: &state,
            space: &space,
            player: state.player(PlayerId(0)).unwrap(),
            registry: &registry,
        };
        assert!(event.check_trigger(&ctx));
    }

    #[test]
    fn completed_event_does_not_refire_until_rearmed() {
        let (state, space, registry) = fixture();
        let mut event = landed_event();
        let ctx = TriggerContext {
            state: &state,
            space: &space,
            player: state.player(PlayerId(0)).unwrap(),
            registry: &registry,
        };

        assert!(event.check_trigger(&ctx));
        assert!(event.begin_processing());
        event.complete();
        assert!(!event.check_trigger(&ctx));

        event.rearm();
        assert!(event.check_trigger(&ctx));
    }

    #[test]
    fn inactive_is_terminal_for_rearm() {
        let mut event = landed_event();
        event.deactivate();
        event.rearm();
        assert_eq!(event.state, EventState::Inactive);
        event.activate();
        assert_eq!(event.state, EventState::Ready);
    }

    #[test]
    fn wire_shape_defaults_priority_and_state() {
        let json = serde_json::json!({
            "trigger": {"type": "ON_LAND"},
            "action": {"type": "PROMPT_ALL_PLAYERS", "payload": {"message": "m"}}
        });
        let event: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.priority, EventPriority::Mid);
        assert_eq!(event.state, EventState::Ready);

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["priority"], "MID");
        assert_eq!(back["state"], "READY");
    }

    #[test]
    fn priority_orders_low_to_critical() {
        assert!(EventPriority::Critical > EventPriority::High);
        assert!(EventPriority::High > EventPriority::Mid);
        assert!(EventPriority::Mid > EventPriority::Low);
    }
}
