//! Notifications the engine emits as it mutates state.
//!
//! The engine appends these to an outbox that callers drain after each
//! public call; runtime layers fan them out to connected clients.

use serde::{Deserialize, Serialize};

use crate::rules::VictoryResult;
use crate::state::{PlayerId, PlayerState, RequestToken, SpaceId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    GameStarted {
        seed: u64,
    },
    TurnBegan {
        turn_number: u32,
        player: PlayerId,
    },
    TurnSkipped {
        player: PlayerId,
    },
    RollResolved {
        player: PlayerId,
        raw: u32,
        modified: u32,
    },
    PlayerMoved {
        player: PlayerId,
        from: SpaceId,
        to: SpaceId,
    },
    PlayerDisplaced {
        player: PlayerId,
        from: SpaceId,
        to: SpaceId,
        steps: i32,
    },
    /// Emitted just before an event's action body runs.
    ActionStarting {
        space: SpaceId,
        action: String,
    },
    /// Emitted once the action completed (or was force-skipped).
    ActionCompleted {
        space: SpaceId,
        action: String,
        skipped: bool,
    },
    EffectApplied {
        player: PlayerId,
        effect: String,
    },
    PlayerStateChanged {
        player: PlayerId,
        state: PlayerState,
    },
    PromptIssued {
        token: RequestToken,
        message: String,
        all_players: bool,
        /// Auto-dismiss deadline for the hosting runtime; `None` waits
        /// indefinitely.
        timeout_ms: Option<u64>,
    },
    RollRequested {
        token: RequestToken,
        player: PlayerId,
        min: u32,
        max: u32,
    },
    ChoiceRequested {
        token: RequestToken,
        player: PlayerId,
        options: Vec<SpaceId>,
    },
    TurnEnded {
        turn_number: u32,
        player: PlayerId,
        repeated: bool,
    },
    GameEnded {
        result: VictoryResult,
    },
}
