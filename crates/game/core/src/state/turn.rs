use serde::{Deserialize, Serialize};

use super::{PlayerId, SpaceId};

/// Per-turn bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Global turn counter, incremented at every BEGIN_TURN (repeats
    /// included).
    pub turn_number: u32,

    /// The player whose turn it is.
    pub current_player: PlayerId,

    /// Moves left in the current move budget (set by the roll).
    pub remaining_moves: u32,

    /// Moves already made this turn (drives OnEnter/OnLand timing).
    pub moves_this_turn: u32,

    /// Space departed by the most recent single move, if any. OnExit
    /// triggers key off this.
    pub last_departed: Option<SpaceId>,

    /// Repeat-turn side-channel raised by effects during a scheduler pass
    /// and consumed at END_TURN.
    pub repeat_requested: bool,
}

impl TurnState {
    pub fn new(first_player: PlayerId) -> Self {
        Self {
            turn_number: 0,
            current_player: first_player,
            remaining_moves: 0,
            moves_this_turn: 0,
            last_departed: None,
            repeat_requested: false,
        }
    }

    /// Resets per-turn counters when a turn begins.
    pub fn begin_turn(&mut self) {
        self.turn_number += 1;
        self.remaining_moves = 0;
        self.moves_this_turn = 0;
        self.last_departed = None;
        self.repeat_requested = false;
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new(PlayerId(0))
    }
}
