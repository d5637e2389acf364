//! Dual-axis phase state machine.
//!
//! Game phase and turn phase advance independently: the game phase gates the
//! whole session (lobby, play, pause, ended) while the turn phase sequences
//! one player's turn. Handlers are plain functions registered per phase and
//! fired in registration order by the engine's directive loop; turn-phase
//! handlers only fire while the game phase is `InGame` or `Paused`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Session-level phase.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    InGame,
    Paused,
    GameEnded,
}

/// Phase within a single player's turn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnPhase {
    BeginTurn,
    WaitingForMove,
    PlayerChoosingDestination,
    ProcessingEvents,
    EndTurn,
}

/// Current position on both phase axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    pub game: GamePhase,
    pub turn: TurnPhase,
}

impl PhaseState {
    /// Seeds both axes without firing any handlers, so the first real
    /// transition triggers entry handlers naturally.
    pub fn init(game: GamePhase, turn: TurnPhase) -> Self {
        Self { game, turn }
    }

    /// Pure predicate used to detect "did the phase change" before firing,
    /// preventing duplicate re-entry when state is merely re-broadcast.
    pub fn is_in_game_phase(&self, phase: GamePhase) -> bool {
        self.game == phase
    }

    pub fn is_in_turn_phase(&self, phase: TurnPhase) -> bool {
        self.turn == phase
    }

    /// Turn-phase handlers are suppressed outside active play.
    pub fn turn_handlers_enabled(&self) -> bool {
        matches!(self.game, GamePhase::InGame | GamePhase::Paused)
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::init(GamePhase::Lobby, TurnPhase::BeginTurn)
    }
}

/// Handler table for both axes, generic over the context the engine passes.
///
/// Handlers are `fn` pointers rather than closures: the engine hands itself
/// to each handler, so the table is copied out before firing to keep the
/// borrows disjoint.
pub struct PhaseMachine<C> {
    game_handlers: Vec<(GamePhase, fn(&mut C))>,
    turn_handlers: Vec<(TurnPhase, fn(&mut C))>,
}

impl<C> PhaseMachine<C> {
    pub fn new() -> Self {
        Self {
            game_handlers: Vec::new(),
            turn_handlers: Vec::new(),
        }
    }

    pub fn register_game_handler(&mut self, phase: GamePhase, handler: fn(&mut C)) {
        self.game_handlers.push((phase, handler));
    }

    pub fn register_turn_handler(&mut self, phase: TurnPhase, handler: fn(&mut C)) {
        self.turn_handlers.push((phase, handler));
    }

    /// Handlers registered for `phase`, in registration order.
    pub fn game_handlers_for(&self, phase: GamePhase) -> Vec<fn(&mut C)> {
        self.game_handlers
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, h)| *h)
            .collect()
    }

    pub fn turn_handlers_for(&self, phase: TurnPhase) -> Vec<fn(&mut C)> {
        self.turn_handlers
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, h)| *h)
            .collect()
    }
}

impl<C> Default for PhaseMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for PhaseMachine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseMachine")
            .field("game_handlers", &self.game_handlers.len())
            .field("turn_handlers", &self.turn_handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handlers_fire_in_registration_order() {
        let mut machine: PhaseMachine<Vec<u32>> = PhaseMachine::new();
        machine.register_turn_handler(TurnPhase::BeginTurn, |log| log.push(1));
        machine.register_turn_handler(TurnPhase::EndTurn, |log| log.push(99));
        machine.register_turn_handler(TurnPhase::BeginTurn, |log| log.push(2));

        let mut log = Vec::new();
        for handler in machine.turn_handlers_for(TurnPhase::BeginTurn) {
            handler(&mut log);
        }
        assert_eq!(log, vec![1, 2]);
    }

    #[test]
    fn turn_handlers_gated_on_game_phase() {
        let mut phase = PhaseState::init(GamePhase::Lobby, TurnPhase::BeginTurn);
        assert!(!phase.turn_handlers_enabled());
        phase.game = GamePhase::InGame;
        assert!(phase.turn_handlers_enabled());
        phase.game = GamePhase::Paused;
        assert!(phase.turn_handlers_enabled());
        phase.game = GamePhase::GameEnded;
        assert!(!phase.turn_handlers_enabled());
    }

    #[test]
    fn phase_names_use_screaming_snake_case() {
        assert_eq!(TurnPhase::WaitingForMove.to_string(), "WAITING_FOR_MOVE");
        assert_eq!(GamePhase::InGame.to_string(), "IN_GAME");
    }
}
