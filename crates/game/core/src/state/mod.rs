//! Authoritative game state representation.
//!
//! Runtime layers clone or query this state but mutate it exclusively
//! through the engine's directive loop.

mod common;
mod history;
mod player;
mod stats;
mod turn;

pub use common::{PieceId, PlayerId, RequestToken, SpaceId};
pub use history::{MoveRecord, MovementHistory};
pub use player::{Player, PlayerError, PlayerState};
pub use stats::{StatRecord, StatValue, Stats, StatsError};
pub use turn::TurnState;

use serde::{Deserialize, Serialize};

use crate::env::Pcg32;
use crate::phase::PhaseState;

/// Canonical snapshot of one game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed set at game creation; drives random starting-position
    /// assignment and any other session-scoped randomness.
    pub seed: u64,

    /// Seated players in seating (turn) order.
    pub players: Vec<Player>,

    pub turn: TurnState,

    /// Current game/turn phase axes.
    pub phase: PhaseState,

    /// Session RNG (seeded from `seed`).
    pub session_rng: Pcg32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            players: Vec::new(),
            turn: TurnState::default(),
            phase: PhaseState::default(),
            session_rng: Pcg32::for_session(seed),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.player(self.turn.current_player)
    }

    pub fn current_player_mut(&mut self) -> Option<&mut Player> {
        self.player_mut(self.turn.current_player)
    }

    /// Adds a player; ids must be unique.
    pub fn add_player(&mut self, player: Player) -> Result<(), PlayerId> {
        if self.player(player.id).is_some() {
            return Err(player.id);
        }
        self.players.push(player);
        Ok(())
    }

    /// Removes a player (left or kicked). Returns the removed record.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    /// Next seat after `id` in turn order, skipping eliminated players.
    ///
    /// Falls back to `id` itself when every other player is eliminated.
    pub fn next_player_after(&self, id: PlayerId) -> PlayerId {
        let Some(start) = self.players.iter().position(|p| p.id == id) else {
            return id;
        };
        let n = self.players.len();
        for offset in 1..=n {
            let candidate = &self.players[(start + offset) % n];
            if !candidate.is_eliminated() {
                return candidate.id;
            }
        }
        id
    }

    /// Players still in the game.
    pub fn standing_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_eliminated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_players(n: u32) -> GameState {
        let mut state = GameState::new(1);
        for i in 0..n {
            state
                .add_player(Player::new(PlayerId(i), format!("peer-{i}"), "p"))
                .unwrap();
        }
        state
    }

    #[test]
    fn add_player_rejects_duplicate_id() {
        let mut state = state_with_players(2);
        let err = state.add_player(Player::new(PlayerId(1), "x", "x"));
        assert_eq!(err, Err(PlayerId(1)));
    }

    #[test]
    fn next_player_skips_eliminated_seats() {
        let mut state = state_with_players(3);
        state
            .player_mut(PlayerId(1))
            .unwrap()
            .set_state(PlayerState::Eliminated, &[])
            .unwrap();
        assert_eq!(state.next_player_after(PlayerId(0)), PlayerId(2));
        assert_eq!(state.next_player_after(PlayerId(2)), PlayerId(0));
    }

    #[test]
    fn next_player_wraps_round_robin() {
        let state = state_with_players(2);
        assert_eq!(state.next_player_after(PlayerId(1)), PlayerId(0));
    }
}
