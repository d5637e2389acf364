//! Victory condition evaluation.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::state::{GameState, PlayerId, SpaceId};

/// How the winner is chosen when the turn limit is hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnLimitWinner {
    /// Player whose flattened movement history is longest.
    FurthestAlong,
    /// Player with the highest value of the named stat.
    HighestStat(String),
    /// Whoever's turn it is when the limit is reached.
    CurrentPlayer,
}

impl Default for TurnLimitWinner {
    fn default() -> Self {
        Self::FurthestAlong
    }
}

/// One victory condition. The rules hold an ordered list of these,
/// OR-combined: the first condition that holds decides the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VictoryCondition {
    /// Any player standing on the target space wins.
    ReachSpace { space: SpaceId },
    /// Game ends once the turn counter reaches `turns`.
    TurnLimit {
        turns: u32,
        #[serde(default)]
        winner: TurnLimitWinner,
    },
    /// Exactly one non-eliminated player remains.
    LastStanding,
}

/// Outcome of a successful victory check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryResult {
    pub winner: PlayerId,
    pub condition: VictoryCondition,
}

impl VictoryCondition {
    /// Evaluates this condition, returning the winner if it holds.
    pub fn check(&self, state: &GameState, _board: &Board) -> Option<VictoryResult> {
        match self {
            Self::ReachSpace { space } => state
                .players
                .iter()
                .find(|p| p.current_space == *space)
                .map(|p| VictoryResult {
                    winner: p.id,
                    condition: self.clone(),
                }),

            Self::TurnLimit { turns, winner } => {
                if state.turn.turn_number < *turns {
                    return None;
                }
                let chosen = match winner {
                    TurnLimitWinner::CurrentPlayer => Some(state.turn.current_player),
                    TurnLimitWinner::FurthestAlong => state
                        .standing_players()
                        .max_by_key(|p| p.history.flattened_len())
                        .map(|p| p.id),
                    TurnLimitWinner::HighestStat(stat) => state
                        .standing_players()
                        .max_by_key(|p| p.stats.int(stat).unwrap_or(i64::MIN))
                        .map(|p| p.id),
                };
                chosen.map(|winner| VictoryResult {
                    winner,
                    condition: self.clone(),
                })
            }

            Self::LastStanding => {
                let mut standing = state.standing_players();
                let first = standing.next()?;
                if standing.next().is_some() {
                    return None;
                }
                Some(VictoryResult {
                    winner: first.id,
                    condition: self.clone(),
                })
            }
        }
    }
}
