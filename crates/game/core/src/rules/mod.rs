//! Declarative game rules: player-count limits, starting positions,
//! movement parameters, and victory conditions.
//!
//! `GameRules` is a pure value object. It never mutates game state; the
//! engine queries it at setup and at END_TURN.

mod victory;

pub use victory::{TurnLimitWinner, VictoryCondition, VictoryResult};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::env::Pcg32;
use crate::state::{GameState, SpaceId};

/// Starting-position mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartMode {
    /// Everyone starts on the first candidate space.
    Single,
    /// Players are distributed across the candidates.
    Spread,
    /// Uniform pick through the session-seeded RNG.
    Random,
    /// Spread over an author-supplied candidate list.
    Custom,
}

/// Sub-distribution applied in `Spread`/`Custom` modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    /// `candidates[index % len]`.
    RoundRobin,
    /// Players bucketed evenly: `ceil(total / len)` per candidate.
    Sequential,
    /// Seeded uniform pick per player.
    Random,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingRule {
    pub mode: StartMode,
    pub distribution: Distribution,
    /// Explicit candidate spaces (required by `Custom`, optional otherwise).
    pub space_ids: Vec<SpaceId>,
}

impl Default for StartingRule {
    fn default() -> Self {
        Self {
            mode: StartMode::Single,
            distribution: Distribution::RoundRobin,
            space_ids: Vec::new(),
        }
    }
}

/// How a player's move budget is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementKind {
    /// Human rolls within `[roll_min, roll_max]`.
    DiceRoll,
    /// Budget is always `roll_max` (no input requested).
    Fixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementRule {
    pub kind: MovementKind,
    pub roll_min: u32,
    pub roll_max: u32,
}

impl Default for MovementRule {
    fn default() -> Self {
        Self {
            kind: MovementKind::DiceRoll,
            roll_min: 1,
            roll_max: 6,
        }
    }
}

/// Result of a player-count check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerCountValidity {
    Valid,
    Warning(String),
    Invalid(String),
}

impl PlayerCountValidity {
    pub fn is_playable(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

/// Rules object owned by a board. Immutable after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub min_players: u32,
    pub max_players: Option<u32>,
    pub recommended_min: Option<u32>,
    pub recommended_max: Option<u32>,
    pub starting: StartingRule,
    pub turn_limit: Option<u32>,
    /// Ordered, OR-combined victory conditions.
    pub victory: Vec<VictoryCondition>,
    pub movement: MovementRule,
    pub required_plugins: Vec<String>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_players: 1,
            max_players: None,
            recommended_min: None,
            recommended_max: None,
            starting: StartingRule::default(),
            turn_limit: None,
            victory: Vec::new(),
            movement: MovementRule::default(),
            required_plugins: Vec::new(),
        }
    }
}

impl GameRules {
    /// Checks a proposed player count against the limits.
    pub fn validate_player_count(&self, n: u32) -> PlayerCountValidity {
        if n < self.min_players {
            return PlayerCountValidity::Invalid(format!(
                "needs at least {} players, got {n}",
                self.min_players
            ));
        }
        if let Some(max) = self.max_players {
            if n > max {
                return PlayerCountValidity::Invalid(format!(
                    "allows at most {max} players, got {n}"
                ));
            }
        }
        let below = self.recommended_min.is_some_and(|lo| n < lo);
        let above = self.recommended_max.is_some_and(|hi| n > hi);
        if below || above {
            return PlayerCountValidity::Warning(format!(
                "{n} players is outside the recommended range"
            ));
        }
        PlayerCountValidity::Valid
    }

    /// Resolves the starting space for seat `index` of `total`.
    ///
    /// Candidates are the explicit `space_ids` filtered to spaces that exist
    /// on the board, else the board's start-typed spaces, else its first
    /// space. `Random` draws through `rng` (the session-seeded generator),
    /// keeping setup replayable.
    pub fn starting_space_for(
        &self,
        index: usize,
        total: usize,
        board: &Board,
        rng: &mut Pcg32,
    ) -> SpaceId {
        let mut candidates: Vec<SpaceId> = self
            .starting
            .space_ids
            .iter()
            .copied()
            .filter(|id| board.space(*id).is_some())
            .collect();
        if candidates.is_empty() {
            candidates = board.start_spaces().map(|s| s.id).collect();
        }
        if candidates.is_empty() {
            candidates.push(board.first_space().id);
        }

        let len = candidates.len();
        match self.starting.mode {
            StartMode::Single => candidates[0],
            StartMode::Random => candidates[rng.pick_index(len)],
            StartMode::Spread | StartMode::Custom => match self.starting.distribution {
                Distribution::RoundRobin => candidates[index % len],
                Distribution::Sequential => {
                    let bucket = total.div_ceil(len);
                    candidates[(index / bucket).min(len - 1)]
                }
                Distribution::Random => candidates[rng.pick_index(len)],
            },
        }
    }

    /// Evaluates the victory conditions in order; first hit wins.
    ///
    /// A configured `turn_limit` acts as an implicit trailing TurnLimit
    /// condition when none is declared explicitly.
    pub fn check_victory(&self, state: &GameState, board: &Board) -> Option<VictoryResult> {
        for condition in &self.victory {
            if let Some(result) = condition.check(state, board) {
                return Some(result);
            }
        }
        if let Some(limit) = self.turn_limit {
            let implicit = VictoryCondition::TurnLimit {
                turns: limit,
                winner: TurnLimitWinner::default(),
            };
            if !self
                .victory
                .iter()
                .any(|c| matches!(c, VictoryCondition::TurnLimit { .. }))
            {
                return implicit.check(state, board);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardMeta, Space, SpaceKind};
    use crate::state::{Player, PlayerId, PlayerState};

    fn board_with_starts(starts: &[u32], normals: &[u32]) -> Board {
        let mut spaces = Vec::new();
        for &id in normals {
            spaces.push(Space::new(SpaceId(id), format!("n{id}"), SpaceKind::Normal));
        }
        for &id in starts {
            spaces.push(Space::new(SpaceId(id), format!("s{id}"), SpaceKind::Start));
        }
        Board::new(BoardMeta::default(), GameRules::default(), spaces).unwrap()
    }

    fn rules() -> GameRules {
        GameRules {
            min_players: 2,
            max_players: Some(6),
            recommended_min: Some(3),
            recommended_max: Some(5),
            ..GameRules::default()
        }
    }

    #[test]
    fn player_count_validity_bands() {
        let r = rules();
        assert!(matches!(
            r.validate_player_count(1),
            PlayerCountValidity::Invalid(_)
        ));
        assert!(matches!(
            r.validate_player_count(7),
            PlayerCountValidity::Invalid(_)
        ));
        assert!(matches!(
            r.validate_player_count(2),
            PlayerCountValidity::Warning(_)
        ));
        assert!(matches!(
            r.validate_player_count(6),
            PlayerCountValidity::Warning(_)
        ));
        assert_eq!(r.validate_player_count(4), PlayerCountValidity::Valid);
    }

    #[test]
    fn single_mode_always_picks_the_first_candidate() {
        let board = board_with_starts(&[10, 11], &[1]);
        let r = GameRules::default();
        let mut rng = Pcg32::new(1);
        for index in 0..4 {
            assert_eq!(r.starting_space_for(index, 4, &board, &mut rng), SpaceId(10));
        }
    }

    #[test]
    fn spread_round_robin_wraps_modulo() {
        let board = board_with_starts(&[10, 11, 12], &[]);
        let r = GameRules {
            starting: StartingRule {
                mode: StartMode::Spread,
                distribution: Distribution::RoundRobin,
                space_ids: Vec::new(),
            },
            ..GameRules::default()
        };
        let mut rng = Pcg32::new(1);
        let picks: Vec<u32> = (0..5)
            .map(|i| r.starting_space_for(i, 5, &board, &mut rng).0)
            .collect();
        assert_eq!(picks, vec![10, 11, 12, 10, 11]);
    }

    #[test]
    fn spread_sequential_buckets_players() {
        let board = board_with_starts(&[10, 11], &[]);
        let r = GameRules {
            starting: StartingRule {
                mode: StartMode::Spread,
                distribution: Distribution::Sequential,
                space_ids: Vec::new(),
            },
            ..GameRules::default()
        };
        // 4 players over 2 candidates: bucket size 2.
        let mut rng = Pcg32::new(1);
        let picks: Vec<u32> = (0..4)
            .map(|i| r.starting_space_for(i, 4, &board, &mut rng).0)
            .collect();
        assert_eq!(picks, vec![10, 10, 11, 11]);
    }

    #[test]
    fn random_mode_is_deterministic_for_a_seed() {
        let board = board_with_starts(&[10, 11, 12], &[]);
        let r = GameRules {
            starting: StartingRule {
                mode: StartMode::Random,
                distribution: Distribution::RoundRobin,
                space_ids: Vec::new(),
            },
            ..GameRules::default()
        };
        let picks = |seed: u64| -> Vec<u32> {
            let mut rng = Pcg32::new(seed);
            (0..4)
                .map(|i| r.starting_space_for(i, 4, &board, &mut rng).0)
                .collect()
        };
        assert_eq!(picks(7), picks(7));
    }

    #[test]
    fn no_start_spaces_falls_back_to_first_space() {
        let board = board_with_starts(&[], &[3, 4]);
        let mut rng = Pcg32::new(1);
        assert_eq!(
            GameRules::default().starting_space_for(0, 2, &board, &mut rng),
            SpaceId(3)
        );
    }

    #[test]
    fn reach_space_victory_requires_presence() {
        let board = board_with_starts(&[], &[1, 10]);
        let mut state = GameState::new(1);
        let mut p = Player::new(PlayerId(0), "a", "a");
        p.current_space = SpaceId(1);
        state.players.push(p);
        let r = GameRules {
            victory: vec![VictoryCondition::ReachSpace { space: SpaceId(10) }],
            ..GameRules::default()
        };
        assert_eq!(r.check_victory(&state, &board), None);

        state.player_mut(PlayerId(0)).unwrap().current_space = SpaceId(10);
        let result = r.check_victory(&state, &board).unwrap();
        assert_eq!(result.winner, PlayerId(0));
    }

    #[test]
    fn last_standing_needs_exactly_one_survivor() {
        let board = board_with_starts(&[], &[1]);
        let mut state = GameState::new(1);
        state.players.push(Player::new(PlayerId(0), "a", "a"));
        state.players.push(Player::new(PlayerId(1), "b", "b"));
        let r = GameRules {
            victory: vec![VictoryCondition::LastStanding],
            ..GameRules::default()
        };
        assert_eq!(r.check_victory(&state, &board), None);

        state
            .player_mut(PlayerId(1))
            .unwrap()
            .set_state(PlayerState::Eliminated, &[])
            .unwrap();
        let result = r.check_victory(&state, &board).unwrap();
        assert_eq!(result.winner, PlayerId(0));
    }

    #[test]
    fn conditions_are_or_combined_in_order() {
        let board = board_with_starts(&[], &[1, 10]);
        let mut state = GameState::new(1);
        let mut p = Player::new(PlayerId(0), "a", "a");
        p.current_space = SpaceId(10);
        state.players.push(p);
        state.turn.turn_number = 99;
        let r = GameRules {
            victory: vec![
                VictoryCondition::ReachSpace { space: SpaceId(10) },
                VictoryCondition::TurnLimit {
                    turns: 1,
                    winner: TurnLimitWinner::CurrentPlayer,
                },
            ],
            ..GameRules::default()
        };
        let result = r.check_victory(&state, &board).unwrap();
        assert!(matches!(result.condition, VictoryCondition::ReachSpace { .. }));
    }
}
