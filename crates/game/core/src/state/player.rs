//! Player record and its invariant-enforcing mutators.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::effect::PlayerEffect;
use crate::env::Pcg32;

use super::{MovementHistory, PieceId, PlayerId, SpaceId, Stats};

/// Lifecycle state of a player.
///
/// The built-in set below is always allowed; boards/plugins may register
/// additional custom states with the behavior registry. `set_state` rejects
/// anything outside the allowed set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerState {
    Idle,
    Playing,
    Won,
    Eliminated,
    Disconnected,
    Custom(String),
}

impl PlayerState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "IDLE",
            Self::Playing => "PLAYING",
            Self::Won => "WON",
            Self::Eliminated => "ELIMINATED",
            Self::Disconnected => "DISCONNECTED",
            Self::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<String> for PlayerState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "IDLE" => Self::Idle,
            "PLAYING" => Self::Playing,
            "WON" => Self::Won,
            "ELIMINATED" => Self::Eliminated,
            "DISCONNECTED" => Self::Disconnected,
            _ => Self::Custom(value),
        }
    }
}

impl From<PlayerState> for String {
    fn from(state: PlayerState) -> Self {
        state.as_str().to_owned()
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by player mutators.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("unknown player state '{0}'")]
    UnknownState(String),
}

impl crate::error::GameError for PlayerError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        // Actions catch this, log, and continue the turn.
        crate::error::ErrorSeverity::Recoverable
    }
}

/// One seated player.
///
/// Effects and movement history are owned exclusively by the player. The
/// roll generator's seed derives from the player id, so rolls replay
/// identically after a save/load round trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Transport-level peer identity (opaque to the engine).
    pub peer_id: String,
    nickname: String,
    state: PlayerState,
    pub current_space: SpaceId,
    pub stats: Stats,
    pub effects: Vec<PlayerEffect>,
    pub history: MovementHistory,
    pub rng: Pcg32,
    pub turns_taken: u32,
    /// Tokens controlled by this player in multi-piece variants.
    pub pieces: Vec<PieceId>,
}

impl Player {
    pub fn new(id: PlayerId, peer_id: impl Into<String>, nickname: &str) -> Self {
        let mut player = Self {
            id,
            peer_id: peer_id.into(),
            nickname: String::new(),
            state: PlayerState::Idle,
            current_space: SpaceId(0),
            stats: Stats::new(),
            effects: Vec::new(),
            history: MovementHistory::new(),
            rng: Pcg32::for_player(id),
            turns_taken: 0,
            pieces: Vec::new(),
        };
        player.set_nickname(nickname);
        player
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Sets the nickname, truncated to [`EngineConfig::MAX_NICKNAME_LEN`]
    /// characters with control characters stripped.
    pub fn set_nickname(&mut self, nickname: &str) {
        self.nickname = nickname
            .chars()
            .filter(|c| !c.is_control())
            .take(EngineConfig::MAX_NICKNAME_LEN)
            .collect();
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Transitions the player state.
    ///
    /// `allowed_custom` is the session's registered custom-state set; a value
    /// outside the built-in set plus that registry fails.
    pub fn set_state(
        &mut self,
        state: PlayerState,
        allowed_custom: &[String],
    ) -> Result<(), PlayerError> {
        if let PlayerState::Custom(name) = &state {
            if !allowed_custom.iter().any(|s| s == name) {
                return Err(PlayerError::UnknownState(name.clone()));
            }
        }
        self.state = state;
        Ok(())
    }

    pub fn is_eliminated(&self) -> bool {
        matches!(self.state, PlayerState::Eliminated)
    }

    /// Finds an effect by its per-player unique id.
    pub fn effect(&self, id: &str) -> Option<&PlayerEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Attaches an effect, replacing any existing effect with the same id so
    /// re-granting refreshes rather than stacks.
    pub fn attach_effect(&mut self, effect: PlayerEffect) {
        self.effects.retain(|e| e.id != effect.id);
        self.effects.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_is_truncated_and_sanitized() {
        let mut player = Player::new(PlayerId(1), "peer-a", "ok\x07name");
        assert_eq!(player.nickname(), "okname");
        player.set_nickname(&"x".repeat(50));
        assert_eq!(player.nickname().len(), 32);
    }

    #[test]
    fn set_state_rejects_unregistered_custom_state() {
        let mut player = Player::new(PlayerId(1), "peer-a", "a");
        let err = player.set_state(PlayerState::Custom("FROZEN".into()), &[]);
        assert_eq!(err, Err(PlayerError::UnknownState("FROZEN".into())));
        assert_eq!(player.state(), &PlayerState::Idle);

        player
            .set_state(PlayerState::Custom("FROZEN".into()), &["FROZEN".into()])
            .unwrap();
        assert_eq!(player.state().as_str(), "FROZEN");
    }

    #[test]
    fn state_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerState::Eliminated).unwrap();
        assert_eq!(json, "\"ELIMINATED\"");
        let back: PlayerState = serde_json::from_str("\"SPECTATING\"").unwrap();
        assert_eq!(back, PlayerState::Custom("SPECTATING".into()));
    }

    #[test]
    fn regranting_an_effect_replaces_it() {
        use crate::effect::{EffectKind, PlayerEffect};
        let mut player = Player::new(PlayerId(1), "peer-a", "a");
        player.attach_effect(PlayerEffect::new("dt", EffectKind::DoubleTurn, 1, player.id));
        player.attach_effect(PlayerEffect::new("dt", EffectKind::DoubleTurn, 3, player.id));
        assert_eq!(player.effects.len(), 1);
        assert_eq!(player.effects[0].duration, 3);
    }
}
