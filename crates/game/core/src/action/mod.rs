//! Action variants: the consequence half of a game event.
//!
//! Actions run synchronously against the authoritative state, except the
//! prompt variants, which hand a [`PromptRequest`] back to the engine and
//! suspend until the runtime resumes it.

mod displace;

pub use displace::displace;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::Board;
use crate::config::EngineConfig;
use crate::effect::{EffectKind, PlayerEffect};
use crate::env::BehaviorRegistry;
use crate::error::Validation;
use crate::notify::EngineEvent;
use crate::state::{GameState, PlayerState, SpaceId};
use crate::wire::{self, Tagged};

/// Mutable view an action executes against. The acting player is always
/// `state.turn.current_player`.
pub struct ActionContext<'a> {
    pub state: &'a mut GameState,
    pub board: &'a Board,
    pub registry: &'a BehaviorRegistry,
    pub config: &'a EngineConfig,
    /// Notification outbox; actions append, the engine drains.
    pub notifications: &'a mut Vec<EngineEvent>,
}

/// A prompt waiting on runtime input.
#[derive(Clone, Debug, PartialEq)]
pub struct PromptRequest {
    pub message: String,
    pub all_players: bool,
    pub timeout_ms: Option<u64>,
}

/// Whether the action finished in place or suspended on a prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionProgress {
    Completed,
    AwaitPrompt(PromptRequest),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Grants (or refreshes) an effect on the acting player.
    ApplyEffect {
        id: String,
        kind: EffectKind,
        duration: i32,
    },

    /// Transitions the acting player's lifecycle state.
    SetPlayerState { state: PlayerState },

    /// Moves the acting player without spending the move budget: negative
    /// steps backtrack through movement history, positive steps follow
    /// sole connections forward.
    DisplacePlayer { steps: i32 },

    /// Broadcast message every player must dismiss.
    PromptAllPlayers { message: String },

    /// Message only the acting player must dismiss.
    PromptCurrentPlayer { message: String },

    /// Teleports the acting player to an arbitrary space.
    SetPlayerSpace { space: SpaceId },

    /// Plugin-contributed action resolved through the behavior registry.
    Custom {
        tag: String,
        payload: serde_json::Value,
    },
}

impl Action {
    pub const TAG_APPLY_EFFECT: &'static str = "APPLY_EFFECT";
    pub const TAG_SET_PLAYER_STATE: &'static str = "SET_PLAYER_STATE";
    pub const TAG_DISPLACE_PLAYER: &'static str = "DISPLACE_PLAYER";
    pub const TAG_PROMPT_ALL_PLAYERS: &'static str = "PROMPT_ALL_PLAYERS";
    pub const TAG_PROMPT_CURRENT_PLAYER: &'static str = "PROMPT_CURRENT_PLAYER";
    pub const TAG_SET_PLAYER_SPACE: &'static str = "SET_PLAYER_SPACE";

    pub fn type_tag(&self) -> &str {
        match self {
            Self::ApplyEffect { .. } => Self::TAG_APPLY_EFFECT,
            Self::SetPlayerState { .. } => Self::TAG_SET_PLAYER_STATE,
            Self::DisplacePlayer { .. } => Self::TAG_DISPLACE_PLAYER,
            Self::PromptAllPlayers { .. } => Self::TAG_PROMPT_ALL_PLAYERS,
            Self::PromptCurrentPlayer { .. } => Self::TAG_PROMPT_CURRENT_PLAYER,
            Self::SetPlayerSpace { .. } => Self::TAG_SET_PLAYER_SPACE,
            Self::Custom { tag, .. } => tag,
        }
    }

    /// Runs the action. Failures degrade rather than abort: a bad target
    /// or unknown custom tag logs a warning and reports `Completed` so the
    /// owning event can finish instead of wedging the turn.
    pub fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionProgress {
        let player_id = ctx.state.turn.current_player;
        match self {
            Self::ApplyEffect { id, kind, duration } => {
                let Some(player) = ctx.state.current_player_mut() else {
                    warn!(player = %player_id, "apply-effect with no acting player");
                    return ActionProgress::Completed;
                };
                player.attach_effect(PlayerEffect::new(
                    id.clone(),
                    kind.clone(),
                    *duration,
                    player_id,
                ));
                ctx.notifications.push(EngineEvent::EffectApplied {
                    player: player_id,
                    effect: id.clone(),
                });
                ActionProgress::Completed
            }

            Self::SetPlayerState { state } => {
                let allowed = ctx.registry.player_states().to_vec();
                let Some(player) = ctx.state.current_player_mut() else {
                    warn!(player = %player_id, "set-player-state with no acting player");
                    return ActionProgress::Completed;
                };
                match player.set_state(state.clone(), &allowed) {
                    Ok(()) => ctx.notifications.push(EngineEvent::PlayerStateChanged {
                        player: player_id,
                        state: state.clone(),
                    }),
                    Err(err) => warn!(player = %player_id, %err, "player state rejected"),
                }
                ActionProgress::Completed
            }

            Self::DisplacePlayer { steps } => {
                displace(ctx, player_id, *steps);
                ActionProgress::Completed
            }

            Self::PromptAllPlayers { message } => ActionProgress::AwaitPrompt(PromptRequest {
                message: resolve_placeholders(message, ctx),
                all_players: true,
                timeout_ms: ctx.config.default_prompt_timeout_ms,
            }),

            Self::PromptCurrentPlayer { message } => ActionProgress::AwaitPrompt(PromptRequest {
                message: resolve_placeholders(message, ctx),
                all_players: false,
                timeout_ms: ctx.config.default_prompt_timeout_ms,
            }),

            Self::SetPlayerSpace { space } => {
                if ctx.board.space(*space).is_none() {
                    warn!(target = %space, "set-player-space to a space not on the board");
                    return ActionProgress::Completed;
                }
                let turn_number = ctx.state.turn.turn_number;
                let Some(player) = ctx.state.current_player_mut() else {
                    return ActionProgress::Completed;
                };
                let from = player.current_space;
                player.current_space = *space;
                player.history.record(*space, turn_number);
                ctx.notifications.push(EngineEvent::PlayerMoved {
                    player: player_id,
                    from,
                    to: *space,
                });
                ActionProgress::Completed
            }

            Self::Custom { tag, payload } => {
                match ctx.registry.custom_action(tag) {
                    Some(custom) => custom.execute(ctx, payload),
                    None => warn!(tag, "no registered behavior for custom action; skipping"),
                }
                ActionProgress::Completed
            }
        }
    }

    /// Advisory authoring-time validation.
    pub fn validate(&self, board: &Board) -> Validation {
        match self {
            Self::ApplyEffect { id, duration, .. } => {
                let mut v = Validation::ok();
                if id.is_empty() {
                    v.push("effect with empty id");
                }
                if *duration <= 0 {
                    v.push(format!("effect '{id}' with non-positive duration {duration}"));
                }
                v
            }
            Self::DisplacePlayer { steps: 0 } => {
                Validation::fail("displace-player with zero steps")
            }
            Self::SetPlayerSpace { space } if board.space(*space).is_none() => {
                Validation::fail(format!("set-player-space targets unknown space {space}"))
            }
            Self::Custom { tag, .. } if tag.is_empty() => {
                Validation::fail("custom action with empty type tag")
            }
            _ => Validation::ok(),
        }
    }
}

/// Substitutes `{player}` and `{space}` in prompt text.
fn resolve_placeholders(message: &str, ctx: &ActionContext<'_>) -> String {
    let Some(player) = ctx.state.current_player() else {
        return message.to_owned();
    };
    let space_name = ctx
        .board
        .space(player.current_space)
        .map(|s| s.name.as_str())
        .unwrap_or("?");
    message
        .replace("{player}", player.nickname())
        .replace("{space}", space_name)
}

#[derive(Serialize, Deserialize)]
struct ApplyEffectPayload {
    id: String,
    #[serde(flatten)]
    kind: EffectKind,
    duration: i32,
}

#[derive(Serialize, Deserialize)]
struct SetPlayerStatePayload {
    state: PlayerState,
}

#[derive(Serialize, Deserialize)]
struct DisplacePayload {
    steps: i32,
}

#[derive(Serialize, Deserialize)]
struct PromptPayload {
    message: String,
}

#[derive(Serialize, Deserialize)]
struct SetSpacePayload {
    space: SpaceId,
}

impl From<Action> for Tagged {
    fn from(action: Action) -> Self {
        match action {
            Action::ApplyEffect { id, kind, duration } => Tagged::with_payload(
                Action::TAG_APPLY_EFFECT,
                &ApplyEffectPayload { id, kind, duration },
            ),
            Action::SetPlayerState { state } => Tagged::with_payload(
                Action::TAG_SET_PLAYER_STATE,
                &SetPlayerStatePayload { state },
            ),
            Action::DisplacePlayer { steps } => {
                Tagged::with_payload(Action::TAG_DISPLACE_PLAYER, &DisplacePayload { steps })
            }
            Action::PromptAllPlayers { message } => {
                Tagged::with_payload(Action::TAG_PROMPT_ALL_PLAYERS, &PromptPayload { message })
            }
            Action::PromptCurrentPlayer { message } => Tagged::with_payload(
                Action::TAG_PROMPT_CURRENT_PLAYER,
                &PromptPayload { message },
            ),
            Action::SetPlayerSpace { space } => {
                Tagged::with_payload(Action::TAG_SET_PLAYER_SPACE, &SetSpacePayload { space })
            }
            Action::Custom { tag, payload } => Tagged { tag, payload },
        }
    }
}

impl TryFrom<Tagged> for Action {
    type Error = wire::WireError;

    fn try_from(tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.tag.as_str() {
            Self::TAG_APPLY_EFFECT => {
                let p: ApplyEffectPayload = tagged.parse_payload()?;
                Self::ApplyEffect {
                    id: p.id,
                    kind: p.kind,
                    duration: p.duration,
                }
            }
            Self::TAG_SET_PLAYER_STATE => {
                let p: SetPlayerStatePayload = tagged.parse_payload()?;
                Self::SetPlayerState { state: p.state }
            }
            Self::TAG_DISPLACE_PLAYER => {
                let p: DisplacePayload = tagged.parse_payload()?;
                Self::DisplacePlayer { steps: p.steps }
            }
            Self::TAG_PROMPT_ALL_PLAYERS => {
                let p: PromptPayload = tagged.parse_payload()?;
                Self::PromptAllPlayers { message: p.message }
            }
            Self::TAG_PROMPT_CURRENT_PLAYER => {
                let p: PromptPayload = tagged.parse_payload()?;
                Self::PromptCurrentPlayer { message: p.message }
            }
            Self::TAG_SET_PLAYER_SPACE => {
                let p: SetSpacePayload = tagged.parse_payload()?;
                Self::SetPlayerSpace { space: p.space }
            }
            _ => Self::Custom {
                tag: tagged.tag,
                payload: tagged.payload,
            },
        })
    }
}

impl Serialize for Action {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = Tagged::deserialize(deserializer)?;
        Self::try_from(tagged).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardMeta, Space, SpaceKind};
    use crate::rules::GameRules;
    use crate::state::{Player, PlayerId};

    fn board() -> Board {
        Board::new(
            BoardMeta::default(),
            GameRules::default(),
            vec![
                Space::new(SpaceId(0), "start", SpaceKind::Start).with_connection(SpaceId(1)),
                Space::new(SpaceId(1), "market", SpaceKind::Normal),
            ],
        )
        .unwrap()
    }

    fn state() -> GameState {
        let mut state = GameState::new(1);
        state
            .add_player(Player::new(PlayerId(0), "peer", "alice"))
            .unwrap();
        state.turn.current_player = PlayerId(0);
        state
    }

    #[test]
    fn apply_effect_attaches_to_acting_player() {
        let board = board();
        let mut state = state();
        let registry = BehaviorRegistry::new();
        let config = EngineConfig::default();
        let mut notifications = Vec::new();
        let mut ctx = ActionContext {
            state: &mut state,
            board: &board,
            registry: &registry,
            config: &config,
            notifications: &mut notifications,
        };

        let action = Action::ApplyEffect {
            id: "bonus".into(),
            kind: EffectKind::DoubleTurn,
            duration: 1,
        };
        assert_eq!(action.execute(&mut ctx), ActionProgress::Completed);
        assert!(state.player(PlayerId(0)).unwrap().effect("bonus").is_some());
        assert!(matches!(
            notifications[0],
            EngineEvent::EffectApplied { player: PlayerId(0), .. }
        ));
    }

    #[test]
    fn prompt_resolves_placeholders_and_suspends() {
        let board = board();
        let mut state = state();
        state.player_mut(PlayerId(0)).unwrap().current_space = SpaceId(1);
        let registry = BehaviorRegistry::new();
        let config = EngineConfig::default();
        let mut notifications = Vec::new();
        let mut ctx = ActionContext {
            state: &mut state,
            board: &board,
            registry: &registry,
            config: &config,
            notifications: &mut notifications,
        };

        let action = Action::PromptCurrentPlayer {
            message: "{player} reached {space}!".into(),
        };
        match action.execute(&mut ctx) {
            ActionProgress::AwaitPrompt(request) => {
                assert_eq!(request.message, "alice reached market!");
                assert!(!request.all_players);
            }
            other => panic!("expected prompt, got {other:?}"),
        }
    }

    #[test]
    fn set_player_space_rejects_spaces_off_the_board() {
        let board = board();
        let mut state = state();
        let registry = BehaviorRegistry::new();
        let config = EngineConfig::default();
        let mut notifications = Vec::new();
        let mut ctx = ActionContext {
            state: &mut state,
            board: &board,
            registry: &registry,
            config: &config,
            notifications: &mut notifications,
        };

        let action = Action::SetPlayerSpace { space: SpaceId(99) };
        assert_eq!(action.execute(&mut ctx), ActionProgress::Completed);
        assert_eq!(state.player(PlayerId(0)).unwrap().current_space, SpaceId(0));
        assert!(notifications.is_empty());
    }

    #[test]
    fn unknown_custom_action_completes_without_effect() {
        let board = board();
        let mut state = state();
        let registry = BehaviorRegistry::new();
        let config = EngineConfig::default();
        let mut notifications = Vec::new();
        let mut ctx = ActionContext {
            state: &mut state,
            board: &board,
            registry: &registry,
            config: &config,
            notifications: &mut notifications,
        };

        let action = Action::Custom {
            tag: "TELEPORT_RANDOM".into(),
            payload: serde_json::Value::Null,
        };
        assert_eq!(action.execute(&mut ctx), ActionProgress::Completed);
    }

    #[test]
    fn wire_round_trip_uses_screaming_snake_tags() {
        let action = Action::DisplacePlayer { steps: -2 };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "DISPLACE_PLAYER");
        assert_eq!(json["payload"]["steps"], -2);
        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn validate_flags_authoring_mistakes() {
        let board = board();
        assert!(!Action::DisplacePlayer { steps: 0 }.validate(&board).is_valid());
        assert!(!Action::SetPlayerSpace { space: SpaceId(7) }
            .validate(&board)
            .is_valid());
        assert!(Action::SetPlayerSpace { space: SpaceId(1) }
            .validate(&board)
            .is_valid());
    }
}
