//! Trigger variants: boolean predicates over turn/space/player context.

mod expr;

pub use expr::{CodeExpr, EvalScope, ExprError, Value};

use serde::{Deserialize, Serialize};

use crate::board::Space;
use crate::env::BehaviorRegistry;
use crate::error::Validation;
use crate::state::{GameState, Player};
use crate::wire::{self, Tagged};

/// Context a trigger evaluates against.
///
/// `space` is the space declaring the event under evaluation, which is not
/// necessarily the player's current space (OnExit keys off the departed one).
pub struct TriggerContext<'a> {
    pub state: &'a GameState,
    pub space: &'a Space,
    pub player: &'a Player,
    pub registry: &'a BehaviorRegistry,
}

impl EvalScope for TriggerContext<'_> {
    fn var(&self, name: &str) -> Option<Value> {
        match name {
            "turn_number" => Some(Value::Int(self.state.turn.turn_number as i64)),
            "moves_left" => Some(Value::Int(self.state.turn.remaining_moves as i64)),
            "moves_this_turn" => Some(Value::Int(self.state.turn.moves_this_turn as i64)),
            "space_id" => Some(Value::Int(self.player.current_space.0 as i64)),
            "turns_taken" => Some(Value::Int(self.player.turns_taken as i64)),
            "player_state" => Some(Value::Str(self.player.state().as_str().to_owned())),
            _ => None,
        }
    }

    fn stat(&self, id: &str) -> Option<Value> {
        self.player.stats.int(id).map(Value::Int)
    }
}

/// Boolean predicate attached to a [`crate::event::GameEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    /// True once the active player has made at least one move this turn and
    /// currently sits on this space. Fires mid-movement, before the move
    /// budget is exhausted.
    OnEnter,

    /// OnEnter timing, but only at the end of movement (no moves left).
    OnLand,

    /// True for the space the player just departed.
    OnExit,

    /// Safe boolean expression over the trigger scope.
    Code(CodeExpr),

    /// Plugin-contributed predicate resolved through the behavior registry.
    /// Unknown tags evaluate to false.
    Custom {
        tag: String,
        payload: serde_json::Value,
    },
}

impl Trigger {
    pub const TAG_ON_ENTER: &'static str = "ON_ENTER";
    pub const TAG_ON_LAND: &'static str = "ON_LAND";
    pub const TAG_ON_EXIT: &'static str = "ON_EXIT";
    pub const TAG_CODE: &'static str = "CODE";

    pub fn type_tag(&self) -> &str {
        match self {
            Self::OnEnter => Self::TAG_ON_ENTER,
            Self::OnLand => Self::TAG_ON_LAND,
            Self::OnExit => Self::TAG_ON_EXIT,
            Self::Code(_) => Self::TAG_CODE,
            Self::Custom { tag, .. } => tag,
        }
    }

    /// Evaluates the predicate. Never panics and never errors: expression
    /// failures and unknown custom tags are false.
    pub fn is_triggered(&self, ctx: &TriggerContext<'_>) -> bool {
        let on_space = ctx.player.current_space == ctx.space.id;
        match self {
            Self::OnEnter => ctx.state.turn.moves_this_turn >= 1 && on_space,
            Self::OnLand => {
                ctx.state.turn.moves_this_turn >= 1
                    && on_space
                    && ctx.state.turn.remaining_moves == 0
            }
            Self::OnExit => ctx.state.turn.last_departed == Some(ctx.space.id),
            Self::Code(expr) => expr.eval_bool(ctx),
            Self::Custom { tag, payload } => match ctx.registry.custom_trigger(tag) {
                Some(custom) => custom.is_triggered(ctx, payload),
                None => {
                    tracing::warn!(tag, "unknown custom trigger; treating as false");
                    false
                }
            },
        }
    }

    /// Advisory authoring-time validation.
    pub fn validate(&self) -> Validation {
        match self {
            Self::Code(expr) => CodeExpr::validate_source(expr.source()),
            Self::Custom { tag, .. } if tag.is_empty() => {
                Validation::fail("custom trigger with empty type tag")
            }
            _ => Validation::ok(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CodePayload {
    source: String,
}

impl From<Trigger> for Tagged {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::OnEnter => Tagged::bare(Trigger::TAG_ON_ENTER),
            Trigger::OnLand => Tagged::bare(Trigger::TAG_ON_LAND),
            Trigger::OnExit => Tagged::bare(Trigger::TAG_ON_EXIT),
            Trigger::Code(expr) => Tagged::with_payload(
                Trigger::TAG_CODE,
                &CodePayload {
                    source: expr.source().to_owned(),
                },
            ),
            Trigger::Custom { tag, payload } => Tagged { tag, payload },
        }
    }
}

impl TryFrom<Tagged> for Trigger {
    type Error = wire::WireError;

    fn try_from(tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.tag.as_str() {
            Self::TAG_ON_ENTER => Self::OnEnter,
            Self::TAG_ON_LAND => Self::OnLand,
            Self::TAG_ON_EXIT => Self::OnExit,
            Self::TAG_CODE => {
                let p: CodePayload = tagged.parse_payload()?;
                let expr =
                    CodeExpr::parse(&p.source).map_err(|err| wire::WireError::BadPayload {
                        tag: Self::TAG_CODE.to_owned(),
                        message: err.to_string(),
                    })?;
                Self::Code(expr)
            }
            _ => Self::Custom {
                tag: tagged.tag,
                payload: tagged.payload,
            },
        })
    }
}

impl Serialize for Trigger {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = Tagged::deserialize(deserializer)?;
        Self::try_from(tagged).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Space, SpaceKind};
    use crate::state::{Player, PlayerId, SpaceId};

    fn fixture() -> (GameState, Space, BehaviorRegistry) {
        let mut state = GameState::new(1);
        let mut player = Player::new(PlayerId(0), "peer", "a");
        player.current_space = SpaceId(5);
        state.players.push(player);
        state.turn.current_player = PlayerId(0);
        let space = Space::new(SpaceId(5), "here", SpaceKind::Normal);
        (state, space, BehaviorRegistry::new())
    }

    fn ctx<'a>(
        state: &'a GameState,
        space: &'a Space,
        registry: &'a BehaviorRegistry,
    ) -> TriggerContext<'a> {
        TriggerContext {
            state,
            space,
            player: state.player(PlayerId(0)).unwrap(),
            registry,
        }
    }

    #[test]
    fn on_enter_requires_a_move_this_turn() {
        let (mut state, space, registry) = fixture();
        assert!(!Trigger::OnEnter.is_triggered(&ctx(&state, &space, &registry)));

        state.turn.moves_this_turn = 1;
        state.turn.remaining_moves = 2;
        assert!(Trigger::OnEnter.is_triggered(&ctx(&state, &space, &registry)));
        // Mid-movement, OnLand stays quiet until the budget is spent.
        assert!(!Trigger::OnLand.is_triggered(&ctx(&state, &space, &registry)));

        state.turn.remaining_moves = 0;
        assert!(Trigger::OnLand.is_triggered(&ctx(&state, &space, &registry)));
    }

    #[test]
    fn on_exit_keys_off_the_departed_space() {
        let (mut state, space, registry) = fixture();
        state.turn.moves_this_turn = 1;
        assert!(!Trigger::OnExit.is_triggered(&ctx(&state, &space, &registry)));
        state.turn.last_departed = Some(SpaceId(5));
        assert!(Trigger::OnExit.is_triggered(&ctx(&state, &space, &registry)));
    }

    #[test]
    fn code_trigger_sees_the_player_scope() {
        let (mut state, space, registry) = fixture();
        state.turn.turn_number = 3;
        state
            .player_mut(PlayerId(0))
            .unwrap()
            .stats
            .set_int("score", 7);
        let trigger = Trigger::Code(CodeExpr::parse("turn_number == 3 && stat('score') > 5").unwrap());
        assert!(trigger.is_triggered(&ctx(&state, &space, &registry)));
    }

    #[test]
    fn unknown_custom_trigger_is_false() {
        let (state, space, registry) = fixture();
        let trigger = Trigger::Custom {
            tag: "NEVER_REGISTERED".into(),
            payload: serde_json::Value::Null,
        };
        assert!(!trigger.is_triggered(&ctx(&state, &space, &registry)));
    }

    #[test]
    fn wire_round_trip_preserves_type_and_payload() {
        let trigger = Trigger::Code(CodeExpr::parse("moves_left == 0").unwrap());
        let json = serde_json::to_value(&trigger).unwrap();
        assert_eq!(json["type"], "CODE");
        assert_eq!(json["payload"]["source"], "moves_left == 0");
        let back: Trigger = serde_json::from_value(json).unwrap();
        assert_eq!(back, trigger);
    }
}
