//! Temporary player effects.
//!
//! An effect is granted by an `ApplyEffect` action (`apply`), then ticked by
//! the [`scheduler::EffectScheduler`] once per scheduling pass (`enact`).
//! Enactment decrements `duration`; the scheduler prunes effects once they
//! are exhausted or explicitly marked for removal.

pub mod scheduler;

pub use scheduler::{EffectScheduler, EffectTick, SchedulerOutcome};

use serde::{Deserialize, Serialize};

use crate::state::PlayerId;
use crate::wire::{self, Tagged};

/// Behavior variant of an effect.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectKind {
    /// Grants the owner an extra turn: raises the repeat-turn signal once
    /// per grant, at the END_TURN scheduler pass of the owner's turn.
    DoubleTurn,

    /// Skips the owner's turn at BEGIN_TURN by zeroing their move budget.
    SkipTurn,

    /// Adds `delta` to every roll the owner makes while active (result
    /// clamped at zero).
    RollModifier { delta: i32 },

    /// Plugin-contributed effect dispatched through the behavior registry.
    Custom {
        tag: String,
        payload: serde_json::Value,
    },
}

impl EffectKind {
    pub const TAG_DOUBLE_TURN: &'static str = "DOUBLE_TURN";
    pub const TAG_SKIP_TURN: &'static str = "SKIP_TURN";
    pub const TAG_ROLL_MODIFIER: &'static str = "ROLL_MODIFIER";

    pub fn type_tag(&self) -> &str {
        match self {
            Self::DoubleTurn => Self::TAG_DOUBLE_TURN,
            Self::SkipTurn => Self::TAG_SKIP_TURN,
            Self::RollModifier { .. } => Self::TAG_ROLL_MODIFIER,
            Self::Custom { tag, .. } => tag,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RollModifierPayload {
    delta: i32,
}

impl From<EffectKind> for Tagged {
    fn from(kind: EffectKind) -> Self {
        match kind {
            EffectKind::DoubleTurn => Tagged::bare(EffectKind::TAG_DOUBLE_TURN),
            EffectKind::SkipTurn => Tagged::bare(EffectKind::TAG_SKIP_TURN),
            EffectKind::RollModifier { delta } => Tagged::with_payload(
                EffectKind::TAG_ROLL_MODIFIER,
                &RollModifierPayload { delta },
            ),
            EffectKind::Custom { tag, payload } => Tagged { tag, payload },
        }
    }
}

impl TryFrom<Tagged> for EffectKind {
    type Error = wire::WireError;

    fn try_from(tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.tag.as_str() {
            Self::TAG_DOUBLE_TURN => Self::DoubleTurn,
            Self::TAG_SKIP_TURN => Self::SkipTurn,
            Self::TAG_ROLL_MODIFIER => {
                let p: RollModifierPayload = tagged.parse_payload()?;
                Self::RollModifier { delta: p.delta }
            }
            _ => Self::Custom {
                tag: tagged.tag,
                payload: tagged.payload,
            },
        })
    }
}

impl Serialize for EffectKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EffectKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = Tagged::deserialize(deserializer)?;
        Self::try_from(tagged).map_err(serde::de::Error::custom)
    }
}

/// An active effect attached to a player.
///
/// Owned exclusively by the player that holds it; `id` is unique per player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerEffect {
    pub id: String,
    pub kind: EffectKind,
    /// Remaining activations. The scheduler prunes at `<= 0`.
    pub duration: i32,
    #[serde(default)]
    pub to_remove: bool,
    /// Player the effect was granted to.
    pub owner: PlayerId,
    /// Set once the effect has fired for the current grant (used by
    /// once-per-grant effects such as DoubleTurn).
    #[serde(default)]
    pub fired_this_grant: bool,
}

impl PlayerEffect {
    pub fn new(id: impl Into<String>, kind: EffectKind, duration: i32, owner: PlayerId) -> Self {
        Self {
            id: id.into(),
            kind,
            duration,
            to_remove: false,
            owner,
            fired_this_grant: false,
        }
    }

    pub fn mark_for_removal(&mut self) {
        self.to_remove = true;
    }

    /// True once the scheduler should prune this effect.
    pub fn is_expired(&self) -> bool {
        self.to_remove || self.duration <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_kind_round_trips_through_wire_shape() {
        let kind = EffectKind::RollModifier { delta: -2 };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "ROLL_MODIFIER");
        assert_eq!(json["payload"]["delta"], -2);
        let back: EffectKind = serde_json::from_value(json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn unknown_tag_becomes_custom() {
        let json = serde_json::json!({"type": "FROZEN", "payload": {"turns": 2}});
        let kind: EffectKind = serde_json::from_value(json).unwrap();
        match kind {
            EffectKind::Custom { ref tag, .. } => assert_eq!(tag, "FROZEN"),
            other => panic!("expected custom effect, got {other:?}"),
        }
    }
}
