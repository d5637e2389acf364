//! Effect scheduling passes.
//!
//! The engine runs one pass over the current player's effects at
//! `BEGIN_TURN` and one at `END_TURN`. Each pass decides per-effect what to
//! do based on its kind and the phase, applies it, and prunes whatever
//! expired. Built-in kinds are matched inline; custom kinds dispatch
//! through the [`BehaviorRegistry`].

use tracing::{debug, warn};

use crate::env::BehaviorRegistry;
use crate::phase::TurnPhase;
use crate::state::{GameState, Player, PlayerId};

use super::EffectKind;

/// What a single effect enactment did. Custom effects return this from
/// `CustomEffect::enact`; built-ins produce it inline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectTick {
    /// The effect did something this pass.
    pub fired: bool,
    /// Consume one activation (`duration -= 1`).
    pub decrement: bool,
    /// Remove the effect regardless of remaining duration.
    pub remove: bool,
    /// Request that the owner takes another turn after this one.
    pub repeat_turn: bool,
    /// Consume the owner's current turn (move budget zeroed).
    pub skip_turn: bool,
}

impl EffectTick {
    /// An enactment that consumed one activation.
    pub fn consumed() -> Self {
        Self {
            fired: true,
            decrement: true,
            ..Self::default()
        }
    }

    /// A pass where the effect stayed dormant.
    pub fn dormant() -> Self {
        Self::default()
    }
}

/// Aggregate result of one scheduling pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerOutcome {
    /// An effect asked for the current player to take another turn.
    pub repeat_turn: bool,
    /// An effect consumed the current player's turn (move budget zeroed).
    pub skip_turn: bool,
}

/// Stateless driver for effect passes. Holds no data; exists so the
/// engine has a single named entry point for effect timing rules.
#[derive(Debug, Default)]
pub struct EffectScheduler;

impl EffectScheduler {
    /// Runs one pass over the current player's effects for `phase`.
    pub fn run_pass(
        state: &mut GameState,
        phase: TurnPhase,
        registry: &BehaviorRegistry,
    ) -> SchedulerOutcome {
        let owner = state.turn.current_player;
        let Some(player) = state.player(owner) else {
            return SchedulerOutcome::default();
        };

        // Snapshot ids and kinds first; custom enactment needs the whole
        // state mutably, so per-effect changes are re-applied by id.
        let snapshot: Vec<(String, EffectKind)> = player
            .effects
            .iter()
            .filter(|e| !e.is_expired())
            .map(|e| (e.id.clone(), e.kind.clone()))
            .collect();

        let mut outcome = SchedulerOutcome::default();
        for (id, kind) in snapshot {
            let tick = match &kind {
                EffectKind::DoubleTurn => Self::tick_double_turn(state, owner, phase, &id),
                EffectKind::SkipTurn => Self::tick_skip_turn(phase),
                EffectKind::RollModifier { .. } => Self::tick_roll_modifier(phase),
                EffectKind::Custom { tag, payload } => match registry.custom_effect(tag) {
                    Some(effect) => effect.enact(state, owner, phase, payload),
                    None => {
                        warn!(tag, effect = %id, "no registered behavior for custom effect; removing");
                        EffectTick {
                            remove: true,
                            ..EffectTick::default()
                        }
                    }
                },
            };

            if tick.fired {
                debug!(effect = %id, ?phase, player = %owner, "effect fired");
            }
            outcome.repeat_turn |= tick.repeat_turn;
            outcome.skip_turn |= tick.skip_turn;
            if let Some(player) = state.player_mut(owner) {
                if let Some(effect) = player.effects.iter_mut().find(|e| e.id == id) {
                    if tick.fired {
                        effect.fired_this_grant = true;
                    }
                    if tick.decrement {
                        effect.duration -= 1;
                    }
                    if tick.remove {
                        effect.mark_for_removal();
                    }
                }
            }
        }

        if let Some(player) = state.player_mut(owner) {
            player.effects.retain(|e| !e.is_expired());
        }

        if outcome.skip_turn {
            state.turn.remaining_moves = 0;
        }
        if outcome.repeat_turn {
            state.turn.repeat_requested = true;
        }
        outcome
    }

    fn tick_double_turn(
        state: &GameState,
        owner: PlayerId,
        phase: TurnPhase,
        id: &str,
    ) -> EffectTick {
        if phase != TurnPhase::EndTurn {
            return EffectTick::dormant();
        }
        // Once per grant: a re-applied effect resets the flag.
        let already_fired = state
            .player(owner)
            .and_then(|p| p.effects.iter().find(|e| e.id == id))
            .is_some_and(|e| e.fired_this_grant);
        if already_fired {
            return EffectTick {
                decrement: true,
                ..EffectTick::default()
            };
        }
        EffectTick {
            fired: true,
            decrement: true,
            repeat_turn: true,
            ..EffectTick::default()
        }
    }

    fn tick_skip_turn(phase: TurnPhase) -> EffectTick {
        if phase != TurnPhase::BeginTurn {
            return EffectTick::dormant();
        }
        EffectTick {
            fired: true,
            decrement: true,
            skip_turn: true,
            ..EffectTick::default()
        }
    }

    fn tick_roll_modifier(phase: TurnPhase) -> EffectTick {
        // Applies passively at roll time; only its duration ticks here.
        if phase == TurnPhase::EndTurn {
            EffectTick {
                decrement: true,
                ..EffectTick::default()
            }
        } else {
            EffectTick::dormant()
        }
    }

    /// Net roll adjustment from the player's active roll-modifier effects.
    pub fn roll_modifier(player: &Player) -> i32 {
        player
            .effects
            .iter()
            .filter(|e| !e.is_expired())
            .filter_map(|e| match e.kind {
                EffectKind::RollModifier { delta } => Some(delta),
                _ => None,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::PlayerEffect;
    use crate::state::Player;

    fn state_with_effect(kind: EffectKind, duration: i32) -> GameState {
        let mut state = GameState::new(7);
        let mut player = Player::new(PlayerId(0), "peer-0", "alice");
        player.attach_effect(PlayerEffect::new("e-1", kind, duration, PlayerId(0)));
        state.add_player(player).unwrap();
        state.turn.current_player = PlayerId(0);
        state
    }

    #[test]
    fn skip_turn_zeroes_moves_at_begin_turn() {
        let registry = BehaviorRegistry::new();
        let mut state = state_with_effect(EffectKind::SkipTurn, 1);
        state.turn.remaining_moves = 3;

        let outcome = EffectScheduler::run_pass(&mut state, TurnPhase::BeginTurn, &registry);

        assert!(outcome.skip_turn);
        assert_eq!(state.turn.remaining_moves, 0);
        // Single activation consumed; effect pruned.
        assert!(state.player(PlayerId(0)).unwrap().effects.is_empty());
    }

    #[test]
    fn skip_turn_is_dormant_at_end_turn() {
        let registry = BehaviorRegistry::new();
        let mut state = state_with_effect(EffectKind::SkipTurn, 1);
        state.turn.remaining_moves = 3;

        let outcome = EffectScheduler::run_pass(&mut state, TurnPhase::EndTurn, &registry);

        assert!(!outcome.skip_turn);
        assert_eq!(state.turn.remaining_moves, 3);
        assert_eq!(state.player(PlayerId(0)).unwrap().effects.len(), 1);
    }

    #[test]
    fn double_turn_fires_once_per_grant() {
        let registry = BehaviorRegistry::new();
        let mut state = state_with_effect(EffectKind::DoubleTurn, 2);

        let first = EffectScheduler::run_pass(&mut state, TurnPhase::EndTurn, &registry);
        assert!(first.repeat_turn);
        assert!(state.turn.repeat_requested);

        state.turn.repeat_requested = false;
        let second = EffectScheduler::run_pass(&mut state, TurnPhase::EndTurn, &registry);
        assert!(!second.repeat_turn);
        assert!(!state.turn.repeat_requested);
        assert!(state.player(PlayerId(0)).unwrap().effects.is_empty());
    }

    #[test]
    fn reapplied_double_turn_fires_again() {
        let registry = BehaviorRegistry::new();
        let mut state = state_with_effect(EffectKind::DoubleTurn, 1);

        assert!(EffectScheduler::run_pass(&mut state, TurnPhase::EndTurn, &registry).repeat_turn);

        // Same id re-granted; attach_effect replaces and resets the flag.
        state
            .player_mut(PlayerId(0))
            .unwrap()
            .attach_effect(PlayerEffect::new(
                "e-1",
                EffectKind::DoubleTurn,
                1,
                PlayerId(0),
            ));
        assert!(EffectScheduler::run_pass(&mut state, TurnPhase::EndTurn, &registry).repeat_turn);
    }

    #[test]
    fn roll_modifier_sums_active_deltas() {
        let mut player = Player::new(PlayerId(0), "peer-0", "p");
        player.attach_effect(PlayerEffect::new(
            "plus",
            EffectKind::RollModifier { delta: 2 },
            3,
            PlayerId(0),
        ));
        player.attach_effect(PlayerEffect::new(
            "minus",
            EffectKind::RollModifier { delta: -1 },
            1,
            PlayerId(0),
        ));
        assert_eq!(EffectScheduler::roll_modifier(&player), 1);
    }

    #[test]
    fn unknown_custom_effect_is_removed_with_warning() {
        let registry = BehaviorRegistry::new();
        let mut state = state_with_effect(
            EffectKind::Custom {
                tag: "FROZEN".into(),
                payload: serde_json::Value::Null,
            },
            5,
        );
        EffectScheduler::run_pass(&mut state, TurnPhase::BeginTurn, &registry);
        assert!(state.player(PlayerId(0)).unwrap().effects.is_empty());
    }
}
