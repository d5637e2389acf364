//! Move-budget acquisition policies.
//!
//! The engine asks the active policy how the current player's move budget
//! is obtained: either by suspending for runtime input (a human rolling)
//! or by producing it deterministically from the player's own RNG stream.

use crate::rules::{MovementKind, MovementRule};
use crate::state::Player;

/// Where the turn's move budget comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollSource {
    /// Suspend and wait for a roll submitted through the runtime.
    AwaitInput { min: u32, max: u32 },
    /// Budget produced without input.
    Automatic(u32),
}

pub trait MovementPolicy: Send + Sync {
    fn propose(&self, player: &mut Player, rule: &MovementRule) -> RollSource;
}

/// Default policy: dice-roll boards wait for input, fixed boards always
/// grant `roll_max`.
#[derive(Debug, Default)]
pub struct DiceRoll;

impl MovementPolicy for DiceRoll {
    fn propose(&self, _player: &mut Player, rule: &MovementRule) -> RollSource {
        match rule.kind {
            MovementKind::DiceRoll => RollSource::AwaitInput {
                min: rule.roll_min,
                max: rule.roll_max,
            },
            MovementKind::Fixed => RollSource::Automatic(rule.roll_max),
        }
    }
}

/// Headless policy: rolls from the player's deterministic RNG stream, so
/// simulations replay identically from the same seed.
#[derive(Debug, Default)]
pub struct SeededAuto;

impl MovementPolicy for SeededAuto {
    fn propose(&self, player: &mut Player, rule: &MovementRule) -> RollSource {
        match rule.kind {
            MovementKind::DiceRoll => {
                RollSource::Automatic(player.rng.roll(rule.roll_min, rule.roll_max))
            }
            MovementKind::Fixed => RollSource::Automatic(rule.roll_max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlayerId;

    #[test]
    fn dice_roll_policy_waits_for_input() {
        let mut player = Player::new(PlayerId(0), "peer", "a");
        let source = DiceRoll.propose(&mut player, &MovementRule::default());
        assert_eq!(source, RollSource::AwaitInput { min: 1, max: 6 });
    }

    #[test]
    fn fixed_movement_never_asks() {
        let mut player = Player::new(PlayerId(0), "peer", "a");
        let rule = MovementRule {
            kind: MovementKind::Fixed,
            roll_min: 1,
            roll_max: 3,
        };
        assert_eq!(
            DiceRoll.propose(&mut player, &rule),
            RollSource::Automatic(3)
        );
    }

    #[test]
    fn seeded_auto_is_deterministic_per_player() {
        let rule = MovementRule::default();
        let mut a = Player::new(PlayerId(7), "peer", "a");
        let mut b = Player::new(PlayerId(7), "peer", "b");
        assert_eq!(
            SeededAuto.propose(&mut a, &rule),
            SeededAuto.propose(&mut b, &rule)
        );
    }
}
