//! Input providers: how parked engine requests get answered.
//!
//! A session wires one provider per request family. Interactive frontends
//! implement these against their transport; the headless implementations
//! here answer immediately and exist for simulations and tests.

use async_trait::async_trait;
use rand::Rng;

use tabula_core::{PlayerId, SpaceId};

/// Answers a parked roll request.
#[async_trait]
pub trait RollProvider: Send + Sync {
    async fn roll(&self, player: PlayerId, min: u32, max: u32) -> u32;
}

/// Answers a parked destination choice.
#[async_trait]
pub trait ChoiceProvider: Send + Sync {
    async fn choose(&self, player: PlayerId, options: &[SpaceId]) -> SpaceId;
}

/// Acknowledges a parked prompt on behalf of a player.
#[async_trait]
pub trait PromptProvider: Send + Sync {
    async fn acknowledge(&self, player: PlayerId, message: &str);
}

/// Headless roller: uniform draw from the thread RNG.
#[derive(Debug, Default)]
pub struct AutoRoll;

#[async_trait]
impl RollProvider for AutoRoll {
    async fn roll(&self, _player: PlayerId, min: u32, max: u32) -> u32 {
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Headless chooser: always the first offered destination.
#[derive(Debug, Default)]
pub struct FirstChoice;

#[async_trait]
impl ChoiceProvider for FirstChoice {
    async fn choose(&self, _player: PlayerId, options: &[SpaceId]) -> SpaceId {
        options[0]
    }
}

/// Headless prompt handler: acknowledges without reading.
#[derive(Debug, Default)]
pub struct Silent;

#[async_trait]
impl PromptProvider for Silent {
    async fn acknowledge(&self, _player: PlayerId, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auto_roll_stays_in_bounds() {
        for _ in 0..64 {
            let value = AutoRoll.roll(PlayerId(0), 1, 6).await;
            assert!((1..=6).contains(&value));
        }
    }

    #[tokio::test]
    async fn first_choice_picks_the_head() {
        let options = [SpaceId(4), SpaceId(9)];
        assert_eq!(FirstChoice.choose(PlayerId(0), &options).await, SpaceId(4));
    }
}
