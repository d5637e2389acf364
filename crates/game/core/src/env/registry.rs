//! Behavior registry: the pluggable dispatch surface for plugin-contributed
//! triggers, actions, effects, and player states.
//!
//! One registry instance is built per game session and passed by reference
//! into the engine (dependency injection; there are no global singletons).
//! Content loaders map wire type-tags onto the `Custom` variants of each
//! family, and the engine resolves those tags here at evaluation time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::action::ActionContext;
use crate::effect::scheduler::EffectTick;
use crate::phase::TurnPhase;
use crate::state::{GameState, PlayerId};
use crate::trigger::TriggerContext;

/// Plugin-contributed trigger predicate.
pub trait CustomTrigger: Send + Sync {
    fn is_triggered(&self, ctx: &TriggerContext<'_>, payload: &serde_json::Value) -> bool;
}

/// Plugin-contributed action body. Runs synchronously; the surrounding
/// pipeline emits the before/after notifications and completes the event.
pub trait CustomAction: Send + Sync {
    fn execute(&self, ctx: &mut ActionContext<'_>, payload: &serde_json::Value);
}

/// Plugin-contributed effect behavior, invoked once per scheduler pass.
pub trait CustomEffect: Send + Sync {
    fn enact(
        &self,
        state: &mut GameState,
        owner: PlayerId,
        phase: TurnPhase,
        payload: &serde_json::Value,
    ) -> EffectTick;
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type tag '{0}' is already registered")]
    DuplicateTag(String),
}

impl crate::error::GameError for RegistryError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Fatal
    }
}

/// Session-scoped registry for all pluggable behavior families.
#[derive(Default)]
pub struct BehaviorRegistry {
    triggers: HashMap<String, Arc<dyn CustomTrigger>>,
    actions: HashMap<String, Arc<dyn CustomAction>>,
    effects: HashMap<String, Arc<dyn CustomEffect>>,
    player_states: Vec<String>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_trigger(
        &mut self,
        tag: impl Into<String>,
        trigger: Arc<dyn CustomTrigger>,
    ) -> Result<(), RegistryError> {
        let tag = tag.into();
        if self.triggers.contains_key(&tag) {
            return Err(RegistryError::DuplicateTag(tag));
        }
        self.triggers.insert(tag, trigger);
        Ok(())
    }

    pub fn register_action(
        &mut self,
        tag: impl Into<String>,
        action: Arc<dyn CustomAction>,
    ) -> Result<(), RegistryError> {
        let tag = tag.into();
        if self.actions.contains_key(&tag) {
            return Err(RegistryError::DuplicateTag(tag));
        }
        self.actions.insert(tag, action);
        Ok(())
    }

    pub fn register_effect(
        &mut self,
        tag: impl Into<String>,
        effect: Arc<dyn CustomEffect>,
    ) -> Result<(), RegistryError> {
        let tag = tag.into();
        if self.effects.contains_key(&tag) {
            return Err(RegistryError::DuplicateTag(tag));
        }
        self.effects.insert(tag, effect);
        Ok(())
    }

    /// Registers an additional allowed player state.
    pub fn register_player_state(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.player_states.contains(&name) {
            self.player_states.push(name);
        }
    }

    pub fn custom_trigger(&self, tag: &str) -> Option<&dyn CustomTrigger> {
        self.triggers.get(tag).map(|t| t.as_ref())
    }

    pub fn custom_action(&self, tag: &str) -> Option<&dyn CustomAction> {
        self.actions.get(tag).map(|a| a.as_ref())
    }

    pub fn custom_effect(&self, tag: &str) -> Option<&dyn CustomEffect> {
        self.effects.get(tag).map(|e| e.as_ref())
    }

    /// Custom player states allowed this session.
    pub fn player_states(&self) -> &[String] {
        &self.player_states
    }
}

impl std::fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("triggers", &self.triggers.len())
            .field("actions", &self.actions.len())
            .field("effects", &self.effects.len())
            .field("player_states", &self.player_states)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysTrigger;

    impl CustomTrigger for AlwaysTrigger {
        fn is_triggered(&self, _ctx: &TriggerContext<'_>, _payload: &serde_json::Value) -> bool {
            true
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = BehaviorRegistry::new();
        registry
            .register_trigger("ALWAYS", Arc::new(AlwaysTrigger))
            .unwrap();
        let err = registry.register_trigger("ALWAYS", Arc::new(AlwaysTrigger));
        assert_eq!(err, Err(RegistryError::DuplicateTag("ALWAYS".into())));
    }

    #[test]
    fn player_state_registration_is_idempotent() {
        let mut registry = BehaviorRegistry::new();
        registry.register_player_state("FROZEN");
        registry.register_player_state("FROZEN");
        assert_eq!(registry.player_states(), &["FROZEN".to_owned()]);
    }
}
