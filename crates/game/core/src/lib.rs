//! Deterministic board-game rules engine shared across runtimes.
//!
//! `tabula-core` defines the canonical model (boards, rules, events,
//! effects) and the synchronous turn engine that drives it. All state
//! mutation flows through [`engine::GameEngine`]; the runtime and content
//! crates depend on the types re-exported here.
pub mod action;
pub mod board;
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod movement;
pub mod notify;
pub mod phase;
pub mod rules;
pub mod state;
pub mod trigger;
pub mod wire;
pub use action::{Action, ActionContext, ActionProgress, PromptRequest};
pub use board::{Board, BoardError, BoardMeta, Connection, DrawHint, Space, SpaceKind};
pub use config::EngineConfig;
pub use effect::{EffectKind, EffectScheduler, EffectTick, PlayerEffect, SchedulerOutcome};
pub use engine::{EngineError, GameEngine, Pending, PendingKind};
pub use env::{BehaviorRegistry, CustomAction, CustomEffect, CustomTrigger, Pcg32, RegistryError};
pub use error::{ErrorSeverity, GameError, Validation};
pub use event::{EventPipeline, EventPriority, EventRef, EventState, GameEvent};
pub use movement::{DiceRoll, MovementPolicy, RollSource, SeededAuto};
pub use notify::EngineEvent;
pub use phase::{GamePhase, PhaseMachine, PhaseState, TurnPhase};
pub use rules::{
    Distribution, GameRules, MovementKind, MovementRule, PlayerCountValidity, StartMode,
    StartingRule, TurnLimitWinner, VictoryCondition, VictoryResult,
};
pub use state::{
    GameState, MoveRecord, MovementHistory, PieceId, Player, PlayerId, PlayerState, RequestToken,
    SpaceId, StatRecord, StatValue, Stats, TurnState,
};
pub use trigger::{CodeExpr, EvalScope, Trigger, TriggerContext, Value};
pub use wire::{Tagged, WireError};
