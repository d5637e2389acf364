//! Async session runtime around the tabula turn engine.
//!
//! The engine in `tabula-core` is synchronous and single-owner; this crate
//! wraps it in a tokio task (the simulation worker), exposes a cloneable
//! [`RuntimeHandle`] over a command channel, and fans engine notifications
//! out through a topic-based [`EventBus`]. Input providers answer the
//! engine's parked requests; the [`TurnTimer`] watchdog force-ends turns
//! that outlive their deadline.

pub mod error;
pub mod events;
pub mod handle;
pub mod providers;
pub mod runtime;
pub mod timer;
pub mod worker;

pub use error::{Result, RuntimeError};
pub use events::{topic_of, EventBus, Topic};
pub use handle::RuntimeHandle;
pub use providers::{
    AutoRoll, ChoiceProvider, FirstChoice, PromptProvider, RollProvider, Silent,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use timer::TurnTimer;
pub use worker::{Command, SimulationWorker};
