//! Session environment: deterministic randomness and the pluggable
//! behavior registry the engine consults for custom content.

mod registry;
mod rng;

pub use registry::{
    BehaviorRegistry, CustomAction, CustomEffect, CustomTrigger, RegistryError,
};
pub use rng::Pcg32;
