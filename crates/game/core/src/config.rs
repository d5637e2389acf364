use serde::{Deserialize, Serialize};

/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on directives drained per external call into the engine.
    ///
    /// Converts an authoring mistake (an event loop that keeps re-triggering
    /// itself) into a logged stop instead of a hang.
    pub max_directives_per_pump: u32,

    /// Default prompt auto-dismiss timeout, applied when a prompt action
    /// does not carry its own.
    pub default_prompt_timeout_ms: Option<u64>,

    /// Roll range used when a board's rules omit one.
    pub default_roll_min: u32,
    pub default_roll_max: u32,
}

impl EngineConfig {
    /// Maximum nickname length; longer names are truncated on set.
    pub const MAX_NICKNAME_LEN: usize = 32;

    pub const DEFAULT_MAX_DIRECTIVES: u32 = 256;
    pub const DEFAULT_PROMPT_TIMEOUT_MS: u64 = 10_000;

    pub fn new() -> Self {
        Self {
            max_directives_per_pump: Self::DEFAULT_MAX_DIRECTIVES,
            default_prompt_timeout_ms: Some(Self::DEFAULT_PROMPT_TIMEOUT_MS),
            default_roll_min: 1,
            default_roll_max: 6,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
