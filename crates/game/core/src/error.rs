//! Common error infrastructure shared across the engine.
//!
//! The engine distinguishes four failure classes, and its propagation policy
//! follows from them:
//!
//! - **Configuration** errors (unknown type tag, malformed event payload,
//!   dangling space reference) are fatal at load/construction time.
//! - **Runtime no-ops** (missing payload field, unknown effect tag, no legal
//!   move target) are logged and swallowed so an untrusted board can never
//!   stall the turn loop.
//! - **Expression** errors inside Code triggers are coerced to `false`.
//! - **Staleness** (a completion arriving for a superseded request) is
//!   silently ignored.

/// Severity level of an error, used to pick a recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// Turn continues; the failed operation becomes a logged no-op.
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unrecoverable: the game cannot safely proceed (load-time only).
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Trait implemented by engine error types to expose their severity.
pub trait GameError: std::error::Error {
    fn severity(&self) -> ErrorSeverity;
}

/// Outcome of an advisory `validate()` call on a trigger or action.
///
/// Validation runs at authoring/import time; the engine never relies on it
/// at runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
        }
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn merge(&mut self, other: Validation) {
        self.errors.extend(other.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
