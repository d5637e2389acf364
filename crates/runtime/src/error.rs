use tabula_core::EngineError;

/// Runtime errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// The simulation worker has shut down.
    #[error("simulation worker is gone")]
    WorkerGone,
    /// The engine rejected the request.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A required input provider was not configured.
    #[error("no {0} provider configured")]
    ProviderNotSet(&'static str),
    /// The builder was spawned without a required piece.
    #[error("runtime builder missing {0}")]
    BuilderIncomplete(&'static str),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
