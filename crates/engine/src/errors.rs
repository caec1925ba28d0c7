use thiserror::Error;

/// Engine-level error type.
/// The hosting process decides how to surface these; the engine only emits them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Measurement probe error: {0}")]
    Probe(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
