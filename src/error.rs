use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Error)]
pub enum ChainError {
    /// Proof-of-work does not meet the chain difficulty.
    #[error("invalid block hash")]
    InvalidHash,
    /// `previous_hash` does not point at the current tip.
    #[error("invalid previous hash")]
    InvalidLink,
    #[error("empty block data")]
    EmptyPayload,
    /// Nonce is still the unmined sentinel (0).
    #[error("invalid nonce")]
    InvalidNonce,
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),
    #[error("stored hash does not match block content")]
    HashMismatch,
    #[error("block at position {position} rejected: {source}")]
    InvalidBlockAt {
        position: usize,
        #[source]
        source: Box<ChainError>,
    },
    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
    #[error("mining gave up after {attempts} attempts")]
    Exhausted { attempts: u64 },
    #[error("invalid config value for {key}: {value:?}")]
    Config { key: &'static str, value: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
