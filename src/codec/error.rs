use thiserror::Error;

use super::types::Dimension;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("invalid token sequence: expected exactly {expected} tokens, got {got}")]
    InvalidTokenCount { expected: usize, got: usize },
    #[error("token {value} for {dimension} is outside 0..={max}")]
    TokenOutOfRange {
        dimension: Dimension,
        value: i64,
        max: u8,
    },
    #[error("non-finite value {value} for {dimension}")]
    NonFinite { dimension: Dimension, value: f64 },
    #[error("workspace {name} must be finite and positive, got {value}")]
    InvalidWorkspace { name: &'static str, value: f64 },
    #[error("invalid bin {value} for {dimension}")]
    InvalidBin { dimension: Dimension, value: u8 },
}
