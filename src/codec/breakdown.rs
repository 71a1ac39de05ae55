use serde::Serialize;

use super::error::CodecError;
use super::types::{ContinuousAction, Dimension, Token};
use super::{decode_sequence, encode};

/// One line of the per-dimension table shown next to the token chips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub dimension: Dimension,
    pub unit: &'static str,
    pub input: f64,
    pub bin: u8,
    pub token: Token,
    pub reconstructed: f64,
    /// `reconstructed - input`, before any clamping of the input.
    pub error: f64,
}

pub fn breakdown(action: &ContinuousAction) -> Result<Vec<BreakdownRow>, CodecError> {
    let encoded = encode(action)?;
    let decoded = decode_sequence(&encoded.tokens);
    Ok(Dimension::ALL
        .iter()
        .map(|&dimension| {
            let input = action.get(dimension);
            let reconstructed = decoded.action.get(dimension);
            BreakdownRow {
                dimension,
                unit: dimension.unit(),
                input,
                bin: encoded.bins.get(dimension),
                token: encoded.tokens.get(dimension),
                reconstructed,
                error: reconstructed - input,
            }
        })
        .collect())
}
