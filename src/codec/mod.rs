//! Action codec
//!
//! Maps continuous 8D robot actions onto 256 bins per dimension and back,
//! the discretization used by vision-language-action models. Tokens are the
//! bins themselves. Everything here is a pure function; callers may share it
//! across threads freely.

pub mod breakdown;
pub mod error;
pub mod scalar;
pub mod types;
pub mod workspace;

pub use breakdown::{breakdown, BreakdownRow};
pub use error::CodecError;
pub use types::{
    ContinuousAction, DecodedAction, DiscreteBins, Dimension, DimensionKind, EncodedAction,
    Token, TokenSequence, TOKEN_COUNT,
};

/// Quantizes every dimension. Out-of-range values are clamped; NaN and
/// infinities are rejected.
pub fn encode(action: &ContinuousAction) -> Result<EncodedAction, CodecError> {
    let values = action.to_array();
    let mut bins = [0u8; TOKEN_COUNT];
    for dimension in Dimension::ALL {
        let value = values[dimension.index()];
        if !value.is_finite() {
            return Err(CodecError::NonFinite { dimension, value });
        }
        bins[dimension.index()] = dimension.kind().to_bin(value);
    }
    let bins = DiscreteBins::from_array(bins)?;
    Ok(EncodedAction {
        bins,
        tokens: bins.to_tokens(),
    })
}

/// Reconstructs an action from exactly eight tokens.
pub fn decode(tokens: &[i64]) -> Result<DecodedAction, CodecError> {
    let tokens = TokenSequence::try_from(tokens)?;
    Ok(decode_sequence(&tokens))
}

/// Infallible once the sequence has been validated.
pub fn decode_sequence(tokens: &TokenSequence) -> DecodedAction {
    let bins = tokens.to_bins();
    let raw = bins.to_array();
    let mut values = [0.0; TOKEN_COUNT];
    for dimension in Dimension::ALL {
        values[dimension.index()] = dimension.kind().from_bin(raw[dimension.index()]);
    }
    DecodedAction {
        action: ContinuousAction::from_array(values),
        bins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fixed_order() {
        let action = ContinuousAction {
            terminate: 1.0,
            x: 0.5,
            y: -0.5,
            z: 0.0,
            rx: 90.0,
            ry: -90.0,
            rz: 0.0,
            gripper: 1.0,
        };
        let encoded = encode(&action).unwrap();
        assert_eq!(
            encoded.tokens.as_slice(),
            &[1, 191, 63, 127, 191, 63, 127, 255]
        );
        assert_eq!(encoded.bins.x(), 191);
        assert_eq!(encoded.bins.ry(), 63);
        assert_eq!(encoded.bins.gripper(), 255);
    }

    #[test]
    fn test_encode_clamps_out_of_range() {
        let action = ContinuousAction::from_array([7.0, 5.0, -5.0, 1.5, 400.0, -400.0, 0.0, 2.0]);
        let encoded = encode(&action).unwrap();
        assert_eq!(encoded.tokens.as_slice(), &[1, 255, 0, 255, 255, 0, 127, 255]);
    }

    #[test]
    fn test_encode_rejects_non_finite() {
        let mut action = ContinuousAction::default();
        action.rz = f64::NAN;
        match encode(&action) {
            Err(CodecError::NonFinite { dimension, .. }) => assert_eq!(dimension, Dimension::Rz),
            other => panic!("expected NonFinite, got {:?}", other),
        }
        action.rz = 0.0;
        action.terminate = f64::INFINITY;
        assert!(encode(&action).is_err());
    }

    #[test]
    fn test_decode_midpoint_scenario() {
        let decoded = decode(&[0, 128, 128, 128, 128, 128, 128, 128]).unwrap();
        let a = decoded.action;
        assert_eq!(a.terminate, 0.0);
        for v in [a.x, a.y, a.z, a.gripper] {
            assert_eq!(v, 0.004);
        }
        for v in [a.rx, a.ry, a.rz] {
            assert_eq!(v, 0.7);
        }
        assert_eq!(decoded.bins.x(), 128);
    }

    #[test]
    fn test_decode_rejects_short_sequence() {
        let err = decode(&[0, 128, 128]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid token sequence: expected exactly 8 tokens, got 3"
        );
        assert!(decode(&[0; 9]).is_err());
    }

    #[test]
    fn test_decode_then_encode_stays_in_bin() {
        let decoded = decode(&[1, 0, 64, 255, 0, 100, 255, 200]).unwrap();
        let reencoded = encode(&decoded.action).unwrap();
        for dimension in Dimension::ALL {
            let original = decoded.bins.get(dimension);
            let again = reencoded.bins.get(dimension);
            assert!(again == original || again + 1 == original);
        }
    }
}
