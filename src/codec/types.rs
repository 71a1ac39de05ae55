// src/codec/types.rs - Value types flowing through the action codec

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::error::CodecError;
use super::scalar;

/// Number of dimensions in an action, and therefore tokens in a sequence.
pub const TOKEN_COUNT: usize = 8;

pub type Token = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Terminate,
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    Gripper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    Terminate,
    Translation,
    Rotation,
    Gripper,
}

impl Dimension {
    /// Token order.
    pub const ALL: [Dimension; TOKEN_COUNT] = [
        Dimension::Terminate,
        Dimension::X,
        Dimension::Y,
        Dimension::Z,
        Dimension::Rx,
        Dimension::Ry,
        Dimension::Rz,
        Dimension::Gripper,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Dimension::Terminate => "terminate",
            Dimension::X => "x",
            Dimension::Y => "y",
            Dimension::Z => "z",
            Dimension::Rx => "rx",
            Dimension::Ry => "ry",
            Dimension::Rz => "rz",
            Dimension::Gripper => "gripper",
        }
    }

    pub fn kind(self) -> DimensionKind {
        match self {
            Dimension::Terminate => DimensionKind::Terminate,
            Dimension::X | Dimension::Y | Dimension::Z => DimensionKind::Translation,
            Dimension::Rx | Dimension::Ry | Dimension::Rz => DimensionKind::Rotation,
            Dimension::Gripper => DimensionKind::Gripper,
        }
    }

    pub fn unit(self) -> &'static str {
        match self.kind() {
            DimensionKind::Terminate => "flag",
            DimensionKind::Translation => "m",
            DimensionKind::Rotation => "deg",
            DimensionKind::Gripper => "cmd",
        }
    }

    /// Largest bin this dimension can produce.
    pub fn max_bin(self) -> u8 {
        match self.kind() {
            DimensionKind::Terminate => 1,
            _ => scalar::MAX_BIN,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DimensionKind {
    pub fn to_bin(self, value: f64) -> u8 {
        match self {
            DimensionKind::Terminate => scalar::terminate_to_bin(value),
            DimensionKind::Translation => scalar::translation_to_bin(value),
            DimensionKind::Rotation => scalar::rotation_to_bin(value),
            DimensionKind::Gripper => scalar::gripper_to_bin(value),
        }
    }

    pub fn from_bin(self, bin: u8) -> f64 {
        match self {
            DimensionKind::Terminate => scalar::bin_to_terminate(bin),
            DimensionKind::Translation => scalar::bin_to_translation(bin),
            DimensionKind::Rotation => scalar::bin_to_rotation(bin),
            DimensionKind::Gripper => scalar::bin_to_gripper(bin),
        }
    }
}

/// A continuous 8D robot action: stop flag, translation (m), rotation (deg), gripper.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContinuousAction {
    #[serde(deserialize_with = "flag_or_number")]
    pub terminate: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub gripper: f64,
}

impl ContinuousAction {
    pub fn from_array(values: [f64; TOKEN_COUNT]) -> Self {
        let [terminate, x, y, z, rx, ry, rz, gripper] = values;
        Self {
            terminate,
            x,
            y,
            z,
            rx,
            ry,
            rz,
            gripper,
        }
    }

    pub fn to_array(&self) -> [f64; TOKEN_COUNT] {
        [
            self.terminate,
            self.x,
            self.y,
            self.z,
            self.rx,
            self.ry,
            self.rz,
            self.gripper,
        ]
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.to_array()[dimension.index()]
    }
}

impl fmt::Display for ContinuousAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {:.2}, {:.2}, {:.2}, {:.2}, {:.2}, {:.2}, {})",
            self.terminate, self.x, self.y, self.z, self.rx, self.ry, self.rz, self.gripper
        )
    }
}

fn flag_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(f64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => f64::from(u8::from(b)),
        Flag::Number(n) => n,
    })
}

/// Per-dimension bin indices. Only the codec builds these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBins")]
pub struct DiscreteBins {
    terminate: u8,
    x: u8,
    y: u8,
    z: u8,
    rx: u8,
    ry: u8,
    rz: u8,
    gripper: u8,
}

#[derive(Deserialize)]
struct RawBins {
    terminate: u8,
    x: u8,
    y: u8,
    z: u8,
    rx: u8,
    ry: u8,
    rz: u8,
    gripper: u8,
}

impl TryFrom<RawBins> for DiscreteBins {
    type Error = CodecError;

    fn try_from(raw: RawBins) -> Result<Self, Self::Error> {
        DiscreteBins::from_array([
            raw.terminate,
            raw.x,
            raw.y,
            raw.z,
            raw.rx,
            raw.ry,
            raw.rz,
            raw.gripper,
        ])
    }
}

impl DiscreteBins {
    pub(crate) fn from_array(bins: [u8; TOKEN_COUNT]) -> Result<Self, CodecError> {
        for dimension in Dimension::ALL {
            let value = bins[dimension.index()];
            if value > dimension.max_bin() {
                return Err(CodecError::InvalidBin { dimension, value });
            }
        }
        let [terminate, x, y, z, rx, ry, rz, gripper] = bins;
        Ok(Self {
            terminate,
            x,
            y,
            z,
            rx,
            ry,
            rz,
            gripper,
        })
    }

    pub fn to_array(&self) -> [u8; TOKEN_COUNT] {
        [
            self.terminate,
            self.x,
            self.y,
            self.z,
            self.rx,
            self.ry,
            self.rz,
            self.gripper,
        ]
    }

    pub fn get(&self, dimension: Dimension) -> u8 {
        self.to_array()[dimension.index()]
    }

    pub fn terminate(&self) -> u8 {
        self.terminate
    }
    pub fn x(&self) -> u8 {
        self.x
    }
    pub fn y(&self) -> u8 {
        self.y
    }
    pub fn z(&self) -> u8 {
        self.z
    }
    pub fn rx(&self) -> u8 {
        self.rx
    }
    pub fn ry(&self) -> u8 {
        self.ry
    }
    pub fn rz(&self) -> u8 {
        self.rz
    }
    pub fn gripper(&self) -> u8 {
        self.gripper
    }

    /// Tokens are the bins themselves; there is no vocabulary offset.
    pub fn to_tokens(&self) -> TokenSequence {
        TokenSequence(self.to_array().map(Token::from))
    }
}

/// Eight tokens in `Dimension::ALL` order. Serializes as a plain integer array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>")]
pub struct TokenSequence([Token; TOKEN_COUNT]);

impl TokenSequence {
    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    pub fn get(&self, dimension: Dimension) -> Token {
        self.0[dimension.index()]
    }

    pub fn to_bins(&self) -> DiscreteBins {
        // Range was checked on construction.
        let bins = self.0.map(|t| t as u8);
        let [terminate, x, y, z, rx, ry, rz, gripper] = bins;
        DiscreteBins {
            terminate,
            x,
            y,
            z,
            rx,
            ry,
            rz,
            gripper,
        }
    }
}

impl TryFrom<&[i64]> for TokenSequence {
    type Error = CodecError;

    fn try_from(tokens: &[i64]) -> Result<Self, Self::Error> {
        if tokens.len() != TOKEN_COUNT {
            return Err(CodecError::InvalidTokenCount {
                expected: TOKEN_COUNT,
                got: tokens.len(),
            });
        }
        let mut out = [0 as Token; TOKEN_COUNT];
        for dimension in Dimension::ALL {
            let value = tokens[dimension.index()];
            let max = dimension.max_bin();
            if !(0..=i64::from(max)).contains(&value) {
                return Err(CodecError::TokenOutOfRange {
                    dimension,
                    value,
                    max,
                });
            }
            out[dimension.index()] = value as Token;
        }
        Ok(Self(out))
    }
}

impl TryFrom<Vec<i64>> for TokenSequence {
    type Error = CodecError;

    fn try_from(tokens: Vec<i64>) -> Result<Self, Self::Error> {
        TokenSequence::try_from(tokens.as_slice())
    }
}

impl fmt::Display for TokenSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodedAction {
    pub bins: DiscreteBins,
    pub tokens: TokenSequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedAction {
    pub action: ContinuousAction,
    pub bins: DiscreteBins,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_order() {
        let names: Vec<&str> = Dimension::ALL.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec!["terminate", "x", "y", "z", "rx", "ry", "rz", "gripper"]
        );
        for (i, d) in Dimension::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn test_terminate_accepts_bool() {
        let json = r#"{"terminate": true, "x": 0.1, "y": 0, "z": 0, "rx": 0, "ry": 0, "rz": 0, "gripper": -1}"#;
        let action: ContinuousAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.terminate, 1.0);
        assert_eq!(action.gripper, -1.0);
    }

    #[test]
    fn test_action_missing_field_rejected() {
        let json = r#"{"terminate": 0, "x": 0.1}"#;
        assert!(serde_json::from_str::<ContinuousAction>(json).is_err());
    }

    #[test]
    fn test_token_sequence_length_checked() {
        let err = TokenSequence::try_from(&[0i64, 1, 2][..]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidTokenCount {
                expected: 8,
                got: 3
            }
        );
        assert!(serde_json::from_str::<TokenSequence>("[1,2,3,4,5,6,7,8,9]").is_err());
    }

    #[test]
    fn test_token_sequence_range_checked() {
        let err = TokenSequence::try_from(vec![2, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::TokenOutOfRange {
                dimension: Dimension::Terminate,
                value: 2,
                ..
            }
        ));
        let err = TokenSequence::try_from(vec![0, 0, 0, 256, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::TokenOutOfRange {
                dimension: Dimension::Z,
                ..
            }
        ));
        assert!(TokenSequence::try_from(vec![0, -1, 0, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_token_sequence_serializes_as_array() {
        let seq = TokenSequence::try_from(vec![1, 191, 63, 127, 191, 63, 127, 255]).unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, "[1,191,63,127,191,63,127,255]");
        let back: TokenSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }

    #[test]
    fn test_bins_reject_bad_terminate() {
        let json = r#"{"terminate": 3, "x": 0, "y": 0, "z": 0, "rx": 0, "ry": 0, "rz": 0, "gripper": 0}"#;
        assert!(serde_json::from_str::<DiscreteBins>(json).is_err());
    }

    #[test]
    fn test_display_compact_tuple() {
        let action = ContinuousAction::from_array([1.0, 0.5, -0.25, 0.0, 0.0, 90.0, 0.0, 0.0]);
        assert_eq!(
            action.to_string(),
            "(1, 0.50, -0.25, 0.00, 0.00, 90.00, 0.00, 0)"
        );
    }
}
