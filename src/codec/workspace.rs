//! Symbolic pick/place tokens.
//!
//! A coarse sibling of the 256-bin codec: each axis of the workspace gets 11
//! evenly spaced bin centers and a position snaps to the nearest one. Tokens
//! are rendered as text centred on zero, e.g. `POS_X_+2` or `ROT_YAW_-5`.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use super::error::CodecError;
use super::types::Dimension;

pub const WORKSPACE_BINS: usize = 11;
const CENTER_INDEX: i32 = (WORKSPACE_BINS / 2) as i32;

pub const DEFAULT_ENV_SIZE_M: f64 = 3.0;
pub const DEFAULT_ENV_HEIGHT_M: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionKind {
    Pick,
    Place,
}

impl MotionKind {
    pub fn label(self) -> &'static str {
        match self {
            MotionKind::Pick => "PICK",
            MotionKind::Place => "PLACE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceTokenizer {
    x_bins: [f64; WORKSPACE_BINS],
    y_bins: [f64; WORKSPACE_BINS],
    z_bins: [f64; WORKSPACE_BINS],
    yaw_bins: [f64; WORKSPACE_BINS],
}

impl Default for WorkspaceTokenizer {
    fn default() -> Self {
        Self::from_extent(DEFAULT_ENV_SIZE_M, DEFAULT_ENV_HEIGHT_M)
    }
}

fn linspace(start: f64, end: f64) -> [f64; WORKSPACE_BINS] {
    let step = (end - start) / (WORKSPACE_BINS - 1) as f64;
    std::array::from_fn(|i| start + step * i as f64)
}

impl WorkspaceTokenizer {
    /// `env_size_m` is the side of the square floor, centred on the origin.
    /// Both extents must be finite and positive.
    pub fn new(env_size_m: f64, env_height_m: f64) -> Result<Self, CodecError> {
        for (name, value) in [("size", env_size_m), ("height", env_height_m)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CodecError::InvalidWorkspace { name, value });
            }
        }
        Ok(Self::from_extent(env_size_m, env_height_m))
    }

    fn from_extent(env_size_m: f64, env_height_m: f64) -> Self {
        let half = env_size_m / 2.0;
        Self {
            x_bins: linspace(-half, half),
            y_bins: linspace(-half, half),
            z_bins: linspace(0.0, env_height_m),
            yaw_bins: linspace(-FRAC_PI_2, FRAC_PI_2),
        }
    }

    /// Offset of the nearest bin from the middle one, in -5..=5. Ties go to
    /// the lower bin.
    pub fn discretize(value: f64, bins: &[f64; WORKSPACE_BINS]) -> i32 {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, center) in bins.iter().enumerate() {
            let dist = (center - value).abs();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        best as i32 - CENTER_INDEX
    }

    /// Tokens for a position (m) and yaw (rad): `[POS_X, POS_Y, POS_Z, ROT_YAW]`.
    pub fn position_to_tokens(&self, pos: [f64; 3], yaw: f64) -> Result<Vec<String>, CodecError> {
        let axes = [
            ("POS_X", Dimension::X, pos[0], &self.x_bins),
            ("POS_Y", Dimension::Y, pos[1], &self.y_bins),
            ("POS_Z", Dimension::Z, pos[2], &self.z_bins),
            ("ROT_YAW", Dimension::Rz, yaw, &self.yaw_bins),
        ];
        axes.into_iter()
            .map(|(prefix, dimension, value, bins)| {
                if !value.is_finite() {
                    return Err(CodecError::NonFinite { dimension, value });
                }
                Ok(format!("{}_{:+}", prefix, Self::discretize(value, bins)))
            })
            .collect()
    }

    pub fn action_to_tokens(
        &self,
        kind: MotionKind,
        pos: [f64; 3],
        yaw: f64,
    ) -> Result<Vec<String>, CodecError> {
        let mut tokens = vec![format!("ACTION_{}", kind.label())];
        tokens.extend(self.position_to_tokens(pos, yaw)?);
        Ok(tokens)
    }
}
