// src/codec/scalar.rs - Per-dimension quantization for the 8D action codec

/// Number of bins per continuous dimension.
pub const BIN_COUNT: u16 = 256;
/// Highest bin index.
pub const MAX_BIN: u8 = 255;

/// Translation range in meters. Gripper commands share the same range.
pub const TRANSLATION_MIN: f64 = -1.0;
pub const TRANSLATION_MAX: f64 = 1.0;
/// Bins per unit of translation: 255 / 2.
pub const TRANSLATION_SCALE: f64 = 127.5;
/// Decimals kept when reconstructing translation and gripper values.
pub const TRANSLATION_DECIMALS: u32 = 3;

/// Rotation range in degrees.
pub const ROTATION_MIN_DEG: f64 = -180.0;
pub const ROTATION_MAX_DEG: f64 = 180.0;
pub const ROTATION_RANGE_DEG: f64 = ROTATION_MAX_DEG - ROTATION_MIN_DEG;
/// Bins per degree: 255 / 360.
pub const ROTATION_SCALE: f64 = MAX_BIN as f64 / ROTATION_RANGE_DEG;
/// Degrees per bin: 360 / 255.
pub const ROTATION_STEP_DEG: f64 = ROTATION_RANGE_DEG / MAX_BIN as f64;
/// Decimals kept when reconstructing rotation values.
pub const ROTATION_DECIMALS: u32 = 1;

fn clamp_bin(raw: f64) -> u8 {
    // `as` saturates and maps NaN to 0, so this is total.
    raw.floor().clamp(0.0, f64::from(MAX_BIN)) as u8
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Any non-zero input raises the flag. NaN is non-zero.
pub fn terminate_to_bin(value: f64) -> u8 {
    u8::from(value != 0.0)
}

pub fn bin_to_terminate(bin: u8) -> f64 {
    f64::from(bin)
}

/// Clamps to [-1, 1] and floors into one of 256 bins.
pub fn translation_to_bin(value: f64) -> u8 {
    let clamped = value.clamp(TRANSLATION_MIN, TRANSLATION_MAX);
    clamp_bin((clamped - TRANSLATION_MIN) * TRANSLATION_SCALE)
}

/// Lower edge of the bin, rounded to millimetres.
pub fn bin_to_translation(bin: u8) -> f64 {
    round_to(
        f64::from(bin) / TRANSLATION_SCALE + TRANSLATION_MIN,
        TRANSLATION_DECIMALS,
    )
}

/// Midpoint of the bin's interval, unrounded. Re-encodes to `bin`.
pub fn translation_bin_center(bin: u8) -> f64 {
    ((f64::from(bin) + 0.5) / TRANSLATION_SCALE + TRANSLATION_MIN).min(TRANSLATION_MAX)
}

/// Clamps to [-180, 180] degrees and floors into one of 256 bins.
pub fn rotation_to_bin(degrees: f64) -> u8 {
    let clamped = degrees.clamp(ROTATION_MIN_DEG, ROTATION_MAX_DEG);
    clamp_bin((clamped - ROTATION_MIN_DEG) * ROTATION_SCALE)
}

pub fn bin_to_rotation(bin: u8) -> f64 {
    round_to(
        f64::from(bin) * ROTATION_STEP_DEG + ROTATION_MIN_DEG,
        ROTATION_DECIMALS,
    )
}

pub fn rotation_bin_center(bin: u8) -> f64 {
    ((f64::from(bin) + 0.5) * ROTATION_STEP_DEG + ROTATION_MIN_DEG).min(ROTATION_MAX_DEG)
}

pub fn gripper_to_bin(value: f64) -> u8 {
    translation_to_bin(value)
}

pub fn bin_to_gripper(bin: u8) -> f64 {
    bin_to_translation(bin)
}
