// tests/codec_properties.rs
//
// Numeric contract of the action codec: bin ranges, monotonicity, clamping,
// bin-center round trips and reconstruction error bounds.

use proptest::prelude::*;
use rt2_tokenizer::codec::scalar::{
    bin_to_gripper, bin_to_rotation, bin_to_translation, gripper_to_bin, rotation_bin_center,
    rotation_to_bin, terminate_to_bin, translation_bin_center, translation_to_bin,
};
use rt2_tokenizer::codec::{decode, encode, ContinuousAction, Dimension};

const TRANSLATION_ERR: f64 = 2.0 / 255.0 + 0.0005;
const ROTATION_ERR: f64 = 360.0 / 255.0 + 0.05;

#[test]
fn bin_centers_reencode_to_same_bin() {
    for b in 0..=255u8 {
        assert_eq!(translation_to_bin(translation_bin_center(b)), b);
        assert_eq!(gripper_to_bin(translation_bin_center(b)), b);
        assert_eq!(rotation_to_bin(rotation_bin_center(b)), b);
    }
}

#[test]
fn decoded_values_reencode_within_one_bin() {
    for b in 0..=255u8 {
        for again in [
            translation_to_bin(bin_to_translation(b)),
            gripper_to_bin(bin_to_gripper(b)),
            rotation_to_bin(bin_to_rotation(b)),
        ] {
            assert!(again == b || again + 1 == b, "bin {} came back as {}", b, again);
        }
    }
}

#[test]
fn boundary_cases() {
    assert_eq!(translation_to_bin(-1.0), 0);
    assert_eq!(translation_to_bin(1.0), 255);
    assert_eq!(translation_to_bin(0.0), 127);
    assert_eq!(rotation_to_bin(-180.0), 0);
    assert_eq!(rotation_to_bin(180.0), 255);
    assert_eq!(gripper_to_bin(0.0), 127);
    assert_eq!(translation_to_bin(5.0), translation_to_bin(1.0));
    assert_eq!(translation_to_bin(-5.0), 0);
}

#[test]
fn full_decode_scenario() {
    let decoded = decode(&[0, 128, 128, 128, 128, 128, 128, 128]).unwrap();
    let expected = ContinuousAction::from_array([0.0, 0.004, 0.004, 0.004, 0.7, 0.7, 0.7, 0.004]);
    assert_eq!(decoded.action, expected);
}

proptest! {
    #[test]
    fn encoded_bins_stay_in_range(
        t in -10.0f64..10.0,
        xyz in proptest::array::uniform3(-1e6f64..1e6),
        rot in proptest::array::uniform3(-1e6f64..1e6),
        g in -1e6f64..1e6,
    ) {
        let action = ContinuousAction {
            terminate: t,
            x: xyz[0], y: xyz[1], z: xyz[2],
            rx: rot[0], ry: rot[1], rz: rot[2],
            gripper: g,
        };
        let encoded = encode(&action).unwrap();
        prop_assert!(encoded.bins.terminate() <= 1);
        for d in Dimension::ALL {
            prop_assert_eq!(u32::from(encoded.bins.get(d)), encoded.tokens.get(d));
        }
    }

    #[test]
    fn translation_is_monotonic(a in -1.5f64..1.5, b in -1.5f64..1.5) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(translation_to_bin(lo) <= translation_to_bin(hi));
    }

    #[test]
    fn rotation_is_monotonic(a in -200.0f64..200.0, b in -200.0f64..200.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rotation_to_bin(lo) <= rotation_to_bin(hi));
    }

    #[test]
    fn terminate_is_binary(v in any::<f64>()) {
        let bin = terminate_to_bin(v);
        prop_assert_eq!(bin, u8::from(v != 0.0));
    }

    #[test]
    fn reconstruction_error_is_bounded(v in -1.0f64..=1.0, deg in -180.0f64..=180.0) {
        prop_assert!((bin_to_translation(translation_to_bin(v)) - v).abs() <= TRANSLATION_ERR);
        prop_assert!((bin_to_gripper(gripper_to_bin(v)) - v).abs() <= TRANSLATION_ERR);
        prop_assert!((bin_to_rotation(rotation_to_bin(deg)) - deg).abs() <= ROTATION_ERR);
    }

    #[test]
    fn decode_rejects_wrong_lengths(len in 0usize..16) {
        prop_assume!(len != 8);
        prop_assert!(decode(&vec![0i64; len]).is_err());
    }
}
