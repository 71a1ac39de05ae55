// src/planner.rs - Scripted 8D pick/place action sequences

use crate::codec::ContinuousAction;

/// Height above a target used for approach and retreat, in meters.
pub const APPROACH_HEIGHT_M: f64 = 0.1;
pub const HOME_POSITION: [f64; 3] = [0.0, 0.0, 0.7];

const GRIPPER_OPEN: f64 = 1.0;
const GRIPPER_CLOSED: f64 = 0.0;

fn step(terminate: bool, pos: [f64; 3], gripper: f64) -> ContinuousAction {
    ContinuousAction {
        terminate: f64::from(u8::from(terminate)),
        x: pos[0],
        y: pos[1],
        z: pos[2],
        rx: 0.0,
        ry: 0.0,
        rz: 0.0,
        gripper,
    }
}

fn above(pos: [f64; 3]) -> [f64; 3] {
    [pos[0], pos[1], pos[2] + APPROACH_HEIGHT_M]
}

/// Approach, descend, close, lift. Only the lift carries the stop flag.
pub fn plan_pick(pos: [f64; 3], is_final: bool) -> Vec<ContinuousAction> {
    vec![
        step(false, above(pos), GRIPPER_OPEN),
        step(false, pos, GRIPPER_OPEN),
        step(false, pos, GRIPPER_CLOSED),
        step(is_final, above(pos), GRIPPER_CLOSED),
    ]
}

/// Approach, descend, open, lift, return home.
pub fn plan_place(pos: [f64; 3], is_final: bool) -> Vec<ContinuousAction> {
    vec![
        step(false, above(pos), GRIPPER_CLOSED),
        step(false, pos, GRIPPER_CLOSED),
        step(false, pos, GRIPPER_OPEN),
        step(false, above(pos), GRIPPER_OPEN),
        step(is_final, HOME_POSITION, GRIPPER_OPEN),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;

    #[test]
    fn test_pick_sequence() {
        let steps = plan_pick([0.55, -0.15, 0.03], true);
        assert_eq!(steps.len(), 4);
        assert!((steps[0].z - 0.13).abs() < 1e-9);
        assert_eq!(steps[1].gripper, 1.0);
        assert_eq!(steps[2].gripper, 0.0);
        assert_eq!(steps[3].terminate, 1.0);
        assert!(steps[..3].iter().all(|s| s.terminate == 0.0));
    }

    #[test]
    fn test_place_ends_home() {
        let steps = plan_place([0.4, 0.0, 0.03], false);
        assert_eq!(steps.len(), 5);
        let last = steps[4];
        assert_eq!([last.x, last.y, last.z], HOME_POSITION);
        assert_eq!(last.terminate, 0.0);
        for s in &steps {
            assert!(encode(s).is_ok());
        }
    }
}
