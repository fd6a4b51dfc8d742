//! # Utility Module
//!
//! Small numeric helpers shared by configuration validation and the layout planner.

use crate::utils::geometry::Rotation;

/// Default tolerance used by [`is_float_round`].
pub const ROUND_EPSILON: f32 = 0.0001;

/// Returns `true` when `value` is within `epsilon` of a whole number.
///
/// # Examples
///
/// ```
/// use rust_maze::utils::util::is_float_round;
///
/// assert!(is_float_round(2.0, 0.0001));
/// assert!(!is_float_round(2.5, 0.0001));
/// ```
pub fn is_float_round(value: f32, epsilon: f32) -> bool {
    (value - value.round()).abs() < epsilon
}

/// Converts a number of quarter turns (0..4) into a yaw rotation.
pub fn yaw_from_quarter_turns(turns: u32) -> Rotation {
    Rotation::from_yaw((turns % 4) as f32 * 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_values() {
        assert!(is_float_round(2.0, ROUND_EPSILON));
        assert!(is_float_round(-3.00001, ROUND_EPSILON));
        assert!(is_float_round(0.0, ROUND_EPSILON));
    }

    #[test]
    fn test_non_round_values() {
        assert!(!is_float_round(2.5, ROUND_EPSILON));
        assert!(!is_float_round(1.001, ROUND_EPSILON));
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(yaw_from_quarter_turns(0).yaw, 0.0);
        assert_eq!(yaw_from_quarter_turns(3).yaw, 270.0);
        assert_eq!(yaw_from_quarter_turns(4).yaw, 0.0);
    }
}
