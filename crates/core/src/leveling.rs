//! XP → level conversion along a triangular-number curve.
//!
//! The cumulative XP required to reach level `L` is `L * (L + 1) * 3 / 2`:
//! each level costs 3 more XP than the one before it (level 1 at 3 XP,
//! level 2 at 9, level 3 at 18, ...). Levels are capped at [`MAX_LEVEL`].

use serde::Serialize;

/// Terminal level; levels never exceed this.
pub const MAX_LEVEL: i32 = 100;

/// Per-level XP increment of the triangular curve.
pub const LEVEL_XP_STEP: i64 = 3;

/// Level progress derived from a cumulative XP total. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    /// Current level in `[0, 100]`.
    pub level: i32,
    /// XP accumulated within the current level.
    pub xp: i64,
    /// XP still needed to reach the next level; 0 at [`MAX_LEVEL`].
    pub remaining: i64,
}

/// Cumulative XP required to reach `level`.
pub fn xp_for_level(level: i32) -> i64 {
    let l = i64::from(level);
    l * (l + 1) * LEVEL_XP_STEP / 2
}

/// Derive level progress from a cumulative XP total.
///
/// Total over all inputs: negative totals (out of contract -- callers
/// branch on the undeclared sentinel before calling) saturate to 0.
/// Monotonically non-decreasing in `total_xp`.
pub fn level_info(total_xp: i64) -> LevelInfo {
    let total = total_xp.max(0);

    // Inverse of the triangular formula via the quadratic formula.
    let discriminant = 1.0 + 8.0 * total as f64 / LEVEL_XP_STEP as f64;
    let raw = ((1.0 + discriminant.sqrt()) / 2.0).floor() as i32 - 1;
    let mut level = raw.clamp(0, MAX_LEVEL);

    // Correct float drift at exact thresholds.
    while level < MAX_LEVEL && xp_for_level(level + 1) <= total {
        level += 1;
    }
    while level > 0 && xp_for_level(level) > total {
        level -= 1;
    }

    let xp = total - xp_for_level(level);
    let remaining = if level == MAX_LEVEL {
        0
    } else {
        i64::from(level + 1) * LEVEL_XP_STEP - xp
    };

    LevelInfo {
        level,
        xp,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_at_zero_xp() {
        assert_eq!(
            level_info(0),
            LevelInfo {
                level: 0,
                xp: 0,
                remaining: 3
            }
        );
    }

    #[test]
    fn exact_thresholds() {
        assert_eq!(
            level_info(3),
            LevelInfo {
                level: 1,
                xp: 0,
                remaining: 6
            }
        );
        assert_eq!(
            level_info(9),
            LevelInfo {
                level: 2,
                xp: 0,
                remaining: 9
            }
        );
        assert_eq!(
            level_info(18),
            LevelInfo {
                level: 3,
                xp: 0,
                remaining: 12
            }
        );
    }

    #[test]
    fn mid_level_progress() {
        assert_eq!(
            level_info(5),
            LevelInfo {
                level: 1,
                xp: 2,
                remaining: 4
            }
        );
        assert_eq!(
            level_info(10),
            LevelInfo {
                level: 2,
                xp: 1,
                remaining: 8
            }
        );
    }

    #[test]
    fn max_level_is_terminal() {
        let cap = xp_for_level(MAX_LEVEL);
        assert_eq!(cap, 14850);

        for total in [cap, cap + 1, cap + 10_000, i64::from(i32::MAX)] {
            let info = level_info(total);
            assert_eq!(info.level, MAX_LEVEL, "total {total} must cap at 100");
            assert_eq!(info.remaining, 0, "no next level beyond the cap");
        }
    }

    #[test]
    fn negative_input_saturates_to_zero() {
        assert_eq!(level_info(-7), level_info(0));
    }

    #[test]
    fn level_is_monotonic() {
        let mut prev = 0;
        for total in 0..=20_000 {
            let level = level_info(total).level;
            assert!(
                level >= prev,
                "level dropped from {prev} to {level} at total {total}"
            );
            prev = level;
        }
    }

    #[test]
    fn total_xp_round_trips_through_level_and_progress() {
        for total in (0..=20_000).step_by(7) {
            let info = level_info(total);
            assert_eq!(
                info.xp + xp_for_level(info.level),
                total,
                "level {} + progress {} must reconstruct total {total}",
                info.level,
                info.xp
            );
            assert!(info.xp >= 0);
            assert!(info.remaining >= 0);
        }
    }
}
