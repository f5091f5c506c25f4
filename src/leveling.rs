//! XP and level math
//!
//! Levels follow a square-root curve: `level = floor(0.1 * sqrt(xp))`, so
//! reaching level `L` takes `L² * 100` XP. Both directions are computed in
//! integers so they stay exact inverses at every level boundary.

use serde::{Deserialize, Serialize};

use crate::error::XpError;

/// XP per squared level
pub const XP_PER_LEVEL_SQUARED: i64 = 100;

/// Minimum XP needed to reach `level`.
pub fn xp_for(level: i64) -> Result<i64, XpError> {
    if level < 0 {
        return Err(XpError::out_of_range(format!(
            "target level should be a positive number, got {}",
            level
        )));
    }
    level
        .checked_mul(level)
        .and_then(|sq| sq.checked_mul(XP_PER_LEVEL_SQUARED))
        .ok_or_else(|| XpError::out_of_range(format!("target level {} is too large", level)))
}

/// Same as [`xp_for`] but for user-entered text.
pub fn xp_for_str(level: &str) -> Result<i64, XpError> {
    let level = level
        .trim()
        .parse::<i64>()
        .map_err(|_| XpError::invalid(format!("target level should be a valid number, got '{}'", level)))?;
    xp_for(level)
}

/// Level reached with `xp` points. Negative totals count as zero.
pub fn level_for(xp: i64) -> i64 {
    // floor(sqrt(xp) / 10) == isqrt(floor(xp / 100)) for non-negative integers
    (xp.max(0) / XP_PER_LEVEL_SQUARED).isqrt()
}

/// XP requirement for a level the store already knows is valid.
///
/// Saturates instead of failing; only reachable with levels derived from
/// stored (and therefore bounded) XP totals.
pub(crate) fn xp_for_saturating(level: i64) -> i64 {
    let level = level.max(0);
    level
        .saturating_mul(level)
        .saturating_mul(XP_PER_LEVEL_SQUARED)
}

/// Progress of an XP total within its current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: i64,
    /// XP earned since reaching `level`
    pub clean_xp: i64,
    /// XP between `level` and `level + 1`
    pub clean_next_level_xp: i64,
}

impl LevelProgress {
    pub fn for_xp(xp: i64) -> Self {
        let xp = xp.max(0);
        let level = level_for(xp);
        let floor = xp_for_saturating(level);
        let next = xp_for_saturating(level + 1);
        Self {
            level,
            clean_xp: xp - floor,
            clean_next_level_xp: next - floor,
        }
    }

    /// Fraction of the way to the next level (0.0 - 1.0)
    pub fn fraction(&self) -> f64 {
        if self.clean_next_level_xp <= 0 {
            1.0
        } else {
            (self.clean_xp as f64 / self.clean_next_level_xp as f64).clamp(0.0, 1.0)
        }
    }

    /// XP still missing for the next level
    pub fn remaining(&self) -> i64 {
        (self.clean_next_level_xp - self.clean_xp).max(0)
    }
}
