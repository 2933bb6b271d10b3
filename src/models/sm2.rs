//! SM-2 (SuperMemo 2) spaced repetition scheduling.
//!
//! Simplified variant used for notes:
//! - The easiness factor (EF) moves by `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)`,
//!   is clamped to a minimum of 1.3 and rounded to 2 decimals
//! - Quality grades 0-2: interval resets to 1 day
//! - Quality grades 3-5: first success jumps to a fixed 6 days, later ones
//!   multiply the interval by the rounded EF
//!
//! Pure: no clock, no storage. Callers own the before/after state.

use super::Quality;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lower bound of the easiness factor
pub const MIN_EASINESS_FACTOR: f64 = 1.3;

/// Easiness factor of a freshly created item
pub const INITIAL_EASINESS_FACTOR: f64 = 2.5;

/// Interval of a freshly created item, in days
pub const INITIAL_INTERVAL: u32 = 1;

/// Interval after the first successful review
pub const FIRST_SUCCESS_INTERVAL: u32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub new_interval: u32,
    pub new_easiness_factor: f64,
}

/// Computes the next interval and easiness factor for a graded review.
///
/// Fails with [`Error::InvalidInput`] when `current_interval` is 0 or
/// `easiness_factor` is below 1.3 (or not a finite number).
pub fn compute_next_review(
    current_interval: u32,
    easiness_factor: f64,
    quality: Quality,
) -> Result<ScheduleUpdate> {
    if current_interval < 1 {
        return Err(Error::InvalidInput(
            "current interval must be at least 1 day".to_string(),
        ));
    }
    if !easiness_factor.is_finite() || easiness_factor < MIN_EASINESS_FACTOR {
        return Err(Error::InvalidInput(format!(
            "easiness factor must be at least {MIN_EASINESS_FACTOR}, got {easiness_factor}"
        )));
    }

    let missed = 5.0 - f64::from(quality.value());
    let delta = 0.1 - missed * (0.08 + missed * 0.02);
    let new_easiness_factor =
        round_to_hundredths((easiness_factor + delta).max(MIN_EASINESS_FACTOR));

    let new_interval = if !quality.is_pass() {
        1
    } else if current_interval == 1 {
        FIRST_SUCCESS_INTERVAL
    } else {
        // `as` saturates, so runaway growth pins at u32::MAX
        (f64::from(current_interval) * new_easiness_factor).round() as u32
    };

    Ok(ScheduleUpdate {
        new_interval,
        new_easiness_factor,
    })
}

/// Moment the item becomes due again: `now + new_interval` days.
pub fn next_review_at(now: DateTime<Utc>, new_interval: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(new_interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Half-up rounding to 2 decimals (values here are always positive).
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
