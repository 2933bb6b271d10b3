//! Scheduling state persisted with every reviewable note.
use super::sm2::{self, INITIAL_EASINESS_FACTOR, INITIAL_INTERVAL, ScheduleUpdate};
use super::Quality;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub current_interval: u32,
    pub easiness_factor: f64,
    pub next_review_at: DateTime<Utc>,
    pub review_count: u32,
    pub consecutive_correct: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

/// Before/after view of one completed review cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub previous_interval: u32,
    pub previous_easiness_factor: f64,
    pub quality: Quality,
    pub update: ScheduleUpdate,
    pub state: ReviewState,
}

impl ReviewState {
    /// State of a brand-new item: 1 day, EF 2.50, due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_interval: INITIAL_INTERVAL,
            easiness_factor: INITIAL_EASINESS_FACTOR,
            next_review_at: now,
            review_count: 0,
            consecutive_correct: 0,
            last_reviewed_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }

    /// Runs the scheduler and the review bookkeeping for one graded answer.
    ///
    /// Returns the new state without touching `self`; persisting it is up to
    /// the caller.
    pub fn apply(&self, quality: Quality, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        let update =
            sm2::compute_next_review(self.current_interval, self.easiness_factor, quality)?;

        tracing::debug!(
            quality = quality.value(),
            previous_interval = self.current_interval,
            new_interval = update.new_interval,
            previous_ef = self.easiness_factor,
            new_ef = update.new_easiness_factor,
            "computed next review"
        );

        let state = ReviewState {
            current_interval: update.new_interval,
            easiness_factor: update.new_easiness_factor,
            next_review_at: sm2::next_review_at(now, update.new_interval),
            review_count: self.review_count.saturating_add(1),
            consecutive_correct: if quality.is_pass() {
                self.consecutive_correct.saturating_add(1)
            } else {
                0
            },
            last_reviewed_at: Some(now),
        };

        Ok(ReviewOutcome {
            previous_interval: self.current_interval,
            previous_easiness_factor: self.easiness_factor,
            quality,
            update,
            state,
        })
    }
}
