//! Review session over due notes.
//! Handles multi-round drilling with SM-2 rescheduling after every grade.

use super::{Note, Quality, ReviewOutcome};
use crate::Result;
use crate::database::db;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// One note in the session and whether it passed in the current round.
#[derive(Clone, Debug)]
pub struct SessionItem {
    pub note: Note,
    pub passed: bool,
}

/// Manages a review session with multiple rounds.
/// Notes that aren't recalled (grade < 3) are repeated in subsequent rounds.
///
/// Every grade is persisted immediately, so a repeat within the same session
/// sees the schedule produced by the previous failure.
#[derive(Debug)]
pub struct ReviewSession {
    items: Vec<SessionItem>,
    current_round: Vec<usize>,
    current_index: usize,
    round_number: usize,
}

impl ReviewSession {
    /// Creates a new session from notes that are due for review.
    pub fn new(notes: Vec<Note>) -> Self {
        let items: Vec<_> = notes
            .into_iter()
            .map(|note| SessionItem {
                note,
                passed: false,
            })
            .collect();
        let current_round = (0..items.len()).collect();

        Self {
            items,
            current_round,
            current_index: 0,
            round_number: 1,
        }
    }

    /// Starts a session with everything due at `now`.
    pub fn from_due(now: DateTime<Utc>, conn: &Connection) -> Result<Self> {
        Ok(Self::new(db::due_notes(now, conn)?))
    }

    pub fn current(&self) -> Option<&Note> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.items.get(idx))
            .map(|item| &item.note)
    }

    /// Grades the current note, persists its new schedule and moves on.
    pub fn grade_current(
        &mut self,
        quality: Quality,
        now: DateTime<Utc>,
        conn: &Connection,
    ) -> Result<Option<ReviewOutcome>> {
        let Some(&idx) = self.current_round.get(self.current_index) else {
            return Ok(None);
        };
        let Some(item) = self.items.get_mut(idx) else {
            return Ok(None);
        };

        let outcome = db::rate_note(item.note.id, quality, now, conn)?;
        item.note.schedule = outcome.state.clone();
        item.passed = quality.is_pass();

        self.advance();
        Ok(Some(outcome))
    }

    /// Moves to the next note, or to the next round at the end of this one.
    pub fn advance(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the notes that weren't recalled.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.items.get(idx).is_some_and(|item| !item.passed))
            .collect();

        if failed.is_empty() {
            self.current_index = self.current_round.len();
            return;
        }

        self.current_round = failed;
        self.current_index = 0;
        self.round_number += 1;
        tracing::debug!(
            round = self.round_number,
            notes = self.current_round.len(),
            "starting next round"
        );
    }

    pub fn passed_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.items.get(idx).is_some_and(|item| item.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    /// True once every note in the current round has passed.
    pub fn is_completed(&self) -> bool {
        self.current_round.is_empty() || self.passed_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} notes", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} notes to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewNote;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap()
    }

    fn q(value: u8) -> Quality {
        Quality::new(value).unwrap()
    }

    fn seeded() -> (Connection, Vec<i64>) {
        let conn = db::open_in_memory().unwrap();
        let ids = ["one", "two", "three"]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let created = now() - Duration::hours(3 - i as i64);
                db::add_note(&NewNote::new(*text), created, &conn).unwrap()
            })
            .collect();
        (conn, ids)
    }

    #[test]
    fn test_empty_session_is_complete() {
        let session = ReviewSession::new(Vec::new());
        assert!(session.is_completed());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_all_pass_in_one_round() {
        let (conn, ids) = seeded();
        let mut session = ReviewSession::from_due(now(), &conn).unwrap();
        assert_eq!(session.total_count(), 3);
        assert_eq!(session.phase_message(), "Round 1: 3 notes");

        for id in &ids {
            assert_eq!(session.current().unwrap().id, *id);
            session.grade_current(q(4), now(), &conn).unwrap().unwrap();
        }

        assert!(session.is_completed());
        assert_eq!(session.round_number(), 1);
        assert!(session.current().is_none());
        assert!(db::due_notes(now(), &conn).unwrap().is_empty());
    }

    #[test]
    fn test_failed_notes_repeat() {
        let (conn, ids) = seeded();
        let mut session = ReviewSession::from_due(now(), &conn).unwrap();

        session.grade_current(q(5), now(), &conn).unwrap();
        session.grade_current(q(1), now(), &conn).unwrap();
        session.grade_current(q(5), now(), &conn).unwrap();

        assert_eq!(session.round_number(), 2);
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.remaining_count(), 1);
        assert!(!session.is_completed());
        assert_eq!(session.current().unwrap().id, ids[1]);
        assert_eq!(session.phase_message(), "Round 2 (Retry): 1 notes to retry");

        let outcome = session.grade_current(q(3), now(), &conn).unwrap().unwrap();
        // Failure already reset the interval to 1, so the pass is a first success
        assert_eq!(outcome.previous_interval, 1);
        assert_eq!(outcome.update.new_interval, 6);
        assert!(session.is_completed());

        let note = db::get_note(ids[1], &conn).unwrap();
        assert_eq!(note.schedule.review_count, 2);
        assert_eq!(note.schedule.consecutive_correct, 1);
    }

    #[test]
    fn test_grade_after_completion_is_noop() {
        let (conn, _) = seeded();
        let mut session = ReviewSession::from_due(now(), &conn).unwrap();
        for _ in 0..3 {
            session.grade_current(q(5), now(), &conn).unwrap();
        }
        assert!(session.grade_current(q(5), now(), &conn).unwrap().is_none());
    }
}
