//! A review is one question asked about a note, and its grading once answered.
use super::Quality;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub note_id: i64,
    pub question_text: String,
    pub expected_answer: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub answer: Option<AnswerRecord>,
}

/// What was answered and how it moved the note's schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub user_answer: String,
    pub answered_at: DateTime<Utc>,
    pub feedback: Option<String>,
    pub quality: Quality,
    pub correct: bool,
    pub previous_interval: u32,
    pub new_interval: u32,
    pub previous_easiness_factor: f64,
    pub new_easiness_factor: f64,
}

impl Review {
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}
