//! A note is a short piece of text the user wants to remember, plus its schedule.
use super::ReviewState;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Only active notes come up for review.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Active,
    Suspended,
    Archived,
}

impl NoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteStatus::Active => "active",
            NoteStatus::Suspended => "suspended",
            NoteStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(NoteStatus::Active),
            "suspended" => Ok(NoteStatus::Suspended),
            "archived" => Ok(NoteStatus::Archived),
            other => Err(Error::InvalidInput(format!("unknown note status '{other}'"))),
        }
    }
}

/// Fields supplied when creating a note.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewNote {
    pub content: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty_estimate: Option<u8>,
}

impl NewNote {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput("note content is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub explanation: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub status: NoteStatus,
    pub difficulty_estimate: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub schedule: ReviewState,
}

impl Note {
    /// Content with the explanation appended, as shown to a grader.
    pub fn full_text(&self) -> String {
        match &self.explanation {
            Some(explanation) => format!("{}\n\nAdditional context: {}", self.content, explanation),
            None => self.content.clone(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == NoteStatus::Active && self.schedule.is_due(now)
    }
}

impl From<Note> for NewNote {
    fn from(note: Note) -> Self {
        Self {
            content: note.content,
            explanation: note.explanation,
            tags: note.tags,
            category: note.category,
            difficulty_estimate: note.difficulty_estimate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        let now = Utc::now();
        Note {
            id: 1,
            content: "Rust moves are memcpy".to_string(),
            explanation: Some("ownership transfers, bits are copied".to_string()),
            tags: vec!["rust".to_string()],
            category: Some("Software engineering".to_string()),
            status: NoteStatus::Active,
            difficulty_estimate: None,
            created_at: now,
            schedule: ReviewState::new(now),
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Suspended".parse::<NoteStatus>().unwrap(), NoteStatus::Suspended);
        assert_eq!(" archived ".parse::<NoteStatus>().unwrap(), NoteStatus::Archived);
        assert!("deleted".parse::<NoteStatus>().is_err());
    }

    #[test]
    fn test_blank_content_rejected() {
        assert!(NewNote::new("   ").validate().is_err());
        assert!(NewNote::new("hello").validate().is_ok());
    }

    #[test]
    fn test_full_text_includes_explanation() {
        let note = sample_note();
        assert_eq!(
            note.full_text(),
            "Rust moves are memcpy\n\nAdditional context: ownership transfers, bits are copied"
        );
    }

    #[test]
    fn test_suspended_note_never_due() {
        let mut note = sample_note();
        let later = note.schedule.next_review_at + chrono::Duration::days(1);
        assert!(note.is_due(later));
        note.status = NoteStatus::Suspended;
        assert!(!note.is_due(later));
    }
}
