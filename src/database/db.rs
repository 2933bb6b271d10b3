//! Database operations for notes and reviews
//!
//! Handles SQLite database initialization, CRUD operations for notes and
//! their review questions, and persistence of SM-2 scheduling state.
//! Timestamps are stored as unix seconds.

use crate::models::{
    AnswerRecord, NewNote, Note, NoteStatus, Quality, Review, ReviewOutcome, ReviewState,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        explanation TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        category TEXT,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'suspended', 'archived')),
        difficulty_estimate INTEGER,
        created_at INTEGER NOT NULL,
        next_review_at INTEGER NOT NULL,
        current_interval INTEGER NOT NULL DEFAULT 1,
        easiness_factor REAL NOT NULL DEFAULT 2.5,
        review_count INTEGER NOT NULL DEFAULT 0,
        consecutive_correct INTEGER NOT NULL DEFAULT 0,
        last_reviewed_at INTEGER
    );

    CREATE INDEX IF NOT EXISTS notes_due ON notes (status, next_review_at);

    CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        note_id INTEGER NOT NULL,
        question_text TEXT NOT NULL,
        expected_answer TEXT,
        generated_at INTEGER NOT NULL,
        user_answer TEXT,
        answered_at INTEGER,
        feedback TEXT,
        quality INTEGER,
        correct INTEGER,
        previous_interval INTEGER,
        new_interval INTEGER,
        previous_easiness_factor REAL,
        new_easiness_factor REAL,
        FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE
    );
";

const NOTE_COLUMNS: &str = "id, content, explanation, tags, category, status, difficulty_estimate,
     created_at, next_review_at, current_interval, easiness_factor, review_count,
     consecutive_correct, last_reviewed_at";

const REVIEW_COLUMNS: &str = "id, note_id, question_text, expected_answer, generated_at,
     user_answer, answered_at, feedback, quality, correct, previous_interval, new_interval,
     previous_easiness_factor, new_easiness_factor";

/// Opens (or creates) the database file and makes sure all tables exist
pub fn init_database(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path.as_ref())?;
    prepare_schema(&conn)?;
    tracing::debug!(path = %path.as_ref().display(), "database ready");
    Ok(conn)
}

/// In-memory database, used by tests and dry runs
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    prepare_schema(&conn)?;
    Ok(conn)
}

fn prepare_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Inserts a note with a fresh schedule (interval 1, EF 2.50, due now)
///
/// Returns the note ID.
pub fn add_note(note: &NewNote, now: DateTime<Utc>, conn: &Connection) -> Result<i64> {
    note.validate()?;
    let schedule = ReviewState::new(now);
    let tags = serde_json::to_string(&note.tags)?;

    conn.execute(
        "INSERT INTO notes (content, explanation, tags, category, status, difficulty_estimate,
                            created_at, next_review_at, current_interval, easiness_factor)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            note.content.trim(),
            note.explanation,
            tags,
            note.category,
            NoteStatus::Active.as_str(),
            note.difficulty_estimate,
            now.timestamp(),
            schedule.next_review_at.timestamp(),
            schedule.current_interval,
            schedule.easiness_factor,
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::info!(note_id = id, "note created");
    Ok(id)
}

pub fn get_note(id: i64, conn: &Connection) -> Result<Note> {
    conn.query_row(
        &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
        params![id],
        note_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("note {id}")))
}

/// Retrieves all notes ordered by ID
pub fn list_notes(conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY id"))?;
    let notes = stmt
        .query_map([], note_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

/// Deletes a note together with its reviews
pub fn delete_note(id: i64, conn: &Connection) -> Result<()> {
    let deleted = conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("note {id}")));
    }
    tracing::info!(note_id = id, "note deleted");
    Ok(())
}

pub fn set_note_status(id: i64, status: NoteStatus, conn: &Connection) -> Result<()> {
    let updated = conn.execute(
        "UPDATE notes SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if updated == 0 {
        return Err(Error::NotFound(format!("note {id}")));
    }
    tracing::info!(note_id = id, %status, "note status changed");
    Ok(())
}

/// Retrieves active notes due for review
///
/// Returns notes where next_review_at <= now, ordered by next_review_at
/// (oldest first).
pub fn due_notes(now: DateTime<Utc>, conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTE_COLUMNS} FROM notes
         WHERE status = 'active' AND next_review_at <= ?1
         ORDER BY next_review_at ASC, id ASC"
    ))?;
    let notes = stmt
        .query_map(params![now.timestamp()], note_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

/// The single most overdue active note, if any
pub fn next_due_note(now: DateTime<Utc>, conn: &Connection) -> Result<Option<Note>> {
    let note = conn
        .query_row(
            &format!(
                "SELECT {NOTE_COLUMNS} FROM notes
                 WHERE status = 'active' AND next_review_at <= ?1
                 ORDER BY next_review_at ASC, id ASC
                 LIMIT 1"
            ),
            params![now.timestamp()],
            note_from_row,
        )
        .optional()?;
    Ok(note)
}

/// Attaches a question to a note
///
/// Returns the review ID.
pub fn add_review(
    note_id: i64,
    question_text: &str,
    expected_answer: Option<&str>,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<i64> {
    if question_text.trim().is_empty() {
        return Err(Error::InvalidInput("question text is required".to_string()));
    }
    // Surface a missing note as NotFound rather than a constraint failure
    get_note(note_id, conn)?;

    conn.execute(
        "INSERT INTO reviews (note_id, question_text, expected_answer, generated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![note_id, question_text.trim(), expected_answer, now.timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_review(id: i64, conn: &Connection) -> Result<Review> {
    conn.query_row(
        &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"),
        params![id],
        review_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("review {id}")))
}

pub fn reviews_for_note(note_id: i64, conn: &Connection) -> Result<Vec<Review>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE note_id = ?1 ORDER BY id"
    ))?;
    let reviews = stmt
        .query_map(params![note_id], review_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(reviews)
}

/// Grades an answer to a review question and reschedules its note
///
/// Runs in one immediate transaction so two submissions for the same
/// review cannot both apply.
pub fn record_answer(
    review_id: i64,
    user_answer: &str,
    feedback: Option<&str>,
    quality: Quality,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<ReviewOutcome> {
    if user_answer.trim().is_empty() {
        return Err(Error::InvalidInput("answer is required".to_string()));
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let review = get_review(review_id, &tx)?;
    if review.is_answered() {
        return Err(Error::InvalidInput(format!(
            "review {review_id} has already been answered"
        )));
    }
    let note = get_note(review.note_id, &tx)?;
    let outcome = note.schedule.apply(quality, now)?;

    tx.execute(
        "UPDATE reviews
         SET user_answer = ?1, answered_at = ?2, feedback = ?3, quality = ?4, correct = ?5,
             previous_interval = ?6, new_interval = ?7,
             previous_easiness_factor = ?8, new_easiness_factor = ?9
         WHERE id = ?10",
        params![
            user_answer,
            now.timestamp(),
            feedback,
            quality.value(),
            quality.is_pass(),
            outcome.previous_interval,
            outcome.update.new_interval,
            outcome.previous_easiness_factor,
            outcome.update.new_easiness_factor,
            review_id,
        ],
    )?;
    write_schedule(note.id, &outcome.state, &tx)?;
    tx.commit()?;

    tracing::info!(
        review_id,
        note_id = note.id,
        quality = quality.value(),
        new_interval = outcome.update.new_interval,
        "answer recorded"
    );
    Ok(outcome)
}

/// Applies an explicit 0-5 rating to a note without a question
pub fn rate_note(
    note_id: i64,
    quality: Quality,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<ReviewOutcome> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let note = get_note(note_id, &tx)?;
    let outcome = note.schedule.apply(quality, now)?;
    write_schedule(note_id, &outcome.state, &tx)?;
    tx.commit()?;

    tracing::info!(
        note_id,
        quality = quality.value(),
        new_interval = outcome.update.new_interval,
        "note rated"
    );
    Ok(outcome)
}

fn write_schedule(note_id: i64, state: &ReviewState, conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE notes
         SET current_interval = ?1, easiness_factor = ?2, next_review_at = ?3,
             review_count = ?4, consecutive_correct = ?5, last_reviewed_at = ?6
         WHERE id = ?7",
        params![
            state.current_interval,
            state.easiness_factor,
            state.next_review_at.timestamp(),
            state.review_count,
            state.consecutive_correct,
            state.last_reviewed_at.map(|t| t.timestamp()),
            note_id,
        ],
    )?;
    Ok(())
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let tags: String = row.get(3)?;
    let status: String = row.get(5)?;

    Ok(Note {
        id: row.get(0)?,
        content: row.get(1)?,
        explanation: row.get(2)?,
        tags: serde_json::from_str(&tags)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        category: row.get(4)?,
        status: status
            .parse()
            .map_err(|e: Error| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        difficulty_estimate: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
        schedule: ReviewState {
            next_review_at: timestamp_column(row, 8)?,
            current_interval: row.get(9)?,
            easiness_factor: row.get(10)?,
            review_count: row.get(11)?,
            consecutive_correct: row.get(12)?,
            last_reviewed_at: optional_timestamp_column(row, 13)?,
        },
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    let answered_at = optional_timestamp_column(row, 6)?;
    let answer = match answered_at {
        Some(answered_at) => {
            let quality: i64 = row.get(8)?;
            Some(AnswerRecord {
                user_answer: row.get(5)?,
                answered_at,
                feedback: row.get(7)?,
                quality: Quality::try_from(quality).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(8, Type::Integer, Box::new(e))
                })?,
                correct: row.get(9)?,
                previous_interval: row.get(10)?,
                new_interval: row.get(11)?,
                previous_easiness_factor: row.get(12)?,
                new_easiness_factor: row.get(13)?,
            })
        }
        None => None,
    };

    Ok(Review {
        id: row.get(0)?,
        note_id: row.get(1)?,
        question_text: row.get(2)?,
        expected_answer: row.get(3)?,
        generated_at: timestamp_column(row, 4)?,
        answer,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}

fn optional_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let secs: Option<i64> = row.get(idx)?;
    secs.map(|secs| {
        DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
    })
    .transpose()
}
