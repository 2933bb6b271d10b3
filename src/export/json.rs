//! JSON import/export of notes.
//! Exports carry the full schedule; imports keep only the note fields, so
//! imported notes start over at interval 1 / EF 2.50.

use crate::Result;
use crate::models::{NewNote, Note};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Exports notes to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_notes_to_path(notes: &[Note], path: impl AsRef<Path>) -> Result<()> {
    let json_string = serde_json::to_string_pretty(notes)?;
    let mut file = File::create(path.as_ref())?;
    file.write_all(json_string.as_bytes())?;
    tracing::info!(count = notes.len(), path = %path.as_ref().display(), "notes exported");
    Ok(())
}

/// Imports notes from a JSON file produced by [`export_notes_to_path`]
/// (or any array of objects with at least a `content` field).
pub fn import_notes(path: impl AsRef<Path>) -> Result<Vec<NewNote>> {
    let file = File::open(path.as_ref())?;
    let notes: Vec<NewNote> = serde_json::from_reader(BufReader::new(file))?;
    for note in &notes {
        note.validate()?;
    }
    tracing::info!(count = notes.len(), path = %path.as_ref().display(), "notes read for import");
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::models::{NoteStatus, Quality, ReviewState};
    use chrono::Utc;
    use std::fs;

    fn reviewed_note() -> Note {
        let now = Utc::now();
        let state = ReviewState::new(now)
            .apply(Quality::new(5).unwrap(), now)
            .unwrap()
            .state;
        Note {
            id: 7,
            content: "Cześć means hello".to_string(),
            explanation: None,
            tags: vec!["polish".to_string()],
            category: Some("Miscellaneous".to_string()),
            status: NoteStatus::Active,
            difficulty_estimate: Some(2),
            created_at: now,
            schedule: state,
        }
    }

    #[test]
    fn test_export_writes_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        export_notes_to_path(&[reviewed_note()], &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json[0]["content"], "Cześć means hello");
        assert_eq!(json[0]["status"], "active");
        assert_eq!(json[0]["schedule"]["current_interval"], 6);
        assert_eq!(json[0]["schedule"]["easiness_factor"], 2.6);
    }

    #[test]
    fn test_import_drops_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        export_notes_to_path(&[reviewed_note()], &path).unwrap();

        let imported = import_notes(&path).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].content, "Cześć means hello");
        assert_eq!(imported[0].tags, vec!["polish"]);
        assert_eq!(imported[0].difficulty_estimate, Some(2));
    }

    #[test]
    fn test_import_minimal_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minimal.json");
        fs::write(&path, r#"[{"content": "just text"}]"#).unwrap();

        let imported = import_notes(&path).unwrap();
        assert_eq!(imported[0], NewNote::new("just text"));
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_notes("nonexistent_file_xyz123.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_notes(&path), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_import_blank_content_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        fs::write(&path, r#"[{"content": ""}]"#).unwrap();

        assert!(matches!(import_notes(&path), Err(Error::InvalidInput(_))));
    }
}
