pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod grading;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};
pub use grading::{Verdict, parse_verdict};
pub use models::{NewNote, Note, NoteStatus, Quality, ReviewOutcome, ReviewState, compute_next_review};
