pub mod note;
pub mod quality;
pub mod review;
pub mod review_session;
pub mod review_state;
pub mod sm2;

pub use note::{NewNote, Note, NoteStatus};
pub use quality::Quality;
pub use review::{AnswerRecord, Review};
pub use review_session::ReviewSession;
pub use review_state::{ReviewOutcome, ReviewState};
pub use sm2::{ScheduleUpdate, compute_next_review};
