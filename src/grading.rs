//! Parsing of the grader's verdict on a free-text answer.
//!
//! The grader replies with a small JSON object such as
//! `{"correct": true, "message": "..."}`. Models are sloppy with it, so
//! `correct` may arrive as a string and the message key may be capitalised.

use crate::models::Quality;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    pub message: String,
}

impl Verdict {
    /// Binary verdicts map onto the scale as 5 (correct) or 2 (incorrect).
    pub fn quality(&self) -> Quality {
        Quality::from_correctness(self.correct)
    }
}

pub fn parse_verdict(text: &str) -> Result<Verdict> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Grading("empty grader reply".to_string()));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::Grading(format!("grader reply is not JSON: {e}")))?;
    let Value::Object(fields) = value else {
        return Err(Error::Grading("grader reply is not a JSON object".to_string()));
    };

    let correct = fields
        .get("correct")
        .and_then(parse_bool)
        .ok_or_else(|| Error::Grading("grader reply is incomplete: no correct flag".to_string()))?;

    let message = ["message", "Message"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .unwrap_or("")
        .trim();
    if message.is_empty() {
        return Err(Error::Grading("grader reply is incomplete: no message".to_string()));
    }

    Ok(Verdict {
        correct,
        message: message.to_string(),
    })
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
