//! Recall quality grade on the SM-2 0-5 scale.
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest grade that counts as a successful recall
pub const PASSING_QUALITY: u8 = 3;

/// Highest grade on the scale
pub const MAX_QUALITY: u8 = 5;

/// Grade of the most recent answer: 0 = total failure, 5 = perfect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self> {
        if value > MAX_QUALITY {
            return Err(Error::InvalidInput(format!(
                "quality must be between 0 and {MAX_QUALITY}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Collapses a correct/incorrect verdict onto the scale (5 or 2).
    pub fn from_correctness(correct: bool) -> Self {
        if correct { Self(5) } else { Self(2) }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Quality {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| {
                Error::InvalidInput(format!(
                    "quality must be between 0 and {MAX_QUALITY}, got {value}"
                ))
            })
            .and_then(Self::new)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
