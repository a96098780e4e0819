//! Shared deterministic types for the journaling core.
//!
//! These types define the stable contract between the session flow and the
//! journal store. They do not depend on external state or I/O.

use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Canonical column order of the persisted journal.
pub const COLUMNS: [&str; 6] = [
    "date",
    "affirmation",
    "gratitude",
    "mood",
    "good_thing",
    "ai_response",
];

/// One of the four progressively disclosed input steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Affirmation,
    Mood,
    Gratitude,
    Reflection,
}

impl Step {
    /// Steps in presentation order.
    pub const ALL: [Step; 4] = [
        Step::Affirmation,
        Step::Mood,
        Step::Gratitude,
        Step::Reflection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Affirmation => "affirmation",
            Step::Mood => "mood",
            Step::Gratitude => "gratitude",
            Step::Reflection => "reflection",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("mood {0} is outside 0..=10")]
pub struct MoodOutOfRange(pub i64);

/// Self-reported mood on a 0 (rough) to 10 (amazing) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;
    /// Starting position of the mood slider.
    pub const DEFAULT: Mood = Mood(5);

    pub fn new(value: u8) -> Result<Self, MoodOutOfRange> {
        if value > Self::MAX {
            return Err(MoodOutOfRange(i64::from(value)));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    fn from_i64(value: i64) -> Result<Self, MoodOutOfRange> {
        u8::try_from(value)
            .map_err(|_| MoodOutOfRange(value))
            .and_then(Self::new)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Mood {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Mood {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoodVisitor)
    }
}

/// Accepts integers and integral floats (`7.0`, as written by spreadsheet
/// tools for a column containing blanks). Anything else is rejected.
struct MoodVisitor;

impl Visitor<'_> for MoodVisitor {
    type Value = Mood;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer mood between 0 and 10")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Mood, E> {
        let v = i64::try_from(v).unwrap_or(i64::MAX);
        Mood::from_i64(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Mood, E> {
        Mood::from_i64(v).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Mood, E> {
        if v.fract() != 0.0 || !v.is_finite() {
            return Err(E::custom(format!("mood {v} is not a whole number")));
        }
        Mood::from_i64(v as i64).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Mood, E> {
        let trimmed = v.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return self.visit_i64(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => self.visit_f64(f),
            Err(_) => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }
}

/// One persisted journal row. Write-once: never mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: NaiveDate,
    pub affirmation: String,
    pub gratitude: String,
    pub mood: Option<Mood>,
    pub good_thing: String,
    pub ai_response: String,
}

/// Values collected from the revealed steps, ready for submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub affirmation: String,
    pub gratitude: String,
    pub mood: Option<Mood>,
    pub good_thing: String,
}

impl Submission {
    /// Build the journal row for `date` with the collaborator's response.
    pub fn into_entry(self, date: NaiveDate, ai_response: String) -> JournalEntry {
        JournalEntry {
            date,
            affirmation: self.affirmation,
            gratitude: self.gratitude,
            mood: self.mood,
            good_thing: self.good_thing,
            ai_response,
        }
    }
}
