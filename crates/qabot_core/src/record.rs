use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primary key attribute of the result table.
pub const ITEM_ID_ATTRIBUTE: &str = "item_id";

/// Application-generated token joining a submitted task to its result row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row written by the worker once it has answered a question.
///
/// `score` is kept exactly as stored; the worker writes the string form of a
/// float, see [`AnswerRecord::score_value`] for the parsed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub item_id: String,
    pub context: String,
    pub question: String,
    pub answer: String,
    pub score: String,
}

impl AnswerRecord {
    pub fn score_value(&self) -> Option<f64> {
        self.score.trim().parse().ok()
    }
}
