use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QaBotError;

pub const DEFAULT_PROBLEMS_FILE: &str = "problems.json";

/// One question to ask against a context passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub context: String,
    pub question: String,
}

/// Reads a batch of problems. `.csv` files need `context` and `question`
/// headers; anything else is parsed as a JSON array of objects.
pub fn load_problems(path: &Path) -> Result<Vec<Problem>, QaBotError> {
    let is_csv = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|error| QaBotError::Problems(format!("{}: {error}", path.display())))?;
        reader
            .deserialize()
            .collect::<Result<Vec<Problem>, _>>()
            .map_err(|error| QaBotError::Problems(format!("{}: {error}", path.display())))
    } else {
        let text = fs::read_to_string(path)
            .map_err(|error| QaBotError::Problems(format!("{}: {error}", path.display())))?;
        parse_problems_json(&text)
            .map_err(|error| QaBotError::Problems(format!("{}: {error}", path.display())))
    }
}

pub fn parse_problems_json(text: &str) -> Result<Vec<Problem>, serde_json::Error> {
    serde_json::from_str(text)
}
