use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::QuizError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Accepts a raw generator reply. Only surrounding whitespace and case
    /// are forgiven; anything but an exact label is rejected.
    pub fn normalize(raw: &str) -> Result<Self, QuizError> {
        match raw.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(QuizError::InvalidDifficulty(raw.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::normalize(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_forgives_case_and_whitespace() {
        for raw in ["Easy", " easy \n", "EASY"] {
            assert_eq!(Difficulty::normalize(raw), Ok(Difficulty::Easy));
        }
        assert_eq!(Difficulty::normalize("\tHard "), Ok(Difficulty::Hard));
    }

    #[test]
    fn normalize_rejects_anything_else() {
        for raw in ["Medium-Hard", "", "medium.", "very hard", "The answer is easy"] {
            assert_eq!(
                Difficulty::normalize(raw),
                Err(QuizError::InvalidDifficulty(raw.to_string()))
            );
        }
    }

    #[test]
    fn serializes_as_lowercase_label() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, "\"hard\"");
        let parsed: Difficulty = serde_json::from_str("\"easy\"").unwrap();
        assert_eq!(parsed, Difficulty::Easy);
    }

    #[test]
    fn defaults_to_medium() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }
}
