use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How the student reported feeling after a quiz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Surprise,
    #[default]
    Neutral,
    Sad,
    Angry,
    Confused,
    Excited,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Confused => "confused",
            Emotion::Excited => "excited",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Emotion::Happy),
            "surprise" => Ok(Emotion::Surprise),
            "neutral" => Ok(Emotion::Neutral),
            "sad" => Ok(Emotion::Sad),
            "angry" => Ok(Emotion::Angry),
            "confused" => Ok(Emotion::Confused),
            "excited" => Ok(Emotion::Excited),
            other => Err(format!("unknown emotion '{}'", other)),
        }
    }
}
