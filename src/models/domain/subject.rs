use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtopicLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subtopic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub level: SubtopicLevel,
    #[serde(default)]
    pub generated: bool,
}

impl Subtopic {
    pub fn new(name: &str, level: SubtopicLevel) -> Self {
        Subtopic {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            content: String::new(),
            level,
            generated: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub subtopics: Vec<Subtopic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Subject {
    pub fn new(name: &str, description: &str, image_url: &str) -> Self {
        Subject {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            image_url: image_url.to_string(),
            subtopics: Vec::new(),
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn subtopic(&self, subtopic_id: &str) -> Option<&Subtopic> {
        self.subtopics.iter().find(|s| s.id == subtopic_id)
    }

    pub fn subtopic_mut(&mut self, subtopic_id: &str) -> Option<&mut Subtopic> {
        self.subtopics.iter_mut().find(|s| s.id == subtopic_id)
    }
}
