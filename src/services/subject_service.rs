use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Subject, Subtopic},
        dto::request::{CreateSubjectRequest, CreateSubtopicRequest},
    },
    repositories::SubjectRepository,
};

pub struct SubjectService {
    repository: Arc<dyn SubjectRepository>,
}

impl SubjectService {
    pub fn new(repository: Arc<dyn SubjectRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_subjects(&self) -> AppResult<Vec<Subject>> {
        self.repository.find_all().await
    }

    pub async fn get_subject(&self, subject_id: &str) -> AppResult<Subject> {
        self.repository
            .find_by_id(subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))
    }

    pub async fn get_subtopic(&self, subject_id: &str, subtopic_id: &str) -> AppResult<(Subject, Subtopic)> {
        let subject = self.get_subject(subject_id).await?;
        let subtopic = subject
            .subtopic(subtopic_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Subtopic not found".to_string()))?;

        Ok((subject, subtopic))
    }

    pub async fn create_subject(&self, request: CreateSubjectRequest) -> AppResult<Subject> {
        request.validate()?;

        if self.repository.find_by_name(&request.name).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Subject '{}' already exists",
                request.name.trim()
            )));
        }

        let subject = Subject::new(
            &request.name,
            &request.description,
            request.image_url.as_deref().unwrap_or_default(),
        );
        let created = self.repository.create(subject).await?;

        log::info!("Created subject '{}' ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn add_subtopic(&self, subject_id: &str, request: CreateSubtopicRequest) -> AppResult<Subtopic> {
        request.validate()?;

        let mut subject = self.get_subject(subject_id).await?;
        let name = request.name.trim();
        if subject
            .subtopics
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name))
        {
            return Err(AppError::AlreadyExists(format!(
                "Subtopic '{}' already exists in '{}'",
                name, subject.name
            )));
        }

        let subtopic = Subtopic::new(name, request.level);
        subject.subtopics.push(subtopic.clone());
        subject.modified_at = Some(Utc::now());
        self.repository.update(subject).await?;

        Ok(subtopic)
    }

    /// Stores generated markdown on a subtopic and marks it generated.
    pub async fn save_subtopic_content(
        &self,
        subject_id: &str,
        subtopic_id: &str,
        content: String,
    ) -> AppResult<Subtopic> {
        let mut subject = self.get_subject(subject_id).await?;
        let subtopic = subject
            .subtopic_mut(subtopic_id)
            .ok_or_else(|| AppError::NotFound("Subtopic not found".to_string()))?;

        subtopic.content = content;
        subtopic.generated = true;
        let updated = subtopic.clone();

        subject.modified_at = Some(Utc::now());
        self.repository.update(subject).await?;
        Ok(updated)
    }
}
