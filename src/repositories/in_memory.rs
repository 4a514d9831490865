//! Process-local repositories, used by `STORAGE_BACKEND=memory` and tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{QuizAttempt, QuizSession, Subject, User},
    repositories::{
        CheckpointRepository, QuizAttemptRepository, SubjectRepository, UserRepository,
    },
};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id == user.id || u.email == user.email || u.username == user.username)
        {
            return Err(AppError::AlreadyExists(format!(
                "User '{}' already exists",
                user.username
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let username = username.trim().to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_reset_token_hash(&self, token_hash: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            ))),
        }
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySubjectRepository {
    subjects: Arc<RwLock<HashMap<String, Subject>>>,
}

impl InMemorySubjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubjectRepository for InMemorySubjectRepository {
    async fn create(&self, subject: Subject) -> AppResult<Subject> {
        let mut subjects = self.subjects.write().await;
        if subjects.values().any(|s| s.name == subject.name) {
            return Err(AppError::AlreadyExists(format!(
                "Subject '{}' already exists",
                subject.name
            )));
        }
        subjects.insert(subject.id.clone(), subject.clone());
        Ok(subject)
    }

    async fn find_all(&self) -> AppResult<Vec<Subject>> {
        let subjects = self.subjects.read().await;
        let mut items: Vec<_> = subjects.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Subject>> {
        Ok(self.subjects.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Subject>> {
        let name = name.trim();
        let subjects = self.subjects.read().await;
        Ok(subjects.values().find(|s| s.name == name).cloned())
    }

    async fn update(&self, subject: Subject) -> AppResult<Subject> {
        let mut subjects = self.subjects.write().await;
        match subjects.get_mut(&subject.id) {
            Some(existing) => {
                *existing = subject.clone();
                Ok(subject)
            }
            None => Err(AppError::NotFound(format!(
                "Subject with id '{}' not found",
                subject.id
            ))),
        }
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryQuizAttemptRepository {
    attempts: Arc<RwLock<Vec<QuizAttempt>>>,
}

impl InMemoryQuizAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn record_attempt(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.attempts.write().await.push(attempt.clone());
        Ok(attempt)
    }

    async fn find_history(&self, user_id: &str, subtopic_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        let mut history: Vec<_> = attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.subtopic_id == subtopic_id)
            .cloned()
            .collect();
        history.sort_by_key(|a| a.timestamp);
        Ok(history)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCheckpointRepository {
    sessions: Arc<RwLock<HashMap<(String, String), QuizSession>>>,
}

impl InMemoryCheckpointRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointRepository for InMemoryCheckpointRepository {
    async fn load(&self, user_id: &str, subtopic_id: &str) -> AppResult<Option<QuizSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&(user_id.to_string(), subtopic_id.to_string()))
            .cloned())
    }

    async fn save(&self, session: &QuizSession) -> AppResult<()> {
        let key = (session.user_id().to_string(), session.subtopic_id().to_string());
        self.sessions.write().await.insert(key, session.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str, subtopic_id: &str) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&(user_id.to_string(), subtopic_id.to_string()));
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}
