use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, QUIZ_ATTEMPTS_COLLECTION},
    errors::AppResult,
    models::domain::QuizAttempt,
};

/// Append-only store of completed quizzes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn record_attempt(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    /// Attempts of one user on one subtopic, oldest first.
    async fn find_history(&self, user_id: &str, subtopic_id: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUIZ_ATTEMPTS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn record_attempt(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_history(&self, user_id: &str, subtopic_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let mut attempts: Vec<QuizAttempt> = self
            .collection
            .find(doc! {
                "user_id": user_id,
                "subtopic_id": subtopic_id
            })
            .await?
            .try_collect()
            .await?;

        // Timestamps are stored as RFC 3339 strings, which do not sort reliably.
        attempts.sort_by_key(|a| a.timestamp);
        Ok(attempts)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for {} collection", QUIZ_ATTEMPTS_COLLECTION);

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_subtopic_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "subtopic_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_subtopic".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_subtopic_index).await?;

        log::info!("Successfully created indexes for {} collection", QUIZ_ATTEMPTS_COLLECTION);
        Ok(())
    }
}
