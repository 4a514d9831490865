use async_trait::async_trait;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, QUIZ_CHECKPOINTS_COLLECTION},
    errors::AppResult,
    models::domain::QuizSession,
};

/// Keyed store of in-flight quiz sessions, one per (user, subtopic).
/// Saving overwrites whatever was there: last write wins.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    async fn load(&self, user_id: &str, subtopic_id: &str) -> AppResult<Option<QuizSession>>;
    async fn save(&self, session: &QuizSession) -> AppResult<()>;
    async fn delete(&self, user_id: &str, subtopic_id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoCheckpointRepository {
    collection: Collection<QuizSession>,
}

impl MongoCheckpointRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUIZ_CHECKPOINTS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl CheckpointRepository for MongoCheckpointRepository {
    async fn load(&self, user_id: &str, subtopic_id: &str) -> AppResult<Option<QuizSession>> {
        let session = self
            .collection
            .find_one(doc! { "user_id": user_id, "subtopic_id": subtopic_id })
            .await?;
        Ok(session)
    }

    async fn save(&self, session: &QuizSession) -> AppResult<()> {
        let filter = doc! {
            "user_id": session.user_id(),
            "subtopic_id": session.subtopic_id()
        };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(filter, session)
            .with_options(options)
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, subtopic_id: &str) -> AppResult<()> {
        self.collection
            .delete_one(doc! { "user_id": user_id, "subtopic_id": subtopic_id })
            .await?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "subtopic_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_subtopic_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(model).await?;
        log::info!("Created unique index on {} collection", QUIZ_CHECKPOINTS_COLLECTION);
        Ok(())
    }
}
