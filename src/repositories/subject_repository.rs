use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, SUBJECTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::Subject,
};

/// Subjects are stored with their subtopics embedded.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn create(&self, subject: Subject) -> AppResult<Subject>;
    async fn find_all(&self) -> AppResult<Vec<Subject>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Subject>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Subject>>;
    async fn update(&self, subject: Subject) -> AppResult<Subject>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSubjectRepository {
    collection: Collection<Subject>,
}

impl MongoSubjectRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(SUBJECTS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl SubjectRepository for MongoSubjectRepository {
    async fn create(&self, subject: Subject) -> AppResult<Subject> {
        self.collection.insert_one(&subject).await?;
        Ok(subject)
    }

    async fn find_all(&self) -> AppResult<Vec<Subject>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?;
        let subjects: Vec<Subject> = cursor.try_collect().await?;
        Ok(subjects)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Subject>> {
        let subject = self.collection.find_one(doc! { "id": id }).await?;
        Ok(subject)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Subject>> {
        let subject = self.collection.find_one(doc! { "name": name.trim() }).await?;
        Ok(subject)
    }

    async fn update(&self, subject: Subject) -> AppResult<Subject> {
        let result = self
            .collection
            .replace_one(doc! { "id": &subject.id }, &subject)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Subject with id '{}' not found",
                subject.id
            )));
        }

        Ok(subject)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for {} collection", SUBJECTS_COLLECTION);

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(name_index).await?;

        log::info!("Successfully created indexes for {} collection", SUBJECTS_COLLECTION);
        Ok(())
    }
}
