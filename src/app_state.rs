use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::{Config, StorageBackend},
    db::Database,
    errors::AppResult,
    repositories::{
        CheckpointRepository, InMemoryCheckpointRepository, InMemoryQuizAttemptRepository,
        InMemorySubjectRepository, InMemoryUserRepository, MongoCheckpointRepository,
        MongoQuizAttemptRepository, MongoSubjectRepository, MongoUserRepository,
        QuizAttemptRepository, SubjectRepository, UserRepository,
    },
    services::{
        content_service::ContentService,
        generator::{OpenAiTextGenerator, TextGenerator},
        quiz_engine::QuizEngine,
        subject_service::SubjectService,
        user_service::UserService,
    },
};

/// The storage seams, grouped so tests can swap them out together.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub subjects: Arc<dyn SubjectRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
    pub checkpoints: Arc<dyn CheckpointRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            subjects: Arc::new(InMemorySubjectRepository::new()),
            attempts: Arc::new(InMemoryQuizAttemptRepository::new()),
            checkpoints: Arc::new(InMemoryCheckpointRepository::new()),
        }
    }

    pub async fn mongo(db: &Database) -> AppResult<Self> {
        let repositories = Self {
            users: Arc::new(MongoUserRepository::new(db)),
            subjects: Arc::new(MongoSubjectRepository::new(db)),
            attempts: Arc::new(MongoQuizAttemptRepository::new(db)),
            checkpoints: Arc::new(MongoCheckpointRepository::new(db)),
        };

        repositories.users.ensure_indexes().await?;
        repositories.subjects.ensure_indexes().await?;
        repositories.attempts.ensure_indexes().await?;
        repositories.checkpoints.ensure_indexes().await?;

        Ok(repositories)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub subject_service: Arc<SubjectService>,
    pub content_service: Arc<ContentService>,
    pub quiz_engine: Arc<QuizEngine>,
    pub jwt_service: Arc<JwtService>,
    pub database: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiTextGenerator::new(&config.generator));

        match config.storage_backend {
            StorageBackend::Mongo => {
                let db = Database::connect(&config).await?;
                let repositories = Repositories::mongo(&db).await?;
                let mut state = Self::from_repositories(config, repositories, generator);
                state.database = Some(db);
                Ok(state)
            }
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::from_repositories(config, Repositories::in_memory(), generator))
            }
        }
    }

    pub fn from_repositories(
        config: Config,
        repositories: Repositories,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        let user_service = Arc::new(UserService::new(
            repositories.users,
            jwt_service.clone(),
            config.reset_token_ttl_minutes,
            &config.frontend_base_url,
        ));
        let subject_service = Arc::new(SubjectService::new(repositories.subjects));
        let content_service = Arc::new(ContentService::new(
            generator.clone(),
            subject_service.clone(),
            repositories.attempts.clone(),
        ));
        let quiz_engine = Arc::new(QuizEngine::new(
            generator,
            repositories.attempts,
            repositories.checkpoints,
            subject_service.clone(),
            config.quiz_policy,
        ));

        Self {
            user_service,
            subject_service,
            content_service,
            quiz_engine,
            jwt_service,
            database: None,
            config: Arc::new(config),
        }
    }
}
