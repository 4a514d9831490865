pub mod checkpoint_repository;
pub mod in_memory;
pub mod quiz_attempt_repository;
pub mod subject_repository;
pub mod user_repository;

pub use checkpoint_repository::{CheckpointRepository, MongoCheckpointRepository};
pub use in_memory::{
    InMemoryCheckpointRepository, InMemoryQuizAttemptRepository, InMemorySubjectRepository,
    InMemoryUserRepository,
};
pub use quiz_attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};
pub use subject_repository::{MongoSubjectRepository, SubjectRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
