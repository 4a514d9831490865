pub mod difficulty;
pub mod emotion;
pub mod question;
pub mod quiz_attempt;
pub mod quiz_session;
pub mod subject;
pub mod user;

pub use difficulty::Difficulty;
pub use emotion::Emotion;
pub use question::Question;
pub use quiz_attempt::{QuizAttempt, QuizHints};
pub use quiz_session::{BreakSuggestion, NextAction, QuizPolicy, QuizSession, SessionState};
pub use subject::{Subject, Subtopic, SubtopicLevel};
pub use user::User;
