pub mod content_service;
pub mod difficulty_selector;
pub mod generator;
pub mod question_synthesizer;
pub mod quiz_engine;
pub mod subject_service;
pub mod user_service;
