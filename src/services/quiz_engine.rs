//! Orchestrates one quiz request at a time: difficulty selection, question
//! synthesis, the session state machine and the result recorder.
//!
//! Nothing is held in memory between requests. Session state comes from the
//! checkpoint store, history from the attempt repository, and every
//! transition is applied to a copy that is only written back on success.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult, QuizError},
    models::{
        domain::{
            Difficulty, Emotion, NextAction, Question, QuizAttempt, QuizHints, QuizPolicy, QuizSession,
            SessionState,
        },
        dto::request::QuizResultRequest,
    },
    repositories::{CheckpointRepository, QuizAttemptRepository},
    services::{
        difficulty_selector::DifficultySelector, generator::TextGenerator,
        question_synthesizer::QuestionSynthesizer, subject_service::SubjectService,
    },
};

#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone)]
pub struct RecordedResult {
    pub attempt: QuizAttempt,
    pub next_action: NextAction,
    pub recent_success_rate: f64,
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub session: QuizSession,
    pub attempt: QuizAttempt,
    pub next_action: NextAction,
    pub warning: Option<String>,
}

pub struct QuizEngine {
    selector: DifficultySelector,
    synthesizer: QuestionSynthesizer,
    attempts: Arc<dyn QuizAttemptRepository>,
    checkpoints: Arc<dyn CheckpointRepository>,
    subject_service: Arc<SubjectService>,
    policy: QuizPolicy,
}

impl QuizEngine {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        attempts: Arc<dyn QuizAttemptRepository>,
        checkpoints: Arc<dyn CheckpointRepository>,
        subject_service: Arc<SubjectService>,
        policy: QuizPolicy,
    ) -> Self {
        Self {
            selector: DifficultySelector::new(generator.clone()),
            synthesizer: QuestionSynthesizer::new(generator),
            attempts,
            checkpoints,
            subject_service,
            policy,
        }
    }

    pub fn policy(&self) -> &QuizPolicy {
        &self.policy
    }

    /// Difficulty first, then questions: two sequential generator calls.
    pub async fn generate_quiz(
        &self,
        subject_id: &str,
        subtopic_id: &str,
        hints: &QuizHints,
    ) -> AppResult<GeneratedQuiz> {
        let (subject, subtopic) = self.subject_service.get_subtopic(subject_id, subtopic_id).await?;

        let difficulty = self.selector.select_difficulty(hints).await?;
        let questions = self
            .synthesizer
            .synthesize_questions(&subtopic.name, &subject.name, difficulty)
            .await?;

        Ok(GeneratedQuiz {
            difficulty,
            questions,
        })
    }

    pub async fn quiz_history(
        &self,
        user_id: &str,
        subject_id: &str,
        subtopic_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        self.subject_service.get_subtopic(subject_id, subtopic_id).await?;
        self.attempts.find_history(user_id, subtopic_id).await
    }

    /// Records an attempt scored by the client and decides what comes next.
    /// A failed write is reported as a warning; the decision still uses the
    /// attempt.
    pub async fn record_result(
        &self,
        user_id: &str,
        subject_id: &str,
        subtopic_id: &str,
        request: QuizResultRequest,
    ) -> AppResult<RecordedResult> {
        self.subject_service.get_subtopic(subject_id, subtopic_id).await?;

        let attempt = QuizAttempt::new(
            user_id,
            subject_id,
            subtopic_id,
            request.score,
            request.emotion.unwrap_or_default(),
            request.difficulty,
            request.time_spent,
            Utc::now(),
        );

        let (scores, warning) = self.record_and_collect_scores(&attempt).await;
        let consecutive = request.consecutive_sessions.max(1);

        let next_action = if self.policy.requires_remedial(consecutive, &scores) {
            NextAction::Remedial
        } else {
            NextAction::NextQuiz
        };
        let recent = &scores[scores.len().saturating_sub(self.policy.remedial_window)..];

        Ok(RecordedResult {
            attempt,
            next_action,
            recent_success_rate: self.policy.success_rate(recent),
            warning,
        })
    }

    /// Writes the attempt and returns the subtopic's score history with it
    /// included, plus a warning when the write or the read failed.
    async fn record_and_collect_scores(&self, attempt: &QuizAttempt) -> (Vec<u8>, Option<String>) {
        let recorded = self.attempts.record_attempt(attempt.clone()).await;
        let mut warnings = Vec::new();

        if let Err(e) = recorded {
            let warning = QuizError::PersistenceFailure(e.to_string());
            log::error!("{}", warning);
            warnings.push(warning.to_string());
        }

        let history = match self
            .attempts
            .find_history(&attempt.user_id, &attempt.subtopic_id)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                log::warn!("Could not read quiz history for remedial check: {}", e);
                warnings.push(format!(
                    "Quiz history could not be read, the next step only considers this attempt: {}",
                    e
                ));
                Vec::new()
            }
        };

        let mut scores: Vec<u8> = history.iter().map(|a| a.score).collect();
        if !history.iter().any(|a| a.id == attempt.id) {
            scores.push(attempt.score);
        }

        let warning = (!warnings.is_empty()).then(|| warnings.join("; "));
        (scores, warning)
    }

    /// Resumes an in-progress checkpoint, otherwise starts a fresh quiz
    /// seeded with the last recorded attempt on the subtopic.
    pub async fn start_session(
        &self,
        user_id: &str,
        subject_id: &str,
        subtopic_id: &str,
    ) -> AppResult<QuizSession> {
        self.ensure_subtopic(subject_id, subtopic_id).await?;

        if let Some(existing) = self.checkpoints.load(user_id, subtopic_id).await? {
            if existing.state() == SessionState::InProgress {
                log::debug!("Resuming quiz session for user {} on {}", user_id, subtopic_id);
                return Ok(existing);
            }
        }

        let hints = self
            .attempts
            .find_history(user_id, subtopic_id)
            .await?
            .last()
            .map(QuizHints::from)
            .unwrap_or_default();

        let quiz = self.generate_quiz(subject_id, subtopic_id, &hints).await?;

        let mut session = QuizSession::new(user_id, subject_id, subtopic_id);
        session.begin(quiz.questions, quiz.difficulty, Utc::now())?;
        self.checkpoints.save(&session).await?;

        log::info!(
            "Started {} quiz session for user {} on {}",
            quiz.difficulty,
            user_id,
            subtopic_id
        );
        Ok(session)
    }

    /// Fails with `NotFound` unless the subtopic belongs to the subject.
    /// Checkpoints are keyed by subtopic only, so session routes call this
    /// before touching one.
    pub async fn ensure_subtopic(&self, subject_id: &str, subtopic_id: &str) -> AppResult<()> {
        self.subject_service.get_subtopic(subject_id, subtopic_id).await?;
        Ok(())
    }

    pub async fn get_session(&self, user_id: &str, subtopic_id: &str) -> AppResult<QuizSession> {
        self.checkpoints
            .load(user_id, subtopic_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No quiz session for this subtopic".to_string()))
    }

    pub async fn select_answer(
        &self,
        user_id: &str,
        subtopic_id: &str,
        index: usize,
        option: &str,
    ) -> AppResult<QuizSession> {
        let mut session = self.get_session(user_id, subtopic_id).await?;
        session.select_answer(index, option)?;
        self.checkpoints.save(&session).await?;
        Ok(session)
    }

    pub async fn navigate(&self, user_id: &str, subtopic_id: &str, delta: i64) -> AppResult<QuizSession> {
        let mut session = self.get_session(user_id, subtopic_id).await?;
        session.navigate(delta)?;
        self.checkpoints.save(&session).await?;
        Ok(session)
    }

    pub async fn submit(
        &self,
        user_id: &str,
        subtopic_id: &str,
        emotion: Option<Emotion>,
    ) -> AppResult<SubmissionOutcome> {
        let mut session = self.get_session(user_id, subtopic_id).await?;
        let attempt = session.submit(emotion, Utc::now())?;

        let (scores, warning) = self.record_and_collect_scores(&attempt).await;
        let next_action = session.apply_outcome(&scores, &self.policy)?;
        self.checkpoints.save(&session).await?;

        log::info!(
            "User {} scored {} on {} ({:?})",
            user_id,
            attempt.score,
            subtopic_id,
            next_action
        );
        Ok(SubmissionOutcome {
            session,
            attempt,
            next_action,
            warning,
        })
    }

    /// Generates the follow-up quiz from the last attempt's hints. If
    /// generation fails the stored session stays `Submitted`.
    pub async fn next_quiz(&self, user_id: &str, subtopic_id: &str) -> AppResult<QuizSession> {
        let mut session = self.get_session(user_id, subtopic_id).await?;
        let hints = session.request_next_quiz()?;

        let quiz = self
            .generate_quiz(session.subject_id(), subtopic_id, &hints)
            .await?;
        session.begin(quiz.questions, quiz.difficulty, Utc::now())?;
        self.checkpoints.save(&session).await?;

        Ok(session)
    }

    pub async fn exit(&self, user_id: &str, subtopic_id: &str) -> AppResult<()> {
        if let Some(mut session) = self.checkpoints.load(user_id, subtopic_id).await? {
            let taken = session.consecutive_sessions();
            session.exit();
            log::info!(
                "User {} left {} ({}) after {} consecutive quizzes",
                user_id,
                subtopic_id,
                session.state(),
                taken
            );
        }
        self.checkpoints.delete(user_id, subtopic_id).await
    }
}
