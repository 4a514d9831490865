//! Quiz session state machine.
//!
//! `Loading -> InProgress -> Submitted -> { NextQuizRequested | RemedialRequested | Exited }`
//!
//! The session is a plain value: it performs no I/O. The quiz engine loads it
//! from the checkpoint store, applies one transition and writes it back.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::QuizError,
    models::domain::{Difficulty, Emotion, Question, QuizAttempt, QuizHints},
};

pub const QUESTIONS_PER_SESSION: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Loading,
    InProgress,
    Submitted,
    NextQuizRequested,
    RemedialRequested,
    Exited,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Loading => "loading",
            SessionState::InProgress => "in progress",
            SessionState::Submitted => "submitted",
            SessionState::NextQuizRequested => "waiting for the next quiz",
            SessionState::RemedialRequested => "redirected to remedial content",
            SessionState::Exited => "exited",
        };
        f.write_str(label)
    }
}

/// Product constants for remedial redirection and break suggestions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizPolicy {
    pub remedial_min_sessions: u32,
    pub remedial_window: usize,
    pub passing_score: u8,
    pub remedial_success_rate: f64,
    pub break_after_minutes: i64,
}

impl Default for QuizPolicy {
    fn default() -> Self {
        Self {
            remedial_min_sessions: 3,
            remedial_window: 3,
            passing_score: 60,
            remedial_success_rate: 0.4,
            break_after_minutes: 30,
        }
    }
}

impl QuizPolicy {
    /// Fraction of `scores` at or above the passing score; 0 when empty.
    pub fn success_rate(&self, scores: &[u8]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        let passed = scores.iter().filter(|s| **s >= self.passing_score).count();
        passed as f64 / scores.len() as f64
    }

    /// `scores` is the attempt history in chronological order, newest last.
    pub fn requires_remedial(&self, consecutive_sessions: u32, scores: &[u8]) -> bool {
        if consecutive_sessions < self.remedial_min_sessions {
            return false;
        }
        let recent = &scores[scores.len().saturating_sub(self.remedial_window)..];
        !recent.is_empty() && self.success_rate(recent) < self.remedial_success_rate
    }

    pub fn break_after(&self) -> Duration {
        Duration::minutes(self.break_after_minutes)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NextAction {
    NextQuiz,
    Remedial,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakSuggestion {
    pub elapsed_seconds: i64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    user_id: String,
    subject_id: String,
    subtopic_id: String,
    state: SessionState,
    questions: Vec<Question>,
    answers: Vec<Option<String>>,
    current_index: usize,
    started_at: Option<DateTime<Utc>>,
    difficulty: Option<Difficulty>,
    consecutive_sessions: u32,
    last_attempt: Option<QuizAttempt>,
}

impl QuizSession {
    pub fn new(user_id: &str, subject_id: &str, subtopic_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            subject_id: subject_id.to_string(),
            subtopic_id: subtopic_id.to_string(),
            state: SessionState::Loading,
            questions: Vec::new(),
            answers: Vec::new(),
            current_index: 0,
            started_at: None,
            difficulty: None,
            consecutive_sessions: 0,
            last_attempt: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn subtopic_id(&self) -> &str {
        &self.subtopic_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn consecutive_sessions(&self) -> u32 {
        self.consecutive_sessions
    }

    pub fn last_attempt(&self) -> Option<&QuizAttempt> {
        self.last_attempt.as_ref()
    }

    fn require_state(&self, expected: &[SessionState], action: &'static str) -> Result<(), QuizError> {
        if expected.contains(&self.state) {
            Ok(())
        } else {
            Err(QuizError::InvalidTransition {
                action,
                state: self.state.to_string(),
            })
        }
    }

    /// `Loading | NextQuizRequested -> InProgress`. Starts the clock.
    pub fn begin(
        &mut self,
        questions: Vec<Question>,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Result<(), QuizError> {
        self.require_state(
            &[SessionState::Loading, SessionState::NextQuizRequested],
            "start a quiz",
        )?;
        if questions.len() != QUESTIONS_PER_SESSION {
            return Err(QuizError::InvalidQuestionCount {
                found: questions.len(),
                expected: QUESTIONS_PER_SESSION,
            });
        }

        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.current_index = 0;
        self.started_at = Some(now);
        self.difficulty = Some(difficulty);
        self.consecutive_sessions += 1;
        self.state = SessionState::InProgress;
        Ok(())
    }

    /// Records or overwrites the answer for `index`.
    pub fn select_answer(&mut self, index: usize, option: &str) -> Result<(), QuizError> {
        self.require_state(&[SessionState::InProgress], "select an answer")?;

        let question = self.questions.get(index).ok_or_else(|| {
            QuizError::InvalidAnswer(format!(
                "question index {} is out of range 0..{}",
                index,
                self.questions.len()
            ))
        })?;
        if !question.has_option(option) {
            return Err(QuizError::InvalidAnswer(format!(
                "'{}' is not an option of question {}",
                option, index
            )));
        }

        self.answers[index] = Some(option.to_string());
        Ok(())
    }

    /// Moves the question pointer by `delta`, clamped to the batch.
    pub fn navigate(&mut self, delta: i64) -> Result<usize, QuizError> {
        self.require_state(&[SessionState::InProgress], "navigate")?;

        let last = self.questions.len().saturating_sub(1) as i64;
        self.current_index = (self.current_index as i64)
            .saturating_add(delta)
            .clamp(0, last) as usize;
        Ok(self.current_index)
    }

    pub fn unanswered(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(_, answer)| answer.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_submittable(&self) -> bool {
        self.state == SessionState::InProgress && self.unanswered().is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| {
                answer.as_deref().is_some_and(|a| question.is_correct(a))
            })
            .count()
    }

    /// `round(100 * correct / total)`.
    pub fn score(&self) -> u8 {
        calculate_score(self.correct_count(), self.questions.len())
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        match (self.state, self.started_at) {
            (SessionState::InProgress, Some(started_at)) => (now - started_at).num_seconds().max(0),
            _ => self
                .last_attempt
                .as_ref()
                .map(|a| a.time_spent_seconds)
                .unwrap_or(0),
        }
    }

    /// `InProgress -> Submitted`, refused while any question is unanswered.
    pub fn submit(
        &mut self,
        emotion: Option<Emotion>,
        now: DateTime<Utc>,
    ) -> Result<QuizAttempt, QuizError> {
        self.require_state(&[SessionState::InProgress], "submit")?;

        let missing = self.unanswered();
        if !missing.is_empty() {
            return Err(QuizError::IncompleteSubmission { missing });
        }

        let attempt = QuizAttempt::new(
            &self.user_id,
            &self.subject_id,
            &self.subtopic_id,
            self.score(),
            emotion.unwrap_or_default(),
            self.difficulty.unwrap_or_default(),
            self.elapsed_seconds(now),
            now,
        );

        self.last_attempt = Some(attempt.clone());
        self.state = SessionState::Submitted;
        Ok(attempt)
    }

    /// Decides what follows a submission. `scores` is the attempt history
    /// for this subtopic, oldest first, including the attempt just made.
    pub fn apply_outcome(&mut self, scores: &[u8], policy: &QuizPolicy) -> Result<NextAction, QuizError> {
        self.require_state(&[SessionState::Submitted], "evaluate the quiz outcome")?;

        if policy.requires_remedial(self.consecutive_sessions, scores) {
            self.state = SessionState::RemedialRequested;
            Ok(NextAction::Remedial)
        } else {
            Ok(NextAction::NextQuiz)
        }
    }

    /// `Submitted -> NextQuizRequested`. Returns the hints for the next
    /// difficulty decision.
    pub fn request_next_quiz(&mut self) -> Result<QuizHints, QuizError> {
        self.require_state(&[SessionState::Submitted], "request the next quiz")?;

        let hints = self
            .last_attempt
            .as_ref()
            .map(QuizHints::from)
            .unwrap_or_default();
        self.state = SessionState::NextQuizRequested;
        Ok(hints)
    }

    /// Leaves the quiz from any state and resets the consecutive counter.
    pub fn exit(&mut self) {
        self.state = SessionState::Exited;
        self.consecutive_sessions = 0;
    }

    pub fn break_suggestion(&self, now: DateTime<Utc>, policy: &QuizPolicy) -> Option<BreakSuggestion> {
        if self.state != SessionState::InProgress {
            return None;
        }
        let elapsed_seconds = self.elapsed_seconds(now);
        if elapsed_seconds < policy.break_after().num_seconds() {
            return None;
        }
        Some(BreakSuggestion {
            elapsed_seconds,
            message: format!(
                "You have been working for over {} minutes. Consider taking a short break.",
                policy.break_after_minutes
            ),
        })
    }
}

pub fn calculate_score(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 * 100.0) / total as f64).round() as u8
}
