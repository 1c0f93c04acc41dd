//! The `Store` trait that persistence backends implement.
//!
//! Every method is one atomic unit: multi-row writes (a quiz with its questions
//! and answers, an evaluation with the user's score update) either fully apply
//! or leave nothing behind. Backends enforce uniqueness of (meeting, quiz type),
//! (username, meeting) for evaluations, and usernames.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::*;

#[async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────── Meetings ─────────────────────────────

    async fn create_meeting(&self, params: &CreateMeetingParams) -> Result<Meeting, StoreError>;

    async fn get_meeting(&self, meeting_id: MeetingId) -> Result<Meeting, StoreError>;

    /// Store the narrative summary on a meeting.
    async fn set_meeting_summary(
        &self,
        meeting_id: MeetingId,
        summary: &str,
    ) -> Result<Meeting, StoreError>;

    /// Overwrite the team evaluation fields of a meeting.
    async fn set_team_evaluation(
        &self,
        meeting_id: MeetingId,
        evaluation: &TeamEvaluation,
    ) -> Result<Meeting, StoreError>;

    // ───────────────────────────── Users ────────────────────────────────

    /// Fails with `AlreadyExists` for a taken username.
    async fn create_user(&self, username: &str) -> Result<User, StoreError>;

    async fn get_user(&self, username: &str) -> Result<User, StoreError>;

    // ───────────────────────────── Transcripts ──────────────────────────

    async fn add_transcript(
        &self,
        params: &CreateTranscriptParams,
    ) -> Result<Transcript, StoreError>;

    /// Transcripts of a meeting, optionally only one user's, oldest first.
    async fn list_transcripts(
        &self,
        meeting_id: MeetingId,
        username: Option<&str>,
    ) -> Result<Vec<Transcript>, StoreError>;

    // ───────────────────────────── Quizzes ──────────────────────────────

    async fn find_quiz(
        &self,
        meeting_id: MeetingId,
        quiz_type: QuizType,
    ) -> Result<Option<Quiz>, StoreError>;

    async fn get_quiz(&self, quiz_id: QuizId) -> Result<Quiz, StoreError>;

    /// Insert a quiz together with its questions and answers.
    /// Fails with `AlreadyExists` if the meeting already has a quiz of that type.
    async fn create_quiz(&self, params: &CreateQuizParams) -> Result<Quiz, StoreError>;

    // ───────────────────────────── Attempts ─────────────────────────────

    async fn create_attempt(&self, params: &CreateAttemptParams)
        -> Result<QuizAttempt, StoreError>;

    /// A user's attempts, newest first, optionally for a single quiz.
    async fn list_attempts(
        &self,
        username: &str,
        quiz_id: Option<QuizId>,
    ) -> Result<Vec<QuizAttempt>, StoreError>;

    /// Distinct meetings whose outro quiz the user has at least one attempt on.
    async fn outro_meetings_attempted(&self, username: &str)
        -> Result<Vec<MeetingId>, StoreError>;

    // ───────────────────────────── Evaluations ──────────────────────────

    async fn find_evaluation(
        &self,
        username: &str,
        meeting_id: MeetingId,
    ) -> Result<Option<UserEvaluation>, StoreError>;

    async fn list_evaluations(
        &self,
        meeting_id: MeetingId,
    ) -> Result<Vec<UserEvaluation>, StoreError>;

    /// Insert an evaluation and apply the user's score/credit update in one unit.
    /// Fails with `AlreadyExists` if the user was already evaluated for the meeting.
    async fn record_evaluation(
        &self,
        params: &RecordEvaluationParams,
    ) -> Result<(UserEvaluation, User), StoreError>;
}

#[derive(Clone, Debug)]
pub struct CreateMeetingParams {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct CreateTranscriptParams {
    pub meeting_id: MeetingId,
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub foul: bool,
}

#[derive(Clone, Debug)]
pub struct CreateQuizParams {
    pub meeting_id: MeetingId,
    pub quiz_type: QuizType,
    pub summary_snapshot: Option<String>,
    /// In display order; the store assigns `order` from the position.
    pub questions: Vec<NewQuestion>,
}

/// A validated question ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub correct_answer_index: u8,
    /// In display order; the store assigns `order` from the position.
    pub answers: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct CreateAttemptParams {
    pub username: String,
    pub quiz_id: QuizId,
    pub score: u32,
    pub total_questions: u32,
}

#[derive(Clone, Debug)]
pub struct RecordEvaluationParams {
    pub username: String,
    pub meeting_id: MeetingId,
    pub total_score: u32,
    pub quiz_score: u32,
    pub participation_score: u32,
    pub quality_score: u32,
    pub strengths: String,
    pub weaknesses: String,
    pub tips: String,
    /// Replaces `User::score`.
    pub new_user_score: u32,
    /// Added to `User::credits`.
    pub credits_earned: u64,
}
