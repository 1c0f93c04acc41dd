//! Outcome types returned by engine operations.
//!
//! These are what a transport layer would serialize back to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AttemptId, MeetingId, Quiz, QuizId, QuizType, QuestionId};

/// A quiz as shown to participants: no correct answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizView {
    pub id: QuizId,
    pub meeting_id: MeetingId,
    pub quiz_type: QuizType,
    pub generated_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub order: u8,
    pub answers: Vec<String>,
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            meeting_id: quiz.meeting_id,
            quiz_type: quiz.quiz_type,
            generated_at: quiz.generated_at,
            questions: quiz
                .questions
                .iter()
                .map(|q| QuestionView {
                    id: q.id,
                    text: q.text.clone(),
                    order: q.order,
                    answers: q.answers.iter().map(|a| a.text.clone()).collect(),
                })
                .collect(),
        }
    }
}

/// Result of grading one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub attempt_id: AttemptId,
    pub quiz_id: QuizId,
    pub username: String,
    pub score: u32,
    pub total_questions: u32,
    /// Rounded to two decimals.
    pub percentage: f64,
    pub passed: bool,
    /// Correct index per submitted answer, in submission order.
    pub correct_answers: Vec<u8>,
    /// Submitted index per answer, in submission order.
    pub user_answers: Vec<i64>,
}

/// Full breakdown of a user evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation_id: i64,
    pub username: String,
    pub meeting_id: MeetingId,
    pub total_score: u32,
    pub quiz_score: u32,
    pub participation_score: u32,
    pub quality_score: u32,
    pub quiz_percentage: f64,
    pub transcript_count: u32,
    pub foul_count: u32,
    pub strengths: String,
    pub weaknesses: String,
    pub tips: String,
    pub meetings_attended: u32,
    /// The user's rolling average after this evaluation.
    pub updated_user_score: u32,
    pub credits_earned: u64,
    pub total_credits: u64,
    pub evaluated_at: DateTime<Utc>,
}

/// Team-level aggregation of a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamReport {
    pub meeting_id: MeetingId,
    pub meeting_name: String,
    pub participant_count: usize,
    pub avg_evaluation_score: u32,
    pub avg_quiz_score: u32,
    pub avg_participation_score: u32,
    pub avg_quality_score: u32,
    pub team_strengths: String,
    pub team_weaknesses: String,
    pub team_tips: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Read-only summary status of a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummaryView {
    pub meeting_id: MeetingId,
    pub meeting_name: String,
    pub summary: Option<String>,
    /// When the outro quiz was generated, if it exists.
    pub generated_at: Option<DateTime<Utc>>,
    pub has_outro_quiz: bool,
}
