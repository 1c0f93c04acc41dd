//! Core data model types for meetquiz.
//!
//! Meetings and transcripts come from outside the engine. Quizzes, attempts,
//! and evaluations are produced by it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MeetingId = i64;
pub type QuizId = i64;
pub type QuestionId = i64;
pub type AttemptId = i64;

/// Number of questions every quiz carries.
pub const QUESTIONS_PER_QUIZ: usize = 5;
/// Number of answer options every question carries.
pub const ANSWERS_PER_QUESTION: usize = 4;

/// A meeting, with the fields the engine fills in over its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub name: String,
    pub description: String,
    /// Narrative summary generated from the transcripts.
    #[serde(default)]
    pub summary: Option<String>,
    /// Latest team-level evaluation.
    #[serde(default)]
    pub team_evaluation: Option<TeamEvaluation>,
    pub created_at: DateTime<Utc>,
}

/// Team-level evaluation stored on a meeting. Overwritten on every aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEvaluation {
    pub score: u32,
    pub strengths: String,
    pub weaknesses: String,
    pub tips: String,
    pub evaluated_at: DateTime<Utc>,
}

/// One transcribed utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub id: i64,
    pub meeting_id: MeetingId,
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Flagged as off-topic at capture time.
    #[serde(default)]
    pub foul: bool,
}

/// Quiz kind. Each meeting has at most one quiz of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    Intro,
    Outro,
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizType::Intro => write!(f, "intro"),
            QuizType::Outro => write!(f, "outro"),
        }
    }
}

impl FromStr for QuizType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intro" => Ok(QuizType::Intro),
            "outro" => Ok(QuizType::Outro),
            other => Err(format!("unknown quiz type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub meeting_id: MeetingId,
    pub quiz_type: QuizType,
    /// Copy of the meeting summary the outro quiz was generated from.
    #[serde(default)]
    pub summary_snapshot: Option<String>,
    pub generated_at: DateTime<Utc>,
    /// Ordered by `Question::order`.
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub text: String,
    pub order: u8,
    pub correct_answer_index: u8,
    /// Ordered by `Answer::order`.
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: QuestionId,
    pub text: String,
    pub order: u8,
}

/// One user's graded submission against a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: AttemptId,
    pub username: String,
    pub quiz_id: QuizId,
    /// Number of correct answers.
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

/// One-shot performance evaluation of a user in a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvaluation {
    pub id: i64,
    pub username: String,
    pub meeting_id: MeetingId,
    /// 0..=100, the sum of the three components.
    pub total_score: u32,
    /// 0..=30
    pub quiz_score: u32,
    /// 0..=20
    pub participation_score: u32,
    /// 0..=50
    pub quality_score: u32,
    pub strengths: String,
    pub weaknesses: String,
    pub tips: String,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Rolling average of evaluation totals.
    #[serde(default)]
    pub score: u32,
    /// Sum of all evaluation totals ever earned.
    #[serde(default)]
    pub credits: u64,
}
