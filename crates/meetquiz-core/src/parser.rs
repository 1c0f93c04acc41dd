//! Generator payload parsing and structural validation.
//!
//! Parsing turns raw model text into typed payloads (`GeneratorError::Malformed`
//! on failure). Validation checks the counts and ranges a quiz must satisfy
//! before it may be persisted.

use serde::de::DeserializeOwned;

use crate::error::{GeneratorError, QuizError};
use crate::model::{ANSWERS_PER_QUESTION, QUESTIONS_PER_QUIZ};
use crate::store::NewQuestion;
use crate::traits::{
    extract_json_from_markdown, QuizPayload, TeamEvaluationPayload, UserEvaluationPayload,
};

/// Longest slice of a raw response echoed back in error messages.
const RAW_EXCERPT_CHARS: usize = 500;

/// Parse a quiz payload from model output.
pub fn parse_quiz_payload(raw: &str) -> Result<QuizPayload, GeneratorError> {
    parse_json_payload(raw, "quiz")
}

/// Parse a user evaluation payload from model output.
pub fn parse_user_evaluation_payload(raw: &str) -> Result<UserEvaluationPayload, GeneratorError> {
    parse_json_payload(raw, "user evaluation")
}

/// Parse a team evaluation payload from model output.
pub fn parse_team_evaluation_payload(raw: &str) -> Result<TeamEvaluationPayload, GeneratorError> {
    parse_json_payload(raw, "team evaluation")
}

/// Summaries are plain text; only emptiness is rejected.
pub fn parse_summary(raw: &str) -> Result<String, GeneratorError> {
    let summary = raw.trim();
    if summary.is_empty() {
        return Err(GeneratorError::Malformed("summary is empty".into()));
    }
    Ok(summary.to_string())
}

fn parse_json_payload<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, GeneratorError> {
    let json = extract_json_from_markdown(raw);
    serde_json::from_str(&json).map_err(|e| {
        GeneratorError::Malformed(format!(
            "failed to parse {what} response: {e}\nResponse: {}",
            excerpt(raw)
        ))
    })
}

fn excerpt(raw: &str) -> String {
    if raw.chars().count() <= RAW_EXCERPT_CHARS {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(RAW_EXCERPT_CHARS).collect();
        format!("{head}...")
    }
}

/// A structural problem found in a quiz payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadIssue {
    /// Zero-based question position, if the issue is question-specific.
    pub question: Option<usize>,
    pub message: String,
}

/// Collect every structural issue in a quiz payload.
pub fn quiz_payload_issues(payload: &QuizPayload) -> Vec<PayloadIssue> {
    let mut issues = Vec::new();

    if payload.questions.len() != QUESTIONS_PER_QUIZ {
        issues.push(PayloadIssue {
            question: None,
            message: format!(
                "expected {QUESTIONS_PER_QUIZ} questions, got {}",
                payload.questions.len()
            ),
        });
    }

    for (idx, q) in payload.questions.iter().enumerate() {
        if q.question_text.trim().is_empty() {
            issues.push(PayloadIssue {
                question: Some(idx),
                message: "question text is empty".into(),
            });
        }
        if q.answers.len() != ANSWERS_PER_QUESTION {
            issues.push(PayloadIssue {
                question: Some(idx),
                message: format!(
                    "expected {ANSWERS_PER_QUESTION} answers, got {}",
                    q.answers.len()
                ),
            });
        }
        if !(0..ANSWERS_PER_QUESTION as i64).contains(&q.correct_answer_index) {
            issues.push(PayloadIssue {
                question: Some(idx),
                message: format!(
                    "correct_answer_index {} is outside 0..={}",
                    q.correct_answer_index,
                    ANSWERS_PER_QUESTION - 1
                ),
            });
        }
    }

    issues
}

/// Validate a quiz payload and convert it into persistable questions.
pub fn validate_quiz_payload(payload: &QuizPayload) -> Result<Vec<NewQuestion>, QuizError> {
    let issues = quiz_payload_issues(payload);
    if !issues.is_empty() {
        let detail = issues
            .iter()
            .map(|i| match i.question {
                Some(q) => format!("question {q}: {}", i.message),
                None => i.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(QuizError::Validation(format!("invalid quiz payload: {detail}")));
    }

    Ok(payload
        .questions
        .iter()
        .map(|q| NewQuestion {
            text: q.question_text.trim().to_string(),
            correct_answer_index: q.correct_answer_index as u8,
            answers: q.answers.clone(),
        })
        .collect())
}
