//! Grading of quiz submissions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::engine::QuizEngine;
use crate::error::QuizError;
use crate::model::{QuestionId, Quiz, QuizId};
use crate::report::GradeReport;
use crate::statistics::{is_passing, percentage, round2};
use crate::store::CreateAttemptParams;

/// One answer in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    /// Out-of-range indices are accepted and graded as wrong.
    pub selected_answer_index: i64,
}

/// Per-submission grading outcome, before anything is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub correct: u32,
    pub total: u32,
    pub correct_answers: Vec<u8>,
    pub user_answers: Vec<i64>,
}

/// Check the submission shape and count correct answers.
///
/// The submission must answer every question of the quiz exactly once.
pub fn grade(quiz: &Quiz, answers: &[SubmittedAnswer]) -> Result<Grade, QuizError> {
    if answers.len() != quiz.questions.len() {
        return Err(QuizError::Validation(format!(
            "expected {} answers for quiz {}, got {}",
            quiz.questions.len(),
            quiz.id,
            answers.len()
        )));
    }

    let mut seen = HashSet::with_capacity(answers.len());
    let mut grade = Grade {
        correct: 0,
        total: quiz.questions.len() as u32,
        correct_answers: Vec::with_capacity(answers.len()),
        user_answers: Vec::with_capacity(answers.len()),
    };

    for answer in answers {
        let question = quiz.question(answer.question_id).ok_or_else(|| {
            QuizError::Validation(format!(
                "question {} does not belong to quiz {}",
                answer.question_id, quiz.id
            ))
        })?;
        if !seen.insert(answer.question_id) {
            return Err(QuizError::Validation(format!(
                "question {} answered more than once",
                answer.question_id
            )));
        }

        if answer.selected_answer_index == question.correct_answer_index as i64 {
            grade.correct += 1;
        }
        grade.correct_answers.push(question.correct_answer_index);
        grade.user_answers.push(answer.selected_answer_index);
    }

    Ok(grade)
}

impl QuizEngine {
    /// Grade a submission and record it as a new attempt.
    pub async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        username: &str,
        answers: &[SubmittedAnswer],
    ) -> Result<GradeReport, QuizError> {
        let quiz = self.store.get_quiz(quiz_id).await?;
        self.store.get_user(username).await?;

        let grade = grade(&quiz, answers)?;
        let attempt = self
            .store
            .create_attempt(&CreateAttemptParams {
                username: username.to_string(),
                quiz_id,
                score: grade.correct,
                total_questions: grade.total,
            })
            .await?;

        let pct = percentage(grade.correct, grade.total);
        tracing::info!(
            quiz_id,
            username,
            attempt_id = attempt.id,
            score = grade.correct,
            total = grade.total,
            "quiz attempt recorded"
        );

        Ok(GradeReport {
            attempt_id: attempt.id,
            quiz_id,
            username: username.to_string(),
            score: grade.correct,
            total_questions: grade.total,
            percentage: round2(pct),
            passed: is_passing(pct),
            correct_answers: grade.correct_answers,
            user_answers: grade.user_answers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::model::QuizType;

    async fn intro_quiz() -> (QuizEngine, Quiz) {
        let (engine, _gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "Kickoff").await;
        seed_user(&engine, "bob").await;
        let quiz = engine
            .get_or_create_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap();
        (engine, quiz)
    }

    #[tokio::test]
    async fn all_correct_is_full_marks() {
        let (engine, quiz) = intro_quiz().await;
        let report = engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 5))
            .await
            .unwrap();

        assert_eq!(report.score, 5);
        assert_eq!(report.total_questions, 5);
        assert_eq!(report.percentage, 100.0);
        assert!(report.passed);
        assert_eq!(report.correct_answers.len(), 5);
        let selected: Vec<u8> = report.user_answers.iter().map(|i| *i as u8).collect();
        assert_eq!(selected, report.correct_answers);
    }

    #[tokio::test]
    async fn all_wrong_fails() {
        let (engine, quiz) = intro_quiz().await;
        let report = engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 0))
            .await
            .unwrap();
        assert_eq!(report.score, 0);
        assert_eq!(report.percentage, 0.0);
        assert!(!report.passed);
    }

    #[tokio::test]
    async fn three_of_five_passes_at_threshold() {
        let (engine, quiz) = intro_quiz().await;
        let report = engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 3))
            .await
            .unwrap();
        assert_eq!(report.percentage, 60.0);
        assert!(report.passed);

        let report = engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 2))
            .await
            .unwrap();
        assert!(!report.passed);
    }

    #[tokio::test]
    async fn wrong_answer_count_is_rejected() {
        let (engine, quiz) = intro_quiz().await;
        let mut answers = answers_with_correct(&quiz, 5);
        answers.pop();
        let err = engine
            .submit_attempt(quiz.id, "bob", &answers)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::Validation(_)));
        assert!(engine.list_attempts("bob", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_or_duplicate_question_is_rejected() {
        let (engine, quiz) = intro_quiz().await;

        let mut foreign = answers_with_correct(&quiz, 5);
        foreign[0].question_id = 9_999;
        assert!(matches!(
            engine.submit_attempt(quiz.id, "bob", &foreign).await,
            Err(QuizError::Validation(_))
        ));

        let mut duplicate = answers_with_correct(&quiz, 5);
        duplicate[1].question_id = duplicate[0].question_id;
        assert!(matches!(
            engine.submit_attempt(quiz.id, "bob", &duplicate).await,
            Err(QuizError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn out_of_range_index_counts_as_wrong() {
        let (engine, quiz) = intro_quiz().await;
        let mut answers = answers_with_correct(&quiz, 5);
        answers[4].selected_answer_index = 7;
        answers[3].selected_answer_index = -1;
        let report = engine.submit_attempt(quiz.id, "bob", &answers).await.unwrap();
        assert_eq!(report.score, 3);
        assert_eq!(report.user_answers[4], 7);
    }

    #[tokio::test]
    async fn unknown_quiz_or_user_is_not_found() {
        let (engine, quiz) = intro_quiz().await;
        let answers = answers_with_correct(&quiz, 5);
        assert!(matches!(
            engine.submit_attempt(quiz.id + 1, "bob", &answers).await,
            Err(QuizError::NotFound { entity: "quiz", .. })
        ));
        assert!(matches!(
            engine.submit_attempt(quiz.id, "mallory", &answers).await,
            Err(QuizError::NotFound { entity: "user", .. })
        ));
    }

    #[tokio::test]
    async fn grading_does_not_touch_quiz() {
        let (engine, quiz) = intro_quiz().await;
        engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 1))
            .await
            .unwrap();
        let stored = engine.get_quiz(quiz.id).await.unwrap();
        assert_eq!(stored.questions.len(), quiz.questions.len());
        for (a, b) in stored.questions.iter().zip(&quiz.questions) {
            assert_eq!(a.correct_answer_index, b.correct_answer_index);
        }
    }

    #[test]
    fn percentage_just_below_threshold_fails() {
        assert!(!is_passing(59.99));
        assert!(is_passing(60.0));
    }
}
