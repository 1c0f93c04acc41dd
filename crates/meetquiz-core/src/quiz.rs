//! Quiz lifecycle: get-or-create intro/outro quizzes, quiz lookup, attempt history.

use crate::engine::{meeting_context, QuizEngine};
use crate::error::{QuizError, StoreError};
use crate::model::{MeetingId, Quiz, QuizAttempt, QuizId, QuizType};
use crate::parser::validate_quiz_payload;
use crate::store::CreateQuizParams;

impl QuizEngine {
    /// Return the meeting's quiz of `quiz_type`, generating it on first request.
    ///
    /// An outro quiz needs the meeting summary, which is generated first if the
    /// meeting has none yet.
    pub async fn get_or_create_quiz(
        &self,
        meeting_id: MeetingId,
        quiz_type: QuizType,
    ) -> Result<Quiz, QuizError> {
        if let Some(quiz) = self.store.find_quiz(meeting_id, quiz_type).await? {
            tracing::debug!(meeting_id, %quiz_type, quiz_id = quiz.id, "quiz already exists");
            return Ok(quiz);
        }

        let _guard = self.quiz_locks.lock((meeting_id, quiz_type)).await;

        // Another request may have created it while we waited
        if let Some(quiz) = self.store.find_quiz(meeting_id, quiz_type).await? {
            return Ok(quiz);
        }

        let meeting = self.store.get_meeting(meeting_id).await?;
        let context = meeting_context(&meeting);

        let (payload, summary_snapshot) = match quiz_type {
            QuizType::Intro => {
                let payload = self
                    .call_generator(
                        "generate_intro_quiz",
                        meeting_id,
                        self.generator.generate_intro_quiz(&context),
                    )
                    .await?;
                (payload, None)
            }
            QuizType::Outro => {
                let summary = self.get_or_create_summary(meeting_id).await?;
                let payload = self
                    .call_generator(
                        "generate_outro_quiz",
                        meeting_id,
                        self.generator.generate_outro_quiz(&context, &summary),
                    )
                    .await?;
                (payload, Some(summary))
            }
        };

        let questions = validate_quiz_payload(&payload)?;

        let params = CreateQuizParams {
            meeting_id,
            quiz_type,
            summary_snapshot,
            questions,
        };
        match self.store.create_quiz(&params).await {
            Ok(quiz) => {
                tracing::info!(meeting_id, %quiz_type, quiz_id = quiz.id, "quiz created");
                Ok(quiz)
            }
            // Lost a race against another process; theirs is the quiz
            Err(StoreError::AlreadyExists(_)) => self
                .store
                .find_quiz(meeting_id, quiz_type)
                .await?
                .ok_or_else(|| {
                    QuizError::not_found("quiz", format!("{quiz_type} for meeting {meeting_id}"))
                }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_quiz(&self, quiz_id: QuizId) -> Result<Quiz, QuizError> {
        Ok(self.store.get_quiz(quiz_id).await?)
    }

    /// A user's attempts, newest first, optionally restricted to one quiz.
    pub async fn list_attempts(
        &self,
        username: &str,
        quiz_id: Option<QuizId>,
    ) -> Result<Vec<QuizAttempt>, QuizError> {
        Ok(self.store.list_attempts(username, quiz_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::error::QuizError;
    use crate::fixtures::*;
    use crate::model::{QuizType, ANSWERS_PER_QUESTION, QUESTIONS_PER_QUIZ};

    #[tokio::test]
    async fn intro_quiz_is_created_once() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "Planning").await;

        let first = engine
            .get_or_create_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap();
        let second = engine
            .get_or_create_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(gen.calls("intro"), 1);
        assert_eq!(first.questions.len(), QUESTIONS_PER_QUIZ);
        for q in &first.questions {
            assert_eq!(q.answers.len(), ANSWERS_PER_QUESTION);
            assert!(q.correct_answer_index <= 3);
        }
        assert!(first.summary_snapshot.is_none());
    }

    #[tokio::test]
    async fn concurrent_requests_generate_once() {
        let (engine, gen) = engine_with(FakeGenerator::with_delay(Duration::from_millis(20)));
        let engine = Arc::new(engine);
        let meeting = seed_meeting(&engine, "Planning").await;

        let requests = (0..5).map(|_| {
            let engine = Arc::clone(&engine);
            async move { engine.get_or_create_quiz(meeting.id, QuizType::Intro).await }
        });
        let quizzes = futures::future::join_all(requests).await;

        let ids: Vec<i64> = quizzes.into_iter().map(|q| q.unwrap().id).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(gen.calls("intro"), 1);
    }

    #[tokio::test]
    async fn unknown_meeting_is_not_found() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let err = engine
            .get_or_create_quiz(99, QuizType::Intro)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::NotFound { entity: "meeting", .. }));
        assert_eq!(gen.calls("intro"), 0);
    }

    #[tokio::test]
    async fn malformed_quiz_is_rejected_and_not_persisted() {
        let mut payload = valid_quiz_payload();
        payload.questions[1].answers.pop();
        let (engine, _gen) = engine_with(FakeGenerator::with_quiz(payload));
        let meeting = seed_meeting(&engine, "Planning").await;

        let err = engine
            .get_or_create_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::Validation(_)));
        assert!(engine
            .store()
            .find_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn outro_quiz_generates_summary_first() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "Retro").await;
        seed_user(&engine, "alice").await;
        seed_transcript(&engine, meeting.id, "alice", 0, false).await;

        let quiz = engine
            .get_or_create_quiz(meeting.id, QuizType::Outro)
            .await
            .unwrap();

        assert_eq!(gen.calls("summary"), 1);
        assert_eq!(gen.calls("outro"), 1);
        let stored = engine.store().get_meeting(meeting.id).await.unwrap();
        assert_eq!(quiz.summary_snapshot, stored.summary);
        assert!(quiz.summary_snapshot.is_some());
    }

    #[tokio::test]
    async fn outro_quiz_reuses_existing_summary() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "Retro").await;
        engine
            .store()
            .set_meeting_summary(meeting.id, "• already summarized")
            .await
            .unwrap();

        let quiz = engine
            .get_or_create_quiz(meeting.id, QuizType::Outro)
            .await
            .unwrap();
        assert_eq!(gen.calls("summary"), 0);
        assert_eq!(quiz.summary_snapshot.as_deref(), Some("• already summarized"));
    }

    #[tokio::test]
    async fn outro_without_transcripts_fails_validation() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "Empty").await;
        let err = engine
            .get_or_create_quiz(meeting.id, QuizType::Outro)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::Validation(_)));
        assert_eq!(gen.calls("outro"), 0);
    }

    #[tokio::test]
    async fn generator_failure_leaves_no_quiz() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        gen.fail_with("HTTP 503");
        let meeting = seed_meeting(&engine, "Planning").await;

        let err = engine
            .get_or_create_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "upstream");
        assert!(err.to_string().contains("generate_intro_quiz"));
        assert!(engine
            .store()
            .find_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn get_quiz_and_attempt_history() {
        let (engine, _gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "Planning").await;
        seed_user(&engine, "bob").await;
        let quiz = engine
            .get_or_create_quiz(meeting.id, QuizType::Intro)
            .await
            .unwrap();

        assert_eq!(engine.get_quiz(quiz.id).await.unwrap().id, quiz.id);
        assert!(matches!(
            engine.get_quiz(quiz.id + 100).await.unwrap_err(),
            QuizError::NotFound { .. }
        ));

        engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 2))
            .await
            .unwrap();
        engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 5))
            .await
            .unwrap();

        let attempts = engine.list_attempts("bob", Some(quiz.id)).await.unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].score, 5);
        assert!(engine.list_attempts("alice", None).await.unwrap().is_empty());
    }
}
