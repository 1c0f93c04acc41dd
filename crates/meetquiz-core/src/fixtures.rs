//! Shared test fixtures: a scripted content generator and seeding helpers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::engine::{EngineConfig, QuizEngine};
use crate::error::GeneratorError;
use crate::grading::SubmittedAnswer;
use crate::memory::MemoryStore;
use crate::model::{Meeting, MeetingId, Quiz};
use crate::store::{CreateMeetingParams, CreateTranscriptParams};
use crate::traits::*;

pub fn valid_quiz_payload() -> QuizPayload {
    QuizPayload {
        questions: (0..5)
            .map(|i| QuestionPayload {
                question_text: format!("Question {i}?"),
                answers: (0..4).map(|a| format!("Answer {i}.{a}")).collect(),
                correct_answer_index: i % 4,
            })
            .collect(),
    }
}

/// Generator with canned responses that records how often each operation ran.
pub struct FakeGenerator {
    calls: Mutex<Vec<&'static str>>,
    quiz: Mutex<QuizPayload>,
    summary: Mutex<String>,
    scores: Mutex<(f64, f64)>,
    transport_failure: Mutex<Option<String>>,
    delay: Mutex<Duration>,
    pub last_user_request: Mutex<Option<UserEvaluationRequest>>,
    pub last_team_request: Mutex<Option<TeamEvaluationRequest>>,
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            quiz: Mutex::new(valid_quiz_payload()),
            summary: Mutex::new("• The team agreed on the roadmap".into()),
            scores: Mutex::new((15.0, 40.0)),
            transport_failure: Mutex::new(None),
            delay: Mutex::new(Duration::ZERO),
            last_user_request: Mutex::new(None),
            last_team_request: Mutex::new(None),
        }
    }
}

impl FakeGenerator {
    pub fn with_scores(participation: f64, quality: f64) -> Self {
        let gen = Self::default();
        *gen.scores.lock().unwrap() = (participation, quality);
        gen
    }

    pub fn with_quiz(payload: QuizPayload) -> Self {
        let gen = Self::default();
        *gen.quiz.lock().unwrap() = payload;
        gen
    }

    pub fn with_delay(delay: Duration) -> Self {
        let gen = Self::default();
        *gen.delay.lock().unwrap() = delay;
        gen
    }

    pub fn set_scores(&self, participation: f64, quality: f64) {
        *self.scores.lock().unwrap() = (participation, quality);
    }

    pub fn set_summary(&self, summary: &str) {
        *self.summary.lock().unwrap() = summary.to_string();
    }

    pub fn fail_with(&self, message: &str) {
        *self.transport_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    async fn enter(&self, operation: &'static str) -> Result<(), GeneratorError> {
        self.calls.lock().unwrap().push(operation);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.transport_failure.lock().unwrap().clone() {
            Some(msg) => Err(GeneratorError::Transport(msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate_intro_quiz(
        &self,
        _meeting: &MeetingContext,
    ) -> Result<QuizPayload, GeneratorError> {
        self.enter("intro").await?;
        Ok(self.quiz.lock().unwrap().clone())
    }

    async fn generate_summary(
        &self,
        _meeting: &MeetingContext,
        _transcripts: &[TranscriptLine],
    ) -> Result<String, GeneratorError> {
        self.enter("summary").await?;
        Ok(self.summary.lock().unwrap().clone())
    }

    async fn generate_outro_quiz(
        &self,
        _meeting: &MeetingContext,
        _summary: &str,
    ) -> Result<QuizPayload, GeneratorError> {
        self.enter("outro").await?;
        Ok(self.quiz.lock().unwrap().clone())
    }

    async fn generate_user_evaluation(
        &self,
        request: &UserEvaluationRequest,
    ) -> Result<UserEvaluationPayload, GeneratorError> {
        self.enter("user_evaluation").await?;
        *self.last_user_request.lock().unwrap() = Some(request.clone());
        let (participation, quality) = *self.scores.lock().unwrap();
        Ok(UserEvaluationPayload {
            strengths: format!("{} stayed on topic", request.username),
            weaknesses: "Spoke rarely".into(),
            tips: "Ask more questions".into(),
            participation_score: participation,
            quality_score: quality,
        })
    }

    async fn generate_team_evaluation(
        &self,
        request: &TeamEvaluationRequest,
    ) -> Result<TeamEvaluationPayload, GeneratorError> {
        self.enter("team_evaluation").await?;
        *self.last_team_request.lock().unwrap() = Some(request.clone());
        Ok(TeamEvaluationPayload {
            team_strengths: "Clear decisions".into(),
            team_weaknesses: "Uneven participation".into(),
            team_tips: "Rotate the facilitator".into(),
        })
    }
}

pub fn engine_with(generator: FakeGenerator) -> (QuizEngine, Arc<FakeGenerator>) {
    let generator = Arc::new(generator);
    let engine = QuizEngine::new(
        Arc::new(MemoryStore::new()),
        generator.clone(),
        EngineConfig::default(),
    );
    (engine, generator)
}

pub async fn seed_meeting(engine: &QuizEngine, name: &str) -> Meeting {
    engine
        .store()
        .create_meeting(&CreateMeetingParams {
            name: name.into(),
            description: format!("{name} description"),
        })
        .await
        .unwrap()
}

pub async fn seed_user(engine: &QuizEngine, username: &str) {
    engine.store().create_user(username).await.unwrap();
}

pub async fn seed_transcript(
    engine: &QuizEngine,
    meeting_id: MeetingId,
    username: &str,
    minute: i64,
    foul: bool,
) {
    let base = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
    engine
        .store()
        .add_transcript(&CreateTranscriptParams {
            meeting_id,
            username: username.into(),
            text: format!("{username} at minute {minute}"),
            timestamp: base + chrono::Duration::minutes(minute),
            foul,
        })
        .await
        .unwrap();
}

/// Answers with the first `correct` questions right and the rest wrong.
pub fn answers_with_correct(quiz: &Quiz, correct: usize) -> Vec<SubmittedAnswer> {
    quiz.questions
        .iter()
        .enumerate()
        .map(|(i, q)| SubmittedAnswer {
            question_id: q.id,
            selected_answer_index: if i < correct {
                q.correct_answer_index as i64
            } else {
                (q.correct_answer_index as i64 + 1) % 4
            },
        })
        .collect()
}
