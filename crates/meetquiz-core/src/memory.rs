//! In-memory `Store` backend with JSON snapshots.
//!
//! All state sits behind one `RwLock`, so every trait method is atomic with
//! respect to every other. Suitable for tests, demos, and the CLI, which takes
//! a [`StateLock`](crate::state_lock::StateLock), loads a snapshot, runs one
//! operation, and writes it back.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::*;
use crate::store::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Sequences {
    meeting: i64,
    user: i64,
    transcript: i64,
    quiz: i64,
    question: i64,
    answer: i64,
    attempt: i64,
    evaluation: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct State {
    #[serde(default)]
    sequences: Sequences,
    #[serde(default)]
    meetings: BTreeMap<MeetingId, Meeting>,
    #[serde(default)]
    users: BTreeMap<String, User>,
    #[serde(default)]
    transcripts: Vec<Transcript>,
    #[serde(default)]
    quizzes: BTreeMap<QuizId, Quiz>,
    #[serde(default)]
    attempts: Vec<QuizAttempt>,
    #[serde(default)]
    evaluations: Vec<UserEvaluation>,
}

impl State {
    fn meeting_mut(&mut self, id: MeetingId) -> Result<&mut Meeting, StoreError> {
        self.meetings
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("meeting", id))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot written by [`MemoryStore::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state from {}", path.display()))?;
        let state: State = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state file {}", path.display()))?;
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Load a snapshot, or start empty if the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_json(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the full state as pretty JSON.
    ///
    /// The snapshot goes to a temporary file next to `path` that then replaces
    /// it, so readers see either the old state or the new one.
    pub async fn save_json(&self, path: &Path) -> Result<()> {
        let json = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state).context("failed to serialize state")?
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .with_context(|| format!("failed to write state to {}", tmp.path().display()))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to write state to {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_meeting(&self, params: &CreateMeetingParams) -> Result<Meeting, StoreError> {
        let mut state = self.state.write().await;
        let meeting = Meeting {
            id: next(&mut state.sequences.meeting),
            name: params.name.clone(),
            description: params.description.clone(),
            summary: None,
            team_evaluation: None,
            created_at: Utc::now(),
        };
        state.meetings.insert(meeting.id, meeting.clone());
        Ok(meeting)
    }

    async fn get_meeting(&self, meeting_id: MeetingId) -> Result<Meeting, StoreError> {
        let state = self.state.read().await;
        state
            .meetings
            .get(&meeting_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("meeting", meeting_id))
    }

    async fn set_meeting_summary(
        &self,
        meeting_id: MeetingId,
        summary: &str,
    ) -> Result<Meeting, StoreError> {
        let mut state = self.state.write().await;
        let meeting = state.meeting_mut(meeting_id)?;
        meeting.summary = Some(summary.to_string());
        Ok(meeting.clone())
    }

    async fn set_team_evaluation(
        &self,
        meeting_id: MeetingId,
        evaluation: &TeamEvaluation,
    ) -> Result<Meeting, StoreError> {
        let mut state = self.state.write().await;
        let meeting = state.meeting_mut(meeting_id)?;
        meeting.team_evaluation = Some(evaluation.clone());
        Ok(meeting.clone())
    }

    async fn create_user(&self, username: &str) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(username) {
            return Err(StoreError::AlreadyExists(format!("user {username}")));
        }
        let user = User {
            id: next(&mut state.sequences.user),
            username: username.to_string(),
            score: 0,
            credits: 0,
        };
        state.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        let state = self.state.read().await;
        state
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", username))
    }

    async fn add_transcript(
        &self,
        params: &CreateTranscriptParams,
    ) -> Result<Transcript, StoreError> {
        let mut state = self.state.write().await;
        if !state.meetings.contains_key(&params.meeting_id) {
            return Err(StoreError::not_found("meeting", params.meeting_id));
        }
        if !state.users.contains_key(&params.username) {
            return Err(StoreError::not_found("user", &params.username));
        }
        let transcript = Transcript {
            id: next(&mut state.sequences.transcript),
            meeting_id: params.meeting_id,
            username: params.username.clone(),
            text: params.text.clone(),
            timestamp: params.timestamp,
            foul: params.foul,
        };
        state.transcripts.push(transcript.clone());
        Ok(transcript)
    }

    async fn list_transcripts(
        &self,
        meeting_id: MeetingId,
        username: Option<&str>,
    ) -> Result<Vec<Transcript>, StoreError> {
        let state = self.state.read().await;
        let mut transcripts: Vec<Transcript> = state
            .transcripts
            .iter()
            .filter(|t| t.meeting_id == meeting_id)
            .filter(|t| username.map_or(true, |u| t.username == u))
            .cloned()
            .collect();
        transcripts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(transcripts)
    }

    async fn find_quiz(
        &self,
        meeting_id: MeetingId,
        quiz_type: QuizType,
    ) -> Result<Option<Quiz>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .quizzes
            .values()
            .find(|q| q.meeting_id == meeting_id && q.quiz_type == quiz_type)
            .cloned())
    }

    async fn get_quiz(&self, quiz_id: QuizId) -> Result<Quiz, StoreError> {
        let state = self.state.read().await;
        state
            .quizzes
            .get(&quiz_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("quiz", quiz_id))
    }

    async fn create_quiz(&self, params: &CreateQuizParams) -> Result<Quiz, StoreError> {
        let mut state = self.state.write().await;
        if !state.meetings.contains_key(&params.meeting_id) {
            return Err(StoreError::not_found("meeting", params.meeting_id));
        }
        if state
            .quizzes
            .values()
            .any(|q| q.meeting_id == params.meeting_id && q.quiz_type == params.quiz_type)
        {
            return Err(StoreError::AlreadyExists(format!(
                "{} quiz for meeting {}",
                params.quiz_type, params.meeting_id
            )));
        }

        // Build everything before inserting so the quiz appears all at once
        let quiz_id = next(&mut state.sequences.quiz);
        let mut questions = Vec::with_capacity(params.questions.len());
        for (q_idx, new_question) in params.questions.iter().enumerate() {
            let question_id = next(&mut state.sequences.question);
            let mut answers = Vec::with_capacity(new_question.answers.len());
            for (a_idx, text) in new_question.answers.iter().enumerate() {
                answers.push(Answer {
                    id: next(&mut state.sequences.answer),
                    question_id,
                    text: text.clone(),
                    order: a_idx as u8,
                });
            }
            questions.push(Question {
                id: question_id,
                quiz_id,
                text: new_question.text.clone(),
                order: q_idx as u8,
                correct_answer_index: new_question.correct_answer_index,
                answers,
            });
        }

        let quiz = Quiz {
            id: quiz_id,
            meeting_id: params.meeting_id,
            quiz_type: params.quiz_type,
            summary_snapshot: params.summary_snapshot.clone(),
            generated_at: Utc::now(),
            questions,
        };
        state.quizzes.insert(quiz_id, quiz.clone());
        Ok(quiz)
    }

    async fn create_attempt(
        &self,
        params: &CreateAttemptParams,
    ) -> Result<QuizAttempt, StoreError> {
        let mut state = self.state.write().await;
        if !state.quizzes.contains_key(&params.quiz_id) {
            return Err(StoreError::not_found("quiz", params.quiz_id));
        }
        let attempt = QuizAttempt {
            id: next(&mut state.sequences.attempt),
            username: params.username.clone(),
            quiz_id: params.quiz_id,
            score: params.score,
            total_questions: params.total_questions,
            completed_at: Utc::now(),
        };
        state.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn list_attempts(
        &self,
        username: &str,
        quiz_id: Option<QuizId>,
    ) -> Result<Vec<QuizAttempt>, StoreError> {
        let state = self.state.read().await;
        let mut attempts: Vec<QuizAttempt> = state
            .attempts
            .iter()
            .filter(|a| a.username == username)
            .filter(|a| quiz_id.map_or(true, |id| a.quiz_id == id))
            .cloned()
            .collect();
        attempts.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(attempts)
    }

    async fn outro_meetings_attempted(
        &self,
        username: &str,
    ) -> Result<Vec<MeetingId>, StoreError> {
        let state = self.state.read().await;
        let mut meetings: Vec<MeetingId> = state
            .attempts
            .iter()
            .filter(|a| a.username == username)
            .filter_map(|a| state.quizzes.get(&a.quiz_id))
            .filter(|q| q.quiz_type == QuizType::Outro)
            .map(|q| q.meeting_id)
            .collect();
        meetings.sort_unstable();
        meetings.dedup();
        Ok(meetings)
    }

    async fn find_evaluation(
        &self,
        username: &str,
        meeting_id: MeetingId,
    ) -> Result<Option<UserEvaluation>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .iter()
            .find(|e| e.username == username && e.meeting_id == meeting_id)
            .cloned())
    }

    async fn list_evaluations(
        &self,
        meeting_id: MeetingId,
    ) -> Result<Vec<UserEvaluation>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .iter()
            .filter(|e| e.meeting_id == meeting_id)
            .cloned()
            .collect())
    }

    async fn record_evaluation(
        &self,
        params: &RecordEvaluationParams,
    ) -> Result<(UserEvaluation, User), StoreError> {
        let mut state = self.state.write().await;
        if !state.meetings.contains_key(&params.meeting_id) {
            return Err(StoreError::not_found("meeting", params.meeting_id));
        }
        if !state.users.contains_key(&params.username) {
            return Err(StoreError::not_found("user", &params.username));
        }
        if state
            .evaluations
            .iter()
            .any(|e| e.username == params.username && e.meeting_id == params.meeting_id)
        {
            return Err(StoreError::AlreadyExists(format!(
                "evaluation of {} for meeting {}",
                params.username, params.meeting_id
            )));
        }

        let evaluation = UserEvaluation {
            id: next(&mut state.sequences.evaluation),
            username: params.username.clone(),
            meeting_id: params.meeting_id,
            total_score: params.total_score,
            quiz_score: params.quiz_score,
            participation_score: params.participation_score,
            quality_score: params.quality_score,
            strengths: params.strengths.clone(),
            weaknesses: params.weaknesses.clone(),
            tips: params.tips.clone(),
            evaluated_at: Utc::now(),
        };

        // Checked above; both writes happen under the same guard
        let user = state
            .users
            .get_mut(&params.username)
            .ok_or_else(|| StoreError::not_found("user", &params.username))?;
        user.score = params.new_user_score;
        user.credits += params.credits_earned;
        let user = user.clone();

        state.evaluations.push(evaluation.clone());
        Ok((evaluation, user))
    }
}
