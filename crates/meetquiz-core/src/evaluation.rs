//! Per-user performance evaluation.
//!
//! An evaluation combines three components into a 0-100 total:
//!
//! | component     | range | source                                   |
//! |---------------|-------|------------------------------------------|
//! | quiz          | 0-30  | latest outro quiz attempt                |
//! | participation | 0-20  | content generator, clamped               |
//! | quality       | 0-50  | content generator, clamped               |
//!
//! Evaluating is one-shot per (user, meeting). It also folds the total into the
//! user's rolling average score and adds it to their credits.

use crate::engine::{meeting_context, QuizEngine};
use crate::error::QuizError;
use crate::model::{MeetingId, QuizType};
use crate::report::EvaluationReport;
use crate::statistics::{
    clamp_component, percentage, quiz_component, rolling_average, round2,
    MAX_PARTICIPATION_SCORE, MAX_QUALITY_SCORE,
};
use crate::store::RecordEvaluationParams;
use crate::traits::UserEvaluationRequest;

impl QuizEngine {
    /// Evaluate `username`'s performance in a meeting.
    ///
    /// Requires the user to have spoken in the meeting and to have attempted its
    /// outro quiz. Fails with `Conflict` if the user was already evaluated.
    pub async fn evaluate_user(
        &self,
        meeting_id: MeetingId,
        username: &str,
    ) -> Result<EvaluationReport, QuizError> {
        // Serializes the conflict check and the rolling average update per user
        let _guard = self.user_locks.lock(username.to_string()).await;

        if self.store.find_evaluation(username, meeting_id).await?.is_some() {
            return Err(QuizError::Conflict(format!(
                "{username} already evaluated for meeting {meeting_id}"
            )));
        }

        let meeting = self.store.get_meeting(meeting_id).await?;
        let user = self.store.get_user(username).await?;

        let transcripts = self
            .store
            .list_transcripts(meeting_id, Some(username))
            .await?;
        if transcripts.is_empty() {
            return Err(QuizError::Validation(format!(
                "{username} has no transcripts in meeting {meeting_id}"
            )));
        }
        let total_count = transcripts.len() as u32;
        let foul_count = transcripts.iter().filter(|t| t.foul).count() as u32;

        let outro = self
            .store
            .find_quiz(meeting_id, QuizType::Outro)
            .await?
            .ok_or_else(|| {
                QuizError::Validation(format!("meeting {meeting_id} has no outro quiz"))
            })?;

        // Newest first, so the first one is the attempt that counts
        let attempt = self
            .store
            .list_attempts(username, Some(outro.id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                QuizError::Validation(format!("{username} has not completed the outro quiz"))
            })?;

        let quiz_percentage = percentage(attempt.score, attempt.total_questions);
        let quiz_score = quiz_component(attempt.score, attempt.total_questions);

        let request = UserEvaluationRequest {
            username: username.to_string(),
            meeting: meeting_context(&meeting),
            transcripts: transcripts.into_iter().map(|t| t.text).collect(),
            foul_count,
            total_count,
            quiz_percentage,
        };
        let payload = self
            .call_generator(
                "generate_user_evaluation",
                meeting_id,
                self.generator.generate_user_evaluation(&request),
            )
            .await?;

        let participation_score =
            clamp_component(payload.participation_score, MAX_PARTICIPATION_SCORE);
        let quality_score = clamp_component(payload.quality_score, MAX_QUALITY_SCORE);
        if participation_score as f64 != payload.participation_score.trunc()
            || quality_score as f64 != payload.quality_score.trunc()
        {
            tracing::warn!(
                meeting_id,
                username,
                raw_participation = payload.participation_score,
                raw_quality = payload.quality_score,
                "generator scores out of range, clamped"
            );
        }
        let total_score = quiz_score + participation_score + quality_score;

        let meetings_attended = self
            .store
            .outro_meetings_attempted(username)
            .await?
            .into_iter()
            .filter(|id| *id != meeting_id)
            .count() as u32
            + 1;
        let new_user_score = rolling_average(user.score, meetings_attended, total_score);

        let (evaluation, user) = self
            .store
            .record_evaluation(&RecordEvaluationParams {
                username: username.to_string(),
                meeting_id,
                total_score,
                quiz_score,
                participation_score,
                quality_score,
                strengths: payload.strengths,
                weaknesses: payload.weaknesses,
                tips: payload.tips,
                new_user_score,
                credits_earned: total_score as u64,
            })
            .await?;

        tracing::info!(
            meeting_id,
            username,
            total_score,
            quiz_score,
            participation_score,
            quality_score,
            meetings_attended,
            new_user_score,
            "user evaluated"
        );

        Ok(EvaluationReport {
            evaluation_id: evaluation.id,
            username: evaluation.username,
            meeting_id,
            total_score,
            quiz_score,
            participation_score,
            quality_score,
            quiz_percentage: round2(quiz_percentage),
            transcript_count: total_count,
            foul_count,
            strengths: evaluation.strengths,
            weaknesses: evaluation.weaknesses,
            tips: evaluation.tips,
            meetings_attended,
            updated_user_score: user.score,
            credits_earned: total_score as u64,
            total_credits: user.credits,
            evaluated_at: evaluation.evaluated_at,
        })
    }
}
