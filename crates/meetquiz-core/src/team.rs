//! Team-level aggregation of a meeting's individual evaluations.

use chrono::Utc;

use crate::engine::{meeting_context, QuizEngine};
use crate::error::QuizError;
use crate::model::{MeetingId, TeamEvaluation};
use crate::report::TeamReport;
use crate::statistics::team_averages;
use crate::traits::{AnonymizedEvaluation, TeamEvaluationRequest};

impl QuizEngine {
    /// Aggregate every individual evaluation of the meeting and overwrite the
    /// meeting's team evaluation.
    ///
    /// Not idempotent: each call regenerates the team feedback from the current
    /// set of evaluations.
    pub async fn evaluate_team(&self, meeting_id: MeetingId) -> Result<TeamReport, QuizError> {
        let meeting = self.store.get_meeting(meeting_id).await?;
        let evaluations = self.store.list_evaluations(meeting_id).await?;

        let averages = team_averages(&evaluations).ok_or_else(|| {
            QuizError::Validation(format!(
                "meeting {meeting_id} has no individual evaluations yet"
            ))
        })?;

        let request = TeamEvaluationRequest {
            meeting: meeting_context(&meeting),
            participant_count: averages.participant_count,
            evaluations: evaluations
                .into_iter()
                .map(|e| AnonymizedEvaluation {
                    total_score: e.total_score,
                    quiz_score: e.quiz_score,
                    participation_score: e.participation_score,
                    quality_score: e.quality_score,
                    strengths: e.strengths,
                    weaknesses: e.weaknesses,
                    tips: e.tips,
                })
                .collect(),
        };
        let payload = self
            .call_generator(
                "generate_team_evaluation",
                meeting_id,
                self.generator.generate_team_evaluation(&request),
            )
            .await?;

        let team = TeamEvaluation {
            score: averages.total_score,
            strengths: payload.team_strengths,
            weaknesses: payload.team_weaknesses,
            tips: payload.team_tips,
            evaluated_at: Utc::now(),
        };
        let meeting = self.store.set_team_evaluation(meeting_id, &team).await?;

        tracing::info!(
            meeting_id,
            participants = averages.participant_count,
            avg_score = averages.total_score,
            "team evaluation stored"
        );

        Ok(TeamReport {
            meeting_id,
            meeting_name: meeting.name,
            participant_count: averages.participant_count,
            avg_evaluation_score: averages.total_score,
            avg_quiz_score: averages.quiz_score,
            avg_participation_score: averages.participation_score,
            avg_quality_score: averages.quality_score,
            team_strengths: team.strengths,
            team_weaknesses: team.weaknesses,
            team_tips: team.tips,
            evaluated_at: team.evaluated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::QuizEngine;
    use crate::error::QuizError;
    use crate::fixtures::*;
    use crate::model::{MeetingId, QuizType};

    /// Evaluate `username` in the meeting so their total comes out as
    /// 30 (quiz) + `participation` + `quality`.
    async fn evaluate(
        engine: &QuizEngine,
        gen: &FakeGenerator,
        meeting_id: MeetingId,
        username: &str,
        participation: f64,
        quality: f64,
    ) {
        seed_user(engine, username).await;
        seed_transcript(engine, meeting_id, username, 0, false).await;
        let quiz = engine
            .get_or_create_quiz(meeting_id, QuizType::Outro)
            .await
            .unwrap();
        engine
            .submit_attempt(quiz.id, username, &answers_with_correct(&quiz, 5))
            .await
            .unwrap();
        gen.set_scores(participation, quality);
        engine.evaluate_user(meeting_id, username).await.unwrap();
    }

    #[tokio::test]
    async fn averages_follow_new_evaluations() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "All hands").await;

        evaluate(&engine, &gen, meeting.id, "alice", 20.0, 40.0).await; // 90
        evaluate(&engine, &gen, meeting.id, "bob", 10.0, 30.0).await; // 70
        evaluate(&engine, &gen, meeting.id, "carol", 15.0, 35.0).await; // 80

        let report = engine.evaluate_team(meeting.id).await.unwrap();
        assert_eq!(report.participant_count, 3);
        assert_eq!(report.avg_evaluation_score, 80);
        assert_eq!(report.avg_quiz_score, 30);
        assert_eq!(report.avg_participation_score, 15);
        assert_eq!(report.avg_quality_score, 35);
        assert_eq!(report.meeting_name, "All hands");

        evaluate(&engine, &gen, meeting.id, "dave", 5.0, 25.0).await; // 60

        let report = engine.evaluate_team(meeting.id).await.unwrap();
        assert_eq!(report.participant_count, 4);
        assert_eq!(report.avg_evaluation_score, 75);
        assert_eq!(gen.calls("team_evaluation"), 2);

        let stored = engine.store().get_meeting(meeting.id).await.unwrap();
        let team = stored.team_evaluation.unwrap();
        assert_eq!(team.score, 75);
        assert_eq!(team.tips, "Rotate the facilitator");
    }

    #[tokio::test]
    async fn request_is_anonymized() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "All hands").await;
        evaluate(&engine, &gen, meeting.id, "alice", 20.0, 40.0).await;

        engine.evaluate_team(meeting.id).await.unwrap();

        let request = gen.last_team_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.participant_count, 1);
        assert_eq!(request.evaluations.len(), 1);
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("\"username\""));
        assert_eq!(request.evaluations[0].total_score, 90);
    }

    #[tokio::test]
    async fn no_evaluations_is_validation_error() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "Empty").await;

        let err = engine.evaluate_team(meeting.id).await.unwrap_err();
        assert!(matches!(err, QuizError::Validation(_)));
        assert_eq!(gen.calls("team_evaluation"), 0);
    }

    #[tokio::test]
    async fn generator_failure_keeps_previous_team_evaluation() {
        let (engine, gen) = engine_with(FakeGenerator::default());
        let meeting = seed_meeting(&engine, "All hands").await;
        evaluate(&engine, &gen, meeting.id, "alice", 20.0, 40.0).await;
        let first = engine.evaluate_team(meeting.id).await.unwrap();

        gen.fail_with("connection reset");
        let err = engine.evaluate_team(meeting.id).await.unwrap_err();
        assert_eq!(err.kind(), "upstream");

        let stored = engine.store().get_meeting(meeting.id).await.unwrap();
        assert_eq!(
            stored.team_evaluation.unwrap().evaluated_at,
            first.evaluated_at
        );
    }
}
