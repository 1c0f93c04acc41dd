//! Meeting summaries generated from transcripts.

use crate::engine::{meeting_context, QuizEngine};
use crate::error::QuizError;
use crate::model::{MeetingId, QuizType};
use crate::report::MeetingSummaryView;
use crate::traits::TranscriptLine;

impl QuizEngine {
    /// Return the meeting's summary, generating and storing it on first request.
    pub async fn get_or_create_summary(&self, meeting_id: MeetingId) -> Result<String, QuizError> {
        let meeting = self.store.get_meeting(meeting_id).await?;
        if let Some(summary) = meeting.summary {
            return Ok(summary);
        }

        let _guard = self.summary_locks.lock(meeting_id).await;

        let meeting = self.store.get_meeting(meeting_id).await?;
        if let Some(summary) = meeting.summary {
            return Ok(summary);
        }

        let transcripts = self.store.list_transcripts(meeting_id, None).await?;
        if transcripts.is_empty() {
            return Err(QuizError::Validation(format!(
                "meeting {meeting_id} has no transcripts to summarize"
            )));
        }

        let lines: Vec<TranscriptLine> = transcripts
            .into_iter()
            .map(|t| TranscriptLine {
                username: t.username,
                text: t.text,
                timestamp: t.timestamp,
            })
            .collect();

        let context = meeting_context(&meeting);
        let summary = self
            .call_generator(
                "generate_summary",
                meeting_id,
                self.generator.generate_summary(&context, &lines),
            )
            .await?;

        let summary = summary.trim().to_string();
        if summary.is_empty() {
            return Err(QuizError::Validation(format!(
                "generate_summary returned an empty summary for meeting {meeting_id}"
            )));
        }

        self.store.set_meeting_summary(meeting_id, &summary).await?;
        tracing::info!(meeting_id, transcripts = lines.len(), "meeting summary stored");
        Ok(summary)
    }

    /// Summary status of a meeting without generating anything.
    pub async fn meeting_summary(
        &self,
        meeting_id: MeetingId,
    ) -> Result<MeetingSummaryView, QuizError> {
        let meeting = self.store.get_meeting(meeting_id).await?;
        let outro = self.store.find_quiz(meeting_id, QuizType::Outro).await?;
        Ok(MeetingSummaryView {
            meeting_id,
            meeting_name: meeting.name,
            summary: meeting.summary,
            generated_at: outro.as_ref().map(|q| q.generated_at),
            has_outro_quiz: outro.is_some(),
        })
    }
}
