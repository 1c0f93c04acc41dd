//! Prompt templates for each content generator operation.
//!
//! Each prompt opens with a fixed lead sentence; the mock provider keys its
//! canned answers on these.

use meetquiz_core::traits::{
    MeetingContext, TeamEvaluationRequest, TranscriptLine, UserEvaluationRequest,
};

pub const SYSTEM_PROMPT: &str = "You are an assistant that helps teams run effective meetings. \
Follow the requested output format exactly.";

pub const INTRO_QUIZ_LEAD: &str = "You are creating a pre-meeting quiz";
pub const SUMMARY_LEAD: &str = "You are creating a concise summary of a meeting";
pub const OUTRO_QUIZ_LEAD: &str = "You are creating a post-meeting quiz";
pub const USER_EVALUATION_LEAD: &str = "You are evaluating one participant";
pub const TEAM_EVALUATION_LEAD: &str = "You are evaluating a team";

const QUIZ_SHAPE: &str = r#"Return ONLY a JSON object with this exact structure (no markdown, no explanation):
{
  "questions": [
    {
      "question_text": "...",
      "correct_answer_index": 0,
      "answers": ["Answer 1", "Answer 2", "Answer 3", "Answer 4"]
    }
  ]
}"#;

fn header(meeting: &MeetingContext) -> String {
    format!(
        "Meeting Name: {}\nMeeting Description: {}",
        meeting.name, meeting.description
    )
}

pub fn intro_quiz(meeting: &MeetingContext) -> String {
    format!(
        "{INTRO_QUIZ_LEAD} to prepare participants.\n\n\
         {}\n\n\
         Create exactly 5 multiple-choice questions that help participants prepare for this meeting.\n\
         Each question must have exactly 4 answer options and correct_answer_index between 0 and 3.\n\n\
         {QUIZ_SHAPE}\n\n\
         Make questions relevant, educational, and varied in difficulty.",
        header(meeting)
    )
}

pub fn summary(meeting: &MeetingContext, transcripts: &[TranscriptLine]) -> String {
    let transcript_text = transcripts
        .iter()
        .map(TranscriptLine::render)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{SUMMARY_LEAD}.\n\n\
         {}\n\n\
         Meeting Transcripts:\n{transcript_text}\n\n\
         Based on the transcripts above, write 5-7 bullet points covering the main topics, \
         key decisions, and important takeaways.\n\
         Return ONLY the bullet points as plain text, one per line, each starting with \"• \".",
        header(meeting)
    )
}

pub fn outro_quiz(meeting: &MeetingContext, summary: &str) -> String {
    format!(
        "{OUTRO_QUIZ_LEAD} to test participant understanding.\n\n\
         {}\n\n\
         Meeting Summary:\n{summary}\n\n\
         Based on the summary above, create exactly 5 multiple-choice questions about what was discussed.\n\
         Each question must have exactly 4 answer options and correct_answer_index between 0 and 3.\n\n\
         {QUIZ_SHAPE}\n\n\
         Make questions specific to the actual content of the meeting.",
        header(meeting)
    )
}

pub fn user_evaluation(request: &UserEvaluationRequest) -> String {
    let transcripts = request
        .transcripts
        .iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{USER_EVALUATION_LEAD} of a meeting.\n\n\
         {}\n\
         Participant: {}\n\n\
         Their contributions:\n{transcripts}\n\n\
         Statistics:\n\
         - Contributions: {}\n\
         - Off-topic contributions: {}\n\
         - Post-meeting quiz result: {:.1}%\n\n\
         Score participation from 0 to 20 (how actively they took part) and quality from 0 to 50 \
         (relevance and usefulness; off-topic contributions lower it).\n\n\
         Return ONLY a JSON object with this exact structure (no markdown, no explanation):\n\
         {{\"strengths\": \"...\", \"weaknesses\": \"...\", \"tips\": \"...\", \
         \"participation_score\": 0, \"quality_score\": 0}}",
        header(&request.meeting),
        request.username,
        request.total_count,
        request.foul_count,
        request.quiz_percentage,
    )
}

pub fn team_evaluation(request: &TeamEvaluationRequest) -> String {
    let evaluations = request
        .evaluations
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "Participant {}: total {}/100 (quiz {}/30, participation {}/20, quality {}/50)\n  \
                 Strengths: {}\n  Weaknesses: {}\n  Tips: {}",
                i + 1,
                e.total_score,
                e.quiz_score,
                e.participation_score,
                e.quality_score,
                e.strengths,
                e.weaknesses,
                e.tips
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{TEAM_EVALUATION_LEAD} based on its members' individual meeting evaluations.\n\n\
         {}\n\
         Participants: {}\n\n\
         Individual evaluations:\n{evaluations}\n\n\
         Describe the team as a whole, not individuals.\n\n\
         Return ONLY a JSON object with this exact structure (no markdown, no explanation):\n\
         {{\"team_strengths\": \"...\", \"team_weaknesses\": \"...\", \"team_tips\": \"...\"}}",
        header(&request.meeting),
        request.participant_count,
    )
}
