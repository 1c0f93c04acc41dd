//! Core trait definitions for content generators and LLM providers.
//!
//! `ContentGenerator` is the seam the engine depends on. `LlmProvider` is the
//! lower-level chat-completion seam that `meetquiz-providers` builds its
//! generator on top of.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

// ---------------------------------------------------------------------------
// Content generator trait
// ---------------------------------------------------------------------------

/// Produces quiz, summary, and evaluation payloads for the engine.
///
/// Output is untrusted: the engine validates structure and clamps scores
/// before anything is persisted.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Pre-meeting quiz from the meeting's name and description.
    async fn generate_intro_quiz(
        &self,
        meeting: &MeetingContext,
    ) -> Result<QuizPayload, GeneratorError>;

    /// Narrative summary from transcripts ordered by timestamp.
    async fn generate_summary(
        &self,
        meeting: &MeetingContext,
        transcripts: &[TranscriptLine],
    ) -> Result<String, GeneratorError>;

    /// Post-meeting quiz from the meeting summary.
    async fn generate_outro_quiz(
        &self,
        meeting: &MeetingContext,
        summary: &str,
    ) -> Result<QuizPayload, GeneratorError>;

    /// Participation and quality assessment of one user.
    async fn generate_user_evaluation(
        &self,
        request: &UserEvaluationRequest,
    ) -> Result<UserEvaluationPayload, GeneratorError>;

    /// Team feedback from the anonymized individual evaluations.
    async fn generate_team_evaluation(
        &self,
        request: &TeamEvaluationRequest,
    ) -> Result<TeamEvaluationPayload, GeneratorError>;
}

/// Meeting fields every generator prompt is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingContext {
    pub name: String,
    pub description: String,
}

/// A transcript as handed to the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptLine {
    /// `[timestamp] username: text`
    pub fn render(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.username,
            self.text
        )
    }
}

/// Quiz as returned by the generator, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizPayload {
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question_text: String,
    pub answers: Vec<String>,
    /// Signed so out-of-range values survive deserialization and get rejected
    /// by validation with a useful message.
    pub correct_answer_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvaluationRequest {
    pub username: String,
    pub meeting: MeetingContext,
    /// The user's own transcript texts, in timestamp order.
    pub transcripts: Vec<String>,
    pub foul_count: u32,
    pub total_count: u32,
    pub quiz_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvaluationPayload {
    pub strengths: String,
    pub weaknesses: String,
    pub tips: String,
    /// Expected 0..=20, clamped by the engine.
    pub participation_score: f64,
    /// Expected 0..=50, clamped by the engine.
    pub quality_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEvaluationRequest {
    pub meeting: MeetingContext,
    pub participant_count: usize,
    pub evaluations: Vec<AnonymizedEvaluation>,
}

/// An individual evaluation with the username stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizedEvaluation {
    pub total_score: u32,
    pub quiz_score: u32,
    pub participation_score: u32,
    pub quality_score: u32,
    pub strengths: String,
    pub weaknesses: String,
    pub tips: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEvaluationPayload {
    pub team_strengths: String,
    pub team_weaknesses: String,
    pub team_tips: String,
}

// ---------------------------------------------------------------------------
// LLM provider trait
// ---------------------------------------------------------------------------

/// Trait for chat-completion backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Run one completion.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Request for one chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "openai/gpt-oss-20b:free").
    pub model: String,
    /// The user prompt.
    pub prompt: String,
    /// Optional system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response content.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Markdown JSON extraction
// ---------------------------------------------------------------------------

/// Extract a JSON document from a possibly markdown-formatted LLM response.
///
/// Handles:
/// - ```json``` blocks (first one wins)
/// - Generic ``` blocks (if no json-specific block found)
/// - Prose around a bare object (sliced from the first `{` to the last `}`)
/// - Raw JSON (returned trimmed)
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_block = None;
    let mut generic_block = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_block.get_or_insert_with(|| current_block.clone());
            } else {
                generic_block.get_or_insert_with(|| current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Unclosed fence: the model ran out of tokens or forgot the closer
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_block.get_or_insert(current_block);
        } else {
            generic_block.get_or_insert(current_block);
        }
    }

    if let Some(block) = json_block.or(generic_block) {
        return block.trim().to_string();
    }

    let trimmed = response.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start > 0 && end > start => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn extract_json_block() {
        let input = "Here you go:\n\n```json\n{\"questions\": []}\n```\n\nGood luck!";
        assert_eq!(extract_json_from_markdown(input), "{\"questions\": []}");
    }

    #[test]
    fn extract_generic_block_fallback() {
        let input = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_from_markdown(input), "{\"a\": 1}");
    }

    #[test]
    fn extract_prefers_json_over_generic() {
        let input = "```\nnot this\n```\n\n```json\n{\"b\": 2}\n```\n";
        assert_eq!(extract_json_from_markdown(input), "{\"b\": 2}");
    }

    #[test]
    fn extract_raw_json_is_trimmed() {
        let input = "  \n{\"c\": 3}\n ";
        assert_eq!(extract_json_from_markdown(input), "{\"c\": 3}");
    }

    #[test]
    fn extract_object_from_surrounding_prose() {
        let input = "Sure! {\"d\": 4} Hope this helps.";
        assert_eq!(extract_json_from_markdown(input), "{\"d\": 4}");
    }

    #[test]
    fn extract_truncated_unclosed_block() {
        let input = "```json\n{\"e\": 5}";
        assert_eq!(extract_json_from_markdown(input), "{\"e\": 5}");
    }

    #[test]
    fn transcript_line_render() {
        let line = TranscriptLine {
            username: "bob".into(),
            text: "Ship it.".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
        };
        assert_eq!(line.render(), "[2025-03-01 09:30:00] bob: Ship it.");
    }
}
