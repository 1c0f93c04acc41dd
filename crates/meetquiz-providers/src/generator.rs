//! `ContentGenerator` built on top of an `LlmProvider`.

use std::sync::Arc;

use async_trait::async_trait;

use meetquiz_core::error::GeneratorError;
use meetquiz_core::parser;
use meetquiz_core::traits::{
    ContentGenerator, GenerateRequest, LlmProvider, MeetingContext, QuizPayload,
    TeamEvaluationPayload, TeamEvaluationRequest, TranscriptLine, UserEvaluationPayload,
    UserEvaluationRequest,
};

use crate::prompts;

/// Sampling settings shared by every call.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "openai/gpt-oss-20b:free".into(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Renders prompts, sends them through a provider, and parses the answers.
pub struct LlmContentGenerator {
    provider: Arc<dyn LlmProvider>,
    settings: GenerationSettings,
}

impl LlmContentGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    async fn complete(&self, operation: &str, prompt: String) -> Result<String, GeneratorError> {
        let request = GenerateRequest {
            model: self.settings.model.clone(),
            prompt,
            system_prompt: Some(prompts::SYSTEM_PROMPT.to_string()),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(|e| GeneratorError::Transport(format!("{e:#}")))?;

        tracing::debug!(
            operation,
            provider = self.provider.name(),
            model = %response.model,
            prompt_tokens = response.token_usage.prompt_tokens,
            completion_tokens = response.token_usage.completion_tokens,
            latency_ms = response.latency_ms,
            "completion received"
        );
        Ok(response.content)
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate_intro_quiz(
        &self,
        meeting: &MeetingContext,
    ) -> Result<QuizPayload, GeneratorError> {
        let raw = self
            .complete("intro_quiz", prompts::intro_quiz(meeting))
            .await?;
        parser::parse_quiz_payload(&raw)
    }

    async fn generate_summary(
        &self,
        meeting: &MeetingContext,
        transcripts: &[TranscriptLine],
    ) -> Result<String, GeneratorError> {
        let raw = self
            .complete("summary", prompts::summary(meeting, transcripts))
            .await?;
        parser::parse_summary(&raw)
    }

    async fn generate_outro_quiz(
        &self,
        meeting: &MeetingContext,
        summary: &str,
    ) -> Result<QuizPayload, GeneratorError> {
        let raw = self
            .complete("outro_quiz", prompts::outro_quiz(meeting, summary))
            .await?;
        parser::parse_quiz_payload(&raw)
    }

    async fn generate_user_evaluation(
        &self,
        request: &UserEvaluationRequest,
    ) -> Result<UserEvaluationPayload, GeneratorError> {
        let raw = self
            .complete("user_evaluation", prompts::user_evaluation(request))
            .await?;
        parser::parse_user_evaluation_payload(&raw)
    }

    async fn generate_team_evaluation(
        &self,
        request: &TeamEvaluationRequest,
    ) -> Result<TeamEvaluationPayload, GeneratorError> {
        let raw = self
            .complete("team_evaluation", prompts::team_evaluation(request))
            .await?;
        parser::parse_team_evaluation_payload(&raw)
    }
}
