//! Mock provider for testing and offline use.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use meetquiz_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, TokenUsage};

use crate::prompts;

/// An LLM provider that answers from a list of canned responses.
///
/// The first entry whose key is a substring of the prompt wins.
pub struct MockProvider {
    responses: Vec<(String, String)>,
    default_response: String,
    failure: Option<String>,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    pub fn new(responses: Vec<(String, String)>) -> Self {
        Self {
            responses,
            default_response: String::new(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        let mut mock = Self::new(Vec::new());
        mock.default_response = response.to_string();
        mock
    }

    /// A mock whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        let mut mock = Self::new(Vec::new());
        mock.failure = Some(message.to_string());
        mock
    }

    /// Valid answers for every generator operation, keyed on the prompt leads.
    pub fn canned() -> Self {
        Self::new(vec![
            (prompts::INTRO_QUIZ_LEAD.into(), canned_quiz("agenda")),
            (prompts::OUTRO_QUIZ_LEAD.into(), canned_quiz("discussion")),
            (
                prompts::SUMMARY_LEAD.into(),
                "• The team reviewed progress\n• Owners were assigned to open items\n• Next steps were agreed"
                    .into(),
            ),
            (
                prompts::USER_EVALUATION_LEAD.into(),
                serde_json::json!({
                    "strengths": "Contributed relevant updates",
                    "weaknesses": "Could go deeper on blockers",
                    "tips": "Prepare questions ahead of time",
                    "participation_score": 15,
                    "quality_score": 35
                })
                .to_string(),
            ),
            (
                prompts::TEAM_EVALUATION_LEAD.into(),
                serde_json::json!({
                    "team_strengths": "Clear ownership of action items",
                    "team_weaknesses": "Discussion drifted at times",
                    "team_tips": "Keep a visible agenda"
                })
                .to_string(),
            ),
        ])
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Five questions whose correct answer is always the first option, wrapped in a
/// markdown fence the way chat models often answer.
fn canned_quiz(topic: &str) -> String {
    let questions: Vec<serde_json::Value> = (1..=5)
        .map(|i| {
            serde_json::json!({
                "question_text": format!("Question {i} about the {topic}?"),
                "correct_answer_index": 0,
                "answers": [
                    format!("Correct {i}"),
                    format!("Wrong {i}a"),
                    format!("Wrong {i}b"),
                    format!("Wrong {i}c"),
                ]
            })
        })
        .collect();
    format!(
        "```json\n{}\n```",
        serde_json::json!({ "questions": questions })
    )
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }

        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        let prompt_tokens = (request.prompt.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("• one point");
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "• one point");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn first_matching_key_wins() {
        let provider = MockProvider::new(vec![
            ("summary".into(), "first".into()),
            ("summary of".into(), "second".into()),
        ]);
        let response = provider
            .generate(&request("a summary of the meeting"))
            .await
            .unwrap();
        assert_eq!(response.content, "first");
    }

    #[tokio::test]
    async fn canned_answers_every_operation() {
        let provider = MockProvider::canned();
        for lead in [
            prompts::INTRO_QUIZ_LEAD,
            prompts::SUMMARY_LEAD,
            prompts::OUTRO_QUIZ_LEAD,
            prompts::USER_EVALUATION_LEAD,
            prompts::TEAM_EVALUATION_LEAD,
        ] {
            let response = provider.generate(&request(lead)).await.unwrap();
            assert!(!response.content.is_empty(), "no canned answer for {lead}");
        }
        assert_eq!(provider.call_count(), 5);
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let provider = MockProvider::failing("HTTP 503: overloaded");
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert!(err.to_string().contains("overloaded"));
        assert_eq!(provider.call_count(), 1);
    }
}
