//! The quiz engine.
//!
//! `QuizEngine` owns the store, the content generator, and the keyed locks that
//! serialize check-then-create paths. The operations themselves live in the
//! `quiz`, `summary`, `grading`, `evaluation`, and `team` modules as further
//! `impl QuizEngine` blocks.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{GeneratorError, QuizError};
use crate::locks::KeyedLocks;
use crate::model::{Meeting, MeetingId, QuizType, User};
use crate::store::Store;
use crate::traits::{ContentGenerator, MeetingContext};

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for a single content generator call.
    pub generator_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generator_timeout: Duration::from_secs(60),
        }
    }
}

pub struct QuizEngine {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) generator: Arc<dyn ContentGenerator>,
    config: EngineConfig,
    pub(crate) quiz_locks: KeyedLocks<(MeetingId, QuizType)>,
    pub(crate) summary_locks: KeyedLocks<MeetingId>,
    pub(crate) user_locks: KeyedLocks<String>,
}

impl QuizEngine {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<dyn ContentGenerator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            generator,
            config,
            quiz_locks: KeyedLocks::new(),
            summary_locks: KeyedLocks::new(),
            user_locks: KeyedLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn get_user(&self, username: &str) -> Result<User, QuizError> {
        Ok(self.store.get_user(username).await?)
    }

    /// Await a generator call under the configured timeout and classify its
    /// failure: transport errors and timeouts are upstream failures, bad
    /// payloads are validation failures.
    pub(crate) async fn call_generator<T, F>(
        &self,
        operation: &'static str,
        meeting_id: MeetingId,
        call: F,
    ) -> Result<T, QuizError>
    where
        F: Future<Output = Result<T, GeneratorError>>,
    {
        let start = Instant::now();
        let outcome = tokio::time::timeout(self.config.generator_timeout, call).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(value)) => {
                tracing::debug!(operation, meeting_id, elapsed_ms, "generator call completed");
                Ok(value)
            }
            Ok(Err(GeneratorError::Transport(message))) => {
                tracing::error!(operation, meeting_id, elapsed_ms, "generator call failed: {message}");
                Err(QuizError::Upstream {
                    operation,
                    meeting_id,
                    message,
                })
            }
            Ok(Err(GeneratorError::Malformed(message))) => {
                tracing::warn!(operation, meeting_id, "generator returned a malformed payload");
                Err(QuizError::Validation(format!(
                    "{operation} returned a malformed payload for meeting {meeting_id}: {message}"
                )))
            }
            Err(_) => {
                tracing::error!(operation, meeting_id, elapsed_ms, "generator call timed out");
                Err(QuizError::Upstream {
                    operation,
                    meeting_id,
                    message: format!(
                        "timed out after {}s",
                        self.config.generator_timeout.as_secs_f64()
                    ),
                })
            }
        }
    }
}

pub(crate) fn meeting_context(meeting: &Meeting) -> MeetingContext {
    MeetingContext {
        name: meeting.name.clone(),
        description: meeting.description.clone(),
    }
}
