//! Subcommand implementations and the state/engine setup they share.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use meetquiz_core::error::GeneratorError;
use meetquiz_core::traits::{
    ContentGenerator, MeetingContext, QuizPayload, TeamEvaluationPayload, TeamEvaluationRequest,
    TranscriptLine, UserEvaluationPayload, UserEvaluationRequest,
};
use meetquiz_core::{MemoryStore, QuizEngine, StateLock};
use meetquiz_providers::config::{create_generator, load_config_from, MeetquizConfig};

pub mod attempts;
pub mod evaluate;
pub mod init;
pub mod meeting;
pub mod quiz;
pub mod seed;
pub mod show_quiz;
pub mod submit;
pub mod summary;
pub mod team;
pub mod user;

/// Global path options.
pub struct Paths {
    pub config: Option<PathBuf>,
    pub state: Option<PathBuf>,
}

/// How long a command waits for another one to release the state file.
/// Generation calls alone may take a minute.
const STATE_LOCK_WAIT: Duration = Duration::from_secs(150);

/// Loaded config plus the state snapshot the command works on.
///
/// The state file stays locked until the workspace is dropped, so a command's
/// checks and its write see no other command's changes in between.
pub struct Workspace {
    pub config: MeetquizConfig,
    pub state_path: PathBuf,
    pub store: Arc<MemoryStore>,
    _lock: StateLock,
}

impl Workspace {
    pub async fn open(paths: &Paths) -> Result<Self> {
        Self::open_with_wait(paths, STATE_LOCK_WAIT).await
    }

    async fn open_with_wait(paths: &Paths, wait: Duration) -> Result<Self> {
        let config = load_config_from(paths.config.as_deref())?;
        let state_path = paths
            .state
            .clone()
            .unwrap_or_else(|| config.state_path.clone());

        let lock = StateLock::acquire(&state_path, wait).await?;
        let store = MemoryStore::load_or_default(&state_path)?;
        tracing::debug!(state = %state_path.display(), "state loaded");

        Ok(Self {
            config,
            state_path,
            store: Arc::new(store),
            _lock: lock,
        })
    }

    /// Engine backed by the configured content generator.
    pub fn engine(&self) -> Result<QuizEngine> {
        let generator = create_generator(&self.config)?;
        Ok(QuizEngine::new(
            self.store.clone(),
            generator,
            self.config.engine_config(),
        ))
    }

    /// Engine for commands that never generate content. Works without any
    /// provider configured.
    pub fn offline_engine(&self) -> QuizEngine {
        let generator: Arc<dyn ContentGenerator> = match create_generator(&self.config) {
            Ok(generator) => generator,
            Err(e) => Arc::new(UnavailableGenerator {
                reason: format!("{e:#}"),
            }),
        };
        QuizEngine::new(
            self.store.clone(),
            generator,
            self.config.engine_config(),
        )
    }

    pub async fn save(&self) -> Result<()> {
        self.store
            .save_json(&self.state_path)
            .await
            .with_context(|| format!("failed to save state: {}", self.state_path.display()))
    }
}

/// Stand-in when no provider is configured; every call fails with the reason.
struct UnavailableGenerator {
    reason: String,
}

impl UnavailableGenerator {
    fn fail<T>(&self) -> Result<T, GeneratorError> {
        Err(GeneratorError::Transport(self.reason.clone()))
    }
}

#[async_trait]
impl ContentGenerator for UnavailableGenerator {
    async fn generate_intro_quiz(&self, _: &MeetingContext) -> Result<QuizPayload, GeneratorError> {
        self.fail()
    }

    async fn generate_summary(
        &self,
        _: &MeetingContext,
        _: &[TranscriptLine],
    ) -> Result<String, GeneratorError> {
        self.fail()
    }

    async fn generate_outro_quiz(
        &self,
        _: &MeetingContext,
        _: &str,
    ) -> Result<QuizPayload, GeneratorError> {
        self.fail()
    }

    async fn generate_user_evaluation(
        &self,
        _: &UserEvaluationRequest,
    ) -> Result<UserEvaluationPayload, GeneratorError> {
        self.fail()
    }

    async fn generate_team_evaluation(
        &self,
        _: &TeamEvaluationRequest,
    ) -> Result<TeamEvaluationPayload, GeneratorError> {
        self.fail()
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
