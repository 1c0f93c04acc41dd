//! Exclusive lock on a state snapshot shared by several processes.
//!
//! A process that loads a snapshot, changes it, and writes it back must hold
//! the lock for the whole load-modify-save cycle. Otherwise the last writer
//! silently discards the other's changes.
//!
//! The lock is a sibling file (`<state>.lock`) created with `create_new`, so
//! the filesystem decides who gets it. It is removed when the guard drops.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Held lock on a state file. Released on drop.
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
}

impl StateLock {
    /// Lock file guarding `state_path`.
    pub fn lock_path(state_path: &Path) -> PathBuf {
        let mut name = state_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        state_path.with_file_name(name)
    }

    /// Take the lock if nobody holds it.
    pub fn try_acquire(state_path: &Path) -> Result<Option<Self>> {
        let path = Self::lock_path(state_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Owner pid, for whoever has to clean up a stale lock
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Some(Self { path }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => {
                Err(anyhow::Error::new(e).context(format!("failed to create {}", path.display())))
            }
        }
    }

    /// Wait up to `wait` for the lock.
    pub async fn acquire(state_path: &Path, wait: Duration) -> Result<Self> {
        let deadline = tokio::time::Instant::now() + wait;
        let mut logged = false;

        loop {
            if let Some(lock) = Self::try_acquire(state_path)? {
                return Ok(lock);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!(
                    "state file {} is locked by another process (remove {} if no meetquiz command is running)",
                    state_path.display(),
                    Self::lock_path(state_path).display()
                );
            }
            if !logged {
                tracing::info!(state = %state_path.display(), "waiting for state lock");
                logged = true;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), "failed to release state lock: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::engine::{EngineConfig, QuizEngine};
    use crate::error::QuizError;
    use crate::fixtures::*;
    use crate::memory::MemoryStore;
    use crate::model::QuizType;
    use crate::store::Store;

    #[test]
    fn lock_path_is_a_sibling() {
        assert_eq!(
            StateLock::lock_path(Path::new("/tmp/x/state.json")),
            PathBuf::from("/tmp/x/state.json.lock")
        );
    }

    #[test]
    fn second_try_fails_until_release() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        let first = StateLock::try_acquire(&state).unwrap().unwrap();
        assert!(first.path().exists());
        assert!(StateLock::try_acquire(&state).unwrap().is_none());

        drop(first);
        assert!(!StateLock::lock_path(&state).exists());
        assert!(StateLock::try_acquire(&state).unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_gives_up_after_wait() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");
        let _held = StateLock::try_acquire(&state).unwrap().unwrap();

        let err = StateLock::acquire(&state, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("locked by another process"));
    }

    /// One load-evaluate-save cycle, the way a CLI process runs it.
    async fn evaluate_in_process(
        state: &Path,
        meeting_id: i64,
        username: &str,
    ) -> Result<(), QuizError> {
        let _lock = StateLock::acquire(state, Duration::from_secs(30))
            .await
            .unwrap();
        let store = Arc::new(MemoryStore::load_json(state).unwrap());
        let engine = QuizEngine::new(
            store.clone(),
            Arc::new(FakeGenerator::with_delay(Duration::from_millis(200))),
            EngineConfig::default(),
        );
        let result = engine.evaluate_user(meeting_id, username).await.map(|_| ());
        store.save_json(state).await.unwrap();
        result
    }

    #[tokio::test(start_paused = true)]
    async fn processes_sharing_a_snapshot_evaluate_once() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        // Bob spoke and took the outro quiz; snapshot written to disk
        let seeded = Arc::new(MemoryStore::new());
        let engine = QuizEngine::new(
            seeded.clone(),
            Arc::new(FakeGenerator::default()),
            EngineConfig::default(),
        );
        seed_user(&engine, "bob").await;
        let meeting = seed_meeting(&engine, "Retro").await;
        seed_transcript(&engine, meeting.id, "bob", 0, false).await;
        let quiz = engine
            .get_or_create_quiz(meeting.id, QuizType::Outro)
            .await
            .unwrap();
        engine
            .submit_attempt(quiz.id, "bob", &answers_with_correct(&quiz, 5))
            .await
            .unwrap();
        seeded.save_json(&state).await.unwrap();

        let (a, b) = tokio::join!(
            evaluate_in_process(&state, meeting.id, "bob"),
            evaluate_in_process(&state, meeting.id, "bob"),
        );
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(QuizError::Conflict(_)))));

        let store = MemoryStore::load_json(&state).unwrap();
        let bob = store.get_user("bob").await.unwrap();
        assert_eq!(store.list_evaluations(meeting.id).await.unwrap().len(), 1);
        assert_eq!(bob.credits, 30 + 15 + 40);
        assert!(!StateLock::lock_path(&state).exists());
    }
}
