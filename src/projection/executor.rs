// Copyright (c) 2025 - Cowboy AI, Inc.
//! Side Effect Executor
//!
//! Executors interpret the effects returned by pure projections and perform
//! the I/O.
//!
//! ```text
//! Pure Projection              Executor
//! ────────────────            ──────────
//!
//! (State, Artifact)           Effects
//!      │                          │
//!      ▼                          ▼
//! ┌─────────────┐           ┌──────────────┐
//! │  project()  │  Effects  │  execute()   │
//! │ (pure func) │ ───────>  │  (async I/O) │
//! └─────────────┘           └──────────────┘
//! ```
//!
//! - [`FileSystemExecutor`] writes templates and the manifest to disk
//! - [`LoggingExecutor`] reports effects through `tracing`
//! - [`CollectingExecutor`] buffers effects for inspection

use async_trait::async_trait;
use futures::future::try_join_all;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::pure::{LogLevel, SideEffect};

/// Trait for executing side effects
#[async_trait]
pub trait SideEffectExecutor: Send + Sync {
    /// Execute a batch of side effects
    ///
    /// If any effect fails the batch fails.
    async fn execute(&mut self, effects: Vec<SideEffect>) -> Result<(), ExecutorError>;

    async fn execute_one(&mut self, effect: SideEffect) -> Result<(), ExecutorError> {
        self.execute(vec![effect]).await
    }
}

/// Errors that can occur during side effect execution
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document could not be rendered
    #[error("Serialization error for {path}: {reason}")]
    Serialization { path: String, reason: String },

    /// Write target escapes the output directory
    #[error("Refusing to write outside the output directory: {0}")]
    UnsafePath(String),
}

fn emit(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug!("{message}"),
        LogLevel::Info => info!("{message}"),
        LogLevel::Warn => warn!("{message}"),
        LogLevel::Error => error!("{message}"),
    }
}

/// Writes `WriteFile` effects under `out_dir`, pretty-printed
#[derive(Debug, Clone)]
pub struct FileSystemExecutor {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSystemExecutor {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, ExecutorError> {
        let path = Path::new(relative);
        let plain = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !plain {
            return Err(ExecutorError::UnsafePath(relative.to_string()));
        }
        Ok(self.out_dir.join(path))
    }
}

#[async_trait]
impl SideEffectExecutor for FileSystemExecutor {
    async fn execute(&mut self, effects: Vec<SideEffect>) -> Result<(), ExecutorError> {
        let mut writes = Vec::new();
        for effect in effects {
            match effect {
                SideEffect::WriteFile { path, contents } => {
                    let target = self.resolve(&path)?;
                    let rendered = serde_json::to_string_pretty(&contents).map_err(|e| {
                        ExecutorError::Serialization {
                            path,
                            reason: e.to_string(),
                        }
                    })?;
                    writes.push((target, rendered));
                }
                SideEffect::Log { level, message } => emit(level, &message),
            }
        }
        if writes.is_empty() {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|source| ExecutorError::Io {
                path: self.out_dir.clone(),
                source,
            })?;

        let written = try_join_all(writes.into_iter().map(|(target, rendered)| async move {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| ExecutorError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
            tokio::fs::write(&target, rendered)
                .await
                .map_err(|source| ExecutorError::Io {
                    path: target.clone(),
                    source,
                })?;
            debug!(path = %target.display(), "Wrote file");
            Ok::<_, ExecutorError>(target)
        }))
        .await?;

        info!(
            out_dir = %self.out_dir.display(),
            files = written.len(),
            "Wrote cloud assembly"
        );
        self.written.extend(written);
        Ok(())
    }
}

/// Logs effects instead of performing them
#[derive(Debug, Clone, Default)]
pub struct LoggingExecutor {
    /// Effects that have been logged
    pub logged_effects: Vec<SideEffect>,
}

impl LoggingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[SideEffect] {
        &self.logged_effects
    }
}

#[async_trait]
impl SideEffectExecutor for LoggingExecutor {
    async fn execute(&mut self, effects: Vec<SideEffect>) -> Result<(), ExecutorError> {
        for effect in effects {
            match &effect {
                SideEffect::WriteFile { path, .. } => info!(path = %path, "Would write file"),
                SideEffect::Log { level, message } => emit(*level, message),
            }
            self.logged_effects.push(effect);
        }
        Ok(())
    }
}

/// Collects effects for later inspection or execution
#[derive(Debug, Clone, Default)]
pub struct CollectingExecutor {
    /// Collected effects
    pub collected: Vec<SideEffect>,
}

impl CollectingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[SideEffect] {
        &self.collected
    }

    /// Take all collected effects, leaving the collector empty
    pub fn take_effects(&mut self) -> Vec<SideEffect> {
        std::mem::take(&mut self.collected)
    }
}

#[async_trait]
impl SideEffectExecutor for CollectingExecutor {
    async fn execute(&mut self, mut effects: Vec<SideEffect>) -> Result<(), ExecutorError> {
        self.collected.append(&mut effects);
        Ok(())
    }
}
