// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Projection System
//!
//! Synthesis never touches the filesystem directly:
//! - Projections are pure functions: `(State, Input) → (State, Effects)`
//! - Side effects are returned as data, not performed
//! - An executor interprets the effects afterwards
//!
//! # Architecture
//!
//! ```text
//! Pure Projection Function          Side Effect Executor
//! ─────────────────────────         ──────────────────────
//!
//! (State, Artifact)                 Effects
//!      │                                 │
//!      ▼                                 ▼
//! ┌──────────────┐                 ┌──────────────┐
//! │   project()  │    Effects      │   execute()  │
//! │  pure func   │ ─────────────>  │  async I/O   │
//! └──────────────┘                 └──────────────┘
//!      │                                 │
//!      ▼                                 ▼
//! (New State, Effects)              Files in the out dir
//! ```
//!
//! # Example
//!
//! ```rust
//! use joelito_dev_infrastructure::projection::pure::*;
//!
//! fn count(state: usize, name: &'static str) -> (usize, Vec<SideEffect>) {
//!     let effects = vec![SideEffect::Log {
//!         level: LogLevel::Info,
//!         message: format!("saw {name}"),
//!     }];
//!     (state + 1, effects)
//! }
//!
//! let (total, effects) = fold_projection(count, 0, vec!["a", "b"]);
//! assert_eq!(total, 2);
//! assert_eq!(effects.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Side effects produced by projections
///
/// Returned as data; an executor performs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SideEffect {
    /// Write a JSON document
    WriteFile {
        /// Path relative to the executor's output directory
        path: String,
        /// Document to write
        contents: Value,
    },

    /// Log a message
    Log {
        /// Log level
        level: LogLevel,
        /// Message
        message: String,
    },
}

impl SideEffect {
    pub fn write(path: impl Into<String>, contents: Value) -> Self {
        Self::WriteFile {
            path: path.into(),
            contents,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Log {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    /// Target path of a `WriteFile`
    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::WriteFile { path, .. } => Some(path),
            Self::Log { .. } => None,
        }
    }
}

/// Log levels for logging side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        write!(f, "{level}")
    }
}

/// Pure projection function type
///
/// - `S`: projection state
/// - `E`: input folded into the state
pub type PureProjection<S, E> = fn(S, E) -> (S, Vec<SideEffect>);

/// Fold a sequence of inputs through a pure projection
///
/// Returns the final state and every effect, in input order.
pub fn fold_projection<S, E>(
    projection: PureProjection<S, E>,
    initial_state: S,
    inputs: Vec<E>,
) -> (S, Vec<SideEffect>) {
    inputs.into_iter().fold(
        (initial_state, Vec::new()),
        |(state, mut all_effects), input| {
            let (new_state, mut effects) = projection(state, input);
            all_effects.append(&mut effects);
            (new_state, all_effects)
        },
    )
}
