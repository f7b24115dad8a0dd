// Copyright (c) 2025 - Cowboy AI, Inc.

//! Synthesis as a Projection
//!
//! Rendering an app is a fold of its stacks into a cloud assembly:
//!
//! ```text
//! [Stack₁, Stack₂, …] ──synth_projection──> (AssemblyState, [Effect…])
//!                                                   │
//!                                                finish()
//!                                                   ▼
//!                                   (CloudAssembly, manifest effect)
//! ```
//!
//! The fold is pure. Effects are handed to a [`SideEffectExecutor`]:
//! [`FileSystemExecutor`] for real output, [`CollectingExecutor`] in tests.

pub mod assembly;
pub mod executor;
pub mod pure;

pub use assembly::{
    synth_projection, template_file, ArtifactEntry, AssemblyState, CloudAssembly, StackArtifact,
    SynthMetadata, MANIFEST_FILE,
};
pub use executor::{
    CollectingExecutor, ExecutorError, FileSystemExecutor, LoggingExecutor, SideEffectExecutor,
};
pub use pure::{fold_projection, LogLevel, PureProjection, SideEffect};
