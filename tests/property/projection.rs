// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Assembly Projection
//!
//! Synthesis folds stacks through a pure projection. These tests check
//! that the fold behaves like one: deterministic, order-preserving and
//! compositional.

use proptest::prelude::*;
use serde_json::json;

use crate::fixtures::metadata;
use joelito_dev_infrastructure::projection::{
    fold_projection, synth_projection, AssemblyState, SideEffect, StackArtifact, MANIFEST_FILE,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate a stack artifact with a unique-ish name
fn artifact() -> impl Strategy<Value = StackArtifact> {
    ("[A-Z][A-Za-z0-9]{0,12}", 0usize..4).prop_map(|(name, resources)| StackArtifact {
        stack_name: name,
        environment: "aws://123456789012/us-east-1".to_string(),
        template: json!({ "Resources": { "Count": resources } }),
        dependencies: vec![],
    })
}

/// Generate artifacts with distinct names
fn artifact_sequence() -> impl Strategy<Value = Vec<StackArtifact>> {
    prop::collection::vec(artifact(), 0..8).prop_map(|mut artifacts| {
        let mut seen = std::collections::BTreeSet::new();
        artifacts.retain(|a| seen.insert(a.stack_name.clone()));
        artifacts
    })
}

fn written_files(effects: &[SideEffect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(SideEffect::file_path)
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: projection is deterministic
    #[test]
    fn prop_projection_is_deterministic(artifacts in artifact_sequence()) {
        let (state1, effects1) = AssemblyState::project(artifacts.clone());
        let (state2, effects2) = AssemblyState::project(artifacts);
        prop_assert_eq!(state1, state2);
        prop_assert_eq!(effects1, effects2);
    }

    /// Property: one template file per stack, in input order
    #[test]
    fn prop_one_template_per_stack(artifacts in artifact_sequence()) {
        let expected: Vec<String> = artifacts.iter().map(StackArtifact::template_file).collect();
        let names: Vec<String> = artifacts.iter().map(|a| a.stack_name.clone()).collect();

        let (state, effects) = AssemblyState::project(artifacts);
        prop_assert_eq!(written_files(&effects), expected);
        prop_assert_eq!(state.order, names);
    }

    /// Property: folding in two halves equals folding at once
    #[test]
    fn prop_fold_is_compositional(artifacts in artifact_sequence(), split in 0usize..8) {
        let split = split.min(artifacts.len());
        let (head, tail) = artifacts.split_at(split);

        let (whole, whole_effects) = AssemblyState::project(artifacts.clone());
        let (first, mut effects) = fold_projection(synth_projection, AssemblyState::default(), head.to_vec());
        let (second, mut more) = fold_projection(synth_projection, first, tail.to_vec());
        effects.append(&mut more);

        prop_assert_eq!(whole, second);
        prop_assert_eq!(whole_effects, effects);
    }

    /// Property: the manifest lists every projected stack
    #[test]
    fn prop_manifest_lists_every_stack(artifacts in artifact_sequence()) {
        let names: Vec<String> = artifacts.iter().map(|a| a.stack_name.clone()).collect();
        let (state, _) = AssemblyState::project(artifacts);
        let (assembly, manifest) = state.finish(metadata()).unwrap();

        prop_assert_eq!(&assembly.deployment_order, &names);
        prop_assert_eq!(assembly.artifacts.len(), names.len());
        prop_assert_eq!(manifest.file_path(), Some(MANIFEST_FILE));
    }
}
