// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Assembly Projection
//!
//! Stacks are folded, in deployment order, into an [`AssemblyState`]. Each
//! stack yields a template file; [`AssemblyState::finish`] adds the
//! manifest describing every artifact.
//!
//! ```text
//! cdk.out/
//! ├── JoelitoDevDnsStack.template.json
//! ├── JoelitoDevInfraStack.template.json
//! └── manifest.json
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::pure::{fold_projection, SideEffect};

/// Manifest schema version written to `manifest.json`
pub const MANIFEST_VERSION: &str = "36.0.0";

/// Manifest file name
pub const MANIFEST_FILE: &str = "manifest.json";

/// Artifact type of a deployable stack
pub const STACK_ARTIFACT_TYPE: &str = "aws:cloudformation:stack";

/// Identity of one synthesis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthMetadata {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

impl SynthMetadata {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
        }
    }
}

impl Default for SynthMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendered stack, ready to be projected
#[derive(Debug, Clone, PartialEq)]
pub struct StackArtifact {
    pub stack_name: String,
    /// `aws://<account>/<region>`
    pub environment: String,
    pub template: Value,
    /// Stacks that must deploy first
    pub dependencies: Vec<String>,
}

impl StackArtifact {
    pub fn template_file(&self) -> String {
        template_file(&self.stack_name)
    }
}

/// Template file name of a stack
pub fn template_file(stack_name: &str) -> String {
    format!("{stack_name}.template.json")
}

/// Manifest entry of one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEntry {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub environment: String,
    pub properties: ArtifactProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
    pub template_file: String,
    pub stack_name: String,
}

/// Accumulated artifacts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyState {
    pub artifacts: BTreeMap<String, ArtifactEntry>,
    /// Stack names in the order they were projected
    pub order: Vec<String>,
}

/// Finished assembly, as written to `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAssembly {
    pub version: String,
    #[serde(flatten)]
    pub metadata: SynthMetadata,
    pub artifacts: BTreeMap<String, ArtifactEntry>,
    pub deployment_order: Vec<String>,
}

impl CloudAssembly {
    pub fn artifact(&self, stack_name: &str) -> Option<&ArtifactEntry> {
        self.artifacts.get(stack_name)
    }
}

/// Project one stack: record its entry and emit its template file
pub fn synth_projection(
    mut state: AssemblyState,
    artifact: StackArtifact,
) -> (AssemblyState, Vec<SideEffect>) {
    let file = artifact.template_file();
    let entry = ArtifactEntry {
        artifact_type: STACK_ARTIFACT_TYPE.to_string(),
        environment: artifact.environment,
        properties: ArtifactProperties {
            template_file: file.clone(),
            stack_name: artifact.stack_name.clone(),
        },
        dependencies: artifact.dependencies,
    };

    let effects = vec![
        SideEffect::write(file.clone(), artifact.template),
        SideEffect::info(format!("Synthesized {} into {}", artifact.stack_name, file)),
    ];

    state.order.push(artifact.stack_name.clone());
    state.artifacts.insert(artifact.stack_name, entry);
    (state, effects)
}

impl AssemblyState {
    /// Fold `artifacts` through [`synth_projection`]
    pub fn project(artifacts: Vec<StackArtifact>) -> (Self, Vec<SideEffect>) {
        fold_projection(synth_projection, Self::default(), artifacts)
    }

    /// Close the assembly, producing the manifest effect
    pub fn finish(
        self,
        metadata: SynthMetadata,
    ) -> serde_json::Result<(CloudAssembly, SideEffect)> {
        let assembly = CloudAssembly {
            version: MANIFEST_VERSION.to_string(),
            metadata,
            artifacts: self.artifacts,
            deployment_order: self.order,
        };
        let manifest = serde_json::to_value(&assembly)?;
        Ok((assembly, SideEffect::write(MANIFEST_FILE, manifest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn artifact(name: &str, dependencies: &[&str]) -> StackArtifact {
        StackArtifact {
            stack_name: name.to_string(),
            environment: "aws://123456789012/us-east-1".to_string(),
            template: json!({ "Resources": {} }),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_projection_emits_template_per_stack() {
        let (state, effects) =
            AssemblyState::project(vec![artifact("Dns", &[]), artifact("Site", &["Dns"])]);

        let files: Vec<_> = effects.iter().filter_map(SideEffect::file_path).collect();
        assert_eq!(files, vec!["Dns.template.json", "Site.template.json"]);
        assert_eq!(state.order, vec!["Dns", "Site"]);
        assert_eq!(state.artifacts["Site"].dependencies, vec!["Dns"]);
    }

    #[test]
    fn test_manifest_shape() {
        let (state, _) = AssemblyState::project(vec![artifact("Dns", &[])]);
        let metadata = SynthMetadata::new();
        let (assembly, effect) = state.finish(metadata.clone()).unwrap();

        assert_eq!(assembly.deployment_order, vec!["Dns"]);
        let SideEffect::WriteFile { path, contents } = effect else {
            panic!("manifest must be a file write");
        };
        assert_eq!(path, MANIFEST_FILE);
        assert_eq!(contents["version"], json!(MANIFEST_VERSION));
        assert_eq!(contents["runId"], json!(metadata.run_id.to_string()));
        assert_eq!(
            contents["artifacts"]["Dns"],
            json!({
                "type": "aws:cloudformation:stack",
                "environment": "aws://123456789012/us-east-1",
                "properties": {
                    "templateFile": "Dns.template.json",
                    "stackName": "Dns",
                },
            })
        );

        let parsed: CloudAssembly = serde_json::from_value(contents).unwrap();
        assert_eq!(parsed, assembly);
    }
}
