// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Model
//!
//! Serde model of the document the provisioning engine consumes. Stacks
//! render into a [`Template`]; tests and the synth binary read it back.

pub mod intrinsic;
pub mod resources;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use resources::{
    AutoDeleteFunction, AutoDeleteObjects, AutoDeleteRole, Bucket, BucketPolicy, Certificate,
    Distribution, HostedZone, MailExchange, OriginAccessControl, RecordSet, RecordTarget,
    ResourceDeclaration, ZoneRef,
};

/// Template format version understood by the engine
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Rendered stack template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub resources: BTreeMap<String, ResourceTemplate>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, OutputTemplate>,
}

impl Template {
    /// Resources of one template type, by logical id
    pub fn resources_of_type<'a>(
        &'a self,
        cfn_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a ResourceTemplate)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == cfn_type)
    }

    /// Export names declared by this template
    pub fn export_names(&self) -> Vec<&str> {
        self.outputs
            .values()
            .filter_map(|output| output.export.as_ref())
            .map(|export| export.name.as_str())
            .collect()
    }
}

/// One entry of `Resources`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTemplate {
    #[serde(rename = "Type")]
    pub resource_type: String,

    pub properties: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

/// One entry of `Outputs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportTemplate>,
}

/// `Export` block of an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportTemplate {
    pub name: String,
}
