// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for infrastructure synthesis

use thiserror::Error;

use crate::domain::{DomainNameError, IdentifierError, ValidationError};

/// Errors that can occur while composing and synthesizing units
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Required deployment parameter absent or blank
    #[error("Missing required parameter {name}: {hint}")]
    MissingParameter { name: String, hint: String },

    /// Deployment parameter present but unusable
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Malformed domain name
    #[error("Invalid domain name: {0}")]
    DomainName(#[from] DomainNameError),

    /// Malformed identifier
    #[error("Invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    /// Violated composition invariant
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Upstream hosted zone does not exist
    #[error("Hosted zone for {domain} not found in {environment}; deploy the DNS unit first")]
    ZoneNotFound { domain: String, environment: String },

    /// Zone lookup failed for reasons other than absence
    #[error("Zone lookup error: {0}")]
    Lookup(String),

    /// Two resources or outputs share a logical id
    #[error("Duplicate logical ID {id} in stack {stack}")]
    DuplicateLogicalId { stack: String, id: String },

    /// Two outputs share an export name
    #[error("Duplicate export {export} in stack {stack}")]
    DuplicateExport { stack: String, export: String },

    /// Reference to an undeclared resource
    #[error("Resource {from} in stack {stack} references undeclared resource {to}")]
    DanglingReference {
        stack: String,
        from: String,
        to: String,
    },

    /// Explicit dependency declared on a resource the stack does not hold
    #[error("Resource {id} is not declared in stack {stack}")]
    UnknownResource { stack: String, id: String },

    /// Cyclic ordering between resources or stacks
    #[error("Dependency cycle in {scope}: {}", .members.join(" -> "))]
    DependencyCycle { scope: String, members: Vec<String> },

    /// Two stacks with one name in an app
    #[error("Duplicate stack {0}")]
    DuplicateStack(String),

    /// Stack name not present in the app
    #[error("Unknown stack {0}")]
    UnknownStack(String),

    /// Cross-stack reference between different accounts/regions
    #[error("Stack {consumer} cannot reference stack {producer}: {reason}")]
    CrossEnvironmentReference {
        producer: String,
        consumer: String,
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl InfrastructureError {
    pub fn missing(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingParameter {
            name: name.into(),
            hint: hint.into(),
        }
    }
}

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}
