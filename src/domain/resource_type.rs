// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Type Taxonomy
//!
//! The closed set of resource types the DNS and Site units declare, with the
//! type strings the provisioning engine expects in a template.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provisioned resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // DNS
    /// Public authoritative zone
    HostedZone,
    /// Any record in a zone (A alias, CNAME, MX)
    RecordSet,

    // TLS
    /// DNS-validated certificate
    Certificate,

    // Storage
    /// Object storage bucket
    Bucket,
    /// Resource policy attached to a bucket
    BucketPolicy,

    // Edge
    /// Signed origin access for the CDN
    OriginAccessControl,
    /// CDN distribution
    Distribution,

    // Teardown support
    /// Execution role for the auto-delete handler
    Role,
    /// Inline handler function
    Function,
    /// Custom resource that empties a bucket before deletion
    AutoDeleteObjects,
}

impl ResourceKind {
    /// Template type string
    pub fn cfn_type(&self) -> &'static str {
        match self {
            Self::HostedZone => "AWS::Route53::HostedZone",
            Self::RecordSet => "AWS::Route53::RecordSet",
            Self::Certificate => "AWS::CertificateManager::Certificate",
            Self::Bucket => "AWS::S3::Bucket",
            Self::BucketPolicy => "AWS::S3::BucketPolicy",
            Self::OriginAccessControl => "AWS::CloudFront::OriginAccessControl",
            Self::Distribution => "AWS::CloudFront::Distribution",
            Self::Role => "AWS::IAM::Role",
            Self::Function => "AWS::Lambda::Function",
            Self::AutoDeleteObjects => "Custom::S3AutoDeleteObjects",
        }
    }

    /// Parse a template type string
    pub fn from_cfn_type(value: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.cfn_type() == value)
    }

    /// Whether destroying this resource can lose user data
    pub fn holds_data(&self) -> bool {
        matches!(self, Self::Bucket | Self::HostedZone)
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::HostedZone,
            Self::RecordSet,
            Self::Certificate,
            Self::Bucket,
            Self::BucketPolicy,
            Self::OriginAccessControl,
            Self::Distribution,
            Self::Role,
            Self::Function,
            Self::AutoDeleteObjects,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cfn_type())
    }
}
