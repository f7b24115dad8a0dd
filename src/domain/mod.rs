// Copyright (c) 2025 - Cowboy AI, Inc.
//! Infrastructure Domain Models
//!
//! Value objects and invariants shared by the DNS and Site units.
//!
//! # Value Objects with Invariants
//!
//! - [`DomainName`] - DNS-validated names (RFC 1123)
//! - [`LogicalId`], [`StackName`], [`ExportName`] - template and stack addressing
//! - [`CertificateArn`], [`HostedZoneId`] - provider identifiers
//! - [`ResourceKind`] - resource type taxonomy
//! - [`BucketTeardown`], [`PublicAccessBlock`], [`ViewerProtocolPolicy`] - access policies
//!
//! # Certificate Sharing
//!
//! - [`CertificateSource`] - `Direct(handle) | Imported(arn) | Issued`

pub mod access;
pub mod certificate;
pub mod domain_name;
pub mod identifiers;
pub mod invariants;
pub mod resource_type;

pub use access::{
    BucketTeardown, Effect, PolicyStatement, Principal, PublicAccessBlock, RemovalPolicy,
    ViewerProtocolPolicy,
};
pub use certificate::{
    CertificateCoverage, CertificateHandle, CertificateSource, ImportedCertificate,
};
pub use domain_name::{DomainName, DomainNameError};
pub use identifiers::{
    CertificateArn, Environment, ExportName, HostedZoneId, IdentifierError, LogicalId, StackName,
};
pub use invariants::{ValidationError, ValidationResult};
pub use resource_type::ResourceKind;
