// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Composition Invariants
//!
//! Rules the units check locally before handing anything to the
//! provisioning engine. Every function is pure and returns a detailed
//! [`ValidationError`] instead of letting the engine fail mid-deployment.
//!
//! # Invariant Categories
//!
//! 1. **Certificate**: validated in the zone that owns the names, issued in
//!    the region CloudFront reads from, naming exactly the distribution aliases
//! 2. **Origin**: bucket never publicly readable
//! 3. **Edge**: viewers only ever served over HTTPS
//! 4. **Teardown**: object auto-deletion only with a destroying removal policy

use super::{
    BucketTeardown, CertificateCoverage, DomainName, Effect, Environment, Principal,
    PolicyStatement, PublicAccessBlock, RemovalPolicy, ViewerProtocolPolicy,
};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Violated composition invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Certificate name outside the validating zone
    #[error("Certificate name {name} cannot be DNS-validated in zone {zone}")]
    ValidationZoneMismatch { name: String, zone: String },

    /// Distribution alias not covered by its certificate
    #[error("Distribution domain {domain} is not covered by certificate names [{covered}]")]
    DomainNotCovered { domain: String, covered: String },

    /// Certificate name the distribution does not answer for
    #[error("Certificate name {name} is not bound on the distribution [{bound}]")]
    CoveredNameNotBound { name: String, bound: String },

    /// Distribution has no aliases at all
    #[error("Distribution must be bound to at least one domain name")]
    NoDistributionDomains,

    /// Certificate issued outside the CloudFront certificate region
    #[error("CloudFront requires certificates in {required}, certificate is in {actual}")]
    CertificateRegion { required: String, actual: String },

    /// Bucket readable by the public
    #[error("Bucket must not be publicly readable: {0}")]
    PublicBucket(String),

    /// Viewer policy allows plain HTTP
    #[error("Viewer protocol policy {0} allows plain HTTP")]
    InsecureViewerProtocol(String),

    /// Teardown settings contradict each other
    #[error("Invalid teardown policy: {0}")]
    Teardown(String),
}

/// Validate that every covered name can be DNS-validated in `zone`
///
/// # Rules
/// - DNS validation places records in the zone, so each covered name must be
///   the zone apex or lie beneath it (wildcards are checked by their parent)
pub fn validate_certificate_zone(
    coverage: &CertificateCoverage,
    zone: &DomainName,
) -> ValidationResult {
    for name in coverage.names() {
        let concrete = name.strip_prefix("*.").unwrap_or(&name);
        let within = DomainName::new(concrete)
            .map(|candidate| candidate.is_within(zone))
            .unwrap_or(false);
        if !within {
            return Err(ValidationError::ValidationZoneMismatch {
                name,
                zone: zone.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate the distribution's aliases against its certificate
///
/// # Rules
/// - At least one alias
/// - Every alias matched by a covered name (exact or wildcard)
/// - Every covered name matched by an alias, so the bound set equals the
///   certificate's set
pub fn validate_distribution_domains(
    domains: &[DomainName],
    coverage: &CertificateCoverage,
) -> ValidationResult {
    if domains.is_empty() {
        return Err(ValidationError::NoDistributionDomains);
    }
    if let Some(domain) = domains.iter().find(|domain| !coverage.covers(domain)) {
        return Err(ValidationError::DomainNotCovered {
            domain: domain.to_string(),
            covered: coverage.names().join(", "),
        });
    }
    let unbound = coverage
        .names()
        .into_iter()
        .find(|pattern| !domains.iter().any(|domain| domain.matches(pattern)));
    match unbound {
        Some(name) => Err(ValidationError::CoveredNameNotBound {
            name,
            bound: domains
                .iter()
                .map(DomainName::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }),
        None => Ok(()),
    }
}

/// Validate that a viewer certificate lives where CloudFront reads it
pub fn validate_distribution_certificate_region(region: &str) -> ValidationResult {
    if region != Environment::CLOUDFRONT_CERTIFICATE_REGION {
        return Err(ValidationError::CertificateRegion {
            required: Environment::CLOUDFRONT_CERTIFICATE_REGION.to_string(),
            actual: region.to_string(),
        });
    }
    Ok(())
}

/// Validate that the bucket is only reachable through the CDN
///
/// # Rules
/// - All four public access block switches on
/// - Every `Allow` statement names the CloudFront service principal and is
///   pinned to a source distribution via `AWS:SourceArn`
pub fn validate_bucket_private(
    access: &PublicAccessBlock,
    statements: &[PolicyStatement],
) -> ValidationResult {
    if !access.blocks_everything() {
        return Err(ValidationError::PublicBucket(
            "public access block must enable all four switches".to_string(),
        ));
    }

    for statement in statements.iter().filter(|s| s.effect == Effect::Allow) {
        match &statement.principal {
            Principal::Service(service) if service == Principal::CLOUDFRONT => {
                if !statement.is_scoped_to_source() {
                    return Err(ValidationError::PublicBucket(
                        "CloudFront read grant is not scoped to a distribution".to_string(),
                    ));
                }
            }
            other => {
                return Err(ValidationError::PublicBucket(format!(
                    "statement grants {:?} access to the origin",
                    other
                )));
            }
        }
    }
    Ok(())
}

/// Validate that viewers are only served over HTTPS
pub fn validate_viewer_protocol(policy: ViewerProtocolPolicy) -> ValidationResult {
    if !policy.enforces_https() {
        return Err(ValidationError::InsecureViewerProtocol(policy.to_string()));
    }
    Ok(())
}

/// Validate teardown settings
///
/// # Rules
/// - Emptying the bucket only makes sense when the bucket itself is deleted
pub fn validate_teardown(teardown: &BucketTeardown) -> ValidationResult {
    if teardown.auto_delete_objects && teardown.removal != RemovalPolicy::Destroy {
        return Err(ValidationError::Teardown(
            "auto_delete_objects requires RemovalPolicy::Destroy".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zone() -> DomainName {
        DomainName::new("example.com").unwrap()
    }

    fn oac_grant(scoped: bool) -> PolicyStatement {
        PolicyStatement {
            effect: Effect::Allow,
            principal: Principal::Service(Principal::CLOUDFRONT.to_string()),
            actions: vec!["s3:GetObject".to_string()],
            resources: vec![json!("arn:aws:s3:::b/*")],
            condition: scoped
                .then(|| json!({ "StringEquals": { "AWS:SourceArn": "arn:dist" } })),
        }
    }

    #[test]
    fn test_certificate_zone() {
        let coverage = CertificateCoverage::apex_and_www(&zone());
        assert!(validate_certificate_zone(&coverage, &zone()).is_ok());

        let other = DomainName::new("example.org").unwrap();
        assert!(matches!(
            validate_certificate_zone(&coverage, &other),
            Err(ValidationError::ValidationZoneMismatch { .. })
        ));
    }

    #[test]
    fn test_wildcard_validates_against_parent() {
        let coverage = CertificateCoverage {
            domain_name: zone(),
            subject_alternative_names: vec!["*.example.com".to_string()],
        };
        assert!(validate_certificate_zone(&coverage, &zone()).is_ok());
    }

    #[test]
    fn test_distribution_domains() {
        let coverage = CertificateCoverage::apex_and_www(&zone());
        let www = zone().subdomain("www").unwrap();
        let blog = zone().subdomain("blog").unwrap();

        assert!(validate_distribution_domains(&[zone(), www.clone()], &coverage).is_ok());
        assert!(validate_distribution_domains(&[www, zone()], &coverage).is_ok());
        assert_eq!(
            validate_distribution_domains(&[blog], &coverage),
            Err(ValidationError::DomainNotCovered {
                domain: "blog.example.com".to_string(),
                covered: "example.com, www.example.com".to_string(),
            })
        );
        assert_eq!(
            validate_distribution_domains(&[], &coverage),
            Err(ValidationError::NoDistributionDomains)
        );
    }

    #[test]
    fn test_bound_names_must_equal_covered_names() {
        let coverage = CertificateCoverage::apex_and_www(&zone());
        assert_eq!(
            validate_distribution_domains(&[zone()], &coverage),
            Err(ValidationError::CoveredNameNotBound {
                name: "www.example.com".to_string(),
                bound: "example.com".to_string(),
            })
        );
    }

    #[test]
    fn test_wildcard_bound_by_any_matching_alias() {
        let coverage = CertificateCoverage {
            domain_name: zone(),
            subject_alternative_names: vec!["*.example.com".to_string()],
        };
        let blog = zone().subdomain("blog").unwrap();
        assert!(validate_distribution_domains(&[zone(), blog], &coverage).is_ok());
        assert!(matches!(
            validate_distribution_domains(&[zone()], &coverage),
            Err(ValidationError::CoveredNameNotBound { .. })
        ));
    }

    #[test]
    fn test_certificate_region() {
        assert!(validate_distribution_certificate_region("us-east-1").is_ok());
        assert!(validate_distribution_certificate_region("eu-west-1").is_err());
    }

    #[test]
    fn test_bucket_private() {
        let block = PublicAccessBlock::block_all();
        assert!(validate_bucket_private(&block, &[oac_grant(true)]).is_ok());
        assert!(validate_bucket_private(&block, &[oac_grant(false)]).is_err());

        let mut open = block;
        open.restrict_public_buckets = false;
        assert!(validate_bucket_private(&open, &[]).is_err());

        let public_read = PolicyStatement {
            principal: Principal::Anyone,
            ..oac_grant(true)
        };
        assert!(validate_bucket_private(&block, &[public_read]).is_err());
    }

    #[test]
    fn test_deny_statements_do_not_expose_bucket() {
        let deny_plain_http = PolicyStatement {
            effect: Effect::Deny,
            principal: Principal::Anyone,
            actions: vec!["s3:*".to_string()],
            resources: vec![json!("arn:aws:s3:::b")],
            condition: Some(json!({ "Bool": { "aws:SecureTransport": "false" } })),
        };
        assert!(
            validate_bucket_private(&PublicAccessBlock::block_all(), &[deny_plain_http]).is_ok()
        );
    }

    #[test]
    fn test_viewer_protocol() {
        assert!(validate_viewer_protocol(ViewerProtocolPolicy::RedirectToHttps).is_ok());
        assert!(validate_viewer_protocol(ViewerProtocolPolicy::HttpsOnly).is_ok());
        assert!(validate_viewer_protocol(ViewerProtocolPolicy::AllowAll).is_err());
    }

    #[test]
    fn test_teardown() {
        assert!(validate_teardown(&BucketTeardown::destroy()).is_ok());
        assert!(validate_teardown(&BucketTeardown::retain()).is_ok());
        let contradictory = BucketTeardown {
            removal: RemovalPolicy::Retain,
            auto_delete_objects: true,
        };
        assert!(validate_teardown(&contradictory).is_err());
    }
}
