// Copyright (c) 2025 - Cowboy AI, Inc.
//! Certificate Sharing Model
//!
//! A site needs a TLS certificate that CloudFront can serve. It can get one
//! in three ways, captured by [`CertificateSource`]:
//!
//! - `Direct`: a handle published by a DNS unit composed in the same app.
//!   Rendered as a cross-stack import of the handle's export.
//! - `Imported`: an explicit ARN supplied at deployment time. The producing
//!   unit may live in another app or may have been deployed long ago.
//! - `Issued`: the site unit requests its own certificate, validated
//!   against the zone it looks up.

use serde::{Deserialize, Serialize};

use super::{CertificateArn, DomainName, Environment, ExportName, LogicalId, StackName};

/// Set of names a certificate is valid for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateCoverage {
    /// Primary domain name
    pub domain_name: DomainName,
    /// Additional names (SANs); may include wildcards such as `*.example.com`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_alternative_names: Vec<String>,
}

impl CertificateCoverage {
    /// Apex plus its `www` subdomain, the coverage every unit here issues
    pub fn apex_and_www(apex: &DomainName) -> Self {
        Self {
            domain_name: apex.clone(),
            subject_alternative_names: vec![format!("www.{}", apex)],
        }
    }

    /// Every covered name, primary first
    pub fn names(&self) -> Vec<String> {
        std::iter::once(self.domain_name.to_string())
            .chain(self.subject_alternative_names.iter().cloned())
            .collect()
    }

    /// Whether `name` is covered, exactly or through a wildcard
    pub fn covers(&self, name: &DomainName) -> bool {
        self.names().iter().any(|pattern| name.matches(pattern))
    }
}

/// In-process handle to a certificate declared by a DNS unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateHandle {
    /// Stack that owns the certificate
    pub stack: StackName,
    /// Certificate's logical id inside that stack
    pub logical_id: LogicalId,
    /// Export under which the owning stack publishes the ARN
    pub export_name: ExportName,
    /// Names the certificate was requested for
    pub coverage: CertificateCoverage,
    /// Where the owning stack deploys
    pub environment: Environment,
}

/// Certificate referenced only by ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedCertificate {
    pub arn: CertificateArn,
    /// Names the certificate is assumed to cover
    pub coverage: CertificateCoverage,
}

impl ImportedCertificate {
    /// Import an ARN issued for the apex and `www` of `apex`
    pub fn for_site(arn: CertificateArn, apex: &DomainName) -> Self {
        Self {
            arn,
            coverage: CertificateCoverage::apex_and_www(apex),
        }
    }
}

/// Where the site unit gets its certificate from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CertificateSource {
    Direct(CertificateHandle),
    Imported(ImportedCertificate),
    Issued,
}

impl CertificateSource {
    /// Coverage of the certificate; `None` for `Issued`, which is derived
    /// from the site's own domain at synthesis.
    pub fn coverage(&self) -> Option<&CertificateCoverage> {
        match self {
            Self::Direct(handle) => Some(&handle.coverage),
            Self::Imported(imported) => Some(&imported.coverage),
            Self::Issued => None,
        }
    }

    /// Short label used in logs
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Direct(_) => "direct",
            Self::Imported(_) => "import",
            Self::Issued => "issue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apex() -> DomainName {
        DomainName::new("joelito.dev").unwrap()
    }

    #[test]
    fn test_apex_and_www_coverage() {
        let coverage = CertificateCoverage::apex_and_www(&apex());
        assert_eq!(coverage.names(), vec!["joelito.dev", "www.joelito.dev"]);
        assert!(coverage.covers(&apex()));
        assert!(coverage.covers(&apex().subdomain("www").unwrap()));
        assert!(!coverage.covers(&apex().subdomain("blog").unwrap()));
    }

    #[test]
    fn test_wildcard_coverage() {
        let coverage = CertificateCoverage {
            domain_name: apex(),
            subject_alternative_names: vec!["*.joelito.dev".to_string()],
        };
        assert!(coverage.covers(&apex().subdomain("blog").unwrap()));
    }

    #[test]
    fn test_source_coverage() {
        let arn = CertificateArn::new(
            "arn:aws:acm:us-east-1:123456789012:certificate/abc",
        )
        .unwrap();
        let source = CertificateSource::Imported(ImportedCertificate::for_site(arn, &apex()));
        assert_eq!(source.strategy(), "import");
        assert!(source.coverage().unwrap().covers(&apex()));
        assert!(CertificateSource::Issued.coverage().is_none());
    }
}
