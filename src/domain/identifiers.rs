// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identifier Value Objects
//!
//! Names the provisioning engine uses to address things: logical resource
//! ids inside a template, stack names, cross-stack export names, certificate
//! ARNs and hosted zone ids. All of them are validated on construction so a
//! malformed identifier is rejected before any template is rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("{kind} is empty")]
    Empty { kind: &'static str },

    #[error("{kind} exceeds maximum length of {max} characters: {value}")]
    TooLong {
        kind: &'static str,
        max: usize,
        value: String,
    },

    #[error("{kind} contains invalid character {ch:?}: {value}")]
    InvalidCharacter {
        kind: &'static str,
        ch: char,
        value: String,
    },

    #[error("Malformed certificate ARN {value}: {reason}")]
    MalformedArn { value: String, reason: String },
}

fn check_identifier(
    kind: &'static str,
    value: &str,
    max: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    if value.len() > max {
        return Err(IdentifierError::TooLong {
            kind,
            max,
            value: value.to_string(),
        });
    }
    if let Some(ch) = value.chars().find(|ch| !allowed(*ch)) {
        return Err(IdentifierError::InvalidCharacter {
            kind,
            ch,
            value: value.to_string(),
        });
    }
    Ok(())
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

string_identifier!(
    /// CloudFormation logical resource/output id (alphanumeric, ≤ 255)
    LogicalId
);

impl LogicalId {
    pub const MAX_LENGTH: usize = 255;

    pub fn new(id: impl Into<String>) -> Result<Self, IdentifierError> {
        let id = id.into();
        check_identifier("Logical ID", &id, Self::MAX_LENGTH, |c| {
            c.is_ascii_alphanumeric()
        })?;
        Ok(Self(id))
    }
}

string_identifier!(
    /// Deployable unit name (`[A-Za-z][A-Za-z0-9-]*`, ≤ 128)
    StackName
);

impl StackName {
    pub const MAX_LENGTH: usize = 128;

    pub fn new(name: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        check_identifier("Stack name", &name, Self::MAX_LENGTH, |c| {
            c.is_ascii_alphanumeric() || c == '-'
        })?;
        let first = name.chars().next().unwrap_or_default();
        if !first.is_ascii_alphabetic() {
            return Err(IdentifierError::InvalidCharacter {
                kind: "Stack name",
                ch: first,
                value: name,
            });
        }
        Ok(Self(name))
    }
}

string_identifier!(
    /// Cross-stack export name, readable by any stack in the same environment
    ExportName
);

impl ExportName {
    pub const MAX_LENGTH: usize = 255;

    /// Export under which the DNS unit publishes its certificate ARN
    pub const DEFAULT_CERTIFICATE_EXPORT: &'static str = "JoelitoDevCertArn";

    pub fn new(name: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        check_identifier("Export name", &name, Self::MAX_LENGTH, |c| {
            c.is_ascii_alphanumeric() || c == ':' || c == '-'
        })?;
        Ok(Self(name))
    }

    pub fn default_certificate_export() -> Self {
        Self(Self::DEFAULT_CERTIFICATE_EXPORT.to_string())
    }
}

string_identifier!(
    /// Route 53 hosted zone id, without the `/hostedzone/` prefix
    HostedZoneId
);

impl HostedZoneId {
    pub fn new(id: impl Into<String>) -> Result<Self, IdentifierError> {
        let id = id.into();
        let id = id.strip_prefix("/hostedzone/").unwrap_or(&id).to_string();
        check_identifier("Hosted zone ID", &id, 32, |c| c.is_ascii_alphanumeric())?;
        Ok(Self(id))
    }
}

string_identifier!(
    /// ACM certificate ARN
    ///
    /// `arn:<partition>:acm:<region>:<account>:certificate/<id>`
    CertificateArn
);

impl CertificateArn {
    const PARTITIONS: [&'static str; 3] = ["aws", "aws-cn", "aws-us-gov"];

    pub fn new(arn: impl AsRef<str>) -> Result<Self, IdentifierError> {
        let raw = arn.as_ref().trim();
        if raw.is_empty() {
            return Err(IdentifierError::Empty {
                kind: "Certificate ARN",
            });
        }

        let malformed = |reason: &str| IdentifierError::MalformedArn {
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = raw.splitn(6, ':').collect();
        let &[prefix, partition, service, region, account, resource] = parts.as_slice() else {
            return Err(malformed("expected six colon-separated fields"));
        };

        if prefix != "arn" {
            return Err(malformed("must start with 'arn'"));
        }
        if !Self::PARTITIONS.contains(&partition) {
            return Err(malformed("unknown partition"));
        }
        if service != "acm" {
            return Err(malformed("service must be 'acm'"));
        }
        if region.is_empty() {
            return Err(malformed("region is empty"));
        }
        if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed("account must be 12 digits"));
        }
        match resource.strip_prefix("certificate/") {
            Some(id) if !id.is_empty() => {}
            _ => return Err(malformed("resource must be 'certificate/<id>'")),
        }

        Ok(Self(raw.to_string()))
    }

    /// Region the certificate was issued in
    pub fn region(&self) -> &str {
        self.0.split(':').nth(3).unwrap_or_default()
    }

    /// Owning account id
    pub fn account(&self) -> &str {
        self.0.split(':').nth(4).unwrap_or_default()
    }
}

/// Target account/region of a deployable unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    /// Account id; required for context lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub region: String,
}

impl Environment {
    /// Region CloudFront reads viewer certificates from
    pub const CLOUDFRONT_CERTIFICATE_REGION: &'static str = "us-east-1";

    pub fn new(account: Option<String>, region: impl Into<String>) -> Self {
        Self {
            account,
            region: region.into(),
        }
    }

    /// Cloud-assembly form, `aws://<account>/<region>`
    pub fn uri(&self) -> String {
        format!(
            "aws://{}/{}",
            self.account.as_deref().unwrap_or("unknown-account"),
            self.region
        )
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            account: None,
            region: Self::CLOUDFRONT_CERTIFICATE_REGION.to_string(),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const ARN: &str =
        "arn:aws:acm:us-east-1:123456789012:certificate/0f1e2d3c-aaaa-bbbb-cccc-1234567890ab";

    #[test]
    fn test_logical_id() {
        assert!(LogicalId::new("JoelitoDevHostedZone").is_ok());
        assert!(matches!(
            LogicalId::new(""),
            Err(IdentifierError::Empty { .. })
        ));
        assert!(matches!(
            LogicalId::new("Bad-Id"),
            Err(IdentifierError::InvalidCharacter { ch: '-', .. })
        ));
    }

    #[test]
    fn test_stack_name_must_start_with_letter() {
        assert!(StackName::new("JoelitoDevDnsStack").is_ok());
        assert!(StackName::new("site-stack-2").is_ok());
        assert!(StackName::new("2site").is_err());
    }

    #[test]
    fn test_export_name_default() {
        assert_eq!(
            ExportName::default_certificate_export().as_str(),
            "JoelitoDevCertArn"
        );
        assert!(ExportName::new("stack:cert-arn").is_ok());
        assert!(ExportName::new("has space").is_err());
    }

    #[test]
    fn test_hosted_zone_id_strips_prefix() {
        let id = HostedZoneId::new("/hostedzone/Z0123456789ABC").unwrap();
        assert_eq!(id.as_str(), "Z0123456789ABC");
    }

    #[test]
    fn test_certificate_arn_parts() {
        let arn = CertificateArn::new(ARN).unwrap();
        assert_eq!(arn.region(), "us-east-1");
        assert_eq!(arn.account(), "123456789012");
        assert_eq!(arn.to_string(), ARN);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "whitespace")]
    fn test_certificate_arn_empty(input: &str) {
        assert_eq!(
            CertificateArn::new(input),
            Err(IdentifierError::Empty {
                kind: "Certificate ARN"
            })
        );
    }

    #[test_case("arn:aws:s3:us-east-1:123456789012:certificate/x" ; "wrong service")]
    #[test_case("arn:aws:acm:us-east-1:1234:certificate/x" ; "short account")]
    #[test_case("arn:aws:acm:us-east-1:123456789012:bucket/x" ; "wrong resource")]
    #[test_case("arn:aws:acm:us-east-1:123456789012:certificate/" ; "missing id")]
    #[test_case("arn:aws:acm:us-east-1" ; "truncated")]
    fn test_certificate_arn_malformed(input: &str) {
        assert!(matches!(
            CertificateArn::new(input),
            Err(IdentifierError::MalformedArn { .. })
        ));
    }

    #[test]
    fn test_environment_uri() {
        let env = Environment::new(Some("123456789012".into()), "us-east-1");
        assert_eq!(env.uri(), "aws://123456789012/us-east-1");
        assert_eq!(Environment::default().uri(), "aws://unknown-account/us-east-1");
    }
}
