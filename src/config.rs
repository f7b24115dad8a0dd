// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Configuration
//!
//! Every deployment-time input is an explicit, typed field of
//! [`DeploymentConfig`]. Nothing is read from ambient context once the
//! config is built.
//!
//! | Variable                   | Field                         | Default            |
//! |----------------------------|-------------------------------|--------------------|
//! | `DOMAIN_NAME`              | `domain_name`                 | required           |
//! | `EMAIL_PROVIDER_MX_RECORD` | `email_provider_mx_record`    | required for DNS   |
//! | `CDK_DEFAULT_ACCOUNT`      | `environment.account`         | none               |
//! | `CDK_DEFAULT_REGION`       | `environment.region`          | `us-east-1`        |
//! | `CERTIFICATE_STRATEGY`     | `certificate.strategy`        | `direct`           |
//! | `JOELITO_DEV_CERT_ARN`     | `certificate.arn`             | none               |
//! | `CERTIFICATE_EXPORT_NAME`  | `certificate.export_name`     | `JoelitoDevCertArn`|
//! | `SITE_RETAIN_BUCKET`       | `site.retain_bucket`          | `false`            |
//! | `SITE_WWW_ALIAS`           | `site.include_www_alias`      | `true`             |
//! | `SYNTH_UNITS`              | `units`                       | `dns,site`         |
//! | `CDK_CONTEXT_FILE`         | `context_file`                | `cdk.context.json` |
//! | `CDK_OUTDIR`               | `out_dir`                     | `cdk.out`          |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{
    BucketTeardown, CertificateArn, CertificateHandle, CertificateSource, DomainName,
    Environment, ExportName, ImportedCertificate,
};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::units::{DnsUnitProps, SiteUnitProps};

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set: {hint}")]
    Missing { name: String, hint: String },

    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },

    #[error("Failed to read config file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

impl From<ConfigError> for InfrastructureError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { name, hint } => InfrastructureError::MissingParameter { name, hint },
            ConfigError::Invalid { name, reason } => {
                InfrastructureError::InvalidParameter { name, reason }
            }
            other => InfrastructureError::Configuration(other.to_string()),
        }
    }
}

fn invalid(name: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// How the site unit obtains its certificate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStrategy {
    /// Handle from the DNS unit composed in the same app
    #[default]
    Direct,
    /// Explicit ARN supplied at deployment time
    Import,
    /// The site unit requests its own certificate
    Issue,
}

impl CertificateStrategy {
    pub fn composition(&self) -> Composition {
        match self {
            Self::Direct => Composition::SingleProcess,
            Self::Import | Self::Issue => Composition::Decoupled,
        }
    }
}

impl FromStr for CertificateStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "import" => Ok(Self::Import),
            "issue" => Ok(Self::Issue),
            other => Err(invalid(
                "CERTIFICATE_STRATEGY",
                format!("expected direct, import or issue, got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for CertificateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Import => "import",
            Self::Issue => "issue",
        };
        write!(f, "{name}")
    }
}

/// How the two units relate at synthesis time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// Certificate handle passed in memory between units of one app
    SingleProcess,
    /// Units share nothing but deployment parameters
    Decoupled,
}

impl Composition {
    pub fn is_decoupled(&self) -> bool {
        matches!(self, Self::Decoupled)
    }
}

/// Certificate settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateConfig {
    #[serde(default)]
    pub strategy: CertificateStrategy,

    /// ARN for the `import` strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    /// Export the DNS unit publishes the ARN under
    #[serde(default = "ExportName::default_certificate_export")]
    pub export_name: ExportName,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            strategy: CertificateStrategy::default(),
            arn: None,
            export_name: ExportName::default_certificate_export(),
        }
    }
}

/// Site unit options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteOptions {
    /// Keep bucket and objects when the stack is destroyed
    pub retain_bucket: bool,
    /// Bind `www.<domain>` on the distribution as well as the apex; must
    /// match the certificate's names
    pub include_www_alias: bool,
    pub index_document: String,
}

impl SiteOptions {
    pub const DEFAULT_INDEX_DOCUMENT: &'static str = "index.html";

    pub fn teardown(&self) -> BucketTeardown {
        if self.retain_bucket {
            BucketTeardown::retain()
        } else {
            BucketTeardown::destroy()
        }
    }
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            retain_bucket: false,
            include_www_alias: true,
            index_document: Self::DEFAULT_INDEX_DOCUMENT.to_string(),
        }
    }
}

/// Which units an app synthesizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSelection {
    pub dns: bool,
    pub site: bool,
}

impl Default for UnitSelection {
    fn default() -> Self {
        Self {
            dns: true,
            site: true,
        }
    }
}

impl FromStr for UnitSelection {
    type Err = ConfigError;

    /// Comma-separated list of `dns` and `site`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut selection = Self {
            dns: false,
            site: false,
        };
        for unit in s.split(',').map(str::trim).filter(|u| !u.is_empty()) {
            match unit.to_ascii_lowercase().as_str() {
                "dns" => selection.dns = true,
                "site" => selection.site = true,
                other => return Err(invalid("SYNTH_UNITS", format!("unknown unit {other:?}"))),
            }
        }
        if !selection.dns && !selection.site {
            return Err(invalid("SYNTH_UNITS", "select at least one of dns, site"));
        }
        Ok(selection)
    }
}

fn default_context_file() -> PathBuf {
    PathBuf::from("cdk.context.json")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("cdk.out")
}

/// Complete deployment input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub domain_name: DomainName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_provider_mx_record: Option<DomainName>,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub certificate: CertificateConfig,

    #[serde(default)]
    pub site: SiteOptions,

    #[serde(default)]
    pub units: UnitSelection,

    #[serde(default = "default_context_file")]
    pub context_file: PathBuf,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

impl DeploymentConfig {
    /// Config for `domain_name` with every other setting at its default
    pub fn new(domain_name: DomainName) -> Self {
        Self {
            domain_name,
            email_provider_mx_record: None,
            environment: Environment::default(),
            certificate: CertificateConfig::default(),
            site: SiteOptions::default(),
            units: UnitSelection::default(),
            context_file: default_context_file(),
            out_dir: default_out_dir(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        let domain_name = var("DOMAIN_NAME").ok_or_else(|| ConfigError::Missing {
            name: "DOMAIN_NAME".to_string(),
            hint: "the apex domain both units serve".to_string(),
        })?;
        let mut config =
            Self::new(DomainName::new(&domain_name).map_err(|e| invalid("DOMAIN_NAME", e))?);

        if let Some(mx) = var("EMAIL_PROVIDER_MX_RECORD") {
            config.email_provider_mx_record =
                Some(DomainName::new(&mx).map_err(|e| invalid("EMAIL_PROVIDER_MX_RECORD", e))?);
        }

        config.environment = Environment::new(
            var("CDK_DEFAULT_ACCOUNT"),
            var("CDK_DEFAULT_REGION")
                .unwrap_or_else(|| Environment::CLOUDFRONT_CERTIFICATE_REGION.to_string()),
        );

        if let Some(strategy) = var("CERTIFICATE_STRATEGY") {
            config.certificate.strategy = strategy.parse()?;
        }
        config.certificate.arn = var("JOELITO_DEV_CERT_ARN");
        if let Some(export) = var("CERTIFICATE_EXPORT_NAME") {
            config.certificate.export_name =
                ExportName::new(export).map_err(|e| invalid("CERTIFICATE_EXPORT_NAME", e))?;
        }

        if let Some(retain) = var("SITE_RETAIN_BUCKET") {
            config.site.retain_bucket = parse_flag("SITE_RETAIN_BUCKET", &retain)?;
        }
        if let Some(www) = var("SITE_WWW_ALIAS") {
            config.site.include_www_alias = parse_flag("SITE_WWW_ALIAS", &www)?;
        }
        if let Some(units) = var("SYNTH_UNITS") {
            config.units = units.parse()?;
        }
        if let Some(path) = var("CDK_CONTEXT_FILE") {
            config.context_file = PathBuf::from(path);
        }
        if let Some(path) = var("CDK_OUTDIR") {
            config.out_dir = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let unreadable = |reason: String| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason,
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| unreadable(e.to_string()))
    }

    /// Check that the selected units have what they need
    pub fn validate(&self) -> InfrastructureResult<()> {
        if self.units.dns && self.email_provider_mx_record.is_none() {
            return Err(InfrastructureError::missing(
                "EMAIL_PROVIDER_MX_RECORD",
                "the DNS unit needs the mail provider's MX host",
            ));
        }
        if self.units.site
            && !self.units.dns
            && self.certificate.strategy == CertificateStrategy::Direct
        {
            return Err(InfrastructureError::InvalidParameter {
                name: "CERTIFICATE_STRATEGY".to_string(),
                reason: "direct needs the DNS unit in the same app; use import or issue"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Resolve where the site's certificate comes from
    ///
    /// Runs before any unit declares a resource. The `import` strategy fails
    /// here when no ARN was supplied.
    pub fn certificate_source(
        &self,
        dns_handle: Option<&CertificateHandle>,
    ) -> InfrastructureResult<CertificateSource> {
        match self.certificate.strategy {
            CertificateStrategy::Direct => dns_handle
                .cloned()
                .map(CertificateSource::Direct)
                .ok_or_else(|| InfrastructureError::InvalidParameter {
                    name: "CERTIFICATE_STRATEGY".to_string(),
                    reason: "direct needs a certificate handle from the DNS unit".to_string(),
                }),
            CertificateStrategy::Import => {
                let arn = self
                    .certificate
                    .arn
                    .as_deref()
                    .map(str::trim)
                    .filter(|arn| !arn.is_empty())
                    .ok_or_else(|| {
                        InfrastructureError::missing(
                            ExportName::DEFAULT_CERTIFICATE_EXPORT,
                            "the import strategy needs a certificate ARN; set JOELITO_DEV_CERT_ARN",
                        )
                    })?;
                let arn = CertificateArn::new(arn)?;
                Ok(CertificateSource::Imported(ImportedCertificate::for_site(
                    arn,
                    &self.domain_name,
                )))
            }
            CertificateStrategy::Issue => Ok(CertificateSource::Issued),
        }
    }

    pub fn dns_props(&self) -> InfrastructureResult<DnsUnitProps> {
        let mail_exchange = self.email_provider_mx_record.clone().ok_or_else(|| {
            InfrastructureError::missing(
                "EMAIL_PROVIDER_MX_RECORD",
                "the DNS unit needs the mail provider's MX host",
            )
        })?;
        Ok(DnsUnitProps {
            domain: self.domain_name.clone(),
            mail_exchange,
            export_name: self.certificate.export_name.clone(),
        })
    }

    pub fn site_props(&self, certificate: CertificateSource) -> SiteUnitProps {
        SiteUnitProps {
            domain: self.domain_name.clone(),
            certificate,
            teardown: self.site.teardown(),
            include_www_alias: self.site.include_www_alias,
            index_document: self.site.index_document.clone(),
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(name, format!("expected a boolean, got {other:?}"))),
    }
}
