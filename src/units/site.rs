// Copyright (c) 2025 - Cowboy AI, Inc.
//! Site Unit
//!
//! Serves the domain's static content over HTTPS through a CDN, with the
//! origin bucket reachable only by that CDN.
//!
//! ```text
//!              lookup (must exist)
//!   zone ─────────────────────────────┐
//!                                     ▼
//!   WebsiteBucket <── BucketOAC ── SiteDistribution <── SiteAliasRecord (A alias)
//!        ▲                             ▲
//!        └── WebsiteBucketPolicy ──────┘                SiteAliasWwwRecord (CNAME)
//! ```
//!
//! Everything that can be checked locally is checked in [`SiteUnit::new`]:
//! the bound aliases against the certificate's names, certificate region and
//! teardown settings. [`SiteUnit::synthesize`] then resolves the zone before it
//! declares a single resource.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::invariants::{
    validate_bucket_private, validate_certificate_zone, validate_distribution_certificate_region,
    validate_distribution_domains, validate_teardown, validate_viewer_protocol,
};
use crate::domain::{
    BucketTeardown, CertificateCoverage, CertificateSource, DomainName, Effect, Environment,
    LogicalId, PolicyStatement, Principal, PublicAccessBlock, ResourceKind, StackName,
    ViewerProtocolPolicy,
};
use crate::errors::InfrastructureResult;
use crate::lookup::{require_zone, HostedZoneAttributes, ZoneLookup, ZoneQuery};
use crate::stack::Stack;
use crate::template::intrinsic::{get_att, import_value, join, pseudo, reference};
use crate::template::{
    AutoDeleteFunction, AutoDeleteObjects, AutoDeleteRole, Bucket, BucketPolicy, Certificate,
    Distribution, OriginAccessControl, RecordSet, RecordTarget, ResourceDeclaration, ZoneRef,
};

/// Inputs of the site unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUnitProps {
    pub domain: DomainName,
    pub certificate: CertificateSource,
    /// Defaults to [`BucketTeardown::destroy`]
    pub teardown: BucketTeardown,
    /// Bind `www.<domain>` on the distribution in addition to the apex.
    /// On by default; turn off only with a certificate that covers the apex
    /// alone.
    pub include_www_alias: bool,
    pub index_document: String,
}

impl SiteUnitProps {
    pub fn new(domain: DomainName, certificate: CertificateSource) -> Self {
        Self {
            domain,
            certificate,
            teardown: BucketTeardown::default(),
            include_www_alias: true,
            index_document: "index.html".to_string(),
        }
    }

    pub fn with_teardown(mut self, teardown: BucketTeardown) -> Self {
        self.teardown = teardown;
        self
    }

    pub fn with_www_alias(mut self, include: bool) -> Self {
        self.include_www_alias = include;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SiteUnit {
    props: SiteUnitProps,
    aliases: Vec<DomainName>,
    www: DomainName,
    coverage: CertificateCoverage,
}

impl SiteUnit {
    pub const BUCKET_ID: &'static str = "WebsiteBucket";
    pub const BUCKET_POLICY_ID: &'static str = "WebsiteBucketPolicy";
    pub const OAC_ID: &'static str = "BucketOAC";
    pub const DISTRIBUTION_ID: &'static str = "SiteDistribution";
    pub const ALIAS_RECORD_ID: &'static str = "SiteAliasRecord";
    pub const WWW_RECORD_ID: &'static str = "SiteAliasWwwRecord";
    pub const CERTIFICATE_ID: &'static str = "SiteCertificate";
    pub const AUTO_DELETE_ROLE_ID: &'static str = "WebsiteBucketAutoDeleteRole";
    pub const AUTO_DELETE_HANDLER_ID: &'static str = "WebsiteBucketAutoDeleteHandler";
    pub const AUTO_DELETE_ID: &'static str = "WebsiteBucketAutoDeleteObjects";
    pub const NAME_SERVERS_OUTPUT_ID: &'static str = "NameServers";

    pub const VIEWER_PROTOCOL: ViewerProtocolPolicy = ViewerProtocolPolicy::RedirectToHttps;

    /// Validate inputs; no stack exists yet when this fails
    pub fn new(props: SiteUnitProps) -> InfrastructureResult<Self> {
        validate_teardown(&props.teardown)?;
        validate_viewer_protocol(Self::VIEWER_PROTOCOL)?;

        let www = props.domain.subdomain("www")?;
        let mut aliases = vec![props.domain.clone()];
        if props.include_www_alias {
            aliases.push(www.clone());
        }

        let coverage = match &props.certificate {
            CertificateSource::Direct(handle) => {
                validate_distribution_certificate_region(&handle.environment.region)?;
                handle.coverage.clone()
            }
            CertificateSource::Imported(imported) => {
                validate_distribution_certificate_region(imported.arn.region())?;
                imported.coverage.clone()
            }
            // A self-issued certificate names exactly the bound aliases.
            CertificateSource::Issued => CertificateCoverage {
                domain_name: props.domain.clone(),
                subject_alternative_names: aliases
                    .iter()
                    .skip(1)
                    .map(DomainName::to_string)
                    .collect(),
            },
        };
        validate_distribution_domains(&aliases, &coverage)?;

        Ok(Self {
            props,
            aliases,
            www,
            coverage,
        })
    }

    pub fn props(&self) -> &SiteUnitProps {
        &self.props
    }

    /// Names the distribution answers for
    pub fn aliases(&self) -> &[DomainName] {
        &self.aliases
    }

    /// Names of the certificate the distribution serves
    pub fn certificate_coverage(&self) -> &CertificateCoverage {
        &self.coverage
    }

    /// Resolve the zone, then declare the site's resources
    pub async fn synthesize(
        &self,
        stack_name: StackName,
        environment: Environment,
        lookup: &dyn ZoneLookup,
    ) -> InfrastructureResult<Stack> {
        let domain = &self.props.domain;
        if matches!(self.props.certificate, CertificateSource::Issued) {
            // A self-issued certificate lives in this stack's region.
            validate_distribution_certificate_region(&environment.region)?;
        }

        let zone = require_zone(lookup, &ZoneQuery::new(domain, &environment)?).await?;

        let mut stack = Stack::new(stack_name.clone(), environment)
            .with_description(format!("Static site for {domain} behind a CDN"));

        let bucket_declaration = Bucket {
            public_access: PublicAccessBlock::block_all(),
            index_document: self.props.index_document.clone(),
            teardown: self.props.teardown,
        };
        if bucket_declaration.kind().holds_data() && self.props.teardown.is_destructive() {
            warn!(
                stack = %stack_name,
                "Site bucket and its objects are deleted with the stack; retain the bucket for production"
            );
        }
        let bucket = stack.add(Self::BUCKET_ID, &bucket_declaration)?;

        let oac = stack.add(
            Self::OAC_ID,
            &OriginAccessControl::named(&format!("{}-{}", stack_name, Self::OAC_ID)),
        )?;

        let certificate_arn = self.certificate_arn(&mut stack, &zone)?;
        let distribution = stack.add(
            Self::DISTRIBUTION_ID,
            &Distribution {
                origin_bucket: bucket.clone(),
                origin_access_control: oac,
                viewer_protocol: Self::VIEWER_PROTOCOL,
                aliases: self.aliases.clone(),
                certificate_arn,
                default_root_object: Some(self.props.index_document.clone()),
            },
        )?;

        let statements = bucket_statements(&bucket, &distribution);
        validate_bucket_private(&bucket_declaration.public_access, &statements)?;
        let policy = stack.add(
            Self::BUCKET_POLICY_ID,
            &BucketPolicy {
                bucket: bucket.clone(),
                statements,
            },
        )?;

        let zone_ref = ZoneRef::Existing(zone.id.clone());
        stack.add(
            Self::ALIAS_RECORD_ID,
            &RecordSet {
                zone: zone_ref.clone(),
                name: domain.clone(),
                target: RecordTarget::CloudFrontAlias {
                    distribution: distribution.clone(),
                },
            },
        )?;
        stack.add(
            Self::WWW_RECORD_ID,
            &RecordSet {
                zone: zone_ref,
                name: self.www.clone(),
                target: RecordTarget::Cname(domain.clone()),
            },
        )?;

        if self.props.teardown.auto_delete_objects {
            let role = stack.add(
                Self::AUTO_DELETE_ROLE_ID,
                &AutoDeleteRole {
                    bucket: bucket.clone(),
                },
            )?;
            let handler = stack.add(Self::AUTO_DELETE_HANDLER_ID, &AutoDeleteFunction { role })?;
            let auto_delete = stack.add(
                Self::AUTO_DELETE_ID,
                &AutoDeleteObjects {
                    provider: handler,
                    bucket,
                },
            )?;
            // The handler must keep bucket access until the objects are gone.
            stack.add_dependency(&auto_delete, &policy)?;
        }

        stack.add_output(
            Self::NAME_SERVERS_OUTPUT_ID,
            name_servers_value(&zone),
            None,
            Some("Name servers of the looked-up zone"),
        )?;

        stack.validate()?;
        info!(
            stack = %stack_name,
            domain = %domain,
            certificate = self.props.certificate.strategy(),
            aliases = self.aliases.len(),
            resources = stack.resources().len(),
            "Synthesized site unit"
        );
        Ok(stack)
    }

    /// ARN value for the distribution, declaring a certificate if needed
    fn certificate_arn(
        &self,
        stack: &mut Stack,
        zone: &HostedZoneAttributes,
    ) -> InfrastructureResult<Value> {
        match &self.props.certificate {
            CertificateSource::Direct(handle) => Ok(import_value(&handle.export_name)),
            CertificateSource::Imported(imported) => Ok(json!(imported.arn.as_str())),
            CertificateSource::Issued => {
                validate_certificate_zone(&self.coverage, &zone.name)?;
                let certificate = stack.add(
                    Self::CERTIFICATE_ID,
                    &Certificate {
                        coverage: self.coverage.clone(),
                        validation_zone: ZoneRef::Existing(zone.id.clone()),
                    },
                )?;
                Ok(reference(&certificate))
            }
        }
    }
}

/// TLS-only deny plus the CDN's read grant, pinned to one distribution
fn bucket_statements(bucket: &LogicalId, distribution: &LogicalId) -> Vec<PolicyStatement> {
    let bucket_arn = get_att(bucket, "Arn");
    let objects = join("", json!([bucket_arn.clone(), "/*"]));
    let distribution_arn = join(
        "",
        json!([
            "arn:",
            pseudo("Partition"),
            ":cloudfront::",
            pseudo("AccountId"),
            ":distribution/",
            reference(distribution),
        ]),
    );

    vec![
        PolicyStatement {
            effect: Effect::Deny,
            principal: Principal::Anyone,
            actions: vec!["s3:*".to_string()],
            resources: vec![bucket_arn, objects.clone()],
            condition: Some(json!({ "Bool": { "aws:SecureTransport": "false" } })),
        },
        PolicyStatement {
            effect: Effect::Allow,
            principal: Principal::Service(Principal::CLOUDFRONT.to_string()),
            actions: vec!["s3:GetObject".to_string()],
            resources: vec![objects],
            condition: Some(json!({ "StringEquals": { "AWS:SourceArn": distribution_arn } })),
        },
    ]
}

fn name_servers_value(zone: &HostedZoneAttributes) -> Value {
    if zone.name_servers.is_empty() {
        json!("none")
    } else {
        json!(zone.name_servers.join(", "))
    }
}

/// Kinds the site unit always declares, independent of options
pub fn required_kinds() -> [ResourceKind; 5] {
    [
        ResourceKind::Bucket,
        ResourceKind::BucketPolicy,
        ResourceKind::OriginAccessControl,
        ResourceKind::Distribution,
        ResourceKind::RecordSet,
    ]
}
