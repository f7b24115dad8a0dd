// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed Resource Declarations
//!
//! Each declaration knows its [`ResourceKind`] and renders its own
//! `Properties` block. Cross-resource wiring is expressed with the builders
//! in [`super::intrinsic`], so the stack can recover dependency edges from
//! the rendered properties alone.

use serde_json::{json, Value};

use super::intrinsic::{get_att, join, pseudo, reference};
use crate::domain::{
    BucketTeardown, CertificateCoverage, DomainName, HostedZoneId, LogicalId, PolicyStatement,
    PublicAccessBlock, RemovalPolicy, ResourceKind, ViewerProtocolPolicy,
};

/// Record TTL used for literal (non-alias) records, in seconds
pub const DEFAULT_RECORD_TTL: u32 = 1800;

/// Route 53 zone that fronts every CloudFront distribution alias
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// Managed `CachingOptimized` cache policy
pub const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";

/// Something that can be declared in a stack
pub trait ResourceDeclaration {
    fn kind(&self) -> ResourceKind;

    fn properties(&self) -> Value;

    /// Deletion/replacement policy; `None` keeps the engine default
    fn removal_policy(&self) -> Option<RemovalPolicy> {
        None
    }
}

/// Zone a record or certificate validation lands in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneRef {
    /// Zone declared in the same stack
    Declared(LogicalId),
    /// Zone resolved by lookup
    Existing(HostedZoneId),
}

impl ZoneRef {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Declared(id) => reference(id),
            Self::Existing(id) => Value::String(id.to_string()),
        }
    }
}

/// Public hosted zone
#[derive(Debug, Clone)]
pub struct HostedZone {
    pub name: DomainName,
}

impl ResourceDeclaration for HostedZone {
    fn kind(&self) -> ResourceKind {
        ResourceKind::HostedZone
    }

    fn properties(&self) -> Value {
        json!({ "Name": self.name.fqdn() })
    }
}

/// DNS-validated certificate
#[derive(Debug, Clone)]
pub struct Certificate {
    pub coverage: CertificateCoverage,
    pub validation_zone: ZoneRef,
}

impl ResourceDeclaration for Certificate {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Certificate
    }

    fn properties(&self) -> Value {
        let zone = self.validation_zone.to_value();
        let validation: Vec<Value> = self
            .coverage
            .names()
            .into_iter()
            .map(|name| json!({ "DomainName": name, "HostedZoneId": zone.clone() }))
            .collect();

        let mut properties = json!({
            "DomainName": self.coverage.domain_name.as_str(),
            "ValidationMethod": "DNS",
            "DomainValidationOptions": validation,
        });
        if !self.coverage.subject_alternative_names.is_empty() {
            properties["SubjectAlternativeNames"] = json!(self.coverage.subject_alternative_names);
        }
        properties
    }
}

/// Mail exchange entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailExchange {
    pub priority: u16,
    pub host: DomainName,
}

/// What a record resolves to
#[derive(Debug, Clone)]
pub enum RecordTarget {
    /// A-record alias onto a CloudFront distribution
    CloudFrontAlias { distribution: LogicalId },
    /// CNAME onto another name
    Cname(DomainName),
    /// Mail exchangers
    Mx(Vec<MailExchange>),
}

/// Record in a hosted zone
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub zone: ZoneRef,
    pub name: DomainName,
    pub target: RecordTarget,
}

impl RecordSet {
    pub fn record_type(&self) -> &'static str {
        match self.target {
            RecordTarget::CloudFrontAlias { .. } => "A",
            RecordTarget::Cname(_) => "CNAME",
            RecordTarget::Mx(_) => "MX",
        }
    }
}

impl ResourceDeclaration for RecordSet {
    fn kind(&self) -> ResourceKind {
        ResourceKind::RecordSet
    }

    fn properties(&self) -> Value {
        let mut properties = json!({
            "HostedZoneId": self.zone.to_value(),
            "Name": self.name.fqdn(),
            "Type": self.record_type(),
        });

        match &self.target {
            RecordTarget::CloudFrontAlias { distribution } => {
                properties["AliasTarget"] = json!({
                    "DNSName": get_att(distribution, "DomainName"),
                    "HostedZoneId": CLOUDFRONT_HOSTED_ZONE_ID,
                });
            }
            RecordTarget::Cname(target) => {
                properties["ResourceRecords"] = json!([target.as_str()]);
                properties["TTL"] = json!(DEFAULT_RECORD_TTL.to_string());
            }
            RecordTarget::Mx(exchanges) => {
                let values: Vec<String> = exchanges
                    .iter()
                    .map(|mx| format!("{} {}", mx.priority, mx.host))
                    .collect();
                properties["ResourceRecords"] = json!(values);
                properties["TTL"] = json!(DEFAULT_RECORD_TTL.to_string());
            }
        }
        properties
    }
}

/// Private origin bucket
#[derive(Debug, Clone)]
pub struct Bucket {
    pub public_access: PublicAccessBlock,
    pub index_document: String,
    pub teardown: BucketTeardown,
}

impl Bucket {
    /// Tag the auto-delete handler checks before emptying a bucket
    pub const AUTO_DELETE_TAG: &'static str = "aws-cdk:auto-delete-objects";
}

impl ResourceDeclaration for Bucket {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Bucket
    }

    fn properties(&self) -> Value {
        let mut properties = json!({
            "PublicAccessBlockConfiguration": self.public_access,
            "WebsiteConfiguration": { "IndexDocument": self.index_document },
        });
        if self.teardown.auto_delete_objects {
            properties["Tags"] = json!([{ "Key": Self::AUTO_DELETE_TAG, "Value": "true" }]);
        }
        properties
    }

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        Some(self.teardown.removal)
    }
}

/// Resource policy on the origin bucket
#[derive(Debug, Clone)]
pub struct BucketPolicy {
    pub bucket: LogicalId,
    pub statements: Vec<PolicyStatement>,
}

impl ResourceDeclaration for BucketPolicy {
    fn kind(&self) -> ResourceKind {
        ResourceKind::BucketPolicy
    }

    fn properties(&self) -> Value {
        let statements: Vec<Value> = self.statements.iter().map(PolicyStatement::to_value).collect();
        json!({
            "Bucket": reference(&self.bucket),
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": statements,
            },
        })
    }
}

/// SigV4 origin access control for an S3 origin
#[derive(Debug, Clone)]
pub struct OriginAccessControl {
    pub name: String,
}

impl OriginAccessControl {
    pub const MAX_NAME_LENGTH: usize = 64;

    /// Build from an arbitrary seed, truncated to the provider's limit
    pub fn named(seed: &str) -> Self {
        Self {
            name: seed.chars().take(Self::MAX_NAME_LENGTH).collect(),
        }
    }
}

impl ResourceDeclaration for OriginAccessControl {
    fn kind(&self) -> ResourceKind {
        ResourceKind::OriginAccessControl
    }

    fn properties(&self) -> Value {
        json!({
            "OriginAccessControlConfig": {
                "Name": self.name,
                "OriginAccessControlOriginType": "s3",
                "SigningBehavior": "no-override",
                "SigningProtocol": "sigv4",
            }
        })
    }
}

/// CDN distribution in front of the origin bucket
#[derive(Debug, Clone)]
pub struct Distribution {
    pub origin_bucket: LogicalId,
    pub origin_access_control: LogicalId,
    pub viewer_protocol: ViewerProtocolPolicy,
    pub aliases: Vec<DomainName>,
    /// ARN value: literal, `Ref` to a local certificate, or `Fn::ImportValue`
    pub certificate_arn: Value,
    pub default_root_object: Option<String>,
}

impl Distribution {
    fn origin_id(&self) -> String {
        format!("{}Origin", self.origin_bucket)
    }
}

impl ResourceDeclaration for Distribution {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Distribution
    }

    fn properties(&self) -> Value {
        let aliases: Vec<&str> = self.aliases.iter().map(DomainName::as_str).collect();
        let mut config = json!({
            "Enabled": true,
            "HttpVersion": "http2",
            "IPV6Enabled": true,
            "Aliases": aliases,
            "DefaultCacheBehavior": {
                "TargetOriginId": self.origin_id(),
                "ViewerProtocolPolicy": self.viewer_protocol.as_str(),
                "CachePolicyId": CACHING_OPTIMIZED_POLICY_ID,
                "Compress": true,
            },
            "Origins": [{
                "Id": self.origin_id(),
                "DomainName": get_att(&self.origin_bucket, "RegionalDomainName"),
                "S3OriginConfig": { "OriginAccessIdentity": "" },
                "OriginAccessControlId": get_att(&self.origin_access_control, "Id"),
            }],
            "ViewerCertificate": {
                "AcmCertificateArn": self.certificate_arn,
                "SslSupportMethod": "sni-only",
                "MinimumProtocolVersion": "TLSv1.2_2021",
            },
        });
        if let Some(root) = &self.default_root_object {
            config["DefaultRootObject"] = json!(root);
        }
        json!({ "DistributionConfig": config })
    }
}

/// Execution role of the auto-delete handler
#[derive(Debug, Clone)]
pub struct AutoDeleteRole {
    pub bucket: LogicalId,
}

impl ResourceDeclaration for AutoDeleteRole {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Role
    }

    fn properties(&self) -> Value {
        let bucket_arn = get_att(&self.bucket, "Arn");
        json!({
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                    "Action": "sts:AssumeRole",
                }],
            },
            "ManagedPolicyArns": [join("", json!([
                "arn:", pseudo("Partition"),
                ":iam::aws:policy/service-role/AWSLambdaBasicExecutionRole",
            ]))],
            "Policies": [{
                "PolicyName": "AutoDeleteObjects",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Action": [
                            "s3:GetBucketTagging",
                            "s3:ListBucket",
                            "s3:ListBucketVersions",
                            "s3:DeleteObject",
                            "s3:DeleteObjectVersion",
                        ],
                        "Resource": [bucket_arn.clone(), join("", json!([bucket_arn, "/*"]))],
                    }],
                },
            }],
        })
    }
}

/// Inline handler that empties a tagged bucket on stack deletion
#[derive(Debug, Clone)]
pub struct AutoDeleteFunction {
    pub role: LogicalId,
}

impl AutoDeleteFunction {
    const HANDLER_SOURCE: &'static str = r#"import boto3
import cfnresponse

TAG = "aws-cdk:auto-delete-objects"


def handler(event, context):
    status = cfnresponse.SUCCESS
    try:
        if event["RequestType"] == "Delete":
            name = event["ResourceProperties"]["BucketName"]
            tags = boto3.client("s3").get_bucket_tagging(Bucket=name)["TagSet"]
            if any(t["Key"] == TAG and t["Value"] == "true" for t in tags):
                bucket = boto3.resource("s3").Bucket(name)
                bucket.object_versions.delete()
                bucket.objects.all().delete()
    except Exception as err:
        print(err)
        status = cfnresponse.FAILED
    cfnresponse.send(event, context, status, {})
"#;
}

impl ResourceDeclaration for AutoDeleteFunction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Function
    }

    fn properties(&self) -> Value {
        json!({
            "Runtime": "python3.12",
            "Handler": "index.handler",
            "Timeout": 900,
            "MemorySize": 128,
            "Role": get_att(&self.role, "Arn"),
            "Code": { "ZipFile": Self::HANDLER_SOURCE },
            "Description": "Empties the site bucket before it is deleted",
        })
    }
}

/// Custom resource invoking the auto-delete handler for one bucket
#[derive(Debug, Clone)]
pub struct AutoDeleteObjects {
    pub provider: LogicalId,
    pub bucket: LogicalId,
}

impl ResourceDeclaration for AutoDeleteObjects {
    fn kind(&self) -> ResourceKind {
        ResourceKind::AutoDeleteObjects
    }

    fn properties(&self) -> Value {
        json!({
            "ServiceToken": get_att(&self.provider, "Arn"),
            "BucketName": reference(&self.bucket),
        })
    }

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        Some(RemovalPolicy::Destroy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> LogicalId {
        LogicalId::new(s).unwrap()
    }

    fn apex() -> DomainName {
        DomainName::new("example.com").unwrap()
    }

    #[test]
    fn test_hosted_zone_uses_absolute_name() {
        let zone = HostedZone { name: apex() };
        assert_eq!(zone.properties(), json!({ "Name": "example.com." }));
    }

    #[test]
    fn test_certificate_validates_every_name_in_zone() {
        let cert = Certificate {
            coverage: CertificateCoverage::apex_and_www(&apex()),
            validation_zone: ZoneRef::Declared(id("Zone")),
        };
        assert_eq!(
            cert.properties(),
            json!({
                "DomainName": "example.com",
                "SubjectAlternativeNames": ["www.example.com"],
                "ValidationMethod": "DNS",
                "DomainValidationOptions": [
                    { "DomainName": "example.com", "HostedZoneId": { "Ref": "Zone" } },
                    { "DomainName": "www.example.com", "HostedZoneId": { "Ref": "Zone" } },
                ],
            })
        );
    }

    #[test]
    fn test_mx_record() {
        let record = RecordSet {
            zone: ZoneRef::Declared(id("Zone")),
            name: apex(),
            target: RecordTarget::Mx(vec![MailExchange {
                priority: 10,
                host: DomainName::new("mx.mail.example.net").unwrap(),
            }]),
        };
        let props = record.properties();
        assert_eq!(props["Type"], json!("MX"));
        assert_eq!(props["ResourceRecords"], json!(["10 mx.mail.example.net"]));
        assert_eq!(props["TTL"], json!("1800"));
    }

    #[test]
    fn test_alias_record_targets_distribution() {
        let record = RecordSet {
            zone: ZoneRef::Existing(HostedZoneId::new("Z123").unwrap()),
            name: apex(),
            target: RecordTarget::CloudFrontAlias {
                distribution: id("SiteDistribution"),
            },
        };
        let props = record.properties();
        assert_eq!(props["HostedZoneId"], json!("Z123"));
        assert_eq!(
            props["AliasTarget"],
            json!({
                "DNSName": { "Fn::GetAtt": ["SiteDistribution", "DomainName"] },
                "HostedZoneId": CLOUDFRONT_HOSTED_ZONE_ID,
            })
        );
        assert!(props.get("TTL").is_none());
    }

    #[test]
    fn test_bucket_teardown_policy() {
        let bucket = Bucket {
            public_access: PublicAccessBlock::block_all(),
            index_document: "index.html".to_string(),
            teardown: BucketTeardown::retain(),
        };
        assert_eq!(bucket.removal_policy(), Some(RemovalPolicy::Retain));
        assert!(bucket.properties().get("Tags").is_none());
        assert_eq!(
            bucket.properties()["PublicAccessBlockConfiguration"]["BlockPublicAcls"],
            json!(true)
        );
    }

    #[test]
    fn test_oac_name_truncated() {
        let oac = OriginAccessControl::named(&"x".repeat(100));
        assert_eq!(oac.name.len(), OriginAccessControl::MAX_NAME_LENGTH);
    }
}
