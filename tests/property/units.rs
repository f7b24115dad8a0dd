// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the DNS and Site Units
//!
//! For every valid domain the units must produce the same resource shape,
//! and every rendered graph must be closed and acyclic.

use proptest::prelude::*;
use serde_json::json;

use crate::fixtures::{ACCOUNT, CERT_ARN, MAIL_PROVIDER};
use joelito_dev_infrastructure::domain::{
    BucketTeardown, CertificateArn, CertificateCoverage, CertificateSource, DomainName,
    Environment, ExportName, HostedZoneId, ImportedCertificate, ResourceKind, StackName,
};
use joelito_dev_infrastructure::lookup::{HostedZoneAttributes, StaticZoneLookup, ZoneQuery};
use joelito_dev_infrastructure::units::{DnsUnit, DnsUnitProps, SiteUnit, SiteUnitProps};
use joelito_dev_infrastructure::Stack;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate a DNS label such as `a1-b`
fn label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,14}[a-z0-9]"
}

/// Generate an apex such as `foo.bar.dev`
fn domain_name() -> impl Strategy<Value = DomainName> {
    (prop::collection::vec(label(), 1..4), "[a-z]{2,6}").prop_map(|(labels, tld)| {
        DomainName::new(format!("{}.{}", labels.join("."), tld)).expect("generated name is valid")
    })
}

fn environment() -> Environment {
    Environment::new(Some(ACCOUNT.to_string()), "us-east-1")
}

fn dns_stack(domain: &DomainName) -> Stack {
    DnsUnit::new(DnsUnitProps {
        domain: domain.clone(),
        mail_exchange: DomainName::new(MAIL_PROVIDER).unwrap(),
        export_name: ExportName::default_certificate_export(),
    })
    .unwrap()
    .synthesize(StackName::new("Dns").unwrap(), environment())
    .unwrap()
    .0
}

/// Certificate names matching the bound aliases
fn coverage(domain: &DomainName, www: bool) -> CertificateCoverage {
    if www {
        CertificateCoverage::apex_and_www(domain)
    } else {
        CertificateCoverage {
            domain_name: domain.clone(),
            subject_alternative_names: vec![],
        }
    }
}

fn site_stack(domain: &DomainName, teardown: BucketTeardown, www: bool, issued: bool) -> Stack {
    let lookup = StaticZoneLookup::new().with_zone(
        ZoneQuery::new(domain, &environment()).unwrap(),
        HostedZoneAttributes {
            id: HostedZoneId::new("Z0PROPERTY").unwrap(),
            name: domain.clone(),
            name_servers: vec![],
        },
    );
    let certificate = if issued {
        CertificateSource::Issued
    } else {
        CertificateSource::Imported(ImportedCertificate {
            arn: CertificateArn::new(CERT_ARN).unwrap(),
            coverage: coverage(domain, www),
        })
    };
    let unit = SiteUnit::new(
        SiteUnitProps::new(domain.clone(), certificate)
            .with_teardown(teardown)
            .with_www_alias(www),
    )
    .unwrap();

    tokio_test::block_on(unit.synthesize(StackName::new("Site").unwrap(), environment(), &lookup))
        .unwrap()
}

fn teardown_strategy() -> impl Strategy<Value = BucketTeardown> {
    prop_oneof![Just(BucketTeardown::destroy()), Just(BucketTeardown::retain())]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: the DNS unit always declares one zone, one certificate and
    /// one MX record at priority 10
    #[test]
    fn prop_dns_unit_shape(domain in domain_name()) {
        let stack = dns_stack(&domain);

        prop_assert_eq!(stack.resources_of(ResourceKind::HostedZone).count(), 1);
        prop_assert_eq!(stack.resources_of(ResourceKind::Certificate).count(), 1);
        prop_assert_eq!(stack.resources_of(ResourceKind::RecordSet).count(), 1);

        let mx = stack.resource(DnsUnit::MX_RECORD_ID).unwrap();
        let expected = json!([format!("10 {}", MAIL_PROVIDER)]);
        prop_assert_eq!(&mx.properties["ResourceRecords"], &expected);

        let certificate = stack.resource(DnsUnit::CERTIFICATE_ID).unwrap();
        let san = json!([format!("www.{}", domain)]);
        prop_assert_eq!(&certificate.properties["SubjectAlternativeNames"], &san);
    }

    /// Property: rendered DNS templates are closed and acyclic
    #[test]
    fn prop_dns_graph_valid(domain in domain_name()) {
        let stack = dns_stack(&domain);
        prop_assert!(stack.validate().is_ok());
        let order = stack.creation_order().unwrap();
        prop_assert_eq!(order[0].as_str(), DnsUnit::ZONE_ID);
    }

    /// Property: the site unit always declares one private bucket, one
    /// HTTPS-only distribution, one apex alias and one www CNAME
    #[test]
    fn prop_site_unit_shape(
        domain in domain_name(),
        teardown in teardown_strategy(),
        www in any::<bool>(),
        issued in any::<bool>(),
    ) {
        let stack = site_stack(&domain, teardown, www, issued);
        let template = stack.to_template().unwrap();

        prop_assert_eq!(stack.resources_of(ResourceKind::Bucket).count(), 1);
        prop_assert_eq!(stack.resources_of(ResourceKind::Distribution).count(), 1);
        prop_assert_eq!(stack.resources_of(ResourceKind::RecordSet).count(), 2);

        let bucket = &template.resources[SiteUnit::BUCKET_ID].properties;
        for flag in ["BlockPublicAcls", "BlockPublicPolicy", "IgnorePublicAcls", "RestrictPublicBuckets"] {
            prop_assert_eq!(&bucket["PublicAccessBlockConfiguration"][flag], &json!(true));
        }

        let config = &template.resources[SiteUnit::DISTRIBUTION_ID].properties["DistributionConfig"];
        prop_assert_eq!(
            &config["DefaultCacheBehavior"]["ViewerProtocolPolicy"],
            &json!("redirect-to-https")
        );

        let apex = &template.resources[SiteUnit::ALIAS_RECORD_ID].properties;
        prop_assert_eq!(&apex["Name"], &json!(domain.fqdn()));
        let cname = &template.resources[SiteUnit::WWW_RECORD_ID].properties;
        prop_assert_eq!(&cname["Name"], &json!(format!("www.{}", domain.fqdn())));
        prop_assert_eq!(&cname["ResourceRecords"], &json!([domain.as_str()]));
    }

    /// Property: distribution aliases equal the certificate's names, whether
    /// the certificate is imported or issued by the site itself
    #[test]
    fn prop_aliases_match_certificate(
        domain in domain_name(),
        www in any::<bool>(),
        issued in any::<bool>(),
    ) {
        let stack = site_stack(&domain, BucketTeardown::destroy(), www, issued);
        let aliases = &stack.resource(SiteUnit::DISTRIBUTION_ID).unwrap().properties
            ["DistributionConfig"]["Aliases"];

        let names = if issued {
            let certificate = &stack.resource(SiteUnit::CERTIFICATE_ID).unwrap().properties;
            let mut names = vec![certificate["DomainName"].clone()];
            if let Some(sans) = certificate["SubjectAlternativeNames"].as_array() {
                names.extend(sans.iter().cloned());
            }
            json!(names)
        } else {
            json!(coverage(&domain, www).names())
        };
        prop_assert_eq!(aliases, &names);
    }

    /// Property: dropping a certificate name from the distribution is rejected
    #[test]
    fn prop_unbound_certificate_name_rejected(domain in domain_name()) {
        let certificate = CertificateSource::Imported(ImportedCertificate::for_site(
            CertificateArn::new(CERT_ARN).unwrap(),
            &domain,
        ));
        let result = SiteUnit::new(SiteUnitProps::new(domain, certificate).with_www_alias(false));
        prop_assert!(result.is_err());
    }

    /// Property: auto-deletion is declared exactly when the teardown is
    /// destructive
    #[test]
    fn prop_auto_delete_follows_teardown(domain in domain_name(), teardown in teardown_strategy()) {
        let stack = site_stack(&domain, teardown, false, false);
        let declared = stack.resources_of(ResourceKind::AutoDeleteObjects).count();
        prop_assert_eq!(declared == 1, teardown.is_destructive());
        prop_assert!(stack.validate().is_ok());
    }
}
