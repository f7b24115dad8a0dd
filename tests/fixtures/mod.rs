// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for joelito-dev-infrastructure
//!
//! Deterministic inputs for unit and composition tests.
//!
//! # Design Principles
//! - Synthesis metadata is fixed (no `Uuid::now_v7()` or `Utc::now()`)
//! - Every test domain resolves through [`zone_lookup`] unless a test is
//!   about a missing zone
//! - [`RecordingLookup`] proves whether a lookup happened at all

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use joelito_dev_infrastructure::config::{CertificateStrategy, DeploymentConfig, UnitSelection};
use joelito_dev_infrastructure::domain::{
    CertificateArn, CertificateSource, DomainName, Environment, HostedZoneId, ImportedCertificate,
};
use joelito_dev_infrastructure::lookup::{
    HostedZoneAttributes, LookupError, StaticZoneLookup, ZoneLookup, ZoneQuery,
};
use joelito_dev_infrastructure::projection::SynthMetadata;

pub const DOMAIN: &str = "example.com";
pub const MAIL_PROVIDER: &str = "mx.mail.example.net";
pub const ACCOUNT: &str = "123456789012";
pub const REGION: &str = "us-east-1";
pub const ZONE_ID: &str = "Z0123456789ABCDEFGHIJ";
pub const CERT_ARN: &str =
    "arn:aws:acm:us-east-1:123456789012:certificate/0f1e2d3c-4b5a-6978-8a9b-0c1d2e3f4a5b";
pub const NAME_SERVERS: [&str; 2] = ["ns-1.awsdns-01.org", "ns-2.awsdns-02.co.uk"];

pub const RUN_ID: &str = "01934f4a-0001-7000-8000-000000000001";
// 2026-01-19T12:00:00Z
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub fn domain() -> DomainName {
    DomainName::new(DOMAIN).expect("Invalid domain in test fixture")
}

pub fn environment() -> Environment {
    Environment::new(Some(ACCOUNT.to_string()), REGION)
}

pub fn metadata() -> SynthMetadata {
    SynthMetadata {
        run_id: Uuid::parse_str(RUN_ID).expect("Invalid UUID in test fixture"),
        generated_at: DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
            .expect("Invalid timestamp in test fixture")
            .with_timezone(&Utc),
    }
}

pub fn zone_attributes() -> HostedZoneAttributes {
    HostedZoneAttributes {
        id: HostedZoneId::new(ZONE_ID).expect("Invalid zone id in test fixture"),
        name: domain(),
        name_servers: NAME_SERVERS.iter().map(|ns| ns.to_string()).collect(),
    }
}

/// Lookup that knows the fixture zone
pub fn zone_lookup() -> StaticZoneLookup {
    StaticZoneLookup::new().with_zone(
        ZoneQuery::new(&domain(), &environment()).expect("Invalid query in test fixture"),
        zone_attributes(),
    )
}

pub fn imported_certificate() -> CertificateSource {
    CertificateSource::Imported(ImportedCertificate::for_site(
        CertificateArn::new(CERT_ARN).expect("Invalid ARN in test fixture"),
        &domain(),
    ))
}

/// Config for both units with the given strategy
pub fn config(strategy: CertificateStrategy) -> DeploymentConfig {
    let mut config = DeploymentConfig::new(domain());
    config.email_provider_mx_record =
        Some(DomainName::new(MAIL_PROVIDER).expect("Invalid MX host in test fixture"));
    config.environment = environment();
    config.certificate.strategy = strategy;
    if strategy == CertificateStrategy::Import {
        config.certificate.arn = Some(CERT_ARN.to_string());
    }
    config
}

/// Config synthesizing only the site unit
pub fn site_only_config(strategy: CertificateStrategy) -> DeploymentConfig {
    let mut config = config(strategy);
    config.units = UnitSelection {
        dns: false,
        site: true,
    };
    config
}

/// Lookup wrapper counting calls
pub struct RecordingLookup<L> {
    inner: L,
    calls: AtomicUsize,
}

impl<L: ZoneLookup> RecordingLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<L: ZoneLookup> ZoneLookup for RecordingLookup<L> {
    async fn find_zone(
        &self,
        query: &ZoneQuery,
    ) -> Result<Option<HostedZoneAttributes>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_zone(query).await
    }
}
