// Copyright (c) 2025 - Cowboy AI, Inc.
//! DNS Unit
//!
//! Owns the domain's authoritative zone. Declares:
//!
//! ```text
//! JoelitoDevHostedZone
//!   ├── JoelitoDevSiteCertificate   apex + www, DNS-validated in the zone
//!   └── JoelitoDevEmailMxRecord     "10 <provider host>"
//!
//! Outputs
//!   JoelitoDevCertArnExport  -> export JoelitoDevCertArn
//!   NameServers              -> delegation set, for the registrar
//! ```
//!
//! Registrar delegation is out of band: the operator copies `NameServers`
//! into the registrar after the first deployment.

use tracing::info;

use crate::domain::invariants::validate_certificate_zone;
use crate::domain::{
    CertificateCoverage, CertificateHandle, DomainName, Environment, ExportName, StackName,
};
use crate::errors::InfrastructureResult;
use crate::stack::Stack;
use crate::template::intrinsic::{get_att, join, reference};
use crate::template::{Certificate, HostedZone, MailExchange, RecordSet, RecordTarget, ZoneRef};

/// Inputs of the DNS unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsUnitProps {
    /// Apex the zone is authoritative for
    pub domain: DomainName,
    /// Mail provider's MX host
    pub mail_exchange: DomainName,
    /// Export the certificate ARN is published under
    pub export_name: ExportName,
}

/// What the DNS unit hands to units composed after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsUnitOutputs {
    pub certificate: CertificateHandle,
}

#[derive(Debug, Clone)]
pub struct DnsUnit {
    props: DnsUnitProps,
    coverage: CertificateCoverage,
}

impl DnsUnit {
    pub const ZONE_ID: &'static str = "JoelitoDevHostedZone";
    pub const CERTIFICATE_ID: &'static str = "JoelitoDevSiteCertificate";
    pub const MX_RECORD_ID: &'static str = "JoelitoDevEmailMxRecord";
    pub const CERTIFICATE_OUTPUT_ID: &'static str = "JoelitoDevCertArnExport";
    pub const NAME_SERVERS_OUTPUT_ID: &'static str = "NameServers";

    /// Fixed MX priority
    pub const MAIL_EXCHANGE_PRIORITY: u16 = 10;

    pub fn new(props: DnsUnitProps) -> InfrastructureResult<Self> {
        // The certificate also names `www.<apex>`, which must be a valid name itself.
        props.domain.subdomain("www")?;
        let coverage = CertificateCoverage::apex_and_www(&props.domain);
        validate_certificate_zone(&coverage, &props.domain)?;
        Ok(Self { props, coverage })
    }

    pub fn props(&self) -> &DnsUnitProps {
        &self.props
    }

    /// Declare the zone, certificate and MX record
    pub fn synthesize(
        &self,
        stack_name: StackName,
        environment: Environment,
    ) -> InfrastructureResult<(Stack, DnsUnitOutputs)> {
        let domain = &self.props.domain;
        let mut stack = Stack::new(stack_name.clone(), environment.clone())
            .with_description(format!("Hosted zone, certificate and mail routing for {domain}"));

        let zone = stack.add(Self::ZONE_ID, &HostedZone { name: domain.clone() })?;

        let certificate = stack.add(
            Self::CERTIFICATE_ID,
            &Certificate {
                coverage: self.coverage.clone(),
                validation_zone: ZoneRef::Declared(zone.clone()),
            },
        )?;

        stack.add(
            Self::MX_RECORD_ID,
            &RecordSet {
                zone: ZoneRef::Declared(zone.clone()),
                name: domain.clone(),
                target: RecordTarget::Mx(vec![MailExchange {
                    priority: Self::MAIL_EXCHANGE_PRIORITY,
                    host: self.props.mail_exchange.clone(),
                }]),
            },
        )?;

        stack.add_output(
            Self::CERTIFICATE_OUTPUT_ID,
            reference(&certificate),
            Some(self.props.export_name.clone()),
            Some("ARN of the site certificate"),
        )?;
        stack.add_output(
            Self::NAME_SERVERS_OUTPUT_ID,
            join(", ", get_att(&zone, "NameServers")),
            None,
            Some("Register these name servers with the domain registrar"),
        )?;

        stack.validate()?;
        info!(
            stack = %stack_name,
            domain = %domain,
            export = %self.props.export_name,
            "Synthesized DNS unit"
        );

        let handle = CertificateHandle {
            stack: stack_name,
            logical_id: certificate,
            export_name: self.props.export_name.clone(),
            coverage: self.coverage.clone(),
            environment,
        };
        Ok((stack, DnsUnitOutputs { certificate: handle }))
    }
}
