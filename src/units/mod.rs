// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployable Units
//!
//! - [`DnsUnit`]: leaf unit owning the zone, certificate and mail routing
//! - [`SiteUnit`]: CDN-fronted private bucket, depending on the zone and
//!   a certificate

pub mod dns;
pub mod site;

pub use dns::{DnsUnit, DnsUnitOutputs, DnsUnitProps};
pub use site::{SiteUnit, SiteUnitProps};

/// Stack name of the DNS unit
pub const DNS_STACK_NAME: &str = "JoelitoDevDnsStack";

/// Stack name of the site unit
pub const SITE_STACK_NAME: &str = "JoelitoDevInfraStack";
