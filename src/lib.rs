//! Typed infrastructure synthesis for joelito.dev
//!
//! Two deployable units, composed in a strict order:
//!
//! - the DNS unit owns the hosted zone, the site certificate and mail routing
//! - the site unit serves a private bucket through a CDN on the apex domain
//!
//! Units declare resources into [`Stack`]s, an [`App`] orders the stacks,
//! and synthesis folds them into templates plus a manifest.

pub mod app;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lookup;
pub mod projection;
pub mod stack;
pub mod template;
pub mod units;

// Re-export commonly used types
pub use app::{compose, App};
pub use config::{CertificateStrategy, DeploymentConfig};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use lookup::{ContextZoneLookup, StaticZoneLookup, ZoneLookup};
pub use stack::Stack;
pub use units::{DnsUnit, SiteUnit};
