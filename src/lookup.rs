// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hosted Zone Lookup
//!
//! The site unit does not own its zone. It resolves an existing zone by
//! domain name in the target account and region before declaring anything
//! that points into it.
//!
//! Lookups are keyed the way the provisioning toolkit caches them in its
//! context file:
//!
//! ```text
//! hosted-zone:account=123456789012:domainName=example.com:region=us-east-1
//! ```
//!
//! A missing zone is turned into an explicit precondition failure by
//! [`require_zone`] instead of surfacing later as an engine error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{DomainName, Environment, HostedZoneId};
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Lookup failure other than "zone does not exist"
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to read lookup context {path}: {reason}")]
    ContextUnreadable { path: PathBuf, reason: String },

    #[error("Malformed lookup context entry {key}: {reason}")]
    MalformedEntry { key: String, reason: String },
}

impl From<LookupError> for InfrastructureError {
    fn from(err: LookupError) -> Self {
        InfrastructureError::Lookup(err.to_string())
    }
}

/// What to look up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneQuery {
    pub domain: DomainName,
    pub account: String,
    pub region: String,
}

impl ZoneQuery {
    /// Build a query for `domain` in `environment`
    ///
    /// Lookups are environment-bound, so an account is required.
    pub fn new(domain: &DomainName, environment: &Environment) -> InfrastructureResult<Self> {
        let account = environment.account.clone().ok_or_else(|| {
            InfrastructureError::missing(
                "account",
                "zone lookups need an explicit account; set CDK_DEFAULT_ACCOUNT",
            )
        })?;
        Ok(Self {
            domain: domain.clone(),
            account,
            region: environment.region.clone(),
        })
    }

    /// Context cache key
    pub fn context_key(&self) -> String {
        format!(
            "hosted-zone:account={}:domainName={}:region={}",
            self.account, self.domain, self.region
        )
    }
}

/// Resolved zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZoneAttributes {
    pub id: HostedZoneId,
    pub name: DomainName,
    /// Delegation set; empty when the lookup source does not report it
    #[serde(default)]
    pub name_servers: Vec<String>,
}

/// Source of existing hosted zones
#[async_trait]
pub trait ZoneLookup: Send + Sync {
    /// Find the zone named by `query`; `Ok(None)` when it does not exist
    async fn find_zone(
        &self,
        query: &ZoneQuery,
    ) -> Result<Option<HostedZoneAttributes>, LookupError>;
}

/// Resolve a zone or fail with a "deploy the DNS unit first" error
pub async fn require_zone(
    lookup: &dyn ZoneLookup,
    query: &ZoneQuery,
) -> InfrastructureResult<HostedZoneAttributes> {
    debug!(key = %query.context_key(), "Looking up hosted zone");
    match lookup.find_zone(query).await? {
        Some(zone) => {
            info!(domain = %query.domain, zone_id = %zone.id, "Resolved hosted zone");
            Ok(zone)
        }
        None => Err(InfrastructureError::ZoneNotFound {
            domain: query.domain.to_string(),
            environment: format!("aws://{}/{}", query.account, query.region),
        }),
    }
}

/// Raw context entry, as the toolkit writes it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContextZoneEntry {
    id: String,
    name: String,
    #[serde(default)]
    name_servers: Vec<String>,
}

/// Lookup backed by a JSON context file
#[derive(Debug, Clone, Default)]
pub struct ContextZoneLookup {
    entries: HashMap<String, HostedZoneAttributes>,
}

impl ContextZoneLookup {
    /// Load a context file; a missing file is an empty context
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let path = path.as_ref();
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No lookup context file, starting empty");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(LookupError::ContextUnreadable {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                })
            }
        };
        let document: serde_json::Value =
            serde_json::from_str(&raw).map_err(|err| LookupError::ContextUnreadable {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        Self::from_value(&document)
    }

    /// Parse the hosted-zone entries of a context document
    ///
    /// Keys not starting with `hosted-zone:` belong to other lookups and are
    /// ignored.
    pub fn from_value(document: &serde_json::Value) -> Result<Self, LookupError> {
        let mut entries = HashMap::new();
        let Some(map) = document.as_object() else {
            return Ok(Self::default());
        };

        for (key, value) in map.iter().filter(|(key, _)| key.starts_with("hosted-zone:")) {
            let malformed = |reason: String| LookupError::MalformedEntry {
                key: key.clone(),
                reason,
            };
            let entry: ContextZoneEntry =
                serde_json::from_value(value.clone()).map_err(|e| malformed(e.to_string()))?;
            let attributes = HostedZoneAttributes {
                id: HostedZoneId::new(entry.id).map_err(|e| malformed(e.to_string()))?,
                name: DomainName::new(entry.name).map_err(|e| malformed(e.to_string()))?,
                name_servers: entry.name_servers,
            };
            entries.insert(key.clone(), attributes);
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ZoneLookup for ContextZoneLookup {
    async fn find_zone(
        &self,
        query: &ZoneQuery,
    ) -> Result<Option<HostedZoneAttributes>, LookupError> {
        Ok(self.entries.get(&query.context_key()).cloned())
    }
}

/// In-memory lookup for pre-resolved zones
#[derive(Debug, Clone, Default)]
pub struct StaticZoneLookup {
    zones: HashMap<ZoneQuery, HostedZoneAttributes>,
}

impl StaticZoneLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `zone` as the answer for `query`
    pub fn with_zone(mut self, query: ZoneQuery, zone: HostedZoneAttributes) -> Self {
        self.zones.insert(query, zone);
        self
    }
}

#[async_trait]
impl ZoneLookup for StaticZoneLookup {
    async fn find_zone(
        &self,
        query: &ZoneQuery,
    ) -> Result<Option<HostedZoneAttributes>, LookupError> {
        Ok(self.zones.get(query).cloned())
    }
}
