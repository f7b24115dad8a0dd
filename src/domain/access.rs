// Copyright (c) 2025 - Cowboy AI, Inc.
//! Access and Teardown Policies
//!
//! Value objects describing who may read the site origin, how viewers must
//! connect, and what happens to the bucket when its stack is destroyed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// What the provisioning engine does with a resource on stack deletion or
/// replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// Delete the resource
    Destroy,
    /// Orphan the resource in the account
    Retain,
}

impl RemovalPolicy {
    /// `DeletionPolicy` / `UpdateReplacePolicy` value
    pub fn cfn_value(&self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
            Self::Retain => "Retain",
        }
    }
}

/// Teardown behaviour of the site bucket
///
/// The site default is [`BucketTeardown::destroy`], which deletes the bucket
/// and every object in it along with the stack. That loses data on purpose.
/// Production deployments should pass [`BucketTeardown::retain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTeardown {
    pub removal: RemovalPolicy,
    /// Empty the bucket before deletion (requires `Destroy`)
    pub auto_delete_objects: bool,
}

impl BucketTeardown {
    /// Delete bucket and contents with the stack
    pub fn destroy() -> Self {
        Self {
            removal: RemovalPolicy::Destroy,
            auto_delete_objects: true,
        }
    }

    /// Keep bucket and contents after the stack is gone
    pub fn retain() -> Self {
        Self {
            removal: RemovalPolicy::Retain,
            auto_delete_objects: false,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.removal == RemovalPolicy::Destroy
    }
}

impl Default for BucketTeardown {
    fn default() -> Self {
        Self::destroy()
    }
}

/// Bucket-level public access block (all four switches)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicAccessBlock {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    pub fn block_all() -> Self {
        Self {
            block_public_acls: true,
            block_public_policy: true,
            ignore_public_acls: true,
            restrict_public_buckets: true,
        }
    }

    pub fn blocks_everything(&self) -> bool {
        self.block_public_acls
            && self.block_public_policy
            && self.ignore_public_acls
            && self.restrict_public_buckets
    }
}

/// Viewer protocol policy of a cache behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerProtocolPolicy {
    AllowAll,
    HttpsOnly,
    RedirectToHttps,
}

impl ViewerProtocolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowAll => "allow-all",
            Self::HttpsOnly => "https-only",
            Self::RedirectToHttps => "redirect-to-https",
        }
    }

    /// Whether content is only ever served over TLS
    pub fn enforces_https(&self) -> bool {
        !matches!(self, Self::AllowAll)
    }
}

impl fmt::Display for ViewerProtocolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// IAM statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Statement principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// Everyone (`"*"`)
    Anyone,
    /// An AWS service principal such as `cloudfront.amazonaws.com`
    Service(String),
}

impl Principal {
    pub const CLOUDFRONT: &'static str = "cloudfront.amazonaws.com";

    pub fn to_value(&self) -> Value {
        match self {
            Self::Anyone => json!({ "AWS": "*" }),
            Self::Service(service) => json!({ "Service": service }),
        }
    }
}

/// One statement of a bucket policy
///
/// `resources` and `condition` are template values so they can carry
/// intrinsic references to the bucket and distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub principal: Principal,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl PolicyStatement {
    pub fn to_value(&self) -> Value {
        let mut statement = json!({
            "Effect": match self.effect {
                Effect::Allow => "Allow",
                Effect::Deny => "Deny",
            },
            "Principal": self.principal.to_value(),
            "Action": if self.actions.len() == 1 {
                Value::String(self.actions[0].clone())
            } else {
                json!(self.actions)
            },
            "Resource": if self.resources.len() == 1 {
                self.resources[0].clone()
            } else {
                Value::Array(self.resources.clone())
            },
        });
        if let (Some(condition), Some(map)) = (&self.condition, statement.as_object_mut()) {
            map.insert("Condition".to_string(), condition.clone());
        }
        statement
    }

    /// Whether the statement's condition pins `AWS:SourceArn`
    pub fn is_scoped_to_source(&self) -> bool {
        self.condition
            .as_ref()
            .and_then(|c| c.get("StringEquals"))
            .and_then(|c| c.get("AWS:SourceArn"))
            .is_some()
    }
}
