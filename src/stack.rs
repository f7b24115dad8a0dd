// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack - a deployable unit's resource graph
//!
//! A stack is an ordered set of declared resources plus the outputs it
//! publishes. Edges between resources come from two places:
//!
//! - **Implicit**: `Ref` / `Fn::GetAtt` found in a resource's properties
//! - **Explicit**: [`Stack::add_dependency`], rendered as `DependsOn`
//!
//! ```text
//! HostedZone ──Ref──> Certificate
//!     │
//!     └──────Ref──> MxRecord
//! ```
//!
//! [`Stack::creation_order`] is the order the engine will create resources
//! in. It is deterministic: among resources whose dependencies are
//! satisfied, the one declared first comes first.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::domain::{Environment, ExportName, LogicalId, RemovalPolicy, ResourceKind, StackName};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::template::intrinsic::{collect_imports, collect_references};
use crate::template::{
    ExportTemplate, OutputTemplate, ResourceDeclaration, ResourceTemplate, Template,
    FORMAT_VERSION,
};

/// Resource as recorded in a stack
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredResource {
    pub id: LogicalId,
    pub kind: ResourceKind,
    pub properties: Value,
    pub removal_policy: Option<RemovalPolicy>,
    depends_on: BTreeSet<LogicalId>,
}

impl DeclaredResource {
    /// Logical ids this resource points at through intrinsics
    pub fn references(&self) -> BTreeSet<String> {
        collect_references(&self.properties)
    }

    /// Explicit `DependsOn` edges
    pub fn depends_on(&self) -> &BTreeSet<LogicalId> {
        &self.depends_on
    }
}

/// Value a stack publishes after deployment
#[derive(Debug, Clone, PartialEq)]
pub struct StackOutput {
    pub id: LogicalId,
    pub description: Option<String>,
    pub value: Value,
    /// Cross-stack export name, if other stacks may import the value
    pub export: Option<ExportName>,
}

/// Deployable unit
#[derive(Debug, Clone)]
pub struct Stack {
    name: StackName,
    environment: Environment,
    description: Option<String>,
    resources: Vec<DeclaredResource>,
    outputs: Vec<StackOutput>,
}

impl Stack {
    pub fn new(name: StackName, environment: Environment) -> Self {
        Self {
            name,
            environment,
            description: None,
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &StackName {
        &self.name
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    fn id_taken(&self, id: &LogicalId) -> bool {
        self.resources.iter().any(|r| &r.id == id) || self.outputs.iter().any(|o| &o.id == id)
    }

    /// Declare a resource under `id`
    pub fn add<R: ResourceDeclaration>(
        &mut self,
        id: &str,
        declaration: &R,
    ) -> InfrastructureResult<LogicalId> {
        let id = LogicalId::new(id)?;
        if self.id_taken(&id) {
            return Err(InfrastructureError::DuplicateLogicalId {
                stack: self.name.to_string(),
                id: id.to_string(),
            });
        }

        debug!(stack = %self.name, id = %id, kind = %declaration.kind(), "Declared resource");
        self.resources.push(DeclaredResource {
            id: id.clone(),
            kind: declaration.kind(),
            properties: declaration.properties(),
            removal_policy: declaration.removal_policy(),
            depends_on: BTreeSet::new(),
        });
        Ok(id)
    }

    /// Require `dependency` to be created before `dependent`
    pub fn add_dependency(
        &mut self,
        dependent: &LogicalId,
        dependency: &LogicalId,
    ) -> InfrastructureResult<()> {
        if self.resource(dependent.as_str()).is_none() {
            return Err(InfrastructureError::UnknownResource {
                stack: self.name.to_string(),
                id: dependent.to_string(),
            });
        }
        if self.resource(dependency.as_str()).is_none() {
            return Err(self.dangling(dependent, dependency));
        }
        if let Some(resource) = self.resources.iter_mut().find(|r| &r.id == dependent) {
            resource.depends_on.insert(dependency.clone());
        }
        Ok(())
    }

    /// Publish a value, optionally as a cross-stack export
    pub fn add_output(
        &mut self,
        id: &str,
        value: Value,
        export: Option<ExportName>,
        description: Option<&str>,
    ) -> InfrastructureResult<()> {
        let id = LogicalId::new(id)?;
        if self.id_taken(&id) {
            return Err(InfrastructureError::DuplicateLogicalId {
                stack: self.name.to_string(),
                id: id.to_string(),
            });
        }
        if let Some(export) = &export {
            if self.exports().any(|existing| existing == export) {
                return Err(InfrastructureError::DuplicateExport {
                    stack: self.name.to_string(),
                    export: export.to_string(),
                });
            }
        }

        self.outputs.push(StackOutput {
            id,
            description: description.map(str::to_string),
            value,
            export,
        });
        Ok(())
    }

    pub fn resources(&self) -> &[DeclaredResource] {
        &self.resources
    }

    pub fn resource(&self, id: &str) -> Option<&DeclaredResource> {
        self.resources.iter().find(|r| r.id.as_str() == id)
    }

    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &DeclaredResource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    pub fn output(&self, id: &str) -> Option<&StackOutput> {
        self.outputs.iter().find(|o| o.id.as_str() == id)
    }

    /// Export names this stack publishes
    pub fn exports(&self) -> impl Iterator<Item = &ExportName> {
        self.outputs.iter().filter_map(|o| o.export.as_ref())
    }

    /// Export names this stack consumes via `Fn::ImportValue`
    pub fn imports(&self) -> BTreeSet<String> {
        self.resources
            .iter()
            .map(|r| &r.properties)
            .chain(self.outputs.iter().map(|o| &o.value))
            .flat_map(collect_imports)
            .collect()
    }

    fn dangling(&self, from: &LogicalId, to: &LogicalId) -> InfrastructureError {
        InfrastructureError::DanglingReference {
            stack: self.name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Every edge `resource -> resources it needs`, implicit and explicit
    fn dependency_map(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.resources
            .iter()
            .map(|r| {
                let mut deps = r.references();
                deps.extend(r.depends_on.iter().map(|d| d.to_string()));
                (r.id.to_string(), deps)
            })
            .collect()
    }

    /// Check references resolve and the graph is acyclic
    pub fn validate(&self) -> InfrastructureResult<()> {
        let declared: BTreeSet<&str> = self.resources.iter().map(|r| r.id.as_str()).collect();

        for resource in &self.resources {
            if let Some(missing) = resource
                .references()
                .into_iter()
                .find(|target| !declared.contains(target.as_str()))
            {
                return Err(InfrastructureError::DanglingReference {
                    stack: self.name.to_string(),
                    from: resource.id.to_string(),
                    to: missing,
                });
            }
        }

        for output in &self.outputs {
            if let Some(missing) = collect_references(&output.value)
                .into_iter()
                .find(|target| !declared.contains(target.as_str()))
            {
                return Err(InfrastructureError::DanglingReference {
                    stack: self.name.to_string(),
                    from: output.id.to_string(),
                    to: missing,
                });
            }
        }

        self.creation_order().map(|_| ())
    }

    /// Order in which the engine creates this stack's resources
    pub fn creation_order(&self) -> InfrastructureResult<Vec<LogicalId>> {
        let nodes: Vec<String> = self.resources.iter().map(|r| r.id.to_string()).collect();
        let order = topological_order(&nodes, &self.dependency_map()).map_err(|members| {
            InfrastructureError::DependencyCycle {
                scope: format!("stack {}", self.name),
                members,
            }
        })?;

        Ok(order
            .into_iter()
            .filter_map(|id| self.resource(&id).map(|r| r.id.clone()))
            .collect())
    }

    /// Validate and render the engine's template document
    pub fn to_template(&self) -> InfrastructureResult<Template> {
        self.validate()?;

        let resources = self
            .resources
            .iter()
            .map(|r| {
                let policy = r.removal_policy.map(|p| p.cfn_value().to_string());
                (
                    r.id.to_string(),
                    ResourceTemplate {
                        resource_type: r.kind.cfn_type().to_string(),
                        properties: r.properties.clone(),
                        depends_on: r.depends_on.iter().map(|d| d.to_string()).collect(),
                        deletion_policy: policy.clone(),
                        update_replace_policy: policy,
                    },
                )
            })
            .collect();

        let outputs = self
            .outputs
            .iter()
            .map(|o| {
                (
                    o.id.to_string(),
                    OutputTemplate {
                        description: o.description.clone(),
                        value: o.value.clone(),
                        export: o.export.as_ref().map(|name| ExportTemplate {
                            name: name.to_string(),
                        }),
                    },
                )
            })
            .collect();

        debug!(stack = %self.name, resources = self.resources.len(), "Rendered template");
        Ok(Template {
            format_version: FORMAT_VERSION.to_string(),
            description: self.description.clone(),
            resources,
            outputs,
        })
    }
}

/// Kahn's algorithm over `nodes`, ties broken by position in `nodes`.
///
/// Dependencies naming nodes outside `nodes` are ignored. On a cycle the
/// error carries every node that could not be ordered.
pub(crate) fn topological_order(
    nodes: &[String],
    dependencies: &BTreeMap<String, BTreeSet<String>>,
) -> Result<Vec<String>, Vec<String>> {
    let position: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.as_str(), i))
        .collect();

    let mut pending = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        for dependency in dependencies.get(node).into_iter().flatten() {
            if let Some(&j) = position.get(dependency.as_str()) {
                pending[i] += 1;
                dependents[j].push(i);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(i) = ready.pop_first() {
        order.push(nodes[i].clone());
        for &dependent in &dependents[i] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() == nodes.len() {
        Ok(order)
    } else {
        Err(nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| pending[*i] > 0)
            .map(|(_, node)| node.clone())
            .collect())
    }
}
