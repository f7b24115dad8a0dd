// Copyright (c) 2025 - Cowboy AI, Inc.
//! App - composition of deployable units
//!
//! An app holds stacks and the ordering between them. Cross-stack imports
//! are linked automatically: a stack importing an export another stack of
//! the app publishes must deploy after it, and both must share an
//! environment.
//!
//! ```text
//! JoelitoDevDnsStack ──export JoelitoDevCertArn──> JoelitoDevInfraStack
//!        (leaf)                                     (depends on DNS)
//! ```

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::config::DeploymentConfig;
use crate::domain::StackName;
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::lookup::ZoneLookup;
use crate::projection::{AssemblyState, CloudAssembly, SideEffect, StackArtifact, SynthMetadata};
use crate::stack::{topological_order, Stack};
use crate::units::{DnsUnit, SiteUnit, DNS_STACK_NAME, SITE_STACK_NAME};

/// Set of stacks synthesized together
#[derive(Debug, Clone, Default)]
pub struct App {
    stacks: Vec<Stack>,
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack; names are unique within an app
    pub fn add_stack(&mut self, stack: Stack) -> InfrastructureResult<()> {
        if self.stack(stack.name().as_str()).is_some() {
            return Err(InfrastructureError::DuplicateStack(stack.name().to_string()));
        }
        debug!(stack = %stack.name(), "Added stack to app");
        self.stacks.push(stack);
        Ok(())
    }

    /// Require `dependency` to deploy before `dependent`
    pub fn add_dependency(
        &mut self,
        dependent: &StackName,
        dependency: &StackName,
    ) -> InfrastructureResult<()> {
        for name in [dependent, dependency] {
            if self.stack(name.as_str()).is_none() {
                return Err(InfrastructureError::UnknownStack(name.to_string()));
            }
        }
        self.dependencies
            .entry(dependent.to_string())
            .or_default()
            .insert(dependency.to_string());
        Ok(())
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name().as_str() == name)
    }

    /// Stacks `name` must deploy after
    pub fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.dependencies
            .get(name)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Add a dependency for every import satisfied by another stack's export
    ///
    /// Imports with no producer in the app are left alone; they refer to
    /// stacks deployed independently.
    pub fn link_exports(&mut self) -> InfrastructureResult<()> {
        let mut links = Vec::new();
        for consumer in &self.stacks {
            for import in consumer.imports() {
                let producer = self.stacks.iter().find(|candidate| {
                    candidate.name() != consumer.name()
                        && candidate.exports().any(|export| export.as_str() == import)
                });
                let Some(producer) = producer else {
                    continue;
                };
                if producer.environment() != consumer.environment() {
                    return Err(InfrastructureError::CrossEnvironmentReference {
                        producer: producer.name().to_string(),
                        consumer: consumer.name().to_string(),
                        reason: format!(
                            "export {} lives in {}, importer deploys to {}",
                            import,
                            producer.environment(),
                            consumer.environment()
                        ),
                    });
                }
                links.push((consumer.name().clone(), producer.name().clone()));
            }
        }
        for (consumer, producer) in links {
            debug!(consumer = %consumer, producer = %producer, "Linked cross-stack import");
            self.add_dependency(&consumer, &producer)?;
        }
        Ok(())
    }

    /// Stacks in the order they must deploy
    pub fn deployment_order(&self) -> InfrastructureResult<Vec<&Stack>> {
        let nodes: Vec<String> = self.stacks.iter().map(|s| s.name().to_string()).collect();
        let order = topological_order(&nodes, &self.dependencies).map_err(|members| {
            InfrastructureError::DependencyCycle {
                scope: "app".to_string(),
                members,
            }
        })?;
        Ok(order.iter().filter_map(|name| self.stack(name)).collect())
    }

    /// Render every stack and project them into a cloud assembly
    ///
    /// Pure: returns the effects instead of writing anything.
    pub fn synth(
        &self,
        metadata: SynthMetadata,
    ) -> InfrastructureResult<(CloudAssembly, Vec<SideEffect>)> {
        let artifacts = self
            .deployment_order()?
            .into_iter()
            .map(|stack| -> InfrastructureResult<StackArtifact> {
                let template = serde_json::to_value(stack.to_template()?)?;
                Ok(StackArtifact {
                    stack_name: stack.name().to_string(),
                    environment: stack.environment().uri(),
                    template,
                    dependencies: self.dependencies_of(stack.name().as_str()),
                })
            })
            .collect::<InfrastructureResult<Vec<_>>>()?;

        let (state, mut effects) = AssemblyState::project(artifacts);
        let (assembly, manifest) = state.finish(metadata)?;
        effects.push(manifest);

        info!(
            run_id = %assembly.metadata.run_id,
            stacks = assembly.deployment_order.len(),
            "Synthesized app"
        );
        Ok((assembly, effects))
    }
}

/// Build the units `config` selects
///
/// Parameter checks run before any unit declares a resource: a missing
/// import ARN fails here, ahead of both stacks.
pub async fn compose(
    config: &DeploymentConfig,
    lookup: &dyn ZoneLookup,
) -> InfrastructureResult<App> {
    config.validate()?;
    let strategy = config.certificate.strategy;
    info!(
        domain = %config.domain_name,
        environment = %config.environment,
        strategy = %strategy,
        composition = ?strategy.composition(),
        "Composing app"
    );

    let resolved_early = if config.units.site && strategy.composition().is_decoupled() {
        Some(config.certificate_source(None)?)
    } else {
        None
    };

    let mut app = App::new();
    let mut handle = None;

    if config.units.dns {
        let unit = DnsUnit::new(config.dns_props()?)?;
        let (stack, outputs) =
            unit.synthesize(StackName::new(DNS_STACK_NAME)?, config.environment.clone())?;
        handle = Some(outputs.certificate);
        app.add_stack(stack)?;
    }

    if config.units.site {
        let source = match resolved_early {
            Some(source) => source,
            None => config.certificate_source(handle.as_ref())?,
        };
        let unit = SiteUnit::new(config.site_props(source))?;
        let stack = unit
            .synthesize(
                StackName::new(SITE_STACK_NAME)?,
                config.environment.clone(),
                lookup,
            )
            .await?;
        app.add_stack(stack)?;

        // The site resolves the DNS unit's zone, whatever the certificate strategy.
        if config.units.dns {
            app.add_dependency(&StackName::new(SITE_STACK_NAME)?, &StackName::new(DNS_STACK_NAME)?)?;
        }
    }

    app.link_exports()?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Environment;

    fn stack(name: &str) -> Stack {
        Stack::new(StackName::new(name).unwrap(), Environment::default())
    }

    fn name(s: &str) -> StackName {
        StackName::new(s).unwrap()
    }

    #[test]
    fn test_duplicate_stack_rejected() {
        let mut app = App::new();
        app.add_stack(stack("A")).unwrap();
        assert!(matches!(
            app.add_stack(stack("A")),
            Err(InfrastructureError::DuplicateStack(_))
        ));
    }

    #[test]
    fn test_dependency_requires_known_stacks() {
        let mut app = App::new();
        app.add_stack(stack("A")).unwrap();
        assert!(matches!(
            app.add_dependency(&name("A"), &name("B")),
            Err(InfrastructureError::UnknownStack(_))
        ));
    }

    #[test]
    fn test_deployment_order() {
        let mut app = App::new();
        app.add_stack(stack("Site")).unwrap();
        app.add_stack(stack("Dns")).unwrap();
        app.add_dependency(&name("Site"), &name("Dns")).unwrap();

        let order: Vec<&str> = app
            .deployment_order()
            .unwrap()
            .iter()
            .map(|s| s.name().as_str())
            .collect();
        assert_eq!(order, vec!["Dns", "Site"]);
    }

    #[test]
    fn test_stack_cycle_detected() {
        let mut app = App::new();
        app.add_stack(stack("A")).unwrap();
        app.add_stack(stack("B")).unwrap();
        app.add_dependency(&name("A"), &name("B")).unwrap();
        app.add_dependency(&name("B"), &name("A")).unwrap();
        assert!(matches!(
            app.deployment_order(),
            Err(InfrastructureError::DependencyCycle { .. })
        ));
    }
}
