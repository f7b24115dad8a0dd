// Copyright (c) 2025 - Cowboy AI, Inc.
//! Synth
//!
//! Composes the DNS and site units and writes their templates plus a
//! manifest into the output directory.
//!
//! Run with: cargo run --bin synth [config.json]
//!
//! Without a config file, configuration comes from the environment
//! (`DOMAIN_NAME`, `EMAIL_PROVIDER_MX_RECORD`, `CDK_DEFAULT_ACCOUNT`, ...).
//! Existing hosted zones are resolved from the lookup context file
//! (`CDK_CONTEXT_FILE`, default `cdk.context.json`).

use anyhow::{Context, Result};
use joelito_dev_infrastructure::{
    compose,
    projection::{FileSystemExecutor, SideEffectExecutor, SynthMetadata},
    ContextZoneLookup, DeploymentConfig,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => DeploymentConfig::from_file(&path)
            .await
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => DeploymentConfig::from_env().context("Failed to load config from environment")?,
    };
    info!("📋 Configuration loaded:");
    info!("  - Domain: {}", config.domain_name);
    info!("  - Environment: {}", config.environment);
    info!("  - Certificate strategy: {}", config.certificate.strategy);
    info!("  - Output: {}", config.out_dir.display());

    let lookup = ContextZoneLookup::load(&config.context_file)
        .await
        .context("Failed to load lookup context")?;
    info!(
        "🔎 Loaded {} hosted zone(s) from {}",
        lookup.len(),
        config.context_file.display()
    );

    let app = compose(&config, &lookup)
        .await
        .context("Failed to compose app")?;
    let (assembly, effects) = app
        .synth(SynthMetadata::new())
        .context("Failed to synthesize app")?;

    let mut executor = FileSystemExecutor::new(&config.out_dir);
    executor
        .execute(effects)
        .await
        .context("Failed to write cloud assembly")?;

    info!("✅ Synthesized run {}", assembly.metadata.run_id);
    for name in &assembly.deployment_order {
        info!("  - {}", name);
    }
    Ok(())
}
