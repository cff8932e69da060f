// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use kube::{Api, Client};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trellis::config::Config;
use trellis::images::ImageVector;
use trellis::kubernetes::{create_target_client, KubeClusterClient};
use trellis::reconcile::Reconciler;
use trellis::render::{ChartRenderer, FsTemplateStore};
use trellis::secrets::{definitions, ensure_secrets, load_bundle, store_secrets};
use trellis::types::ManagedCluster;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Trellis");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: cluster={}/{}, target_namespace={}",
        config.cluster_namespace, config.cluster_name, config.target_namespace
    );

    // Create Kubernetes client for the management cluster
    let client = Client::try_default().await?;
    info!("Connected to management cluster");

    let clusters: Api<ManagedCluster> = Api::namespaced(client.clone(), &config.cluster_namespace);
    let cluster = clusters
        .get(&config.cluster_name)
        .await
        .with_context(|| format!("Failed to get ManagedCluster {}", config.cluster_name))?;
    if !cluster.is_ready() {
        warn!("Cluster {} is not ready, skipping reconciliation", config.cluster_name);
        return Ok(());
    }

    let target = create_target_client(&client, &cluster, &config).await?;

    // Generated secrets are persisted before use so later cycles reuse them
    let existing = load_bundle(&client, &config.cluster_namespace, &config.cluster_name).await?;
    let (bundle, generated) = ensure_secrets(&definitions(&config.cluster_name, &cluster.spec), &existing)?;
    if generated.is_empty() {
        info!("All secrets of cluster {} already exist", config.cluster_name);
    } else {
        store_secrets(
            &client,
            &config.cluster_namespace,
            &config.cluster_name,
            &bundle,
            &generated,
        )
        .await?;
    }

    let images = ImageVector::read(&config.image_vector)?;
    if !config.chart_path.is_dir() {
        bail!("Chart directory {} does not exist", config.chart_path.display());
    }
    let renderer = ChartRenderer::new(FsTemplateStore::new(config.chart_path.clone()));

    let reconciler = Reconciler::new(
        KubeClusterClient::new(target),
        renderer,
        images,
        &config.target_namespace,
    );
    let report = reconciler
        .reconcile(&config.cluster_name, &cluster.spec, &bundle)
        .await?;

    info!("Reconciliation finished: {}", report);
    Ok(())
}
