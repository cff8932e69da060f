// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Target cluster client creation from the cluster's kubeconfig secret

use crate::config::Config;
use crate::constants::data_keys;
use crate::error::{Result, TrellisError};
use crate::types::ManagedCluster;
use k8s_openapi::api::core::v1::Secret;
use kube::{config::KubeConfigOptions, config::Kubeconfig, Api, Client, Config as KConfig, ResourceExt};
use tracing::{debug, info, instrument};

/// Create a Kubernetes client for a managed cluster
#[instrument(skip(manager_client, cluster, config), fields(cluster = %cluster.name_any()))]
pub async fn create_target_client(
    manager_client: &Client,
    cluster: &ManagedCluster,
    config: &Config,
) -> Result<Client> {
    if config.testing_mode {
        debug!("Testing mode: using the ambient kubeconfig for the target cluster");
        let c = KConfig::infer()
            .await
            .map_err(|e| TrellisError::KubeconfigError(format!("Failed to infer config: {}", e)))?;
        return Client::try_from(c)
            .map_err(|e| TrellisError::KubeconfigError(format!("Failed to create client: {}", e)));
    }

    let namespace = cluster
        .namespace()
        .unwrap_or_else(|| config.cluster_namespace.clone());
    let kubeconfig = get_cluster_kubeconfig(manager_client, cluster, &namespace).await?;
    create_client_from_kubeconfig(&kubeconfig).await
}

/// Read the kubeconfig secret of a managed cluster
#[instrument(skip(client, cluster), fields(cluster = %cluster.name_any()))]
async fn get_cluster_kubeconfig(
    client: &Client,
    cluster: &ManagedCluster,
    namespace: &str,
) -> Result<String> {
    let cluster_name = cluster.name_any();
    let secret_name = cluster.kubeconfig_secret_name();
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    info!(
        "Getting kubeconfig secret '{}/{}' for cluster '{}'...",
        namespace, secret_name, cluster_name
    );

    let secret = secrets.get(&secret_name).await.map_err(|e| {
        TrellisError::KubeconfigError(format!(
            "Failed to get kubeconfig secret for cluster {}: {}",
            cluster_name, e
        ))
    })?;

    kubeconfig_from_secret(&cluster_name, &secret)
}

fn kubeconfig_from_secret(cluster_name: &str, secret: &Secret) -> Result<String> {
    let Some(data) = secret.data.as_ref() else {
        return Err(TrellisError::KubeconfigError(format!(
            "Kubeconfig secret for cluster {} has no data",
            cluster_name
        )));
    };

    let Some(kubeconfig) = data.get(data_keys::KUBECONFIG) else {
        return Err(TrellisError::KubeconfigError(format!(
            "Kubeconfig secret for cluster {} does not contain '{}' key",
            cluster_name,
            data_keys::KUBECONFIG
        )));
    };

    String::from_utf8(kubeconfig.0.clone()).map_err(|e| {
        TrellisError::KubeconfigError(format!(
            "Failed to decode kubeconfig for cluster {}: {}",
            cluster_name, e
        ))
    })
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| TrellisError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        KConfig::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                TrellisError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| TrellisError::KubeconfigError(format!("Failed to create client: {}", e)))
}
