// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the ManagedCluster to reconcile
    pub cluster_name: String,
    /// Namespace of the ManagedCluster and its stored secrets in the management cluster
    pub cluster_namespace: String,
    /// Namespace in the managed cluster the addon bundles are applied to
    pub target_namespace: String,
    /// Directory containing the template sets
    pub chart_path: PathBuf,
    /// Image vector file
    pub image_vector: PathBuf,
    pub testing_mode: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let cluster_name =
            env::var("CLUSTER_NAME").context("CLUSTER_NAME environment variable not set")?;
        let cluster_namespace = env::var("CLUSTER_NAMESPACE").unwrap_or("garden".to_string());
        let target_namespace = env::var("TARGET_NAMESPACE").unwrap_or("kube-system".to_string());
        let chart_path = env::var("CHART_PATH").unwrap_or("charts".to_string()).into();
        let image_vector = env::var("IMAGE_VECTOR")
            .unwrap_or("images.yaml".to_string())
            .into();
        // For testing, uses the KUBECONFIG env var to create the target client instead of fetching kubeconfig from secrets
        let testing_mode: bool = env::var("TESTING_MODE")
            .unwrap_or("false".to_string())
            .parse()
            .unwrap_or(false);

        Ok(Config {
            cluster_name,
            cluster_namespace,
            target_namespace,
            chart_path,
            image_vector,
            testing_mode,
        })
    }
}
