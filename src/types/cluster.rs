// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Desired state of a managed cluster's add-ons.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "trellis.dev", version = "v1alpha1", kind = "ManagedCluster")]
#[kube(namespaced)]
#[kube(status = "ManagedClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    pub infrastructure: Infrastructure,
    pub kubernetes: KubernetesSpec,
    pub networks: Networks,
    /// URL of the managed cluster's API server, used in generated kubeconfigs
    pub api_server: String,
    #[serde(default)]
    pub addons: Addons,
    /// The cluster hosts control planes of other clusters
    #[serde(default)]
    pub used_as_seed: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
    OpenStack,
    Alicloud,
    Local,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 6] = [
        CloudProvider::Aws,
        CloudProvider::Azure,
        CloudProvider::Gcp,
        CloudProvider::OpenStack,
        CloudProvider::Alicloud,
        CloudProvider::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
            CloudProvider::OpenStack => "openstack",
            CloudProvider::Alicloud => "alicloud",
            CloudProvider::Local => "local",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Infrastructure {
    pub provider: CloudProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Cloud account the cluster runs in (AWS account id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesSpec {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kube_proxy: Option<KubeProxySpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubeProxySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_gates: Option<BTreeMap<String, bool>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Networks {
    pub pods: String,
    pub services: String,
    pub nodes: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Addons {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_autoscaler: Option<AddonToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helm_tiller: Option<AddonToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kube_lego: Option<KubeLego>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kube2iam: Option<Kube2Iam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_dashboard: Option<KubernetesDashboard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monocular: Option<AddonToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nginx_ingress: Option<NginxIngress>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct AddonToggle {
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct KubeLego {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct Kube2Iam {
    pub enabled: bool,
    #[serde(default)]
    pub roles: Vec<Kube2IamRole>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
pub struct Kube2IamRole {
    pub name: String,
    pub description: String,
    pub policy: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesDashboard {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_mode: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NginxIngress {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer_source_ranges: Option<Vec<String>>,
}

impl Addons {
    pub fn cluster_autoscaler_enabled(&self) -> bool {
        self.cluster_autoscaler.as_ref().is_some_and(|a| a.enabled)
    }

    pub fn helm_tiller_enabled(&self) -> bool {
        self.helm_tiller.as_ref().is_some_and(|a| a.enabled)
    }

    pub fn kube_lego_enabled(&self) -> bool {
        self.kube_lego.as_ref().is_some_and(|a| a.enabled)
    }

    pub fn kube2iam_enabled(&self) -> bool {
        self.kube2iam.as_ref().is_some_and(|a| a.enabled)
    }

    pub fn kubernetes_dashboard_enabled(&self) -> bool {
        self.kubernetes_dashboard.as_ref().is_some_and(|a| a.enabled)
    }

    pub fn monocular_enabled(&self) -> bool {
        self.monocular.as_ref().is_some_and(|a| a.enabled)
    }

    pub fn nginx_ingress_enabled(&self) -> bool {
        self.nginx_ingress.as_ref().is_some_and(|a| a.enabled)
    }
}

impl ManagedCluster {
    /// Check if the control plane of this cluster is ready based on its status conditions
    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.condition_type == "ControlPlaneReady" && c.status == "True")
            })
    }

    /// Get the name of the kubeconfig secret for this cluster
    pub fn kubeconfig_secret_name(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.kubeconfig_secret_name.clone())
            .unwrap_or_else(|| format!("{}.kubeconfig", self.name_any()))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig_secret_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
