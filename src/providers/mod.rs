// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Provider-specific add-on configuration.
//!
//! Every supported infrastructure provider implements [`ProviderAddons`]
//! completely. An operation a provider has nothing to contribute to returns
//! an empty tree, so callers merge the result without checking the provider.

mod alicloud;
mod aws;
mod azure;
mod gcp;
mod local;
mod openstack;

pub use alicloud::AlicloudAddons;
pub use aws::AwsAddons;
pub use azure::AzureAddons;
pub use gcp::GcpAddons;
pub use local::LocalAddons;
pub use openstack::OpenStackAddons;

use crate::types::{CloudProvider, ManagedClusterSpec};
use serde_json::{json, Value};

pub trait ProviderAddons: Send + Sync {
    /// Base values of the nginx-ingress addon
    fn nginx_ingress_config(&self, spec: &ManagedClusterSpec) -> Value;

    /// Values of the kube2iam addon bridging pods to cloud IAM roles
    fn kube2iam_config(&self, spec: &ManagedClusterSpec) -> Value;

    /// Values of the admission-control template set
    fn admission_control_config(&self, spec: &ManagedClusterSpec) -> Value;
}

/// Select the implementation for a provider
pub fn dispatcher(provider: CloudProvider) -> &'static dyn ProviderAddons {
    match provider {
        CloudProvider::Aws => &AwsAddons,
        CloudProvider::Azure => &AzureAddons,
        CloudProvider::Gcp => &GcpAddons,
        CloudProvider::OpenStack => &OpenStackAddons,
        CloudProvider::Alicloud => &AlicloudAddons,
        CloudProvider::Local => &LocalAddons,
    }
}

/// Admission values installing a single default StorageClass
fn default_storage_class(provisioner: &str, parameters: Value) -> Value {
    json!({
        "storageClasses": [{
            "name": "default",
            "isDefaultClass": true,
            "provisioner": provisioner,
            "parameters": parameters,
        }]
    })
}
