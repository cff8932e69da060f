// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::ProviderAddons;
use crate::types::ManagedClusterSpec;
use crate::values;
use serde_json::Value;

/// Clusters running on a developer machine; no cloud integrations exist.
pub struct LocalAddons;

impl ProviderAddons for LocalAddons {
    fn nginx_ingress_config(&self, _spec: &ManagedClusterSpec) -> Value {
        values::empty()
    }

    fn kube2iam_config(&self, _spec: &ManagedClusterSpec) -> Value {
        values::empty()
    }

    fn admission_control_config(&self, _spec: &ManagedClusterSpec) -> Value {
        values::empty()
    }
}
