// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{default_storage_class, ProviderAddons};
use crate::types::ManagedClusterSpec;
use crate::values;
use serde_json::{json, Value};

pub struct OpenStackAddons;

impl ProviderAddons for OpenStackAddons {
    fn nginx_ingress_config(&self, _spec: &ManagedClusterSpec) -> Value {
        values::empty()
    }

    fn kube2iam_config(&self, _spec: &ManagedClusterSpec) -> Value {
        values::empty()
    }

    fn admission_control_config(&self, spec: &ManagedClusterSpec) -> Value {
        let parameters = match &spec.infrastructure.region {
            Some(region) => json!({ "availability": region }),
            None => json!({}),
        };
        default_storage_class("kubernetes.io/cinder", parameters)
    }
}
