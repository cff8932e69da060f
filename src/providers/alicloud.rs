// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{default_storage_class, ProviderAddons};
use crate::types::ManagedClusterSpec;
use crate::values;
use serde_json::{json, Value};

pub struct AlicloudAddons;

impl ProviderAddons for AlicloudAddons {
    fn nginx_ingress_config(&self, _spec: &ManagedClusterSpec) -> Value {
        json!({
            "controller": {
                "service": {
                    "annotations": {
                        "service.beta.kubernetes.io/alicloud-loadbalancer-address-type": "internet"
                    }
                }
            }
        })
    }

    fn kube2iam_config(&self, _spec: &ManagedClusterSpec) -> Value {
        values::empty()
    }

    fn admission_control_config(&self, _spec: &ManagedClusterSpec) -> Value {
        default_storage_class(
            "alicloud/disk",
            json!({ "type": "cloud_ssd", "readOnly": "false" }),
        )
    }
}
