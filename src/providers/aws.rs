// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{default_storage_class, ProviderAddons};
use crate::types::ManagedClusterSpec;
use crate::values;
use serde_json::{json, Value};

pub struct AwsAddons;

impl ProviderAddons for AwsAddons {
    fn nginx_ingress_config(&self, _spec: &ManagedClusterSpec) -> Value {
        // ELBs terminate TCP, the client address arrives via proxy protocol
        json!({
            "controller": {
                "config": {
                    "use-proxy-protocol": "true"
                },
                "service": {
                    "annotations": {
                        "service.beta.kubernetes.io/aws-load-balancer-proxy-protocol": "*"
                    }
                }
            }
        })
    }

    fn kube2iam_config(&self, spec: &ManagedClusterSpec) -> Value {
        let Some(kube2iam) = spec.addons.kube2iam.as_ref().filter(|k| k.enabled) else {
            return json!({ "enabled": false });
        };

        let roles: Vec<Value> = kube2iam
            .roles
            .iter()
            .map(|role| {
                json!({
                    "name": role.name,
                    "description": role.description,
                    "policy": role.policy,
                })
            })
            .collect();

        let mut config = json!({
            "enabled": true,
            "roles": roles,
        });
        if let Some(account_id) = &spec.infrastructure.account_id {
            config = values::merge(
                config,
                json!({
                    "extraArgs": {
                        "base-role-arn": format!("arn:aws:iam::{}:role/", account_id)
                    }
                }),
            );
        }
        config
    }

    fn admission_control_config(&self, _spec: &ManagedClusterSpec) -> Value {
        default_storage_class(
            "kubernetes.io/aws-ebs",
            json!({ "type": "gp2", "encrypted": "true" }),
        )
    }
}
