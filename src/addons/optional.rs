// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Values of the optional add-ons a cluster owner can switch on.

use super::with_enabled;
use crate::error::Result;
use crate::providers::ProviderAddons;
use crate::reconcile::ReconcileContext;
use crate::types::ManagedClusterSpec;
use crate::values::merge;
use serde_json::{json, Value};

/// Ingress values: the provider's base plus the owner's restrictions.
///
/// Source ranges and seed resource limits only apply while the addon is
/// enabled; otherwise the provider base is returned untouched.
pub fn nginx_ingress_values(spec: &ManagedClusterSpec, provider: &dyn ProviderAddons) -> Value {
    let mut values = provider.nginx_ingress_config(spec);

    let Some(ingress) = spec.addons.nginx_ingress.as_ref().filter(|i| i.enabled) else {
        return values;
    };

    if let Some(ranges) = &ingress.load_balancer_source_ranges {
        values = merge(
            values,
            json!({
                "controller": {
                    "service": {
                        "loadBalancerSourceRanges": ranges,
                    }
                }
            }),
        );
    }

    if spec.used_as_seed {
        values = merge(
            values,
            json!({
                "controller": {
                    "resources": {
                        "limits": {
                            "cpu": "500m",
                            "memory": "1024Mi",
                        }
                    }
                }
            }),
        );
    }

    values
}

fn kube_lego_values(spec: &ManagedClusterSpec) -> Value {
    match spec.addons.kube_lego.as_ref().and_then(|l| l.email.as_ref()) {
        Some(email) => json!({ "config": { "LEGO_EMAIL": email } }),
        None => json!({}),
    }
}

fn kubernetes_dashboard_values(spec: &ManagedClusterSpec) -> Value {
    match spec
        .addons
        .kubernetes_dashboard
        .as_ref()
        .and_then(|d| d.authentication_mode.as_ref())
    {
        Some(mode) => json!({ "authenticationMode": mode }),
        None => json!({}),
    }
}

/// Values of the optional template set
pub fn optional_values(ctx: &ReconcileContext) -> Result<Value> {
    let spec = ctx.spec;
    let addons = &spec.addons;

    let cluster_autoscaler = ctx.inject_images(
        with_enabled(json!({}), addons.cluster_autoscaler_enabled()),
        &[("cluster-autoscaler", "cluster-autoscaler")],
    )?;
    let helm_tiller = ctx.inject_images(
        with_enabled(json!({}), addons.helm_tiller_enabled()),
        &[("helm-tiller", "helm-tiller")],
    )?;
    let kube_lego = ctx.inject_images(
        with_enabled(kube_lego_values(spec), addons.kube_lego_enabled()),
        &[("kube-lego", "kube-lego")],
    )?;
    let kube2iam = ctx.inject_images(
        with_enabled(ctx.provider.kube2iam_config(spec), addons.kube2iam_enabled()),
        &[("kube2iam", "kube2iam")],
    )?;
    let kubernetes_dashboard = ctx.inject_images(
        with_enabled(
            kubernetes_dashboard_values(spec),
            addons.kubernetes_dashboard_enabled(),
        ),
        &[("kubernetes-dashboard", "kubernetes-dashboard")],
    )?;
    let monocular = ctx.inject_images(
        with_enabled(json!({}), addons.monocular_enabled()),
        &[
            ("monocular-api", "monocular-api"),
            ("monocular-ui", "monocular-ui"),
            ("busybox", "busybox"),
        ],
    )?;
    let nginx_ingress = ctx.inject_images(
        with_enabled(
            nginx_ingress_values(spec, ctx.provider),
            addons.nginx_ingress_enabled(),
        ),
        &[
            ("nginx-ingress-controller", "nginx-ingress-controller"),
            ("ingress-default-backend", "ingress-default-backend"),
        ],
    )?;

    Ok(json!({
        "cluster-autoscaler": cluster_autoscaler,
        "helm-tiller": helm_tiller,
        "kube-lego": kube_lego,
        "kube2iam": kube2iam,
        "kubernetes-dashboard": kubernetes_dashboard,
        "monocular": monocular,
        "nginx-ingress": nginx_ingress,
    }))
}
