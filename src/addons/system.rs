// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Values of the core add-ons every cluster runs: DNS, proxy, overlay network,
//! VPN, metrics server and node exporter.

use super::{compute_cluster_ip, pod_annotations, secret_data_values};
use crate::constants::{data_keys, secrets, CLUSTER_DNS_OFFSET, DEFAULT_DOMAIN};
use crate::error::Result;
use crate::reconcile::ReconcileContext;
use crate::values::merge;
use serde_json::{json, Value};

pub fn kube_dns_values(ctx: &ReconcileContext) -> Result<Value> {
    Ok(json!({
        "clusterDNS": compute_cluster_ip(&ctx.spec.networks.services, CLUSTER_DNS_OFFSET)?,
        "domain": DEFAULT_DOMAIN,
    }))
}

pub fn kube_proxy_values(ctx: &ReconcileContext) -> Result<Value> {
    let mut values = json!({
        "kubeconfig": ctx.secrets.require_text(secrets::KUBE_PROXY, data_keys::KUBECONFIG)?,
    });
    values = merge(values, pod_annotations(ctx, &[secrets::KUBE_PROXY])?);

    if let Some(feature_gates) = ctx
        .spec
        .kubernetes
        .kube_proxy
        .as_ref()
        .and_then(|p| p.feature_gates.as_ref())
    {
        values = merge(values, json!({ "featureGates": feature_gates }));
    }
    Ok(values)
}

pub fn metrics_server_values(ctx: &ReconcileContext) -> Result<Value> {
    let values = json!({
        "tls": {
            "caBundle": ctx.secrets.require_text(secrets::CA_METRICS_SERVER, data_keys::CA_CERT)?,
        },
        "secret": {
            "data": secret_data_values(ctx.secrets.require(secrets::METRICS_SERVER)?),
        },
    });
    Ok(merge(values, pod_annotations(ctx, &[secrets::METRICS_SERVER])?))
}

pub fn vpn_shoot_values(ctx: &ReconcileContext) -> Result<Value> {
    let networks = &ctx.spec.networks;
    let mut values = json!({
        "podNetwork": networks.pods,
        "serviceNetwork": networks.services,
        "nodeNetwork": networks.nodes,
        "tlsAuth": ctx.secrets.require_text(secrets::VPN_SEED_TLSAUTH, data_keys::VPN_TLSAUTH)?,
    });
    values = merge(
        values,
        pod_annotations(ctx, &[secrets::VPN_SHOOT, secrets::VPN_SEED_TLSAUTH])?,
    );

    if ctx.secrets.contains(secrets::VPN_SHOOT_DH) {
        values = merge(
            values,
            json!({
                "diffieHellmanKey": ctx.secrets.require_text(secrets::VPN_SHOOT_DH, data_keys::DH_PARAMS)?,
            }),
        );
    }
    Ok(values)
}

/// Values of the core template set
pub fn core_values(ctx: &ReconcileContext) -> Result<Value> {
    let calico = ctx.inject_images(
        json!({ "cloudProvider": ctx.spec.infrastructure.provider.as_str() }),
        &[
            ("calico-node", "calico-node"),
            ("calico-cni", "calico-cni"),
            ("calico-typha", "calico-typha"),
        ],
    )?;
    let kube_dns = ctx.inject_images(
        kube_dns_values(ctx)?,
        &[
            ("kube-dns", "kube-dns"),
            ("kube-dns-dnsmasq", "kube-dns-dnsmasq"),
            ("kube-dns-sidecar", "kube-dns-sidecar"),
            ("kube-dns-autoscaler", "cluster-proportional-autoscaler"),
        ],
    )?;
    let kube_proxy = ctx.inject_images(kube_proxy_values(ctx)?, &[("hyperkube", "hyperkube")])?;
    let metrics_server = ctx.inject_images(
        metrics_server_values(ctx)?,
        &[("metrics-server", "metrics-server")],
    )?;
    let vpn_shoot = ctx.inject_images(vpn_shoot_values(ctx)?, &[("vpn-shoot", "vpn-shoot")])?;
    let node_exporter =
        ctx.inject_images(json!({}), &[("node-exporter", "node-exporter")])?;

    Ok(json!({
        "global": {
            "podNetwork": ctx.spec.networks.pods,
        },
        "calico": calico,
        "kube-dns": kube_dns,
        "kube-proxy": kube_proxy,
        "metrics-server": metrics_server,
        "vpn-shoot": vpn_shoot,
        "monitoring": {
            "node-exporter": node_exporter,
        },
    }))
}
