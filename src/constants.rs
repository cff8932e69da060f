// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "trellis";

/// Kubernetes label keys used by Trellis
pub mod labels {
    /// Marks objects written by Trellis
    pub const MANAGED_BY: &str = "trellis.dev/managed-by";
    /// Cluster a stored secret belongs to
    pub const CLUSTER: &str = "trellis.dev/cluster";
    /// Logical name of a stored secret within its bundle
    pub const SECRET_NAME: &str = "trellis.dev/secret-name";
}

/// Prefix of the pod annotation carrying a secret checksum
pub const CHECKSUM_ANNOTATION_PREFIX: &str = "checksum/secret-";

/// Cluster DNS domain handed to kube-dns
pub const DEFAULT_DOMAIN: &str = "cluster.local";

/// Offset of the cluster DNS address within the service network
pub const CLUSTER_DNS_OFFSET: u32 = 10;

/// Logical secret names
pub mod secrets {
    pub const CA: &str = "ca";
    pub const KUBE_PROXY: &str = "kube-proxy";
    pub const VPN_SHOOT: &str = "vpn-shoot";
    pub const VPN_SEED_TLSAUTH: &str = "vpn-seed-tlsauth";
    pub const VPN_SHOOT_DH: &str = "vpn-shoot-dh";
    pub const CA_METRICS_SERVER: &str = "ca-metrics-server";
    pub const METRICS_SERVER: &str = "metrics-server";
}

/// Data keys inside secrets
pub mod data_keys {
    pub const CA_CERT: &str = "ca.crt";
    pub const CA_KEY: &str = "ca.key";
    pub const TLS_CERT: &str = "tls.crt";
    pub const TLS_KEY: &str = "tls.key";
    pub const KUBECONFIG: &str = "kubeconfig";
    pub const VPN_TLSAUTH: &str = "vpn.tlsauth";
    pub const DH_PARAMS: &str = "dh2048.pem";
}

/// Template sets and the objects their rendered bundles are delivered as
pub mod charts {
    pub const CORE: &str = "shoot-core";
    pub const CORE_RELEASE: &str = "shoot-core";
    pub const CORE_OBJECT: &str = "addons-core";

    pub const OPTIONAL: &str = "shoot-addons";
    pub const OPTIONAL_RELEASE: &str = "addons";
    pub const OPTIONAL_OBJECT: &str = "addons-optional";

    pub const ADMISSION: &str = "shoot-admission-controls";
    pub const ADMISSION_RELEASE: &str = "admission-controls";
    pub const ADMISSION_OBJECT: &str = "addons-admission-controls";
}

/// Deployments created by earlier releases with the EnsureExists addon-manager
/// mode; the addon manager never removes them so Trellis deletes them itself.
pub const LEGACY_HEAPSTER_SELECTOR: &str = "chart=heapster-0.1.1,origin=gardener";
