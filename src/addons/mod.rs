// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Composition of the values handed to the three add-on template sets.

pub mod admission;
pub mod optional;
pub mod system;

pub use admission::admission_values;
pub use optional::{nginx_ingress_values, optional_values};
pub use system::core_values;

use crate::error::{Result, TrellisError};
use crate::reconcile::ReconcileContext;
use crate::secrets::SecretData;
use serde_json::{json, Map, Value};
use std::net::Ipv4Addr;

/// Address at `offset` within an IPv4 CIDR range
pub fn compute_cluster_ip(cidr: &str, offset: u32) -> Result<String> {
    let invalid = |reason: &str| {
        TrellisError::ConfigCompositionError(format!("invalid network '{}': {}", cidr, reason))
    };

    let (address, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| invalid("missing prefix length"))?;
    let address: Ipv4Addr = address.parse().map_err(|_| invalid("not an IPv4 address"))?;
    let prefix: u32 = prefix.parse().map_err(|_| invalid("invalid prefix length"))?;
    if prefix > 32 {
        return Err(invalid("invalid prefix length"));
    }

    let size = 1u64 << (32 - prefix);
    if u64::from(offset) >= size {
        return Err(invalid("range too small"));
    }

    let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    let network = u32::from(address) & mask;
    Ok(Ipv4Addr::from(network + offset).to_string())
}

/// `podAnnotations` carrying the checksums of the given secrets
fn pod_annotations(ctx: &ReconcileContext, secrets: &[&str]) -> Result<Value> {
    let mut annotations = Map::new();
    for secret in secrets {
        let (key, value) = ctx.checksums.annotation(secret)?;
        annotations.insert(key, Value::String(value));
    }
    Ok(json!({ "podAnnotations": annotations }))
}

/// Secret data as a tree of strings
fn secret_data_values(data: &SecretData) -> Value {
    Value::Object(
        data.iter()
            .map(|(k, v)| (k.clone(), Value::String(String::from_utf8_lossy(v).into_owned())))
            .collect(),
    )
}

/// Values with the addon's `enabled` flag set
fn with_enabled(values: Value, enabled: bool) -> Value {
    crate::values::merge(values, json!({ "enabled": enabled }))
}
