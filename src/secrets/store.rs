// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Loading and storing a cluster's secret bundle in the management cluster

use crate::constants::{labels, OPERATOR_NAME};
use crate::error::Result;
use crate::secrets::bundle::{SecretBundle, SecretData};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{
    api::{ListParams, ObjectMeta, Patch, PatchParams},
    Api, Client, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Load all stored secrets of a cluster into a bundle
#[instrument(skip(client))]
pub async fn load_bundle(client: &Client, namespace: &str, cluster: &str) -> Result<SecretBundle> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let selector = format!("{}={}", labels::CLUSTER, cluster);
    let secret_list = secrets.list(&ListParams::default().labels(&selector)).await?;

    let bundle: SecretBundle = secret_list
        .items
        .iter()
        .filter_map(|secret| {
            let name = logical_name(secret)?;
            Some((name.to_string(), secret_data(secret)))
        })
        .collect();

    info!(
        "Loaded {} secrets for cluster {} from namespace {}",
        bundle.len(),
        cluster,
        namespace
    );
    Ok(bundle)
}

/// Store the named secrets of a bundle (create or update)
#[instrument(skip(client, bundle))]
pub async fn store_secrets(
    client: &Client,
    namespace: &str,
    cluster: &str,
    bundle: &SecretBundle,
    names: &[String],
) -> Result<()> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let pp = PatchParams::apply(OPERATOR_NAME).force();

    for (name, data) in bundle.iter().filter(|(n, _)| names.iter().any(|m| m == n)) {
        let secret = create_stored_secret(cluster, name, namespace, data);
        let object_name = secret.name_any();
        secrets
            .patch(&object_name, &pp, &Patch::Apply(&secret))
            .await?;
        debug!("Stored secret {}/{}", namespace, object_name);
    }

    Ok(())
}

/// Name of the Secret object holding a cluster's logical secret
pub fn stored_secret_name(cluster: &str, name: &str) -> String {
    format!("{}.{}", cluster, name)
}

fn logical_name(secret: &Secret) -> Option<&str> {
    secret
        .metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(labels::SECRET_NAME))
        .map(|s| s.as_str())
}

fn secret_data(secret: &Secret) -> SecretData {
    secret
        .data
        .as_ref()
        .map(|data| {
            data.iter()
                .map(|(k, v)| (k.clone(), v.0.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn create_stored_secret(cluster: &str, name: &str, namespace: &str, data: &SecretData) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(stored_secret_name(cluster, name)),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([
                (labels::CLUSTER.to_string(), cluster.to_string()),
                (labels::SECRET_NAME.to_string(), name.to_string()),
                (labels::MANAGED_BY.to_string(), OPERATOR_NAME.to_string()),
            ])),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.clone(), ByteString(v.clone())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}
