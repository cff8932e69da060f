// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of resources left behind by earlier add-on releases.

use crate::constants::LEGACY_HEAPSTER_SELECTOR;
use crate::error::Result;
use crate::kubernetes::target::{ClusterClient, ResourceKind};
use tracing::{debug, info, instrument};

/// Delete legacy heapster deployments from `namespace`.
///
/// Returns the names that were deleted. Objects that vanish between list and
/// delete are skipped.
#[instrument(skip(client))]
pub async fn delete_legacy_resources<C>(client: &C, namespace: &str) -> Result<Vec<String>>
where
    C: ClusterClient + ?Sized,
{
    let names = client
        .list(ResourceKind::Deployment, namespace, LEGACY_HEAPSTER_SELECTOR)
        .await?;

    let mut deleted = Vec::new();
    for name in names {
        match client.delete(ResourceKind::Deployment, namespace, &name).await {
            Ok(()) => {
                info!("Deleted legacy deployment {}/{}", namespace, name);
                deleted.push(name);
            }
            Err(e) if e.is_not_found() => {
                debug!("Legacy deployment {}/{} already gone", namespace, name);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(deleted)
}
