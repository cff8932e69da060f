// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Inputs shared by every composition step of one cycle.

use crate::error::{Result, TrellisError};
use crate::images::ImageVector;
use crate::providers::{dispatcher, ProviderAddons};
use crate::secrets::{Checksums, SecretBundle};
use crate::types::ManagedClusterSpec;
use semver::Version;
use serde_json::Value;

pub struct ReconcileContext<'a> {
    pub spec: &'a ManagedClusterSpec,
    pub secrets: SecretBundle,
    pub checksums: Checksums,
    pub provider: &'static dyn ProviderAddons,
    pub images: &'a ImageVector,
    pub version: Version,
}

impl<'a> ReconcileContext<'a> {
    pub fn new(
        spec: &'a ManagedClusterSpec,
        secrets: SecretBundle,
        images: &'a ImageVector,
    ) -> Result<Self> {
        let version = parse_version(&spec.kubernetes.version)?;
        let checksums = secrets.checksums();

        Ok(Self {
            spec,
            secrets,
            checksums,
            provider: dispatcher(spec.infrastructure.provider),
            images,
            version,
        })
    }

    /// Resolve images for this cycle's runtime version into `values`
    pub fn inject_images(&self, values: Value, mapping: &[(&str, &str)]) -> Result<Value> {
        self.images.inject(values, &self.version, mapping)
    }
}

/// Parse a Kubernetes version, accepting a leading `v`
fn parse_version(raw: &str) -> Result<Version> {
    Version::parse(raw.trim_start_matches('v')).map_err(|e| {
        TrellisError::ConfigCompositionError(format!(
            "invalid kubernetes version '{}': {}",
            raw, e
        ))
    })
}
