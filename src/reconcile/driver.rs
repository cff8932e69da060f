// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One reconciliation cycle: compose, render and apply the three add-on
//! bundles of a cluster, in stage order.

use super::cleanup::delete_legacy_resources;
use super::context::ReconcileContext;
use super::stage::Stage;
use crate::addons::{admission_values, core_values, optional_values};
use crate::constants::{charts, labels, secrets, OPERATOR_NAME};
use crate::error::{Result, TrellisError};
use crate::images::ImageVector;
use crate::kubernetes::target::{ClusterClient, ResourceKind};
use crate::render::{ChartRenderer, RenderedBundle, TemplateStore};
use crate::secrets::{definitions, ensure_secrets, SecretBundle};
use crate::types::ManagedClusterSpec;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, info, instrument};

/// Kind and name of an object applied to the target namespace
pub type Applied = (ResourceKind, String);

/// What a finished cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub cluster: String,
    pub stages: Vec<Stage>,
    pub generated_secrets: Vec<String>,
    pub applied: Vec<Applied>,
    pub deleted: Vec<String>,
}

impl ReconcileReport {
    fn new(cluster: &str) -> Self {
        Self {
            cluster: cluster.to_string(),
            ..Default::default()
        }
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let applied: Vec<String> = self
            .applied
            .iter()
            .map(|(kind, name)| format!("{}/{}", kind, name))
            .collect();
        write!(
            f,
            "cluster {}: {} stages, generated [{}], applied [{}], deleted [{}]",
            self.cluster,
            self.stages.len(),
            self.generated_secrets.join(", "),
            applied.join(", "),
            self.deleted.join(", ")
        )
    }
}

/// Drives reconciliation cycles against one target cluster
pub struct Reconciler<C, S> {
    client: C,
    renderer: ChartRenderer<S>,
    images: ImageVector,
    namespace: String,
}

impl<C: ClusterClient, S: TemplateStore> Reconciler<C, S> {
    pub fn new(client: C, renderer: ChartRenderer<S>, images: ImageVector, namespace: &str) -> Self {
        Self {
            client,
            renderer,
            images,
            namespace: namespace.to_string(),
        }
    }

    /// Run one cycle to `Done`.
    ///
    /// The first failing stage aborts the cycle; its error is returned tagged
    /// with that stage and everything applied before it stays in place.
    #[instrument(skip(self, spec, existing))]
    pub async fn reconcile(
        &self,
        cluster_name: &str,
        spec: &ManagedClusterSpec,
        existing: &SecretBundle,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::new(cluster_name);
        info!("Starting reconciliation of cluster {}", cluster_name);

        let (ctx, generated) = record(
            self.gather(cluster_name, spec, existing),
            Stage::Gathering,
            &mut report,
        )?;
        report.generated_secrets = generated;

        // Core
        let values = record(core_values(&ctx), Stage::ComposeCore, &mut report)?;
        let bundle = record(
            self.render(charts::CORE, charts::CORE_RELEASE, &values),
            Stage::RenderCore,
            &mut report,
        )?;
        let applied = record(
            self.apply_core(&ctx, &bundle).await,
            Stage::ApplyCore,
            &mut report,
        )?;
        report.applied.extend(applied);

        // Optional
        let values = record(optional_values(&ctx), Stage::ComposeOptional, &mut report)?;
        report.deleted = record(
            delete_legacy_resources(&self.client, &self.namespace).await,
            Stage::Cleanup,
            &mut report,
        )?;
        let bundle = record(
            self.render(charts::OPTIONAL, charts::OPTIONAL_RELEASE, &values),
            Stage::RenderOptional,
            &mut report,
        )?;
        let applied = record(
            self.apply_secret(charts::OPTIONAL_OBJECT, &bundle).await,
            Stage::ApplyOptional,
            &mut report,
        )?;
        report.applied.push(applied);

        // Admission controls
        let values = record(admission_values(&ctx), Stage::ComposeAdmission, &mut report)?;
        let bundle = record(
            self.render(charts::ADMISSION, charts::ADMISSION_RELEASE, &values),
            Stage::RenderAdmission,
            &mut report,
        )?;
        let applied = record(
            self.apply_config_map(charts::ADMISSION_OBJECT, &bundle).await,
            Stage::ApplyAdmission,
            &mut report,
        )?;
        report.applied.push(applied);

        let reached = report.stages.last().map_or(Stage::Failed, |last| last.next());
        debug!("Cluster {} reached stage {}", cluster_name, reached);
        info!("Reconciled {}", report);
        Ok(report)
    }

    fn gather<'a>(
        &'a self,
        cluster_name: &str,
        spec: &'a ManagedClusterSpec,
        existing: &SecretBundle,
    ) -> Result<(ReconcileContext<'a>, Vec<String>)> {
        let (bundle, generated) = ensure_secrets(&definitions(cluster_name, spec), existing)?;
        let ctx = ReconcileContext::new(spec, bundle, &self.images)?;
        Ok((ctx, generated))
    }

    fn render(&self, set: &str, release: &str, values: &Value) -> Result<RenderedBundle> {
        self.renderer.render(set, release, &self.namespace, values)
    }

    async fn apply_core(
        &self,
        ctx: &ReconcileContext<'_>,
        bundle: &RenderedBundle,
    ) -> Result<Vec<Applied>> {
        let vpn = ctx.secrets.require(secrets::VPN_SHOOT)?;
        let data = vpn
            .iter()
            .map(|(k, v)| (k.clone(), ByteString(v.clone())))
            .collect();
        let secret = Secret {
            metadata: self.metadata(secrets::VPN_SHOOT),
            data: Some(data),
            ..Default::default()
        };
        let vpn_secret = self
            .apply(ResourceKind::Secret, secrets::VPN_SHOOT, &secret)
            .await?;
        let core = self.apply_secret(charts::CORE_OBJECT, bundle).await?;

        Ok(vec![vpn_secret, core])
    }

    /// Apply a bundle as a Secret; used for bundles that carry credentials
    async fn apply_secret(&self, name: &str, bundle: &RenderedBundle) -> Result<Applied> {
        let data = bundle
            .object_data()
            .into_iter()
            .map(|(k, v)| (k, ByteString(v.into_bytes())))
            .collect();
        let secret = Secret {
            metadata: self.metadata(name),
            data: Some(data),
            ..Default::default()
        };
        self.apply(ResourceKind::Secret, name, &secret).await
    }

    async fn apply_config_map(&self, name: &str, bundle: &RenderedBundle) -> Result<Applied> {
        let config_map = ConfigMap {
            metadata: self.metadata(name),
            data: Some(bundle.object_data()),
            ..Default::default()
        };
        self.apply(ResourceKind::ConfigMap, name, &config_map).await
    }

    async fn apply<T: Serialize>(
        &self,
        kind: ResourceKind,
        name: &str,
        object: &T,
    ) -> Result<Applied> {
        let body = serde_json::to_value(object).map_err(|e| {
            TrellisError::ConfigCompositionError(format!("failed to serialize {} {}: {}", kind, name, e))
        })?;
        self.client.apply(kind, &self.namespace, name, body).await?;
        info!("Applied {} {}/{}", kind, self.namespace, name);
        Ok((kind, name.to_string()))
    }

    fn metadata(&self, name: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(self.namespace.clone()),
            labels: Some(BTreeMap::from([(
                labels::MANAGED_BY.to_string(),
                OPERATOR_NAME.to_string(),
            )])),
            ..Default::default()
        }
    }
}

/// Record `stage` as visited, or tag the error with it
fn record<T>(result: Result<T>, stage: Stage, report: &mut ReconcileReport) -> Result<T> {
    match result {
        Ok(value) => {
            debug_assert_eq!(
                report.stages.last().map_or(Stage::Gathering, |last| last.next()),
                stage
            );
            debug!("Stage {} of cluster {} complete", stage, report.cluster);
            report.stages.push(stage);
            Ok(value)
        }
        Err(e) => {
            error!(
                "Stage {} of cluster {} failed, cycle is {}: {}",
                stage,
                report.cluster,
                Stage::Failed,
                e
            );
            Err(e.in_stage(stage))
        }
    }
}
