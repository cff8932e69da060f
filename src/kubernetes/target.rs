// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operations against the managed cluster's API

use crate::constants::OPERATOR_NAME;
use crate::error::ApplyError;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{
    api::{ApiResource, DeleteParams, DynamicObject, ListParams, Patch, PatchParams},
    Api, Client, ResourceExt,
};
use serde_json::Value;
use std::fmt;
use tracing::{debug, instrument};

/// Kinds of objects Trellis manages in the target cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Secret,
    ConfigMap,
    Deployment,
}

impl ResourceKind {
    fn api_resource(&self) -> ApiResource {
        match self {
            ResourceKind::Secret => ApiResource::erase::<Secret>(&()),
            ResourceKind::ConfigMap => ApiResource::erase::<ConfigMap>(&()),
            ResourceKind::Deployment => ApiResource::erase::<Deployment>(&()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ResourceKind::Secret => "Secret",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Deployment => "Deployment",
        };
        f.write_str(kind)
    }
}

/// Apply, list and delete objects in the managed cluster.
///
/// Every call either completes or fails; not-found is reported as
/// [`ApplyError::NotFound`] so callers can tell it apart.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Create or update an object
    async fn apply(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        body: Value,
    ) -> Result<(), ApplyError>;

    /// Names of the objects matching a label selector
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<String>, ApplyError>;

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str)
        -> Result<(), ApplyError>;
}

/// [`ClusterClient`] backed by a kube client, applying with server-side apply
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, kind: ResourceKind, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &kind.api_resource())
    }
}

fn map_error(err: kube::Error, kind: ResourceKind, namespace: &str, name: &str) -> ApplyError {
    match err {
        kube::Error::Api(response) if response.code == 404 => ApplyError::NotFound {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => ApplyError::Api(other),
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    #[instrument(skip(self, body))]
    async fn apply(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        body: Value,
    ) -> Result<(), ApplyError> {
        let object: DynamicObject = serde_json::from_value(body)
            .map_err(|e| ApplyError::InvalidBody(format!("{} {}/{}: {}", kind, namespace, name, e)))?;

        let pp = PatchParams::apply(OPERATOR_NAME).force();
        self.api(kind, namespace)
            .patch(name, &pp, &Patch::Apply(&object))
            .await
            .map_err(|e| map_error(e, kind, namespace, name))?;

        debug!("Applied {} {}/{}", kind, namespace, name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<String>, ApplyError> {
        let objects = self
            .api(kind, namespace)
            .list(&ListParams::default().labels(label_selector))
            .await
            .map_err(|e| map_error(e, kind, namespace, label_selector))?;

        Ok(objects.items.iter().map(|o| o.name_any()).collect())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), ApplyError> {
        self.api(kind, namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| map_error(e, kind, namespace, name))?;

        debug!("Deleted {} {}/{}", kind, namespace, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{not_found_json, MockService};
    use serde_json::json;

    const DEPLOYMENTS: &str = "/apis/apps/v1/namespaces/kube-system/deployments";

    #[tokio::test]
    async fn test_apply_uses_server_side_apply() {
        let service = MockService::new().on_patch(
            "/api/v1/namespaces/kube-system/configmaps/addons",
            200,
            r#"{"apiVersion":"v1","kind":"ConfigMap","metadata":{"name":"addons","namespace":"kube-system"}}"#,
        );
        let client = KubeClusterClient::new(service.clone().into_client());

        client
            .apply(
                ResourceKind::ConfigMap,
                "kube-system",
                "addons",
                json!({
                    "apiVersion": "v1",
                    "kind": "ConfigMap",
                    "metadata": {"name": "addons", "namespace": "kube-system"},
                    "data": {"a": "b"}
                }),
            )
            .await
            .unwrap();

        assert_eq!(
            service.requests(),
            vec![(
                "PATCH".to_string(),
                "/api/v1/namespaces/kube-system/configmaps/addons".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_body_without_metadata() {
        let client = KubeClusterClient::new(MockService::new().into_client());

        let err = client
            .apply(ResourceKind::Secret, "kube-system", "x", json!("not an object"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_list_returns_names() {
        let list = json!({
            "apiVersion": "apps/v1",
            "kind": "DeploymentList",
            "metadata": {},
            "items": [
                {"apiVersion": "apps/v1", "kind": "Deployment", "metadata": {"name": "heapster", "namespace": "kube-system"}}
            ]
        });
        let client = KubeClusterClient::new(
            MockService::new()
                .on_get(DEPLOYMENTS, 200, &list.to_string())
                .into_client(),
        );

        let names = client
            .list(ResourceKind::Deployment, "kube-system", "chart=heapster-0.1.1")
            .await
            .unwrap();

        assert_eq!(names, vec!["heapster"]);
    }

    #[tokio::test]
    async fn test_delete_reports_not_found_distinctly() {
        let client = KubeClusterClient::new(
            MockService::new()
                .on_delete(
                    &format!("{}/heapster", DEPLOYMENTS),
                    404,
                    &not_found_json("deployments", "heapster"),
                )
                .into_client(),
        );

        let err = client
            .delete(ResourceKind::Deployment, "kube-system", "heapster")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_surfaces_other_errors() {
        let forbidden = json!({
            "kind": "Status",
            "apiVersion": "v1",
            "status": "Failure",
            "message": "forbidden",
            "reason": "Forbidden",
            "code": 403
        });
        let client = KubeClusterClient::new(
            MockService::new()
                .on_delete(&format!("{}/heapster", DEPLOYMENTS), 403, &forbidden.to_string())
                .into_client(),
        );

        let err = client
            .delete(ResourceKind::Deployment, "kube-system", "heapster")
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyError::Api(_)));
    }

    #[tokio::test]
    async fn test_delete_succeeds() {
        let status = json!({"kind": "Status", "apiVersion": "v1", "status": "Success", "code": 200});
        let client = KubeClusterClient::new(
            MockService::new()
                .on_delete(&format!("{}/heapster", DEPLOYMENTS), 200, &status.to_string())
                .into_client(),
        );

        client
            .delete(ResourceKind::Deployment, "kube-system", "heapster")
            .await
            .unwrap();
    }
}
