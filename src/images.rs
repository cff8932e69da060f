// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Image vector: resolution of logical image names to concrete references

use crate::error::{Result, TrellisError};
use semver::{Version, VersionReq};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// One candidate image for a logical name
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub name: String,
    pub repository: String,
    /// Defaults to `v<runtime version>` when absent
    #[serde(default)]
    pub tag: Option<String>,
    /// Runtime versions this entry applies to, e.g. `>= 1.11`
    #[serde(default)]
    pub runtime_version: Option<String>,
}

impl ImageSource {
    fn matches(&self, name: &str, version: &Version) -> Result<bool> {
        if self.name != name {
            return Ok(false);
        }
        let Some(constraint) = &self.runtime_version else {
            return Ok(true);
        };
        let req = VersionReq::parse(constraint).map_err(|e| {
            TrellisError::ImageResolutionError(format!(
                "invalid runtime version constraint '{}' for image {}: {}",
                constraint, self.name, e
            ))
        })?;
        Ok(req.matches(version))
    }

    fn reference(&self, version: &Version) -> String {
        match &self.tag {
            Some(tag) => format!("{}:{}", self.repository, tag),
            None => format!("{}:v{}", self.repository, version),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageVector {
    pub images: Vec<ImageSource>,
}

impl ImageVector {
    pub fn new(images: Vec<ImageSource>) -> Self {
        Self { images }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            TrellisError::ImageResolutionError(format!("failed to parse image vector: {}", e))
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            TrellisError::ImageResolutionError(format!(
                "failed to read image vector {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Find the first entry for `name` compatible with `version`
    pub fn find(&self, name: &str, version: &Version) -> Result<String> {
        for image in &self.images {
            if image.matches(name, version)? {
                return Ok(image.reference(version));
            }
        }
        Err(TrellisError::ImageResolutionError(format!(
            "no image '{}' compatible with runtime version {}",
            name, version
        )))
    }

    /// Write `images.<key>` into `values` for every (key, image name) pair
    pub fn inject(&self, values: Value, version: &Version, mapping: &[(&str, &str)]) -> Result<Value> {
        let mut images = serde_json::Map::new();
        for (key, name) in mapping {
            let reference = self.find(name, version)?;
            debug!("Resolved image {} to {}", name, reference);
            images.insert(key.to_string(), Value::String(reference));
        }
        Ok(crate::values::merge(
            values,
            serde_json::json!({ "images": images }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VECTOR: &str = r#"
images:
- name: kube-dns
  repository: k8s.gcr.io/k8s-dns-kube-dns-amd64
  tag: "1.14.8"
  runtimeVersion: "< 1.11"
- name: kube-dns
  repository: k8s.gcr.io/k8s-dns-kube-dns-amd64
  tag: "1.14.10"
  runtimeVersion: ">= 1.11"
- name: hyperkube
  repository: k8s.gcr.io/hyperkube
"#;

    fn version(v: &str) -> Version {
        Version::parse(v).unwrap()
    }

    #[test]
    fn test_version_selects_different_entries() {
        let vector = ImageVector::from_yaml(VECTOR).unwrap();

        let old = vector.find("kube-dns", &version("1.10.5")).unwrap();
        let new = vector.find("kube-dns", &version("1.11.0")).unwrap();

        assert_eq!(old, "k8s.gcr.io/k8s-dns-kube-dns-amd64:1.14.8");
        assert_eq!(new, "k8s.gcr.io/k8s-dns-kube-dns-amd64:1.14.10");
    }

    #[test]
    fn test_missing_tag_defaults_to_runtime_version() {
        let vector = ImageVector::from_yaml(VECTOR).unwrap();
        assert_eq!(
            vector.find("hyperkube", &version("1.11.0")).unwrap(),
            "k8s.gcr.io/hyperkube:v1.11.0"
        );
    }

    #[test]
    fn test_unknown_image_fails() {
        let vector = ImageVector::from_yaml(VECTOR).unwrap();
        let err = vector.find("kube-lego", &version("1.11.0")).unwrap_err();
        assert!(matches!(err, TrellisError::ImageResolutionError(_)));
    }

    #[test]
    fn test_no_compatible_version_fails() {
        let vector = ImageVector::new(vec![ImageSource {
            name: "coredns".to_string(),
            repository: "coredns/coredns".to_string(),
            tag: Some("1.2.0".to_string()),
            runtime_version: Some(">= 1.12".to_string()),
        }]);

        assert!(vector.find("coredns", &version("1.11.0")).is_err());
    }

    #[test]
    fn test_inject_adds_images_and_keeps_values() {
        let vector = ImageVector::from_yaml(VECTOR).unwrap();
        let values = json!({"clusterDNS": "100.64.0.10"});

        let injected = vector
            .inject(values, &version("1.11.0"), &[("kube-dns", "kube-dns"), ("proxy", "hyperkube")])
            .unwrap();

        assert_eq!(
            injected,
            json!({
                "clusterDNS": "100.64.0.10",
                "images": {
                    "kube-dns": "k8s.gcr.io/k8s-dns-kube-dns-amd64:1.14.10",
                    "proxy": "k8s.gcr.io/hyperkube:v1.11.0"
                }
            })
        );
    }

    #[test]
    fn test_inject_is_deterministic() {
        let vector = ImageVector::from_yaml(VECTOR).unwrap();
        let mapping = [("kube-dns", "kube-dns")];

        let a = vector.inject(json!({}), &version("1.10.5"), &mapping).unwrap();
        let b = vector.inject(json!({}), &version("1.10.5"), &mapping).unwrap();

        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
