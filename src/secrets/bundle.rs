// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret bundles and their content checksums

use crate::constants::CHECKSUM_ANNOTATION_PREFIX;
use crate::error::{Result, TrellisError};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Data of a single secret: data key -> raw bytes
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Named secrets belonging to one managed cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretBundle {
    secrets: BTreeMap<String, SecretData>,
}

impl SecretBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: SecretData) {
        self.secrets.insert(name.into(), data);
    }

    pub fn get(&self, name: &str) -> Option<&SecretData> {
        self.secrets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SecretData)> {
        self.secrets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Get a secret that must be present
    pub fn require(&self, name: &str) -> Result<&SecretData> {
        self.get(name)
            .ok_or_else(|| TrellisError::MissingSecretError(format!("secret '{}' is absent", name)))
    }

    /// Get one data entry of a secret as UTF-8 text
    pub fn require_text(&self, name: &str, key: &str) -> Result<String> {
        let bytes = self.require(name)?.get(key).ok_or_else(|| {
            TrellisError::MissingSecretError(format!(
                "secret '{}' does not contain '{}' key",
                name, key
            ))
        })?;

        String::from_utf8(bytes.clone()).map_err(|e| {
            TrellisError::MissingSecretError(format!(
                "secret '{}' key '{}' is not valid UTF-8: {}",
                name, key, e
            ))
        })
    }

    /// Compute the checksum of every secret in the bundle
    pub fn checksums(&self) -> Checksums {
        Checksums(
            self.secrets
                .iter()
                .map(|(name, data)| (name.clone(), checksum(data)))
                .collect(),
        )
    }
}

impl FromIterator<(String, SecretData)> for SecretBundle {
    fn from_iter<I: IntoIterator<Item = (String, SecretData)>>(iter: I) -> Self {
        Self {
            secrets: iter.into_iter().collect(),
        }
    }
}

/// Checksum of a secret's data.
///
/// Hashes every key and value in key order with a separator byte after each,
/// so moving bytes between a key and its value changes the result.
pub fn checksum(data: &SecretData) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in data {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(value);
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Secret name -> checksum
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checksums(BTreeMap<String, String>);

impl Checksums {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Pod annotation forcing a restart of consumers when `name` changes
    pub fn annotation(&self, name: &str) -> Result<(String, String)> {
        let value = self.get(name).ok_or_else(|| {
            TrellisError::MissingSecretError(format!("no checksum for secret '{}'", name))
        })?;
        Ok((
            format!("{}{}", CHECKSUM_ANNOTATION_PREFIX, name),
            value.to_string(),
        ))
    }
}
