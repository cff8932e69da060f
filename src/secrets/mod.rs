// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Credential management: secret bundles, checksums, generation and storage.

pub mod bundle;
pub mod generate;
pub mod store;

pub use bundle::{checksum, Checksums, SecretBundle, SecretData};
pub use generate::{definitions, ensure_secrets, SecretDefinition, SecretKind};
pub use store::{load_bundle, store_secrets};
