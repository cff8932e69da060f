// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for target client creation and target cluster operations.

pub mod client;
pub mod target;

pub use client::create_target_client;
pub use target::{ClusterClient, KubeClusterClient, ResourceKind};
