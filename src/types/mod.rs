// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types read by Trellis.

pub mod cluster;

pub use cluster::{CloudProvider, ManagedCluster, ManagedClusterSpec};
