// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation driver: runs the stages of one cycle for one cluster.

pub mod cleanup;
pub mod context;
pub mod driver;
pub mod stage;

pub use cleanup::delete_legacy_resources;
pub use context::ReconcileContext;
pub use driver::{Applied, ReconcileReport, Reconciler};
pub use stage::Stage;
