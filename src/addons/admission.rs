// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::reconcile::ReconcileContext;
use serde_json::Value;

/// Values of the admission-control template set; entirely provider-specific
pub fn admission_values(ctx: &ReconcileContext) -> Result<Value> {
    Ok(ctx.provider.admission_control_config(ctx.spec))
}
