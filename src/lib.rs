// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod addons;
pub mod config;
pub mod constants;
pub mod error;
pub mod images;
pub mod kubernetes;
pub mod providers;
pub mod reconcile;
pub mod render;
pub mod secrets;
pub mod types;
pub mod values;

#[cfg(test)]
pub mod test_utils;
