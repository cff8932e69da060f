// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rendering of template sets into manifest bundles.

pub mod renderer;
pub mod store;

pub use renderer::{ChartRenderer, RenderedBundle};
pub use store::{FsTemplateStore, MemoryTemplateStore, TemplateStore};
