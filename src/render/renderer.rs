// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Chart renderer
//!
//! A template set is laid out like a Helm chart:
//!
//! ```text
//! <set>/values.yaml                 defaults, merged under the supplied values
//! <set>/templates/*.yaml            rendered manifests (`_*` files are helpers only)
//! <set>/charts/<sub>/...            subchart, receives values[<sub>] and `global`
//! ```
//!
//! Templates are minijinja templates with `Values`, `Release.Name`,
//! `Release.Namespace` and `Chart.Name` in scope.

use super::store::TemplateStore;
use crate::error::{Result, TrellisError};
use crate::values;
use base64::{engine::general_purpose::STANDARD, Engine};
use minijinja::{context, AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

const VALUES_FILE: &str = "values.yaml";
const TEMPLATES_DIR: &str = "templates/";
const CHARTS_DIR: &str = "charts/";

/// Manifests rendered from one template set, keyed by template path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBundle {
    pub release: String,
    pub namespace: String,
    manifests: BTreeMap<String, String>,
}

impl RenderedBundle {
    pub fn manifests(&self) -> &BTreeMap<String, String> {
        &self.manifests
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.manifests.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    /// Individual YAML documents in path order
    #[cfg(test)]
    pub fn documents(&self) -> Vec<&str> {
        self.manifests
            .values()
            .flat_map(|manifest| manifest.split("\n---"))
            .map(|doc| doc.trim_start_matches("---").trim())
            .filter(|doc| !doc.is_empty())
            .collect()
    }

    /// Manifests keyed for storage in a Secret or ConfigMap (`/` is not a valid key character)
    pub fn object_data(&self) -> BTreeMap<String, String> {
        self.manifests
            .iter()
            .map(|(path, manifest)| (path.replace('/', "_"), manifest.clone()))
            .collect()
    }
}

fn b64enc(value: String) -> String {
    STANDARD.encode(value)
}

/// Double-quoted YAML scalar; JSON string syntax is a subset of it
fn quote(value: minijinja::Value) -> std::result::Result<String, minijinja::Error> {
    let text = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    serde_json::to_string(&text)
        .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

fn render_error(path: &str, e: minijinja::Error) -> TrellisError {
    TrellisError::TemplateRenderError(format!("{}: {:#}", path, e))
}

/// Renders template sets read from a [`TemplateStore`]
pub struct ChartRenderer<S> {
    store: S,
}

impl<S: TemplateStore> ChartRenderer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Render a template set for a release into `namespace`
    #[instrument(skip(self, values))]
    pub fn render(
        &self,
        set: &str,
        release: &str,
        namespace: &str,
        values: &Value,
    ) -> Result<RenderedBundle> {
        let files = self.store.list(set)?;
        let mut sources = BTreeMap::new();
        for path in &files {
            sources.insert(path.clone(), self.store.read(set, path)?);
        }

        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        // manifests are YAML; values are emitted verbatim
        env.set_auto_escape_callback(|_| AutoEscape::None);
        // a missing value fails the render; `if` on it is still allowed
        env.set_undefined_behavior(UndefinedBehavior::SemiStrict);
        env.add_filter("b64enc", b64enc);
        env.add_filter("quote", quote);
        for (path, source) in &sources {
            if is_template(path) {
                env.add_template(path, source)
                    .map_err(|e| render_error(path, e))?;
            }
        }

        let chart = Chart {
            env: &env,
            sources: &sources,
            release,
            namespace,
        };
        let mut manifests = BTreeMap::new();
        chart.render("", set, values.clone(), None, &mut manifests)?;

        debug!("Rendered {} manifests from template set {}", manifests.len(), set);
        Ok(RenderedBundle {
            release: release.to_string(),
            namespace: namespace.to_string(),
            manifests,
        })
    }
}

fn is_template(path: &str) -> bool {
    path.starts_with(TEMPLATES_DIR) || path.contains(&format!("/{}", TEMPLATES_DIR))
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

struct Chart<'a, 'env> {
    env: &'a Environment<'env>,
    sources: &'a BTreeMap<String, String>,
    release: &'a str,
    namespace: &'a str,
}

impl Chart<'_, '_> {
    fn render(
        &self,
        prefix: &str,
        name: &str,
        supplied: Value,
        global: Option<&Value>,
        out: &mut BTreeMap<String, String>,
    ) -> Result<()> {
        let defaults = self.defaults(prefix)?;
        let mut chart_values = values::merge(defaults, supplied);
        if let Some(global) = global {
            chart_values = values::merge(chart_values, serde_json::json!({ "global": global }));
            if chart_values.get("enabled") == Some(&Value::Bool(false)) {
                debug!("Subchart {} is disabled", name);
                return Ok(());
            }
        }

        let ctx = context! {
            Values => &chart_values,
            Release => context! { Name => self.release, Namespace => self.namespace },
            Chart => context! { Name => name },
        };

        let templates_prefix = format!("{}{}", prefix, TEMPLATES_DIR);
        for path in self.sources.keys() {
            if !path.starts_with(&templates_prefix) || file_name(path).starts_with('_') {
                continue;
            }

            let rendered = self
                .env
                .get_template(path)
                .and_then(|t| t.render(&ctx))
                .map_err(|e| render_error(path, e))?;
            let rendered = rendered.trim();
            if !rendered.is_empty() {
                out.insert(path.clone(), format!("{}\n", rendered));
            }
        }

        let global = chart_values
            .get("global")
            .cloned()
            .unwrap_or_else(values::empty);
        for subchart in self.subcharts(prefix) {
            let supplied = chart_values
                .get(&subchart)
                .cloned()
                .unwrap_or_else(values::empty);
            let sub_prefix = format!("{}{}{}/", prefix, CHARTS_DIR, subchart);
            self.render(&sub_prefix, &subchart, supplied, Some(&global), out)?;
        }

        Ok(())
    }

    fn defaults(&self, prefix: &str) -> Result<Value> {
        let path = format!("{}{}", prefix, VALUES_FILE);
        match self.sources.get(&path) {
            Some(source) => {
                let parsed: Option<Value> = serde_yaml::from_str(source).map_err(|e| {
                    TrellisError::TemplateRenderError(format!("{}: {}", path, e))
                })?;
                Ok(parsed.unwrap_or_else(values::empty))
            }
            None => Ok(values::empty()),
        }
    }

    fn subcharts(&self, prefix: &str) -> BTreeSet<String> {
        let charts_prefix = format!("{}{}", prefix, CHARTS_DIR);
        self.sources
            .keys()
            .filter_map(|path| path.strip_prefix(&charts_prefix))
            .filter_map(|rest| rest.split_once('/').map(|(name, _)| name.to_string()))
            .collect()
    }
}
