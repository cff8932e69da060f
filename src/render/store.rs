// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Template stores: where template sets are read from

use crate::error::{Result, TrellisError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Access to the raw files of named template sets
pub trait TemplateStore {
    /// Paths of every file in a template set, relative to its root and sorted
    fn list(&self, set: &str) -> Result<Vec<String>>;

    /// Content of one file of a template set
    fn read(&self, set: &str, path: &str) -> Result<String>;
}

impl<T: TemplateStore + ?Sized> TemplateStore for &T {
    fn list(&self, set: &str) -> Result<Vec<String>> {
        (**self).list(set)
    }

    fn read(&self, set: &str, path: &str) -> Result<String> {
        (**self).read(set, path)
    }
}

/// Template sets stored as directories below a root directory
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn set_dir(&self, set: &str) -> Result<PathBuf> {
        let dir = self.root.join(set);
        if !dir.is_dir() {
            return Err(TrellisError::TemplateNotFoundError(format!(
                "template set '{}' not found below {}",
                set,
                self.root.display()
            )));
        }
        Ok(dir)
    }
}

fn relative_path(dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(dir).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

impl TemplateStore for FsTemplateStore {
    fn list(&self, set: &str) -> Result<Vec<String>> {
        let dir = self.set_dir(set)?;
        let pattern = format!("{}/**/*", dir.display());
        let entries = glob::glob(&pattern).map_err(|e| {
            TrellisError::TemplateNotFoundError(format!("invalid template set path {}: {}", pattern, e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                TrellisError::TemplateNotFoundError(format!("failed to list template set '{}': {}", set, e))
            })?;
            if !path.is_file() {
                continue;
            }
            if let Some(relative) = relative_path(&dir, &path) {
                files.push(relative);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read(&self, set: &str, path: &str) -> Result<String> {
        let file = self.set_dir(set)?.join(path);
        std::fs::read_to_string(&file).map_err(|e| {
            TrellisError::TemplateNotFoundError(format!(
                "failed to read template {}: {}",
                file.display(),
                e
            ))
        })
    }
}

/// Template sets held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateStore {
    sets: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, set: &str, path: &str, content: &str) -> Self {
        self.sets
            .entry(set.to_string())
            .or_default()
            .insert(path.to_string(), content.to_string());
        self
    }

    fn set(&self, set: &str) -> Result<&BTreeMap<String, String>> {
        self.sets.get(set).ok_or_else(|| {
            TrellisError::TemplateNotFoundError(format!("template set '{}' not found", set))
        })
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn list(&self, set: &str) -> Result<Vec<String>> {
        Ok(self.set(set)?.keys().cloned().collect())
    }

    fn read(&self, set: &str, path: &str) -> Result<String> {
        self.set(set)?.get(path).cloned().ok_or_else(|| {
            TrellisError::TemplateNotFoundError(format!("template {}/{} not found", set, path))
        })
    }
}
