// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::reconcile::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Target cluster kubeconfig error: {0}")]
    KubeconfigError(String),

    #[error("Failed to generate secret: {0}")]
    SecretGenerationError(String),

    #[error("Missing secret: {0}")]
    MissingSecretError(String),

    #[error("Configuration composition failed: {0}")]
    ConfigCompositionError(String),

    #[error("Image resolution failed: {0}")]
    ImageResolutionError(String),

    #[error("Template set not found: {0}")]
    TemplateNotFoundError(String),

    #[error("Template rendering failed: {0}")]
    TemplateRenderError(String),

    #[error(transparent)]
    ApplyError(#[from] ApplyError),

    #[error("Stage {stage} failed: {source}")]
    StageError {
        stage: Stage,
        #[source]
        source: Box<TrellisError>,
    },
}

impl TrellisError {
    /// Tag an error with the reconciliation stage it occurred in.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ TrellisError::StageError { .. } => already,
            other => TrellisError::StageError {
                stage,
                source: Box::new(other),
            },
        }
    }
}

/// Errors surfaced by the target cluster client.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Target cluster API error: {0}")]
    Api(#[from] kube::Error),

    #[error("Invalid object body: {0}")]
    InvalidBody(String),
}

impl ApplyError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApplyError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrellisError>;
