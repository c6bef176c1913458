// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SccError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to serialize pod spec for hashing: {0}")]
    HashSerialization(#[from] serde_json::Error),

    #[error("Invalid jitter configuration: {0}")]
    InvalidJitterConfig(String),

    #[error("Namespace operation failed: {0}")]
    NamespaceError(String),

    #[error("Could not determine cluster identity: {0}")]
    MissingClusterIdentity(String),

    #[error("Deployment ensure failed: {0}")]
    DeploymentError(String),
}

pub type Result<T> = std::result::Result<T, SccError>;
