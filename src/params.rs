// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Desired-state parameters for the operator Deployment.

use crate::config::Config;
use crate::constants::{self, env as env_keys, labels, CONTAINER_NAME, SERVICE_ACCOUNT_NAME};
use crate::error::Result;
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Label values are capped at 63 characters; a 16-hex-char prefix of the
/// SHA-256 digest is plenty to detect drift.
const HASH_LEN: usize = 16;

/// Snapshot of everything that determines what the operator Deployment
/// should look like. Constructed fresh on each reconcile pass.
#[derive(Debug, Clone)]
pub struct SccOperatorParams {
    pub rancher_version: String,
    pub git_commit: String,
    pub operator_image: String,
    /// Hash of the desired pod spec, stamped on the Deployment as the
    /// scc.cattle.io/scc-hash label
    pub refresh_hash: String,
    pod_spec: PodSpec,
}

impl SccOperatorParams {
    /// Build params from config. Fails when the pod spec cannot be
    /// serialized; a broken hash input must not silently degrade to an
    /// image-only hash.
    pub fn new(config: &Config) -> Result<Self> {
        let pod_spec = desired_pod_spec(config);
        let refresh_hash = pod_spec_hash(&pod_spec)?;

        Ok(Self {
            rancher_version: config.rancher_version.clone(),
            git_commit: config.git_commit.clone(),
            operator_image: config.operator_image.clone(),
            refresh_hash,
            pod_spec,
        })
    }

    pub fn pod_spec(&self) -> &PodSpec {
        &self.pod_spec
    }

    /// Labels stamped on every object this deployer manages
    pub fn managed_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                labels::MANAGED_BY.to_string(),
                constants::OPERATOR_NAME.to_string(),
            ),
            (
                labels::SCC_OPERATOR_HASH.to_string(),
                self.refresh_hash.clone(),
            ),
        ])
    }
}

fn desired_pod_spec(config: &Config) -> PodSpec {
    let env = vec![
        EnvVar {
            name: env_keys::SERVER_VERSION.to_string(),
            value: Some(config.rancher_version.clone()),
            ..Default::default()
        },
        EnvVar {
            name: env_keys::GIT_COMMIT.to_string(),
            value: Some(config.git_commit.clone()),
            ..Default::default()
        },
        EnvVar {
            name: env_keys::DEV_MODE.to_string(),
            value: Some(config.dev_mode.to_string()),
            ..Default::default()
        },
    ];

    PodSpec {
        service_account_name: Some(SERVICE_ACCOUNT_NAME.to_string()),
        containers: vec![Container {
            name: CONTAINER_NAME.to_string(),
            image: Some(config.operator_image.clone()),
            image_pull_policy: Some("IfNotPresent".to_string()),
            env: Some(env),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn pod_spec_hash(pod_spec: &PodSpec) -> Result<String> {
    let serialized = serde_json::to_vec(pod_spec)?;
    let digest = Sha256::digest(&serialized);
    let mut hex = format!("{:x}", digest);
    hex.truncate(HASH_LEN);
    Ok(hex)
}
