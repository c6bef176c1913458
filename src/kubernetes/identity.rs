// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster identity: the UID of the kube-system namespace is stable for
//! the lifetime of a cluster and doubles as the installation UUID
//! reported to the registration service.

use crate::constants::identity::{RETRY_ATTEMPTS, RETRY_INTERVAL_SECS, RETRY_MAX_INTERVAL_SECS};
use crate::error::{Result, SccError};
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Look up the kube-system namespace UID, retrying with exponential
/// backoff. The API server may not be fully up when we start.
pub async fn cluster_uuid(client: &Client) -> Result<String> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let mut interval = RETRY_INTERVAL_SECS;
    let mut last_error = String::new();

    for attempt in 0..RETRY_ATTEMPTS {
        match namespaces.get("kube-system").await {
            Ok(ns) => {
                if let Some(uid) = ns.metadata.uid {
                    return Ok(uid);
                }
                last_error = "kube-system namespace has no UID".to_string();
            }
            Err(e) => {
                last_error = e.to_string();
            }
        }

        warn!(
            "Failed to read kube-system namespace (attempt {}): {}, retrying in {}s",
            attempt + 1,
            last_error,
            interval
        );
        sleep(Duration::from_secs(interval)).await;
        interval = (interval * 2).min(RETRY_MAX_INTERVAL_SECS);
    }

    Err(SccError::MissingClusterIdentity(last_error))
}
