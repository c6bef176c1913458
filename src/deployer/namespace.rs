// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace deployer, including recovery from a stuck-terminating
//! namespace left behind by a previous uninstall.

use crate::constants::{OPERATOR_NAME, SYSTEM_NAMESPACE};
use crate::deployer::ResourceDeployer;
use crate::error::{Result, SccError};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ObjectMeta, Patch, PatchParams, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Attempts to observe the namespace gone before recreating it
const ABSENCE_POLL_ATTEMPTS: u32 = 30;
const ABSENCE_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct NamespaceDeployer {
    client: Client,
}

impl NamespaceDeployer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    fn desired(labels: &BTreeMap<String, String>) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(SYSTEM_NAMESPACE.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn create(&self, labels: &BTreeMap<String, String>) -> Result<()> {
        info!("Creating namespace {}", SYSTEM_NAMESPACE);
        self.api()
            .create(&PostParams::default(), &Self::desired(labels))
            .await?;
        Ok(())
    }

    /// A namespace with a deletion timestamp is on its way out; waiting for
    /// it to disappear and recreating is the only way to get a clean one.
    /// Lingering finalizers are stripped first so the delete can complete.
    #[instrument(skip(self, current, labels))]
    async fn recreate_terminating(
        &self,
        current: Namespace,
        labels: &BTreeMap<String, String>,
    ) -> Result<()> {
        warn!(
            "Namespace {} is terminating, waiting for removal before recreating",
            SYSTEM_NAMESPACE
        );

        let has_finalizers = current
            .metadata
            .finalizers
            .as_ref()
            .is_some_and(|f| !f.is_empty());
        if has_finalizers {
            info!("Stripping finalizers from terminating namespace {}", SYSTEM_NAMESPACE);
            let patch = serde_json::json!({ "metadata": { "finalizers": null } });
            self.api()
                .patch(
                    SYSTEM_NAMESPACE,
                    &PatchParams::default(),
                    &Patch::Merge(&patch),
                )
                .await?;
        }

        self.wait_for_absence().await?;
        self.create(labels).await
    }

    async fn wait_for_absence(&self) -> Result<()> {
        for attempt in 0..ABSENCE_POLL_ATTEMPTS {
            match self.api().get(SYSTEM_NAMESPACE).await {
                Ok(_) => {
                    debug!(
                        "Namespace {} still present (attempt {})",
                        SYSTEM_NAMESPACE, attempt
                    );
                    tokio::time::sleep(ABSENCE_POLL_INTERVAL).await;
                }
                Err(kube::Error::Api(err)) if err.code == 404 => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        Err(SccError::NamespaceError(format!(
            "namespace {} did not finish terminating",
            SYSTEM_NAMESPACE
        )))
    }
}

impl ResourceDeployer for NamespaceDeployer {
    async fn has_resource(&self) -> Result<bool> {
        match self.api().get(SYSTEM_NAMESPACE).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure(&self, labels: &BTreeMap<String, String>) -> Result<()> {
        match self.api().get(SYSTEM_NAMESPACE).await {
            Ok(current) if current.metadata.deletion_timestamp.is_some() => {
                self.recreate_terminating(current, labels).await
            }
            Ok(current) => {
                let current_labels = current.metadata.labels.unwrap_or_default();
                let in_sync = labels
                    .iter()
                    .all(|(k, v)| current_labels.get(k) == Some(v));
                if in_sync {
                    debug!("Namespace {} already in sync", SYSTEM_NAMESPACE);
                    return Ok(());
                }

                info!("Updating labels on namespace {}", SYSTEM_NAMESPACE);
                let pp = PatchParams::apply(OPERATOR_NAME).force();
                self.api()
                    .patch(SYSTEM_NAMESPACE, &pp, &Patch::Apply(&Self::desired(labels)))
                    .await?;
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 404 => self.create(labels).await,
            Err(e) => Err(SccError::NamespaceError(format!(
                "failed to check namespace {}: {}",
                SYSTEM_NAMESPACE, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{namespace_json, not_found_json, terminating_namespace_json, MockService};

    #[tokio::test]
    async fn test_has_resource_present() {
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/cattle-scc-system",
                200,
                &namespace_json(SYSTEM_NAMESPACE),
            )
            .into_client();

        let deployer = NamespaceDeployer::new(client);
        assert!(deployer.has_resource().await.unwrap());
    }

    #[tokio::test]
    async fn test_has_resource_absent() {
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/cattle-scc-system",
                404,
                &not_found_json("namespaces", SYSTEM_NAMESPACE),
            )
            .into_client();

        let deployer = NamespaceDeployer::new(client);
        assert!(!deployer.has_resource().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_creates_missing_namespace() {
        let mock = MockService::new()
            .on_get(
                "/api/v1/namespaces/cattle-scc-system",
                404,
                &not_found_json("namespaces", SYSTEM_NAMESPACE),
            )
            .on_post(
                "/api/v1/namespaces",
                201,
                &namespace_json(SYSTEM_NAMESPACE),
            );
        let recorder = mock.recorder();

        let deployer = NamespaceDeployer::new(mock.into_client());
        deployer.ensure(&BTreeMap::new()).await.unwrap();

        assert!(recorder.saw("POST", "/api/v1/namespaces"));
    }

    #[tokio::test]
    async fn test_ensure_noop_when_in_sync() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/cattle-scc-system",
            200,
            &namespace_json(SYSTEM_NAMESPACE),
        );
        let recorder = mock.recorder();

        let deployer = NamespaceDeployer::new(mock.into_client());
        deployer.ensure(&BTreeMap::new()).await.unwrap();

        assert!(!recorder.saw("POST", "/api/v1/namespaces"));
        assert!(!recorder.saw("PATCH", "/api/v1/namespaces/cattle-scc-system"));
    }

    #[tokio::test]
    async fn test_ensure_recreates_terminating_namespace() {
        // First GET sees the terminating namespace, the next confirms it is
        // gone, then the create goes through.
        let mock = MockService::new()
            .on_get_seq(
                "/api/v1/namespaces/cattle-scc-system",
                vec![
                    (200, terminating_namespace_json(SYSTEM_NAMESPACE)),
                    (404, not_found_json("namespaces", SYSTEM_NAMESPACE)),
                ],
            )
            .on_post(
                "/api/v1/namespaces",
                201,
                &namespace_json(SYSTEM_NAMESPACE),
            );
        let recorder = mock.recorder();

        let deployer = NamespaceDeployer::new(mock.into_client());
        deployer.ensure(&BTreeMap::new()).await.unwrap();

        assert!(recorder.saw("POST", "/api/v1/namespaces"));
    }
}
