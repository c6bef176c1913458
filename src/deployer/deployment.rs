// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment deployer. Drift is detected by comparing the live
//! scc.cattle.io/scc-hash label against the hash computed from the
//! desired pod spec.

use crate::constants::{labels, DEPLOYMENT_NAME, OPERATOR_NAME, SYSTEM_NAMESPACE};
use crate::deployer::ResourceDeployer;
use crate::error::Result;
use crate::params::SccOperatorParams;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{
    api::{DeleteParams, ObjectMeta, Patch, PatchParams, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Bound to one reconcile pass: carries the params whose hash decides
/// whether the live Deployment needs replacing.
pub struct DeploymentDeployer {
    client: Client,
    params: SccOperatorParams,
}

impl DeploymentDeployer {
    pub fn new(client: Client, params: SccOperatorParams) -> Self {
        Self { client, params }
    }

    fn api(&self) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), SYSTEM_NAMESPACE)
    }

    fn desired(&self, labels_map: &BTreeMap<String, String>) -> Deployment {
        let selector = BTreeMap::from([("app".to_string(), DEPLOYMENT_NAME.to_string())]);

        let mut pod_labels = labels_map.clone();
        pod_labels.extend(selector.clone());

        Deployment {
            metadata: ObjectMeta {
                name: Some(DEPLOYMENT_NAME.to_string()),
                namespace: Some(SYSTEM_NAMESPACE.to_string()),
                labels: Some(labels_map.clone()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                selector: LabelSelector {
                    match_labels: Some(selector),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(pod_labels),
                        ..Default::default()
                    }),
                    spec: Some(self.params.pod_spec().clone()),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl ResourceDeployer for DeploymentDeployer {
    async fn has_resource(&self) -> Result<bool> {
        match self.api().get(DEPLOYMENT_NAME).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure(&self, labels_map: &BTreeMap<String, String>) -> Result<()> {
        match self.api().get(DEPLOYMENT_NAME).await {
            Ok(current) => {
                let live_hash = current
                    .metadata
                    .labels
                    .as_ref()
                    .and_then(|l| l.get(labels::SCC_OPERATOR_HASH))
                    .map(String::as_str);

                if live_hash == Some(self.params.refresh_hash.as_str()) {
                    debug!(
                        "Deployment {}/{} matches hash, nothing to do",
                        SYSTEM_NAMESPACE, DEPLOYMENT_NAME
                    );
                    return Ok(());
                }

                info!(
                    "Deployment {}/{} hash drift (live: {:?}), redeploying",
                    SYSTEM_NAMESPACE, DEPLOYMENT_NAME, live_hash
                );
                let pp = PatchParams::apply(OPERATOR_NAME).force();
                self.api()
                    .patch(DEPLOYMENT_NAME, &pp, &Patch::Apply(&self.desired(labels_map)))
                    .await?;
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                info!("Creating Deployment {}/{}", SYSTEM_NAMESPACE, DEPLOYMENT_NAME);
                self.api()
                    .create(&PostParams::default(), &self.desired(labels_map))
                    .await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Delete the operator Deployment; already-missing is fine.
pub async fn remove_deployment(client: Client) -> Result<()> {
    let api: Api<Deployment> = Api::namespaced(client, SYSTEM_NAMESPACE);
    match api.delete(DEPLOYMENT_NAME, &DeleteParams::default()).await {
        Ok(_) => {
            info!("Removed Deployment {}/{}", SYSTEM_NAMESPACE, DEPLOYMENT_NAME);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(()),
        Err(e) => Err(e.into()),
    }
}
