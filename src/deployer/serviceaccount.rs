// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ServiceAccount deployer for the operator pod identity.

use crate::constants::{OPERATOR_NAME, SERVICE_ACCOUNT_NAME, SYSTEM_NAMESPACE};
use crate::deployer::ResourceDeployer;
use crate::error::Result;
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{
    api::{ObjectMeta, Patch, PatchParams, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub struct ServiceAccountDeployer {
    client: Client,
}

impl ServiceAccountDeployer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<ServiceAccount> {
        Api::namespaced(self.client.clone(), SYSTEM_NAMESPACE)
    }

    fn desired(labels: &BTreeMap<String, String>) -> ServiceAccount {
        ServiceAccount {
            metadata: ObjectMeta {
                name: Some(SERVICE_ACCOUNT_NAME.to_string()),
                namespace: Some(SYSTEM_NAMESPACE.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl ResourceDeployer for ServiceAccountDeployer {
    async fn has_resource(&self) -> Result<bool> {
        match self.api().get(SERVICE_ACCOUNT_NAME).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure(&self, labels: &BTreeMap<String, String>) -> Result<()> {
        match self.api().get(SERVICE_ACCOUNT_NAME).await {
            Ok(current) => {
                let current_labels = current.metadata.labels.unwrap_or_default();
                let in_sync = labels
                    .iter()
                    .all(|(k, v)| current_labels.get(k) == Some(v));
                if in_sync {
                    debug!(
                        "ServiceAccount {}/{} already in sync",
                        SYSTEM_NAMESPACE, SERVICE_ACCOUNT_NAME
                    );
                    return Ok(());
                }

                info!(
                    "Updating ServiceAccount {}/{}",
                    SYSTEM_NAMESPACE, SERVICE_ACCOUNT_NAME
                );
                let pp = PatchParams::apply(OPERATOR_NAME).force();
                self.api()
                    .patch(
                        SERVICE_ACCOUNT_NAME,
                        &pp,
                        &Patch::Apply(&Self::desired(labels)),
                    )
                    .await?;
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                info!(
                    "Creating ServiceAccount {}/{}",
                    SYSTEM_NAMESPACE, SERVICE_ACCOUNT_NAME
                );
                self.api()
                    .create(&PostParams::default(), &Self::desired(labels))
                    .await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
