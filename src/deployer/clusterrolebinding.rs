// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ClusterRoleBinding deployer binding the operator ServiceAccount to
//! cluster-admin, matching what the Helm-managed install grants.

use crate::constants::{
    CLUSTER_ROLE_BINDING_NAME, OPERATOR_NAME, SERVICE_ACCOUNT_NAME, SYSTEM_NAMESPACE,
};
use crate::deployer::ResourceDeployer;
use crate::error::Result;
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use kube::{
    api::{ObjectMeta, Patch, PatchParams, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub struct ClusterRoleBindingDeployer {
    client: Client,
}

impl ClusterRoleBindingDeployer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<ClusterRoleBinding> {
        Api::all(self.client.clone())
    }

    fn desired(labels: &BTreeMap<String, String>) -> ClusterRoleBinding {
        ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(CLUSTER_ROLE_BINDING_NAME.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".to_string(),
                kind: "ClusterRole".to_string(),
                name: "cluster-admin".to_string(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".to_string(),
                name: SERVICE_ACCOUNT_NAME.to_string(),
                namespace: Some(SYSTEM_NAMESPACE.to_string()),
                ..Default::default()
            }]),
        }
    }
}

impl ResourceDeployer for ClusterRoleBindingDeployer {
    async fn has_resource(&self) -> Result<bool> {
        match self.api().get(CLUSTER_ROLE_BINDING_NAME).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure(&self, labels: &BTreeMap<String, String>) -> Result<()> {
        let desired = Self::desired(labels);
        match self.api().get(CLUSTER_ROLE_BINDING_NAME).await {
            Ok(current) => {
                // roleRef is immutable on the server; if it drifted the
                // patch below surfaces the API error to the caller.
                let subjects_match = current.subjects == desired.subjects;
                let role_match = current.role_ref == desired.role_ref;
                if subjects_match && role_match {
                    debug!(
                        "ClusterRoleBinding {} already in sync",
                        CLUSTER_ROLE_BINDING_NAME
                    );
                    return Ok(());
                }

                info!("Updating ClusterRoleBinding {}", CLUSTER_ROLE_BINDING_NAME);
                let pp = PatchParams::apply(OPERATOR_NAME).force();
                self.api()
                    .patch(CLUSTER_ROLE_BINDING_NAME, &pp, &Patch::Apply(&desired))
                    .await?;
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                info!("Creating ClusterRoleBinding {}", CLUSTER_ROLE_BINDING_NAME);
                self.api().create(&PostParams::default(), &desired).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
