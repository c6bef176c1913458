// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Get-or-create-or-patch deployers for the SCC operator's resources.

pub mod clusterrolebinding;
pub mod deployment;
pub mod namespace;
pub mod serviceaccount;

pub use clusterrolebinding::ClusterRoleBindingDeployer;
pub use deployment::DeploymentDeployer;
pub use namespace::NamespaceDeployer;
pub use serviceaccount::ServiceAccountDeployer;

use crate::error::Result;
use crate::params::SccOperatorParams;
use kube::Client;
use std::collections::BTreeMap;
use std::future::Future;
use tracing::{info, instrument};

/// Common contract for the individual resource deployers: an existence
/// check plus an idempotent create-or-update.
pub trait ResourceDeployer {
    fn has_resource(&self) -> impl Future<Output = Result<bool>> + Send;
    fn ensure(
        &self,
        labels: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Composes the resource deployers in dependency order: namespace, then
/// service account, then cluster role binding, then deployment.
pub struct SccDeployer {
    client: Client,
    namespace: NamespaceDeployer,
    service_account: ServiceAccountDeployer,
    cluster_role_binding: ClusterRoleBindingDeployer,
}

impl SccDeployer {
    pub fn new(client: Client) -> Self {
        Self {
            namespace: NamespaceDeployer::new(client.clone()),
            service_account: ServiceAccountDeployer::new(client.clone()),
            cluster_role_binding: ClusterRoleBindingDeployer::new(client.clone()),
            client,
        }
    }

    /// Run one full reconcile pass for the operator's resources. The
    /// Deployment deployer is bound to this pass's params.
    #[instrument(skip(self, params), fields(hash = %params.refresh_hash))]
    pub async fn ensure_all(&self, params: &SccOperatorParams) -> Result<()> {
        let labels = params.managed_labels();

        self.namespace.ensure(&labels).await?;
        self.service_account.ensure(&labels).await?;
        self.cluster_role_binding.ensure(&labels).await?;

        let deployment = DeploymentDeployer::new(self.client.clone(), params.clone());
        deployment.ensure(&labels).await?;

        info!("SCC operator resources are in sync");
        Ok(())
    }

    /// Remove the operator Deployment when the built-in operator is
    /// disabled. The namespace and RBAC objects are left in place since
    /// credentials secrets may still live there.
    pub async fn remove_deployment(&self) -> Result<()> {
        deployment::remove_deployment(self.client.clone()).await
    }
}
