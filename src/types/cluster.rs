// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

/// Rancher provisioning cluster, as far as telemetry needs it. Only read,
/// never written, so the spec carries just the fields we look at.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "provisioning.cattle.io", version = "v1", kind = "Cluster")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Cluster {
    /// Check if this is the local/management cluster
    pub fn is_local(&self) -> bool {
        self.name_any() == "local" || self.spec.local == Some(true)
    }
}
