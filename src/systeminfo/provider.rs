// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Counts nodes, vCPUs, and clusters. List failures degrade to zero
//! counts so a flaky telemetry read never blocks a check-in.

use crate::types::cluster::Cluster;
use k8s_openapi::api::core::v1::Node;
use kube::{api::ListParams, Api, Client};
use tracing::{instrument, warn};

/// Counts reported to the registration service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemCounts {
    pub nodes: u64,
    /// vCPU capacity summed over the node list
    pub sockets: u64,
    pub clusters: u64,
}

pub struct InfoProvider {
    client: Client,
}

impl InfoProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Gather all counts. Never fails; unreachable lists count as zero.
    #[instrument(skip(self))]
    pub async fn gather(&self) -> SystemCounts {
        let (nodes, sockets) = self.count_nodes().await;
        let clusters = self.count_clusters().await;

        SystemCounts {
            nodes,
            sockets,
            clusters,
        }
    }

    async fn count_nodes(&self) -> (u64, u64) {
        let nodes: Api<Node> = Api::all(self.client.clone());
        match nodes.list(&ListParams::default()).await {
            Ok(list) => {
                let count = list.items.len() as u64;
                let vcpus = list
                    .items
                    .iter()
                    .filter_map(|n| {
                        n.status
                            .as_ref()
                            .and_then(|s| s.capacity.as_ref())
                            .and_then(|c| c.get("cpu"))
                            .and_then(|q| parse_cpu_quantity(&q.0))
                    })
                    .sum();
                (count, vcpus)
            }
            Err(e) => {
                warn!("Failed to list nodes, reporting zero counts: {}", e);
                (0, 0)
            }
        }
    }

    async fn count_clusters(&self) -> u64 {
        let clusters: Api<Cluster> = Api::all(self.client.clone());
        match clusters.list(&ListParams::default()).await {
            Ok(list) => list.items.len() as u64,
            Err(e) => {
                warn!("Failed to list clusters, reporting zero count: {}", e);
                0
            }
        }
    }
}

/// Parse a Kubernetes cpu quantity: plain cores ("4") or millicores
/// ("3500m", rounded up to whole cores).
fn parse_cpu_quantity(quantity: &str) -> Option<u64> {
    if let Some(milli) = quantity.strip_suffix('m') {
        let m: u64 = milli.parse().ok()?;
        Some(m.div_ceil(1000))
    } else {
        quantity.parse().ok()
    }
}
