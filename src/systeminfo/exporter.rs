// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Formats gathered system information into the registration payloads.

use crate::error::Result;
use crate::systeminfo::provider::{InfoProvider, SystemCounts};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::instrument;

/// Product identifier SCC knows Rancher installations by
const PRODUCT_IDENTIFIER: &str = "rancher";

/// Payload for online registration check-ins
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OnlineRegistrationPayload {
    pub uuid: String,
    pub server_url: String,
    pub nodes: u64,
    pub sockets: u64,
    pub clusters: u64,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Product {
    pub identifier: String,
    pub version: String,
    pub arch: String,
}

/// Payload for offline registration requests, shipped base64-encoded
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OfflineRegistrationPayload {
    pub uuid: String,
    pub server_url: String,
    pub product: Product,
}

pub struct InfoExporter {
    provider: InfoProvider,
    uuid: String,
    server_url: Option<String>,
    version: String,
}

impl InfoExporter {
    pub fn new(
        provider: InfoProvider,
        uuid: String,
        server_url: Option<String>,
        version: String,
    ) -> Self {
        Self {
            provider,
            uuid,
            server_url,
            version,
        }
    }

    /// Registration cannot proceed until the server URL is configured
    pub fn server_url_ready(&self) -> bool {
        self.server_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Gather current counts and build the online check-in payload
    #[instrument(skip(self))]
    pub async fn online_payload(&self) -> OnlineRegistrationPayload {
        let counts = self.provider.gather().await;
        self.online_payload_from_counts(counts)
    }

    fn online_payload_from_counts(&self, counts: SystemCounts) -> OnlineRegistrationPayload {
        OnlineRegistrationPayload {
            uuid: self.uuid.clone(),
            server_url: self.server_url.clone().unwrap_or_default(),
            nodes: counts.nodes,
            sockets: counts.sockets,
            clusters: counts.clusters,
            version: self.version.clone(),
        }
    }

    /// Build the base64-encoded offline registration request
    pub fn offline_payload(&self) -> Result<String> {
        let payload = OfflineRegistrationPayload {
            uuid: self.uuid.clone(),
            server_url: self.server_url.clone().unwrap_or_default(),
            product: Product {
                identifier: PRODUCT_IDENTIFIER.to_string(),
                version: self.version.clone(),
                arch: std::env::consts::ARCH.to_string(),
            },
        };

        let serialized = serde_json::to_vec(&payload)?;
        Ok(STANDARD.encode(serialized))
    }
}
