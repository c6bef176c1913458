// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Namespace the SCC operator and its credentials live in
pub const SYSTEM_NAMESPACE: &str = "cattle-scc-system";

/// Name of the operator Deployment
pub const DEPLOYMENT_NAME: &str = "scc-operator";
/// Name of the operator ServiceAccount
pub const SERVICE_ACCOUNT_NAME: &str = "scc-operator";
/// Name of the ClusterRoleBinding granting the operator its permissions
pub const CLUSTER_ROLE_BINDING_NAME: &str = "scc-operator";
/// Container name inside the operator pod
pub const CONTAINER_NAME: &str = "scc-operator";

/// Default operator image when CATTLE_SCC_OPERATOR_IMAGE is unset
pub const DEFAULT_OPERATOR_IMAGE: &str = "rancher/scc-operator:latest";

/// Field manager name used for server-side apply
pub const OPERATOR_NAME: &str = "scc-deployer";

/// Kubernetes label keys stamped on managed objects
pub mod labels {
    /// Hash of the desired operator pod spec, used for drift detection
    pub const SCC_OPERATOR_HASH: &str = "scc.cattle.io/scc-hash";
    /// Marks objects owned by this deployer
    pub const MANAGED_BY: &str = "scc.cattle.io/managed-by";
}

/// Environment variable names read at startup
pub mod env {
    /// Values 1/true/yes/on/once disable deployment of the built-in operator
    pub const DISABLE_OPERATOR: &str = "CATTLE_DISABLE_BUILTIN_SCC_OPERATOR";
    pub const DEV_MODE: &str = "CATTLE_DEV_MODE";
    pub const OPERATOR_IMAGE: &str = "CATTLE_SCC_OPERATOR_IMAGE";
    pub const SERVER_URL: &str = "CATTLE_SERVER_URL";
    pub const SERVER_VERSION: &str = "CATTLE_SERVER_VERSION";
    pub const GIT_COMMIT: &str = "CATTLE_GIT_COMMIT";
}

/// Check-in cadence for the registration keepalive
pub mod checkin {
    use std::time::Duration;

    pub const PROD_BASE: Duration = Duration::from_secs(20 * 60 * 60);
    /// Prod jitter amplitude: up to 3 hours either side of the base
    pub const PROD_JITTER_MAX: u32 = 3;
    pub const PROD_JITTER_SCALE: Duration = Duration::from_secs(60 * 60);

    pub const DEV_BASE: Duration = Duration::from_secs(30 * 60);
    /// Dev jitter amplitude: up to 10 minutes either side of the base
    pub const DEV_JITTER_MAX: u32 = 10;
    pub const DEV_JITTER_SCALE: Duration = Duration::from_secs(60);

    /// Hard ceiling on time between check-ins, regardless of jitter
    pub const PROD_DEADLINE: Duration = Duration::from_secs(24 * 60 * 60);
    pub const DEV_DEADLINE: Duration = Duration::from_secs(45 * 60);
}

/// How often the jitter checker polls for a due check-in
pub const POLLING_INTERVAL: Duration = Duration::from_secs(60);

/// Cluster identity lookup retry configuration
pub mod identity {
    /// Initial retry interval in seconds
    pub const RETRY_INTERVAL_SECS: u64 = 2;
    /// Maximum retry interval in seconds (exponential backoff cap)
    pub const RETRY_MAX_INTERVAL_SECS: u64 = 30;
    /// Attempts before giving up on the kube-system namespace lookup
    pub const RETRY_ATTEMPTS: u32 = 10;
}

/// Name of the secret holding SCC credentials for a registration,
/// suffixed with the registration's name hash.
pub fn scc_credentials_secret_name(suffix: &str) -> String {
    format!("scc-system-credentials-{}", suffix)
}
