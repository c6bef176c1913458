// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as env_keys, DEFAULT_OPERATOR_IMAGE};
use anyhow::Result;
use std::env;

/// Deployer configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Skip deploying the built-in SCC operator
    pub operator_disabled: bool,
    /// Dev mode: shorter check-in intervals, dev version fallback
    pub dev_mode: bool,
    /// Container image for the operator Deployment
    pub operator_image: String,
    /// Rancher server URL reported to the registration service
    pub server_url: Option<String>,
    /// Rancher version reported to the registration service
    pub rancher_version: String,
    /// Git commit baked into the operator pod environment
    pub git_commit: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let operator_disabled = env::var(env_keys::DISABLE_OPERATOR)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        let dev_mode = env::var(env_keys::DEV_MODE)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        let operator_image = env::var(env_keys::OPERATOR_IMAGE)
            .unwrap_or_else(|_| DEFAULT_OPERATOR_IMAGE.to_string());
        let server_url = env::var(env_keys::SERVER_URL).ok().filter(|v| !v.is_empty());
        let rancher_version = env::var(env_keys::SERVER_VERSION)
            .unwrap_or_else(|_| "dev".to_string());
        let git_commit = env::var(env_keys::GIT_COMMIT).unwrap_or_else(|_| "HEAD".to_string());

        Ok(Config {
            operator_disabled,
            dev_mode,
            operator_image,
            server_url,
            rancher_version,
            git_commit,
        })
    }

    /// Dev builds use the dev check-in cadence even without CATTLE_DEV_MODE
    pub fn use_dev_cadence(&self) -> bool {
        self.dev_mode || version_is_dev_build(&self.rancher_version)
    }
}

/// Accepted "enabled" spellings for boolean-ish environment variables.
/// "once" is kept for compatibility with the old agent tooling.
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "once"
    )
}

/// A version is a dev build when it is the literal "dev" or carries a
/// prerelease suffix such as "-rc.1".
pub fn version_is_dev_build(version: &str) -> bool {
    version == "dev" || version.contains('-')
}
