// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use scc_deployer::config::Config;
use scc_deployer::constants::env as env_keys;
use scc_deployer::deployer::SccDeployer;
use scc_deployer::jitterbug::{checkin_due, JitterChecker, JitterCheckerConfig};
use scc_deployer::kubernetes::cluster_uuid;
use scc_deployer::params::SccOperatorParams;
use scc_deployer::systeminfo::{InfoExporter, InfoProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting SCC operator deployer");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: image={} dev_mode={}",
        config.operator_image, config.dev_mode
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let deployer = Arc::new(SccDeployer::new(client.clone()));

    if config.operator_disabled {
        info!(
            "{} is set, removing the built-in SCC operator",
            env_keys::DISABLE_OPERATOR
        );
        deployer.remove_deployment().await?;
        return Ok(());
    }

    // The kube-system namespace UID doubles as the installation UUID
    let uuid = cluster_uuid(&client).await?;

    // Initial reconcile pass before the scheduler takes over
    let params = SccOperatorParams::new(&config)?;
    deployer.ensure_all(&params).await?;

    let exporter = Arc::new(InfoExporter::new(
        InfoProvider::new(client),
        uuid,
        config.server_url.clone(),
        config.rancher_version.clone(),
    ));

    let cadence = if config.use_dev_cadence() {
        JitterCheckerConfig::dev()
    } else {
        JitterCheckerConfig::prod()
    };
    let mut checker = JitterChecker::new(cadence)?;
    checker.start();

    info!("Starting jittered check-in loop");

    let last_checkin = Arc::new(Mutex::new(Instant::now()));
    checker
        .run(move |trigger_interval, strict_deadline| {
            let deployer = deployer.clone();
            let exporter = exporter.clone();
            let config = config.clone();
            let last_checkin = last_checkin.clone();

            async move {
                let last = *last_checkin.lock().await;
                if !checkin_due(trigger_interval, strict_deadline, last) {
                    return Ok(false);
                }

                // Re-read desired state so image or version changes roll out
                let params = SccOperatorParams::new(&config)?;
                deployer.ensure_all(&params).await?;

                if exporter.server_url_ready() {
                    let payload = exporter.online_payload().await;
                    info!(
                        nodes = payload.nodes,
                        sockets = payload.sockets,
                        clusters = payload.clusters,
                        version = %payload.version,
                        "Check-in complete"
                    );
                } else {
                    warn!("Server URL not set, skipping registration check-in");
                }

                *last_checkin.lock().await = Instant::now();
                Ok(true)
            }
        })
        .await?;

    // This should never be reached as the checker runs forever
    warn!("Check-in loop stopped unexpectedly");
    Ok(())
}
