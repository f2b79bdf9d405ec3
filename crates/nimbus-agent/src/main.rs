mod config;

use anyhow::Result;
use nimbus_collector::device::DeviceMap;
use nimbus_collector::relabel::RelabelSource;
use nimbus_collector::{MetricSource, NodeEngine};
use nimbus_push::client::{AuthClient, AuthorityConfig};
use nimbus_push::gateway::Pusher;
use nimbus_push::token::TokenStore;
use std::sync::Arc;
use sysinfo::System;
use tokio::signal;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("nimbus_agent=info".parse()?)
                .add_directive("nimbus_collector=info".parse()?)
                .add_directive("nimbus_push=info".parse()?),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = config::AgentConfig::load(&config_path)?;
    let hostname = config
        .hostname
        .clone()
        .or_else(System::host_name)
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!(agent_id = %config.agent_id, hostname = %hostname, "nimbus-agent starting");

    let store = match &config.credential_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            TokenStore::at_dir(dir)
        }
        None => TokenStore::open()?,
    };

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let client = AuthClient::new(
        http,
        AuthorityConfig {
            endpoint: config.auth.endpoint.clone(),
            agent_id: config.agent_id.clone(),
            secret: config.auth.secret.clone(),
            secret_id: config.auth.secret_id.clone(),
            tenant_id: config.auth.tenant_id.clone(),
        },
        store,
    );
    let mut pusher = Pusher::new(client, &config.gateway_url, "nimbus-agent")
        .grouping("instance_id", &config.agent_id)
        .grouping("hostname", &hostname)
        .grouping("instance", &hostname);

    let devices = DeviceMap::system();
    tracing::info!(devices = devices.len(), "built device identity mapping");

    let engine = NodeEngine::with_default_collectors();
    tracing::info!(
        descriptors = engine.describe().len(),
        "registered metric descriptors"
    );
    let source = Arc::new(Mutex::new(
        RelabelSource::new(engine, devices).refresh_on_miss(config.refresh_mapping_on_miss),
    ));

    let mut tick = interval(Duration::from_secs(config.push_interval_secs));
    tracing::info!(
        interval_secs = config.push_interval_secs,
        gateway = %config.gateway_url,
        "starting push loop"
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let source = Arc::clone(&source);
                let samples = tokio::task::spawn_blocking(move || {
                    // One pass completes before the next begins; the lock
                    // only guards against a pass outliving its tick.
                    let mut source = source.blocking_lock();
                    nimbus_collector::gather(&mut *source)
                })
                .await?;

                match pusher.push(&samples).await {
                    Ok(()) => {
                        tracing::info!(samples = samples.len(), "pushed metrics to gateway");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "push failed, waiting for next cycle");
                    }
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}
