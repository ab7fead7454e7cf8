//! # Cache Probe
//!
//! Connects with environment configuration, prints one health report as
//! JSON and exits non-zero when the cache is down.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_facade::{CacheConfig, HealthIndicator, HealthStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = CacheConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!(
        version = cache_facade::VERSION,
        url = %config.url,
        gate = %config.gate,
        "Starting cache probe"
    );

    let stack = cache_facade::init(&config).await?;

    let mut report = stack.health.report().await;
    if stack.service.is_enabled() {
        match stack.service.count().await {
            Ok(keys) => {
                report.insert("keys".to_string(), serde_json::json!(keys));
            }
            Err(e) => tracing::warn!(error = %e, "Failed to count keys"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    let healthy = report.get("status") == Some(&serde_json::json!(HealthStatus::Up));
    stack.shutdown().await;

    if !healthy {
        anyhow::bail!("cache '{}' is down", config.health.service);
    }
    Ok(())
}
