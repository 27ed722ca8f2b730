//! Report broker and Redis connectivity as a JSON health record.

use std::process::ExitCode;

use push_common::config::AppConfig;
use push_common::types::HealthStatus;
use push_publisher::amqp_publisher;
use push_tokens::TokenMetadataStore;

#[tokio::main]
async fn main() -> ExitCode {
    push_tools::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let rabbit_connected = amqp_publisher(&config.rabbitmq_url)
        .is_broker_reachable()
        .await;

    let redis_connected = match TokenMetadataStore::connect(&config).await {
        Ok(store) => store.ping().await.is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Redis connectivity check failed");
            false
        }
    };

    let status = HealthStatus::new(rabbit_connected, redis_connected);
    match serde_json::to_string_pretty(&status) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to render health status: {e}");
            return ExitCode::FAILURE;
        }
    }

    if status.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
