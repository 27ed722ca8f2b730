//! Manage device token bindings for local testing and operations.
//!
//! ```bash
//! push-tokens list --user-id 123
//! push-tokens add --user-id 123 --token TEST_TOKEN
//! push-tokens remove --user-id 123 --token TEST_TOKEN
//! ```

use std::process::ExitCode;

use clap::Parser;

use push_common::config::AppConfig;
use push_tokens::TokenMetadataStore;
use push_tools::token_cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    push_tools::init_tracing();
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let store = match TokenMetadataStore::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to connect to Redis: {e}");
            return ExitCode::FAILURE;
        }
    };

    match token_cli::run(&store, &cli.command, &mut std::io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
