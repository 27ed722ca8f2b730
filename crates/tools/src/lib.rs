//! Operational tooling shared by the `push-*` binaries.

pub mod test_event;
pub mod token_cli;

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, honouring `RUST_LOG` when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "push_tools=info,push_publisher=info,push_tokens=info,push_normalizer=warn",
            )
        }))
        .with_writer(std::io::stderr)
        .init();
}
