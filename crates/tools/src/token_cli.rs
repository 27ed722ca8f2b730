//! `push-tokens` command surface: inspect and edit device token bindings.

use std::io::Write;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};

use push_tokens::{RemoveOutcome, TokenBackend, TokenMetadataStore};

#[derive(Parser, Debug)]
#[command(name = "push-tokens")]
#[command(about = "Manage push device tokens in Redis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TokenCommand {
    /// List the token mapping for a user
    List {
        #[arg(long)]
        user_id: i64,
    },
    /// Bind a token to a user (overwrites any existing mapping)
    Add {
        #[arg(long)]
        user_id: i64,
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        token: String,
    },
    /// Remove a user's token mapping, only if it matches `--token` when given.
    /// An empty `--token` removes whatever token is bound.
    Remove {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        token: Option<String>,
    },
}

/// Run `command` against `store`, writing the human-readable result to `out`.
///
/// Absent mappings and token mismatches are reported but are not errors.
/// Store failures and failures writing to `out` are.
pub async fn run<B: TokenBackend>(
    store: &TokenMetadataStore<B>,
    command: &TokenCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        TokenCommand::List { user_id } => {
            let key = store.keys().user_key(*user_id);
            let fields = store.list(*user_id).await?;
            if fields.is_empty() {
                writeln!(out, "No token mapping found for user {} (key: {})", user_id, key)?;
            } else {
                writeln!(out, "Token mapping for user {} (key: {}):", user_id, key)?;
                for (field, value) in &fields {
                    writeln!(out, "  {}: {}", field, value)?;
                }
            }
        }
        TokenCommand::Add { user_id, token } => {
            store.add(*user_id, token).await?;
            writeln!(out, "Added token for user {}: {}", user_id, token)?;
        }
        TokenCommand::Remove { user_id, token } => {
            let token = token.as_deref().filter(|t| !t.is_empty());
            let outcome = store.remove(*user_id, token).await?;
            let message = match (outcome, token) {
                (RemoveOutcome::Removed, Some(_)) => {
                    format!("Removed token mapping for user {}", user_id)
                }
                (RemoveOutcome::Removed, None) => {
                    format!("Removed token mapping (any token) for user {}", user_id)
                }
                (RemoveOutcome::Mismatch, _) => format!(
                    "Token does not match current mapping for user {}; no action taken.",
                    user_id
                ),
                (RemoveOutcome::Absent, _) => {
                    format!("No token mapping found for user {}; no action taken.", user_id)
                }
            };
            writeln!(out, "{}", message)?;
        }
    }
    Ok(())
}
