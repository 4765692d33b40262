// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mneme - personal memory ingestion, retrieval and persona adaptation.
//!
//! This is the command-line entry point.

mod app;
mod context;
mod import;
mod manage;
mod output;
mod persona;
mod query;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mneme_config::model::MnemeConfig;
use mneme_core::types::SourceTag;
use mneme_core::MnemeError;

use crate::app::App;
use crate::query::QueryOverrides;

/// Mneme - personal memory ingestion, retrieval and persona adaptation.
#[derive(Parser, Debug)]
#[command(name = "mneme", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Import an extracted data export directory.
    Import {
        #[arg(long)]
        user: String,
        /// Root of the extracted export.
        dir: PathBuf,
        /// Skip detection and treat the export as this source.
        #[arg(long, value_parser = parse_source)]
        source: Option<SourceTag>,
        /// Display name stored with the user.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the detected source type of an export directory.
    Detect { dir: PathBuf },
    /// Retrieve memories relevant to a query.
    Query {
        #[arg(long)]
        user: String,
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long, allow_negative_numbers = true)]
        min_score: Option<f32>,
        #[arg(long)]
        recency_boost: Option<f32>,
        /// Restrict to these sources (repeatable).
        #[arg(long = "source", value_parser = parse_source)]
        sources: Vec<SourceTag>,
        #[arg(long)]
        json: bool,
    },
    /// Record a message and print the assembled generation context.
    Context {
        #[arg(long)]
        user: String,
        message: String,
        #[arg(long, default_value = "default")]
        conversation: String,
        /// Identifier of the person being talked to.
        #[arg(long)]
        counterpart: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show the persona, bootstrapping it from imported text if needed.
    Persona {
        #[arg(long)]
        user: String,
        /// Re-derive the persona even if one exists.
        #[arg(long)]
        rebuild: bool,
        #[arg(long)]
        json: bool,
    },
    /// List imported data sources.
    Sources {
        #[arg(long)]
        user: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete old conversation turns.
    Prune {
        #[arg(long)]
        user: String,
        /// Age threshold in days (defaults to conversation.retention_days).
        #[arg(long)]
        days: Option<u32>,
    },
    /// Delete all imported data and conversation turns of a user.
    Forget {
        #[arg(long)]
        user: String,
        #[arg(long)]
        yes: bool,
    },
}

fn parse_source(value: &str) -> Result<SourceTag, String> {
    value
        .parse::<SourceTag>()
        .map_err(|_| format!("unknown source `{value}`"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => mneme_config::load_and_validate_path(path),
        None => mneme_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            mneme_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.general.log_level);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(MnemeError::PersonaNotFound { user_id }) => {
            eprintln!("mneme: no persona for {user_id} yet; run `mneme persona --user {user_id}` first");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("mneme: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: MnemeConfig) -> Result<(), MnemeError> {
    let app = App::open(config).await?;
    let result = match command {
        Commands::Import {
            user,
            dir,
            source,
            name,
            json,
        } => import::run_import(&app, &user, &dir, source, name.as_deref(), json).await,
        Commands::Detect { dir } => import::run_detect(&app, &dir).await,
        Commands::Query {
            user,
            query,
            top_k,
            min_score,
            recency_boost,
            sources,
            json,
        } => {
            let overrides = QueryOverrides {
                top_k,
                min_score,
                recency_boost,
                sources,
            };
            query::run_query(&app, &user, &query, overrides, json).await
        }
        Commands::Context {
            user,
            message,
            conversation,
            counterpart,
            json,
        } => {
            context::run_context(&app, &user, &conversation, &message, counterpart.as_deref(), json)
                .await
        }
        Commands::Persona { user, rebuild, json } => {
            persona::run_persona(&app, &user, rebuild, json).await
        }
        Commands::Sources { user, json } => manage::run_sources(&app, &user, json).await,
        Commands::Prune { user, days } => manage::run_prune(&app, &user, days).await,
        Commands::Forget { user, yes } => manage::run_forget(&app, &user, yes).await,
    };
    app.close().await?;
    result
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence. Logs go to stderr so `--json` output stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mneme={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn source_flags_parse_case_insensitively() {
        let cli = Cli::parse_from([
            "mneme", "query", "--user", "u1", "--source", "Mail", "--source", "chat", "lunch",
        ]);
        match cli.command {
            Commands::Query { sources, .. } => {
                assert_eq!(sources, vec![SourceTag::Mail, SourceTag::Chat]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        let result = Cli::try_parse_from(["mneme", "import", "--user", "u1", "--source", "fax", "."]);
        assert!(result.is_err());
    }

    #[test]
    fn default_config_is_valid() {
        let config = mneme_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.embedding.dimensions, 1536);
    }
}
