// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MateHub - a command-line chat client for the MateHub backend.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use matehub_api::ApiClient;
use matehub_config::MatehubConfig;
use matehub_core::{ConversationKey, MatehubError};
use matehub_poll::PollConfig;
use matehub_session::{ChatSessionController, SessionConfig};

mod history;
mod shell;
mod whoami;

/// MateHub - chat with story characters from the terminal.
#[derive(Parser, Debug)]
#[command(name = "matehub", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Story to open.
        #[arg(long, default_value_t = 1)]
        story: i64,
    },
    /// Show the current session identity.
    Whoami,
    /// Print conversation history for a story.
    History {
        /// Story to read.
        #[arg(long)]
        story: i64,
        /// Number of pages to fetch, newest first.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match matehub_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            matehub_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Chat { story }) => shell::run_shell(&config, story).await,
        Some(Commands::Whoami) => whoami::run(&config).await,
        Some(Commands::History { story, pages }) => history::run(&config, story, pages).await,
        None => {
            println!("matehub: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "command failed");
        eprintln!("{} {}", "error:".red().bold(), err.user_message());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("matehub={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Builds the HTTP client and establishes a session.
pub(crate) async fn connect(config: &MatehubConfig) -> Result<ApiClient, MatehubError> {
    let client = ApiClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.request_timeout_secs),
    )?;
    client.ensure_session().await?;
    Ok(client)
}

/// Builds a session controller for `story` on top of an established client.
pub(crate) async fn open_session(
    config: &MatehubConfig,
    client: &ApiClient,
    story: i64,
) -> Result<ChatSessionController, MatehubError> {
    let identity = client.me().await?;
    let user_id = identity.kakao_id.unwrap_or(0);

    let session_config = SessionConfig {
        model: config.chat.model.clone(),
        page_size: config.chat.page_size,
        pagination: config.chat.pagination,
        poll: PollConfig {
            max_attempts: config.poll.max_attempts,
            initial_delay: Duration::from_millis(config.poll.initial_delay_ms),
            max_delay: Duration::from_millis(config.poll.max_delay_ms),
            backoff_factor: config.poll.backoff_factor,
        },
    };

    let controller = ChatSessionController::new(
        Arc::new(client.clone()),
        ConversationKey::new(user_id, story),
        session_config,
    );
    controller.load_latest().await?;
    Ok(controller)
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
    fn binary_loads_config_defaults() {
        let config = matehub_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.chat.page_size, 20);
    }
}
