// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `matehub chat` command implementation.
//!
//! Interactive readline shell: type to send a message and wait for the
//! reply; slash commands switch stories, page history, and inspect the
//! session. The shell is a plain terminal surface over the session
//! controller, with no rendering state of its own.

use colored::Colorize;
use matehub_config::MatehubConfig;
use matehub_core::{ChatMessage, ConversationKey, Direction, MatehubError};
use matehub_session::{ChatSessionController, LoadOlderOutcome, SendOutcome};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

/// Runs the interactive chat shell for one story.
pub async fn run_shell(config: &MatehubConfig, story: i64) -> Result<(), MatehubError> {
    let client = crate::connect(config).await?;
    let controller = crate::open_session(config, &client, story).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| MatehubError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "matehub chat".bold().green());
    println!(
        "Story {}. Type to chat; {} loads older messages, {} switches story, {} exits.\n",
        story,
        "/older".yellow(),
        "/story <id>".yellow(),
        "/quit".yellow()
    );
    print_transcript(&controller.messages());

    let prompt = format!("{}> ", "you".cyan());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(&client, &controller, command).await;
                    continue;
                }

                send_and_print(&client, &controller, trimmed).await;
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!(error = %e, "readline failed");
                break;
            }
        }
    }

    println!("bye.");
    Ok(())
}

async fn handle_command(
    client: &matehub_api::ApiClient,
    controller: &ChatSessionController,
    command: &str,
) {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("older") => match controller.load_older().await {
            Ok(LoadOlderOutcome::Loaded {
                inserted,
                has_more_older,
            }) => {
                println!(
                    "loaded {inserted} older message(s){}",
                    if has_more_older { "" } else { " (start of story)" }
                );
                print_transcript(&controller.messages());
            }
            Ok(LoadOlderOutcome::NothingOlder) => println!("no older messages."),
            Ok(LoadOlderOutcome::AlreadyLoading) => println!("still loading..."),
            Ok(LoadOlderOutcome::Disabled) => println!("pagination is disabled."),
            Ok(LoadOlderOutcome::Superseded) => {}
            Err(err) => print_error(&err),
        },
        Some("story") => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
            Some(id) => {
                let key = ConversationKey::new(controller.key().user_id, id);
                match controller.switch_story(key).await {
                    Ok(()) => {
                        println!("switched to story {id}.");
                        print_transcript(&controller.messages());
                    }
                    Err(err) => print_error(&err),
                }
            }
            None => println!("usage: /story <id>"),
        },
        Some("models") => match client.available_models().await {
            Ok(models) => {
                for model in models {
                    println!("  {model}");
                }
            }
            Err(err) => print_error(&err),
        },
        Some("whoami") => match controller.identity().await {
            Ok(identity) => {
                if identity.is_anonymous {
                    println!("anonymous session");
                } else {
                    println!("kakao user {}", identity.kakao_id.unwrap_or(0));
                }
            }
            Err(err) => print_error(&err),
        },
        _ => println!("unknown command: /{command}"),
    }
}

async fn send_and_print(
    client: &matehub_api::ApiClient,
    controller: &ChatSessionController,
    text: &str,
) {
    // The terminal transcript is always "at the bottom".
    match controller.send(text, true).await {
        Ok(SendOutcome::Delivered { reply, .. }) => print_message(&reply),
        Ok(SendOutcome::Superseded) => {}
        Err(MatehubError::AuthExpired) => {
            // Anonymous sessions can be re-established transparently;
            // the optimistic entry stays so the user can resend.
            debug!("session expired mid-send, re-bootstrapping");
            match client.ensure_session().await {
                Ok(()) => println!("{}", "Session renewed. Please resend your message.".yellow()),
                Err(err) => print_error(&err),
            }
        }
        Err(err) => print_error(&err),
    }
}

fn print_transcript(messages: &[ChatMessage]) {
    for message in messages {
        print_message(message);
    }
}

fn print_message(message: &ChatMessage) {
    let label = match message.direction {
        Direction::Sent => "you".cyan(),
        Direction::Received => "mate".green(),
    };
    println!("{}: {}", label, message.content);
}

fn print_error(err: &MatehubError) {
    debug!(error = %err, "shell operation failed");
    eprintln!("{} {}", "!".red().bold(), err.user_message());
}
