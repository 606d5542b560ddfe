// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `matehub history` command implementation.
//!
//! Fetches up to `pages` pages of history for a story, newest page
//! first, and prints them in chronological order.

use colored::Colorize;
use matehub_config::MatehubConfig;
use matehub_core::{ChatMessage, Direction, MatehubError};

/// Prints conversation history for one story.
pub async fn run(config: &MatehubConfig, story: i64, pages: u32) -> Result<(), MatehubError> {
    let client = crate::connect(config).await?;

    let mut collected: Vec<ChatMessage> = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..pages.max(1) {
        let page = client
            .chat_history(story, config.chat.page_size, cursor.as_deref())
            .await?;
        // Older pages go in front so the transcript stays chronological.
        let mut merged = page.messages;
        merged.append(&mut collected);
        collected = merged;

        cursor = page.next_cursor;
        if !page.has_more || cursor.is_none() || !config.chat.pagination {
            break;
        }
    }

    if collected.is_empty() {
        println!("no messages in story {story}.");
        return Ok(());
    }

    for message in &collected {
        let label = match message.direction {
            Direction::Sent => "you".cyan(),
            Direction::Received => "mate".green(),
        };
        println!(
            "{} {}: {}",
            message
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed(),
            label,
            message.content
        );
    }
    Ok(())
}
