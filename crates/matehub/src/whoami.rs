// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `matehub whoami` command implementation.

use colored::Colorize;
use matehub_config::MatehubConfig;
use matehub_core::MatehubError;

/// Prints the current session's identity.
pub async fn run(config: &MatehubConfig) -> Result<(), MatehubError> {
    let client = crate::connect(config).await?;
    let identity = client.me().await?;

    if identity.is_anonymous {
        println!("{} (anonymous session)", "matehub".green());
    } else {
        println!(
            "{} kakao user {}",
            "matehub".green(),
            identity.kakao_id.unwrap_or(0)
        );
    }
    Ok(())
}
