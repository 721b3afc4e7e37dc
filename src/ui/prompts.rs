//! Confirmation prompt with CI fallback

use super::context::UiContext;
use crate::error::{CamaraError, CamaraResult};

/// Ask a yes/no question
///
/// Returns `true` without asking under `--yes`, and `default` when the
/// session is not interactive.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> CamaraResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on the terminal
    let message = message.to_string();
    let answer = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| CamaraError::User(format!("Prompt task failed: {}", e)))?;

    answer.map_err(|e| CamaraError::User(format!("Prompt failed: {}", e)))
}
