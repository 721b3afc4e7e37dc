//! Spinners and progress bars with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start spinning with a message (plain line in CI)
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}

/// Progress bar for precaching the offline manifest
///
/// Shows an indicatif bar in interactive mode, one line per asset in CI.
pub struct InstallProgress {
    bar: Option<ProgressBar>,
}

impl InstallProgress {
    pub fn new(ctx: &UiContext, generation: &str, total: u64) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total);
            // Template is a literal; a parse failure falls back to the default bar
            if let Ok(bar_style) = ProgressStyle::default_bar().template(
                "  {spinner:.magenta} Caching {prefix}  {bar:20.magenta/dim} {pos}/{len} {msg:.dim}",
            ) {
                bar.set_style(bar_style.progress_chars("━╸─"));
            }
            bar.set_prefix(generation.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Caching {} asset(s) into {}...", total, generation);
            None
        };
        Self { bar }
    }

    /// Record one downloaded asset
    pub fn on_asset(&self, url: &str) {
        match self.bar {
            Some(ref bar) => {
                bar.inc(1);
                bar.set_message(short_url(url).to_string());
            }
            None => println!("  fetched {}", url),
        }
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

/// Last path segment of a URL, or the URL itself for a directory
fn short_url(url: &str) -> &str {
    match url.trim_end_matches('/').rsplit_once('/') {
        Some((_, last)) if !url.ends_with('/') && !last.is_empty() => last,
        _ => url,
    }
}
