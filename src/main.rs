//! Camara - offline-first camera and photo gallery
//!
//! CLI entry point that dispatches to subcommands.

use camara::cli::{commands, Cli, Commands};
use camara::config::{ConfigManager, DataPaths};
use camara::error::CamaraResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CamaraResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions { shell } = cli.command {
        commands::completions(shell);
        return Ok(());
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);
    camara::ui::init_theme();
    debug!("Using config {}", config_manager.path().display());

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(ConfigManager::default_data_dir);
    let paths = DataPaths::resolve(&config, &data_dir);
    debug!(
        "Photos in {}, offline cache in {}",
        paths.photos.display(),
        paths.offline.display()
    );

    match cli.command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Capture(args) => commands::capture(args, &config, &paths).await,
        Commands::Gallery(args) => commands::gallery(args, &paths).await,
        Commands::Download(args) => commands::download(args, &config, &paths).await,
        Commands::Cache(args) => commands::cache(args, &config, &paths).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `RUST_LOG` wins when set
fn init_logging(verbose: u8, log_format: &str) {
    let default_filter = match verbose {
        0 => "camara=warn",
        1 => "camara=info",
        _ => "camara=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr so command output can be piped
    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}
