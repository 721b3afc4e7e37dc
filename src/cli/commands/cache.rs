//! Cache command - manage the offline cache

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::commands::open_proxy;
use crate::config::{Config, DataPaths};
use crate::error::{CamaraError, CamaraResult};
use crate::offline::{Destination, OfflineProxy, ProxyStatus, ResourceRequest};
use crate::ui::{self, InstallProgress, UiContext};
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::fs;
use url::Url;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, paths: &DataPaths) -> CamaraResult<()> {
    let mut proxy = open_proxy(config, paths).await?;

    match args.action {
        CacheAction::Install => install(&mut proxy).await,
        CacheAction::Activate => activate(&mut proxy).await,
        CacheAction::Status { format } => show_status(&proxy, format).await,
        CacheAction::Fetch {
            path,
            method,
            data,
            document,
            output,
        } => fetch(&proxy, &path, &method, data, document, output).await,
        CacheAction::Clear { yes } => clear(&mut proxy, yes).await,
    }
}

async fn install(proxy: &mut OfflineProxy) -> CamaraResult<()> {
    let ctx = UiContext::detect();
    let generation = proxy.settings().generation.clone();
    let total = proxy.settings().assets.len() as u64;

    let progress = InstallProgress::new(&ctx, &generation, total);
    let result = proxy
        .install_with_progress(&|url: &str| progress.on_asset(url))
        .await;
    progress.finish();

    let count = result?;
    ui::step_ok_detail(
        &ctx,
        &format!("Installed {} asset(s)", count),
        &generation,
    );
    ui::remark(&ctx, "Run: camara cache activate");
    Ok(())
}

async fn activate(proxy: &mut OfflineProxy) -> CamaraResult<()> {
    let ctx = UiContext::detect();
    let purged = proxy.activate().await?;

    for name in &purged {
        ui::step_info(&ctx, &format!("Purged generation {}", name));
    }
    ui::step_ok(
        &ctx,
        &format!(
            "Generation {} is now serving requests",
            proxy.settings().generation
        ),
    );
    Ok(())
}

async fn show_status(proxy: &OfflineProxy, format: OutputFormat) -> CamaraResult<()> {
    let status = proxy.status().await?;

    match format {
        OutputFormat::Table => print_status_table(&status),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Plain => {
            for name in &status.generations {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn print_status_table(status: &ProxyStatus) {
    let ctx = UiContext::detect();
    ui::key_value(&ctx, "Origin", &status.origin);
    ui::key_value(&ctx, "Generation", &status.generation);
    ui::key_value_status(&ctx, "State", &status.state.to_string(), status.controlling);
    ui::key_value(&ctx, "Entries", &status.entries.to_string());

    println!();
    if status.generations.is_empty() {
        println!("No cache generations.");
        return;
    }

    println!("{:<30} {:<10}", "GENERATION", "CURRENT");
    println!("{}", "-".repeat(40));
    for name in &status.generations {
        let current = if *name == status.generation {
            style("yes").green().to_string()
        } else {
            style("stale").yellow().to_string()
        };
        println!("{:<30} {:<10}", name, current);
    }
}

async fn fetch(
    proxy: &OfflineProxy,
    path: &str,
    method: &str,
    data: Option<String>,
    document: bool,
    output: Option<PathBuf>,
) -> CamaraResult<()> {
    let url = match Url::parse(path) {
        Ok(url) => url,
        Err(_) => proxy.resolve(path)?,
    };

    let mut request = ResourceRequest::new(method, url)?;
    if let Some(data) = data {
        request = request.with_body(data.into_bytes());
    }
    if document {
        request = request.with_destination(Destination::Document);
    }

    let answer = proxy.handle(&request).await?;
    eprintln!(
        "{} {} {} ({}, {}, {} bytes)",
        style(answer.response.status).bold(),
        request.method,
        request.url,
        style(answer.source).cyan(),
        answer
            .response
            .header("content-type")
            .unwrap_or("unknown type"),
        answer.response.body.len()
    );

    match output {
        Some(path) => fs::write(&path, &answer.response.body)
            .await
            .map_err(|e| CamaraError::io(format!("writing {}", path.display()), e))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&answer.response.body)
                .and_then(|_| stdout.flush())
                .map_err(|e| CamaraError::io("writing response body", e))?;
        }
    }

    Ok(())
}

async fn clear(proxy: &mut OfflineProxy, yes: bool) -> CamaraResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let status = proxy.status().await?;

    if status.generations.is_empty() {
        println!("No cache generations to clear.");
        return Ok(());
    }

    println!(
        "This will remove {} cache generation(s):",
        status.generations.len()
    );
    for name in &status.generations {
        println!("  {} {}", style("•").red(), name);
    }
    println!();

    if !ui::confirm(&ctx, "Are you sure?", false).await? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = proxy.clear().await?;
    ui::step_ok(&ctx, &format!("Cleared {} generation(s)", removed.len()));
    Ok(())
}
