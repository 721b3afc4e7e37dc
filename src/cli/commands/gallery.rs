//! Gallery command - browse or clear stored photos

use crate::cli::args::{GalleryAction, GalleryArgs, OutputFormat};
use crate::cli::commands::open_library;
use crate::config::DataPaths;
use crate::error::{CamaraError, CamaraResult};
use crate::gallery::Gallery;
use crate::store::PhotoRecord;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// Execute the gallery command
pub async fn execute(args: GalleryArgs, paths: &DataPaths) -> CamaraResult<()> {
    let mut gallery = Gallery::new(open_library(paths).await?);
    gallery.reload().await?;

    match args.action {
        GalleryAction::List { format } => list_photos(&gallery, format),
        GalleryAction::Show { id, index, back } => show_photo(&mut gallery, id, index, back),
        GalleryAction::Clear { yes } => clear_photos(&mut gallery, yes).await,
    }
}

fn taken(record: &PhotoRecord) -> String {
    record
        .created_at()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn list_photos(gallery: &Gallery, format: OutputFormat) -> CamaraResult<()> {
    match format {
        OutputFormat::Table => print_photo_table(gallery.records()),
        OutputFormat::Json => print_photo_json(gallery.records())?,
        OutputFormat::Plain => print_photo_plain(gallery.records()),
    }
    Ok(())
}

fn print_photo_table(records: &[PhotoRecord]) {
    if records.is_empty() {
        println!("No photos yet.");
        return;
    }

    println!("{:<6} {:<16} {:<20} {:>10}", "#", "ID", "TAKEN", "BYTES");
    println!("{}", "-".repeat(55));

    for (index, record) in records.iter().enumerate() {
        println!(
            "{:<6} {:<16} {:<20} {:>10}",
            index + 1,
            record.id,
            taken(record),
            record.payload_len()
        );
    }

    println!();
    println!("Total: {} photo(s)", records.len());
}

fn print_photo_json(records: &[PhotoRecord]) -> CamaraResult<()> {
    #[derive(Serialize)]
    struct PhotoJson {
        id: i64,
        taken: Option<String>,
        bytes: usize,
    }

    let photos: Vec<PhotoJson> = records
        .iter()
        .map(|r| PhotoJson {
            id: r.id,
            taken: r.created_at().map(|t| t.to_rfc3339()),
            bytes: r.payload_len(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&photos)?);
    Ok(())
}

fn print_photo_plain(records: &[PhotoRecord]) {
    for record in records {
        println!("{}", record.id);
    }
}

fn show_photo(
    gallery: &mut Gallery,
    id: Option<i64>,
    index: Option<usize>,
    back: Option<usize>,
) -> CamaraResult<()> {
    if gallery.is_empty() {
        return Err(CamaraError::NoPhotos);
    }

    if let Some(id) = id {
        if !gallery.select(id) {
            return Err(CamaraError::PhotoNotFound(id));
        }
    } else if let Some(index) = index {
        if index == 0 || !gallery.select_index(index - 1) {
            return Err(CamaraError::User(format!(
                "Index {} out of range (1-{})",
                index,
                gallery.len()
            )));
        }
    } else if let Some(steps) = back {
        for _ in 0..steps {
            gallery.prev();
        }
    }

    let record = gallery.current().ok_or(CamaraError::NoPhotos)?;
    let position = gallery.position().map(|p| p + 1).unwrap_or(0);
    let image = record.decode()?;

    let mut marker = String::new();
    if gallery.at_start() {
        marker.push_str(" oldest");
    }
    if gallery.at_end() {
        marker.push_str(" newest");
    }

    let ctx = UiContext::detect();
    println!(
        "[{}/{}]{}",
        position,
        gallery.len(),
        style(marker).dim()
    );
    ui::key_value(&ctx, "Id", &record.id.to_string());
    ui::key_value(&ctx, "Taken", &taken(record));
    ui::key_value(&ctx, "Size", &format!("{}x{}", image.width(), image.height()));
    ui::key_value(&ctx, "Encoded", &format!("{} bytes", record.payload_len()));

    Ok(())
}

async fn clear_photos(gallery: &mut Gallery, yes: bool) -> CamaraResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);

    if gallery.is_empty() {
        println!("Gallery is already empty.");
        return Ok(());
    }

    let count = gallery.len();
    let confirmed = ui::confirm(
        &ctx,
        &format!("Delete all {} photo(s)? This cannot be undone", count),
        false,
    )
    .await?;

    if !confirmed {
        println!("Aborted.");
        return Ok(());
    }

    gallery.clear().await?;
    ui::step_ok(&ctx, &format!("Deleted {} photo(s)", count));
    Ok(())
}
