//! Download command - save a stored photo as PNG

use crate::cli::args::DownloadArgs;
use crate::cli::commands::{download_dir, open_library};
use crate::config::{Config, DataPaths};
use crate::download::save_photo;
use crate::error::{CamaraError, CamaraResult};
use crate::ui::{self, UiContext};
use chrono::Utc;

/// Execute the download command
pub async fn execute(args: DownloadArgs, config: &Config, paths: &DataPaths) -> CamaraResult<()> {
    let ctx = UiContext::detect();
    let library = open_library(paths).await?;

    let record = match args.id {
        Some(id) => library.get(id).await?,
        None => library
            .list_all()
            .await?
            .pop()
            .ok_or(CamaraError::NoPhotos)?,
    };

    let dir = download_dir(args.output, config);
    let path = save_photo(&record, &dir, Utc::now()).await?;
    ui::step_ok_detail(
        &ctx,
        &format!("Saved photo {}", record.id),
        &path.display().to_string(),
    );

    Ok(())
}
