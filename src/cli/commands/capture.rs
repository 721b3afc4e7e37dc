//! Capture command - take one photo

use crate::camera::{create_camera, CaptureSession};
use crate::cli::args::CaptureArgs;
use crate::cli::commands::{download_dir, open_library};
use crate::config::{Config, DataPaths};
use crate::download::save_photo;
use crate::error::CamaraResult;
use crate::studio::Studio;
use crate::ui::{self, TaskSpinner, UiContext};
use chrono::Utc;

/// Execute the capture command
pub async fn execute(args: CaptureArgs, config: &Config, paths: &DataPaths) -> CamaraResult<()> {
    let ctx = UiContext::detect();
    let facing = args.facing.unwrap_or(config.camera.facing);

    let device = create_camera(&config.camera, args.source.as_deref());
    let session = CaptureSession::new(device)
        .with_ideal_size(config.camera.ideal_width, config.camera.ideal_height);
    let studio = Studio::new(session, open_library(paths).await?);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!(
        "Opening {} camera ({})...",
        facing,
        studio.device_name().await
    ));

    let record = match studio.take_photo(facing).await {
        Ok(record) => record,
        Err(e) => {
            spinner.stop_error("Capture failed");
            return Err(e);
        }
    };
    spinner.stop(&format!("Photo {} captured", record.id));

    let image = record.decode()?;
    let gallery = studio.gallery().await;
    ui::key_value(&ctx, "Size", &format!("{}x{}", image.width(), image.height()));
    ui::key_value(&ctx, "Encoded", &format!("{} bytes", record.payload_len()));
    if let Some(taken) = record.created_at() {
        ui::key_value(&ctx, "Taken", &taken.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string());
    }
    ui::key_value(&ctx, "Gallery", &format!("{} photo(s)", gallery.len()));

    if args.download {
        let dir = download_dir(args.output, config);
        let path = save_photo(&record, &dir, Utc::now()).await?;
        ui::step_ok_detail(&ctx, "Saved", &path.display().to_string());
    }

    Ok(())
}
