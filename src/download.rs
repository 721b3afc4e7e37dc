//! Saving photos as PNG files

use crate::error::{CamaraError, CamaraResult};
use crate::store::PhotoRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// File name for a download made at `now`
///
/// `foto-<ISO-8601 UTC with milliseconds>.png` with `:` and `.` replaced by
/// `-`, e.g. `foto-2026-10-16T12-34-56-789Z.png`.
pub fn download_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("foto-{stamp}.png")
}

/// Write the photo's PNG into `dir` and return the file path
pub async fn save_photo(
    record: &PhotoRecord,
    dir: &Path,
    now: DateTime<Utc>,
) -> CamaraResult<PathBuf> {
    let png = record.png_bytes()?;

    fs::create_dir_all(dir)
        .await
        .map_err(|e| CamaraError::io(format!("creating {}", dir.display()), e))?;

    let path = dir.join(download_filename(now));
    fs::write(&path, &png)
        .await
        .map_err(|e| CamaraError::io(format!("writing {}", path.display()), e))?;

    info!(
        "Saved photo {} to {} ({} bytes)",
        record.id,
        path.display(),
        png.len()
    );
    Ok(path)
}
