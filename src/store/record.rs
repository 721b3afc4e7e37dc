//! Photo record persisted by the store

use crate::camera::raster::{decode_data_url, png_from_data_url};
use crate::camera::Still;
use crate::error::CamaraResult;
use chrono::{DateTime, TimeZone, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// One captured photo
///
/// `id` is the creation timestamp in Unix milliseconds. It is assigned once
/// at insertion; records are never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Creation timestamp, unique within the store
    pub id: i64,

    /// PNG payload as `data:image/png;base64,...`
    pub image: String,
}

impl PhotoRecord {
    /// Build a record from a still
    pub fn from_still(id: i64, still: &Still) -> Self {
        Self {
            id,
            image: still.data_url.clone(),
        }
    }

    /// Creation time derived from the id
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.id).single()
    }

    /// Raw PNG bytes of the payload
    pub fn png_bytes(&self) -> CamaraResult<Vec<u8>> {
        png_from_data_url(&self.image)
    }

    /// Decoded pixels of the payload
    pub fn decode(&self) -> CamaraResult<RgbaImage> {
        decode_data_url(&self.image)
    }

    /// Encoded payload size in bytes
    pub fn payload_len(&self) -> usize {
        self.image.len()
    }
}
