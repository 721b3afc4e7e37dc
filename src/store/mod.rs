//! Local photo store
//!
//! Durable, append-only storage of captured stills. Records are inserted or
//! bulk-deleted, never updated.

mod backend;
mod library;
mod record;

pub use backend::{FileRecordStore, MemoryRecordStore, RecordStore};
pub use library::{system_clock, Clock, PhotoLibrary};
pub use record::PhotoRecord;
