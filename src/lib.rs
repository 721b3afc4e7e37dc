//! Camara - offline-first camera and photo gallery
//!
//! Captures lossless stills from a camera feed, keeps them in a durable
//! local gallery and serves the application shell from a versioned offline
//! cache.

pub mod camera;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod gallery;
pub mod offline;
pub mod store;
pub mod studio;
pub mod ui;

pub use error::{CamaraError, CamaraResult};
