//! Error types for atlas access.
//!
//! Missing or malformed on-disk structure is fatal and raised before any
//! computation; invalid settings are fatal configuration errors. Data
//! gaps (a point outside the model domain) are not errors here — they
//! travel as masked values.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the tide atlas.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// The model root directory does not exist.
    #[error("tide model not found at: '{}'; ensure the model is downloaded to this location", .path.display())]
    MissingModel { path: PathBuf },

    /// A required region sub-directory is missing.
    #[error("tide model was not clipped correctly: missing '{}' for region {region}", .path.display())]
    MissingRegionDir { region: u32, path: PathBuf },

    /// A grid directory does not hold the expected number of files.
    #[error("tide model was not clipped correctly: '{}' holds {found} grid files, expected {expected}", .path.display())]
    WrongFileCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// Failed to read or parse a region-boundary file.
    #[error("failed to read region boundaries from '{}': {message}", .path.display())]
    RegionFile { path: PathBuf, message: String },

    /// Failed to open or read a constituent grid file.
    #[error("failed to read constituent grid '{}': {message}", .path.display())]
    GridRead { path: PathBuf, message: String },

    /// Unknown interpolation method name.
    #[error("invalid interpolation method: {0} (expected bilinear, spline, linear, or nearest)")]
    InvalidMethod(String),

    /// Filesystem error while scanning the model tree.
    #[error("I/O error under '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AtlasError {
    pub fn grid_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::GridRead {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for atlas operations.
pub type AtlasResult<T> = std::result::Result<T, AtlasError>;
