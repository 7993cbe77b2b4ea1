//! Error types for catalog decoding, synchronization, and persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding the binary shortcuts container.
///
/// Decode errors are fatal for the whole parse: the format has no recovery
/// point, so partial results are always discarded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream contained a type tag outside the known record set.
    #[error("unknown record type tag 0x{0:02x}")]
    UnknownRecordType(u8),

    /// The stream ended before an expected field or end marker.
    #[error("truncated stream: unexpected end of input")]
    Truncated,

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the catalog document store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document exists but could not be parsed back into a catalog.
    #[error("corrupt catalog document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading an NFO metadata side-file.
///
/// Metadata errors never abort a sync; the affected entry proceeds without
/// the overlay.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("malformed NFO {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("failed to read NFO {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a catalog synchronization run.
///
/// A fatal sync error leaves the previously persisted catalog untouched.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The remote ownership API response violated its contract.
    #[error("invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    /// A configured file does not exist.
    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    /// A configured directory does not exist.
    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// A setting required by this sync is absent or empty.
    #[error("configuration error: {0}")]
    Config(String),

    /// The caller cancelled the sync before it completed.
    #[error("sync cancelled")]
    Cancelled,

    /// Another sync of the same catalog kind is already in flight.
    #[error("a sync for the {0} catalog is already running")]
    AlreadyRunning(&'static str),

    #[error("request to ownership API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
