//! Error types for scan listing parsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a [`ScanCatalog`](crate::ScanCatalog).
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan file could not be opened or read.
    #[error("Failed to read scan file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A `PROGRAM` line was found before any `us-bcast:` marker, so it has
    /// no broadcast to ride on.
    #[error("Program on line {line} appears before any us-bcast marker")]
    OrphanProgram { line: usize },
}

/// A channel number that is not a `major.minor` decimal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid channel number: {0:?}")]
pub struct ChannelParseError(pub String);
