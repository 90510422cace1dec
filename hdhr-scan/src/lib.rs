//! Channel map for HDHomeRun tuners.
//!
//! This crate turns the text printed by `hdhomerun_config <id> scan` into a
//! sorted, queryable list of programs. Each program remembers the broadcast
//! (RF multiplex) it was found on, which is what the tuner must be set to
//! before the program can be selected.
//!
//! # Example
//!
//! ```rust
//! use hdhr_scan::{ScanCatalog, VirtualChannel};
//!
//! let listing = "\
//! SCANNING: 57000000 (us-bcast:5)
//! LOCK: 8vsb (ss=87 snq=90 seq=100)
//! PROGRAM 4: 11.5 Channel Eleven Two
//! PROGRAM 3: 11.4 Channel Eleven
//! ";
//!
//! let catalog = ScanCatalog::parse(listing).unwrap();
//! let wanted: VirtualChannel = "11.40".parse().unwrap();
//! let program = catalog.lookup(&wanted).unwrap();
//! assert_eq!(program.program_id, 3);
//! assert_eq!(program.broadcast_id, 5);
//! assert_eq!(catalog.list()[0].channel.to_string(), "11.4");
//! ```

pub mod catalog;
pub mod error;
pub mod parser;
pub mod types;

pub use catalog::{CatalogBuilder, ScanCatalog};
pub use error::{ChannelParseError, ScanError};
pub use parser::{classify_line, LineKind};
pub use types::{BroadcastId, Program, VirtualChannel};
