//! Sorted, read-only channel map built from a scan listing.

use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, trace, warn};

use crate::error::{ChannelParseError, ScanError};
use crate::parser::{classify_line, LineKind};
use crate::types::{BroadcastId, Program, VirtualChannel};

/// Channel map parsed from `hdhomerun_config scan` output.
///
/// Programs are kept sorted by channel. Ties keep their order from the file,
/// and [`lookup`](Self::lookup) returns the first of them.
#[derive(Debug, Clone, Default)]
pub struct ScanCatalog {
    programs: Vec<Program>,
}

impl ScanCatalog {
    /// Parse a scan listing held in memory.
    pub fn parse(text: &str) -> Result<Self, ScanError> {
        let mut builder = CatalogBuilder::new();
        for line in text.lines() {
            builder.feed(line)?;
        }
        Ok(builder.finish())
    }

    /// Read and parse a scan listing from disk.
    ///
    /// Program names are not required to be UTF-8; invalid bytes are
    /// replaced with U+FFFD.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ScanError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read scan file {:?} ({} bytes)", path, bytes.len());
        Self::parse(&String::from_utf8_lossy(&bytes))
    }

    /// Find the program carrying `channel`.
    pub fn lookup(&self, channel: &VirtualChannel) -> Option<&Program> {
        self.programs.iter().find(|p| &p.channel == channel)
    }

    /// Parse `channel` (e.g. `"11.40"`) and look it up.
    pub fn lookup_str(&self, channel: &str) -> Result<Option<&Program>, ChannelParseError> {
        let channel: VirtualChannel = channel.parse()?;
        Ok(self.lookup(&channel))
    }

    /// All programs in channel order.
    pub fn list(&self) -> &[Program] {
        &self.programs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Program> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Distinct broadcasts referenced by the catalog, ascending.
    pub fn broadcasts(&self) -> Vec<BroadcastId> {
        self.programs
            .iter()
            .map(|p| p.broadcast_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<'a> IntoIterator for &'a ScanCatalog {
    type Item = &'a Program;
    type IntoIter = std::slice::Iter<'a, Program>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Line-by-line catalog construction.
///
/// The only state carried between lines is the broadcast announced by the
/// most recent `us-bcast:` marker.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    broadcast: Option<BroadcastId>,
    line_no: usize,
    programs: Vec<Program>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the next line of the listing.
    pub fn feed(&mut self, line: &str) -> Result<(), ScanError> {
        self.line_no += 1;

        match classify_line(line) {
            LineKind::Broadcast(id) => {
                trace!("line {}: broadcast {}", self.line_no, id);
                self.broadcast = Some(id);
            }
            LineKind::Program {
                program_id,
                channel,
                name,
            } => {
                let broadcast_id = self
                    .broadcast
                    .ok_or(ScanError::OrphanProgram { line: self.line_no })?;
                trace!(
                    "line {}: program {} on {} (broadcast {})",
                    self.line_no,
                    program_id,
                    channel,
                    broadcast_id
                );
                self.programs.push(Program {
                    program_id,
                    name: name.to_string(),
                    channel,
                    broadcast_id,
                });
            }
            LineKind::Other => {}
        }

        Ok(())
    }

    /// Sort the collected programs and freeze them into a catalog.
    pub fn finish(mut self) -> ScanCatalog {
        // Vec::sort_by is stable, so duplicates keep file order.
        self.programs.sort_by(|a, b| a.channel.cmp(&b.channel));

        for pair in self.programs.windows(2) {
            if pair[0].channel == pair[1].channel {
                warn!(
                    "Duplicate channel {}: '{}' shadows '{}'",
                    pair[0].channel, pair[0].name, pair[1].name
                );
            }
        }

        debug!("Parsed {} programs from {} lines", self.programs.len(), self.line_no);
        ScanCatalog {
            programs: self.programs,
        }
    }
}
