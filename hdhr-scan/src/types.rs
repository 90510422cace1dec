//! Channel and program records.

use std::fmt;
use std::str::FromStr;

use crate::error::ChannelParseError;

/// Identifier of the physical RF broadcast (multiplex) a program rides on,
/// as reported by the `us-bcast:<n>` scan marker.
pub type BroadcastId = u32;

/// A virtual channel number such as `11.4`.
///
/// The value is an exact decimal: the integer part plus the fractional digits
/// with trailing zeros removed. Equality and ordering are therefore numeric,
/// so `11.40 == 11.4` and `11.4 < 11.41 < 11.5`.
///
/// ```
/// use hdhr_scan::VirtualChannel;
///
/// let a: VirtualChannel = "11.40".parse().unwrap();
/// let b: VirtualChannel = "11.4".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "11.4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualChannel {
    major: u32,
    // Significant fractional digits. Lexicographic order on a digit string
    // without trailing zeros matches numeric order of the fraction.
    fraction: String,
}

impl FromStr for VirtualChannel {
    type Err = ChannelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || ChannelParseError(s.to_string());

        let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let major = if int_part.is_empty() {
            0
        } else {
            int_part.parse::<u32>().map_err(|_| invalid())?
        };

        Ok(Self {
            major,
            fraction: frac_part.trim_end_matches('0').to_string(),
        })
    }
}

impl fmt::Display for VirtualChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fraction = if self.fraction.is_empty() {
            "0"
        } else {
            self.fraction.as_str()
        };
        // Padding applies to the whole number so listings stay aligned.
        f.pad(&format!("{}.{}", self.major, fraction))
    }
}

/// One virtual channel found in a scan listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// MPEG program number, unique within its broadcast only.
    pub program_id: u32,
    /// Display name (the rest of the `PROGRAM` line).
    pub name: String,
    /// Virtual channel number, the lookup key.
    pub channel: VirtualChannel,
    /// Broadcast carrying this program.
    pub broadcast_id: BroadcastId,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{:>4} @{:>2} (#{:>2}): {}>",
            self.channel, self.broadcast_id, self.program_id, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(s: &str) -> VirtualChannel {
        s.parse().unwrap()
    }

    #[test]
    fn test_channel_numeric_equality() {
        assert_eq!(ch("11.40"), ch("11.4"));
        assert_eq!(ch("11.0"), ch("11"));
        assert_eq!(ch("11."), ch("11"));
        assert_eq!(ch(".5"), ch("0.5"));
        assert_ne!(ch("11.4"), ch("11.41"));
    }

    #[test]
    fn test_channel_ordering() {
        let mut chans = vec![ch("11.5"), ch("2.1"), ch("11.41"), ch("11.4"), ch("11.10")];
        chans.sort();
        let shown: Vec<String> = chans.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["2.1", "11.1", "11.4", "11.41", "11.5"]);
    }

    #[test]
    fn test_channel_rejects_garbage() {
        for bad in ["", ".", "abc", "11.x", "-1.2", "1.2.3", "99999999999.1"] {
            assert!(bad.parse::<VirtualChannel>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(ch("7").to_string(), "7.0");
        assert_eq!(format!("{:>6}", ch("2.1")), "   2.1");
    }

    #[test]
    fn test_program_display() {
        let p = Program {
            program_id: 3,
            name: "Channel Eleven".to_string(),
            channel: ch("11.4"),
            broadcast_id: 5,
        };
        assert_eq!(p.to_string(), "<11.4 @ 5 (# 3): Channel Eleven>");
    }
}
