//! Line classifier for `hdhomerun_config scan` output.
//!
//! A scan listing looks like this:
//!
//! ```text
//! SCANNING: 57000000 (us-bcast:2)
//! LOCK: 8vsb (ss=100 snq=79 seq=100)
//! TSID: 0x0641
//! PROGRAM 3: 2.1 KTVU-HD
//! PROGRAM 4: 2.2 KTVU-SD
//! ```
//!
//! Only two shapes matter. A line containing `us-bcast:<digits>` starts a new
//! broadcast, and a line containing `PROGRAM <digits>: <digits>.<digits> <name>`
//! defines a program on the broadcast in effect. Both may appear anywhere in the
//! line; everything else is ignored.

use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1};
use nom::combinator::{map_res, recognize, rest};
use nom::sequence::{preceded, separated_pair, tuple};
use nom::IResult;

use crate::types::{BroadcastId, VirtualChannel};

/// Classification of a single scan listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `us-bcast:<id>` marker.
    Broadcast(BroadcastId),
    /// `PROGRAM <id>: <channel> <name>` entry.
    Program {
        program_id: u32,
        channel: VirtualChannel,
        name: &'a str,
    },
    /// Anything else.
    Other,
}

/// Classify one line. A broadcast marker takes precedence over a program entry
/// on the same line.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(id) = search(line, broadcast_marker) {
        return LineKind::Broadcast(id);
    }

    match search(line, program_entry) {
        Some((program_id, channel, name)) => LineKind::Program {
            program_id,
            channel,
            name,
        },
        None => LineKind::Other,
    }
}

/// Run `parser` at every char boundary of `line` and return the leftmost match.
fn search<'a, O>(line: &'a str, mut parser: impl FnMut(&'a str) -> IResult<&'a str, O>) -> Option<O> {
    line.char_indices()
        .find_map(|(offset, _)| parser(&line[offset..]).ok().map(|(_, out)| out))
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

fn broadcast_marker(input: &str) -> IResult<&str, BroadcastId> {
    preceded(tag("us-bcast:"), number)(input)
}

fn channel_number(input: &str) -> IResult<&str, VirtualChannel> {
    map_res(
        recognize(separated_pair(digit1, char('.'), digit1)),
        str::parse::<VirtualChannel>,
    )(input)
}

fn program_entry(input: &str) -> IResult<&str, (u32, VirtualChannel, &str)> {
    let (input, (_, program_id, _, channel, _, name)) = tuple((
        tag("PROGRAM "),
        number,
        tag(": "),
        channel_number,
        char(' '),
        rest,
    ))(input)?;
    Ok((input, (program_id, channel, name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_marker_anywhere() {
        assert_eq!(
            classify_line("SCANNING: 57000000 (us-bcast:2)"),
            LineKind::Broadcast(2)
        );
        assert_eq!(classify_line("us-bcast:51"), LineKind::Broadcast(51));
    }

    #[test]
    fn test_program_entry() {
        match classify_line("PROGRAM 3: 11.4 Channel Eleven") {
            LineKind::Program {
                program_id,
                channel,
                name,
            } => {
                assert_eq!(program_id, 3);
                assert_eq!(channel, "11.4".parse().unwrap());
                assert_eq!(name, "Channel Eleven");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_program_entry_with_prefix_and_empty_name() {
        match classify_line("  >> PROGRAM 10: 2.10 ") {
            LineKind::Program { program_id, name, .. } => {
                assert_eq!(program_id, 10);
                assert_eq!(name, "");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_marker_wins_over_program() {
        assert_eq!(
            classify_line("us-bcast:7 PROGRAM 1: 3.1 Mixed"),
            LineKind::Broadcast(7)
        );
    }

    #[test]
    fn test_other_lines() {
        for line in [
            "LOCK: 8vsb (ss=100 snq=79 seq=100)",
            "TSID: 0x0641",
            "PROGRAM 5: 0 (control)",
            "PROGRAM 3: 11.4",
            "us-bcast:",
            "",
        ] {
            assert_eq!(classify_line(line), LineKind::Other, "line {:?}", line);
        }
    }

    #[test]
    fn test_overflowing_numbers_are_ignored() {
        assert_eq!(classify_line("us-bcast:99999999999"), LineKind::Other);
        assert_eq!(
            classify_line("PROGRAM 99999999999: 2.1 Too Big"),
            LineKind::Other
        );
    }
}
