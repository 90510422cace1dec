//! Tuner status reply parsing.
//!
//! `get /tunerN/status` answers with a single line such as
//! `ch=8vsb:177000000 lock=8vsb ss=87 snq=90 seq=100 bps=19392658 pps=1780`.

use std::fmt;

use hdhr_scan::VirtualChannel;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{digit1, space1};
use nom::combinator::{eof, map_res};
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

/// Structured form of a status reply. Values are kept verbatim except the
/// bit rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TunerStatus {
    pub channel: String,
    pub lock: String,
    /// Signal strength.
    pub ss: String,
    /// Signal-to-noise quality.
    pub snq: String,
    /// Symbol error quality.
    pub seq: String,
    /// Raw bit rate in bits per second.
    pub bps: u64,
}

impl TunerStatus {
    /// Bit rate in megabits per second.
    pub fn mbps(&self) -> f64 {
        self.bps as f64 / 1_000_000.0
    }
}

/// A status reply, structured when it matches the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLine {
    Parsed(TunerStatus),
    Raw(String),
}

impl StatusLine {
    /// Parse the first line of a status reply, keeping it raw on mismatch.
    pub fn parse(reply: &str) -> Self {
        let line = reply.lines().next().unwrap_or("").trim();
        match status_fields(line) {
            Ok((_, status)) => StatusLine::Parsed(status),
            Err(_) => StatusLine::Raw(line.to_string()),
        }
    }
}

fn field<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(
        tuple((tag(name), tag("="))),
        take_till1(|c: char| c.is_whitespace()),
    )
}

fn status_fields(input: &str) -> IResult<&str, TunerStatus> {
    let (input, (channel, _, lock, _, ss, _, snq, _, seq, _, bps)) = tuple((
        field("ch"),
        space1,
        field("lock"),
        space1,
        field("ss"),
        space1,
        field("snq"),
        space1,
        field("seq"),
        space1,
        terminated(
            preceded(tag("bps="), map_res(digit1, str::parse::<u64>)),
            alt((space1, eof)),
        ),
    ))(input)?;

    Ok((
        input,
        TunerStatus {
            channel: channel.to_string(),
            lock: lock.to_string(),
            ss: ss.to_string(),
            snq: snq.to_string(),
            seq: seq.to_string(),
            bps,
        },
    ))
}

/// Everything shown by the `status` command.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: StatusLine,
    /// Raw `streaminfo` reply, when the device answered.
    pub stream_info: Option<String>,
    pub current_channel: Option<VirtualChannel>,
    pub previous_channel: Option<VirtualChannel>,
}

struct OptChannel<'a>(&'a Option<VirtualChannel>);

impl fmt::Display for OptChannel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ch) => write!(f, "{}", ch),
            None => f.write_str("None"),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(info) = &self.stream_info {
            writeln!(f, "{}", info)?;
        }
        match &self.status {
            StatusLine::Parsed(s) => writeln!(
                f,
                "ch={} lock={} ss={} snq={} seq={} rate={:.3} Mbps",
                s.channel,
                s.lock,
                s.ss,
                s.snq,
                s.seq,
                s.mbps()
            )?,
            StatusLine::Raw(line) => writeln!(f, "{}", line)?,
        }
        writeln!(f, "Channel .. {}", OptChannel(&self.current_channel))?;
        write!(f, "PrevCh ... {}", OptChannel(&self.previous_channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_line() {
        let line = StatusLine::parse("ch=11.4 lock=8vsb ss=87 snq=90 seq=100 bps=19392658");
        let StatusLine::Parsed(s) = line else {
            panic!("status did not parse");
        };
        assert_eq!(s.channel, "11.4");
        assert_eq!(s.lock, "8vsb");
        assert_eq!(s.ss, "87");
        assert_eq!(s.snq, "90");
        assert_eq!(s.seq, "100");
        assert_eq!(s.bps, 19392658);
        assert!((s.mbps() - 19.393).abs() < 0.001);
    }

    #[test]
    fn test_parse_status_with_trailing_fields() {
        let line = StatusLine::parse("ch=8vsb:177000000 lock=8vsb ss=100 snq=100 seq=100 bps=19394080 pps=1780\n");
        match line {
            StatusLine::Parsed(s) => {
                assert_eq!(s.channel, "8vsb:177000000");
                assert_eq!(s.bps, 19394080);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_idle_tuner() {
        match StatusLine::parse("ch=none lock=none ss=0 snq=0 seq=0 bps=0 pps=0") {
            StatusLine::Parsed(s) => assert_eq!(s.mbps(), 0.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_status_kept_raw() {
        for reply in [
            "ch=11.4 lock=8vsb ss=87",
            "ch=11.4 lock=8vsb ss=87 snq=90 seq=100 bps=fast",
            "ch=11.4 lock=8vsb ss=87 snq=90 seq=100 bps=12x",
            "",
        ] {
            assert_eq!(StatusLine::parse(reply), StatusLine::Raw(reply.to_string()));
        }
    }

    #[test]
    fn test_report_display() {
        let report = StatusReport {
            status: StatusLine::parse("ch=11.4 lock=8vsb ss=87 snq=90 seq=100 bps=19392658"),
            stream_info: None,
            current_channel: Some("11.4".parse().unwrap()),
            previous_channel: None,
        };
        let text = report.to_string();
        assert!(text.contains("rate=19.393 Mbps"));
        assert!(text.contains("Channel .. 11.4"));
        assert!(text.ends_with("PrevCh ... None"));
    }
}
