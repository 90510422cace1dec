//! Interactive command loop.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use colored::Colorize;
use log::{debug, error};
use thiserror::Error;

use crate::device::DeviceControl;
use crate::session::TunerSession;

pub const PROMPT: &str = "HDHR> ";

const HELP: &str = "
   list        - lists channels (cached)
   t <target>  - changes target IP for video
   ch <chan>   - changes to XX.YY channel
   prev        - previous channel
   status      - status

   help        - help
   q           - quits";

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Target(String),
    Channel(String),
    Previous,
    Status,
    Help,
    Quit,
    Empty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("bad input")]
    MissingArgument,

    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::Empty);
        };
        let mut argument = || {
            words
                .next()
                .map(str::to_string)
                .ok_or(CommandError::MissingArgument)
        };

        match verb {
            "list" => Ok(Command::List),
            "t" => Ok(Command::Target(argument()?)),
            "ch" => Ok(Command::Channel(argument()?)),
            "prev" | "p" => Ok(Command::Previous),
            "status" | "s" => Ok(Command::Status),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one command against the session, printing its result to `out`.
///
/// Session errors are printed and do not stop the loop; only I/O errors on
/// `out` are returned.
pub fn execute<D: DeviceControl, W: Write>(
    session: &mut TunerSession<D>,
    command: Command,
    out: &mut W,
) -> io::Result<Flow> {
    debug!("Executing {:?}", command);

    match command {
        Command::Empty => {}
        Command::List => {
            let catalog = session.catalog();
            for program in catalog {
                writeln!(out, "Prog: {}", program)?;
            }
            writeln!(
                out,
                "Total {} programs on {} broadcasts",
                catalog.len(),
                catalog.broadcasts().len()
            )?;
        }
        Command::Target(target) => set_target(session, &target, out)?,
        Command::Channel(channel) => match session.change_channel_str(&channel) {
            Ok(outcome) => writeln!(out, "Changed to {}", outcome.channel.to_string().bold())?,
            Err(e) => report(out, &e)?,
        },
        Command::Previous => match session.previous_channel_recall() {
            Ok(Some(outcome)) => writeln!(out, "Changed to {}", outcome.channel.to_string().bold())?,
            Ok(None) => {}
            Err(e) => report(out, &e)?,
        },
        Command::Status => match session.status() {
            Ok(status) => writeln!(out, "{}", status)?,
            Err(e) => report(out, &e)?,
        },
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

/// Read commands from `input` until `quit` or end of input.
///
/// Lines that are not valid UTF-8 are decoded lossily. With `release_on_exit`
/// the tuner target is reset to `none` afterwards so the device stops
/// streaming, even when reading or writing failed.
pub fn run_interactive<D, R, W>(
    session: &mut TunerSession<D>,
    input: R,
    out: &mut W,
    release_on_exit: bool,
) -> io::Result<()>
where
    D: DeviceControl,
    R: BufRead,
    W: Write,
{
    let result = read_commands(session, input, out);

    if release_on_exit {
        match &result {
            Ok(()) => set_target(session, crate::device::UNSET_TARGET, out)?,
            Err(_) => {
                if let Err(e) = session.release() {
                    error!("{}", e);
                }
            }
        }
    }
    result
}

fn read_commands<D, R, W>(session: &mut TunerSession<D>, mut input: R, out: &mut W) -> io::Result<()>
where
    D: DeviceControl,
    R: BufRead,
    W: Write,
{
    let mut buf = Vec::new();
    loop {
        write!(out, "{}", PROMPT.bold())?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(out)?;
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);

        match line.parse::<Command>() {
            Ok(command) => {
                if execute(session, command, out)? == Flow::Quit {
                    return Ok(());
                }
            }
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        }
    }
}

fn set_target<D: DeviceControl, W: Write>(
    session: &mut TunerSession<D>,
    target: &str,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Setting target to '{}'", target)?;
    if let Err(e) = session.set_target(target) {
        report(out, &e)?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, err: &dyn std::error::Error) -> io::Result<()> {
    error!("{}", err);
    writeln!(out, "{}", err.to_string().red())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{session_with, RecordingDevice};
    use crate::session::SessionPolicy;

    fn run(input: &str, release: bool) -> (String, TunerSession<RecordingDevice>) {
        run_bytes(input.as_bytes(), release)
    }

    fn run_bytes(input: &[u8], release: bool) -> (String, TunerSession<RecordingDevice>) {
        colored::control::set_override(false);
        let mut session = session_with(SessionPolicy::default());
        let mut out = Vec::new();
        run_interactive(&mut session, input, &mut out, release).unwrap();
        (String::from_utf8(out).unwrap(), session)
    }

    /// A reader that yields one line and then fails.
    struct BrokenInput(Option<&'static [u8]>);

    impl io::Read for BrokenInput {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            unreachable!("read through BufRead")
        }
    }

    impl BufRead for BrokenInput {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            match self.0 {
                Some(line) => Ok(line),
                None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed")),
            }
        }

        fn consume(&mut self, _: usize) {
            self.0 = None;
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("list".parse::<Command>(), Ok(Command::List));
        assert_eq!("t 10.0.0.5".parse::<Command>(), Ok(Command::Target("10.0.0.5".into())));
        assert_eq!("  ch 11.4  extra".parse::<Command>(), Ok(Command::Channel("11.4".into())));
        assert_eq!("p".parse::<Command>(), Ok(Command::Previous));
        assert_eq!("prev".parse::<Command>(), Ok(Command::Previous));
        assert_eq!("s".parse::<Command>(), Ok(Command::Status));
        assert_eq!("?".parse::<Command>(), Ok(Command::Help));
        assert_eq!("q\n".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("   ".parse::<Command>(), Ok(Command::Empty));
    }

    #[test]
    fn test_parse_command_errors() {
        assert_eq!("t".parse::<Command>(), Err(CommandError::MissingArgument));
        assert_eq!("ch".parse::<Command>(), Err(CommandError::MissingArgument));
        assert_eq!(
            "tune 5".parse::<Command>(),
            Err(CommandError::Unknown("tune".into()))
        );
    }

    #[test]
    fn test_list_output() {
        let (out, _) = run("list\nq\n", false);
        assert!(out.contains("Prog: <10.1 @10 (# 1): Ten>"));
        assert!(out.contains("Prog: <11.4 @ 5 (# 3): Channel Eleven>"));
        assert!(out.contains("Total 3 programs on 2 broadcasts"));
        let first = out.find("10.1").unwrap();
        let second = out.find("11.4").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_channel_requires_target() {
        let (out, session) = run("ch 11.4\nq\n", false);
        assert!(out.contains("No target set."));
        assert!(session.current_channel().is_none());
    }

    #[test]
    fn test_session_flow_and_release_on_exit() {
        let (out, session) = run("t 10.0.0.5\nch 11.4\nch 10.1\np\nch 42.1\nbogus\nt\n", true);
        assert!(out.contains("Setting target to '10.0.0.5'"));
        assert!(out.contains("Changed to 11.4"));
        assert!(out.contains("Changed to 10.1"));
        assert!(out.contains("Invalid channel 42.1"));
        assert!(out.contains("Unknown command 'bogus'"));
        assert!(out.contains("bad input"));
        assert!(out.contains("Setting target to 'none'"));
        assert_eq!(session.target(), "none");
    }

    #[test]
    fn test_quit_without_release_keeps_target() {
        let (out, session) = run("t 10.0.0.5\nquit\nch 11.4\n", false);
        assert_eq!(session.target(), "10.0.0.5");
        assert!(!out.contains("Changed to"));
    }

    #[test]
    fn test_help() {
        let (out, _) = run("help\n", false);
        assert!(out.contains("ch <chan>   - changes to XX.YY channel"));
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_loop() {
        let (out, session) = run_bytes(b"t 10.0.0.5\nch 11.4\n\xff\nstatus\nq\n", true);
        assert!(out.contains("Changed to 11.4"));
        assert!(out.contains("Unknown command '\u{fffd}'"));
        assert!(out.contains("/tuner0/status"));
        assert!(out.contains("Setting target to 'none'"));
        assert_eq!(session.target(), "none");
    }

    #[test]
    fn test_read_error_still_releases() {
        colored::control::set_override(false);
        let mut session = session_with(SessionPolicy::default());
        let mut out = Vec::new();
        let input = BrokenInput(Some(b"t 10.0.0.5\n"));
        let err = run_interactive(&mut session, input, &mut out, true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(session.target(), "none");
    }
}
