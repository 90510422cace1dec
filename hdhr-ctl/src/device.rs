//! Access to the tuner through the `hdhomerun_config` utility.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use thiserror::Error;

/// Target value meaning "no receiver configured".
pub const UNSET_TARGET: &str = "none";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors from a device-control invocation.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The utility could not be started at all.
    #[error("Failed to run {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The utility did not finish in time and was killed.
    #[error("Device command timed out after {0:?}")]
    Timeout(Duration),

    /// The utility ran but reported a failure.
    #[error("Device rejected command (exit code {code:?}): {message}")]
    Rejected { code: Option<i32>, message: String },
}

/// Per-tuner attribute addressed by `get`/`set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunerAttr {
    Channel,
    Program,
    Target,
    Status,
    StreamInfo,
}

impl TunerAttr {
    fn as_str(self) -> &'static str {
        match self {
            TunerAttr::Channel => "channel",
            TunerAttr::Program => "program",
            TunerAttr::Target => "target",
            TunerAttr::Status => "status",
            TunerAttr::StreamInfo => "streaminfo",
        }
    }
}

/// A tuner on the device, addressed by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuner(pub u32);

impl Tuner {
    /// Attribute path such as `/tuner0/channel`.
    pub fn path(self, attr: TunerAttr) -> String {
        format!("/tuner{}/{}", self.0, attr.as_str())
    }
}

impl fmt::Display for Tuner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tuner{}", self.0)
    }
}

/// The two primitive verbs of the device-control utility.
pub trait DeviceControl {
    /// Read an attribute. Returns the reply with surrounding whitespace removed.
    fn get(&mut self, path: &str) -> Result<String, DeviceError>;

    /// Write an attribute.
    fn set(&mut self, path: &str, value: &str) -> Result<(), DeviceError>;
}

/// Runs `<binary> <device_id> get|set <path> [value]` for every request.
#[derive(Debug, Clone)]
pub struct ConfigTool {
    binary: PathBuf,
    device_id: String,
    timeout: Duration,
}

impl ConfigTool {
    pub fn new(binary: impl Into<PathBuf>, device_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            device_id: device_id.into(),
            timeout,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    fn run(&self, args: &[&str]) -> Result<String, DeviceError> {
        debug!(
            "Running {} {} {}",
            self.binary.display(),
            self.device_id,
            args.join(" ")
        );

        let spawn_error = |source| DeviceError::Spawn {
            binary: self.binary.clone(),
            source,
        };

        let mut child = Command::new(&self.binary)
            .arg(&self.device_id)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Replies are a few lines at most, so the pipes cannot fill up
        // while we poll.
        let start = Instant::now();
        loop {
            match child.try_wait().map_err(spawn_error)? {
                Some(_) => break,
                None if start.elapsed() >= self.timeout => {
                    warn!("Device command {:?} timed out after {:?}", args, self.timeout);
                    if let Err(e) = child.kill() {
                        warn!("Failed to kill timed out device command: {}", e);
                    }
                    let _ = child.wait();
                    return Err(DeviceError::Timeout(self.timeout));
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        trace!("Device replied {:?} (stderr {:?})", stdout, stderr);

        if !output.status.success() || stdout.starts_with("ERROR") {
            let message = if stderr.is_empty() { stdout } else { stderr };
            return Err(DeviceError::Rejected {
                code: output.status.code(),
                message,
            });
        }

        Ok(stdout)
    }
}

impl DeviceControl for ConfigTool {
    fn get(&mut self, path: &str) -> Result<String, DeviceError> {
        self.run(&["get", path])
    }

    fn set(&mut self, path: &str, value: &str) -> Result<(), DeviceError> {
        self.run(&["set", path, value]).map(|_| ())
    }
}
