//! hdhr-ctl library - interactive control of an HDHomeRun tuner.
//!
//! The binary binds a [`ScanCatalog`](hdhr_scan::ScanCatalog) and a
//! [`ConfigTool`] to a [`TunerSession`] and feeds it operator commands.

pub mod commands;
pub mod config;
pub mod device;
pub mod session;
pub mod status;

// Re-export commonly used types
pub use commands::{run_interactive, Command};
pub use config::ConfigFile;
pub use device::{ConfigTool, DeviceControl, DeviceError, Tuner, TunerAttr, UNSET_TARGET};
pub use session::{ChangeOutcome, ChannelUpdate, DeviceErrors, SessionError, SessionPolicy, TunerSession};
pub use status::{StatusLine, StatusReport, TunerStatus};
