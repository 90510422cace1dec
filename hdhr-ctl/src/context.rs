use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "hdhrctl")]
#[clap(about = "Interactive channel changer for HDHomeRun network tuners.", long_about = None)]
#[clap(version)]
pub(crate) struct Cli {
    /// The device ID.{n}
    /// Anything `hdhomerun_config` accepts as a device: the hex ID
    /// printed by `hdhomerun_config discover`, or an IP address.
    #[clap(value_name = "DEVICE_ID")]
    pub device_id: String,

    /// The tuner ordinal on the device (0, 1, ...).
    #[clap(value_name = "TUNER_ORDINAL")]
    pub tuner: u32,

    /// Output of `hdhomerun_config <DEVICE_ID> scan /tuner<N>`.
    #[clap(value_name = "SCAN_FILE")]
    pub scan_file: PathBuf,

    /// Configuration file path.{n}
    /// Defaults to `hdhrctl.toml` in the working directory if present.
    #[clap(short = 'f', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the `hdhomerun_config` binary.
    #[clap(long, value_name = "PATH")]
    pub config_binary: Option<PathBuf>,

    /// Directory for log files.{n}
    /// If not specified, logs only go to the console.
    #[clap(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Leave the tuner streaming to its target on exit.
    #[clap(long)]
    pub keep_target: bool,

    /// Enable debug logging.
    #[clap(short, long)]
    pub verbose: bool,
}
