//! hdhrctl: interactive channel changer for HDHomeRun tuners.
//!
//! Loads a channel map produced by `hdhomerun_config scan`, then reads
//! commands from stdin and retunes the tuner through `hdhomerun_config`.

use std::io;

use clap::Parser;
use log::{error, info, warn};

use hdhr_ctl::{run_interactive, ConfigFile, ConfigTool, Tuner, TunerSession};
use hdhr_scan::ScanCatalog;

mod context;
mod logging;

use context::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    // Load config file: explicit path > auto-detect > default
    let file_config = match ConfigFile::locate(args.config.clone()) {
        Some(path) => match ConfigFile::load(&path) {
            Ok(c) => {
                eprintln!("Loaded config from: {}", path.display());
                c
            }
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                return Err(e.into());
            }
        },
        None => ConfigFile::default(),
    };

    // Command line takes precedence over the config file.
    let log_dir = args.log_dir.clone().or_else(|| file_config.logging.log_dir.clone());
    logging::init_logging(
        log_dir.as_deref(),
        file_config.retention_days(),
        args.verbose,
        file_config.logging.level.as_deref(),
    )?;

    let catalog = match ScanCatalog::parse_file(&args.scan_file) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    if catalog.is_empty() {
        warn!("No programs found in {}", args.scan_file.display());
    }
    info!(
        "Loaded {} programs on {} broadcasts from {}",
        catalog.len(),
        catalog.broadcasts().len(),
        args.scan_file.display()
    );

    let binary = args.config_binary.clone().unwrap_or_else(|| file_config.binary());
    let device = ConfigTool::new(binary, args.device_id.clone(), file_config.timeout());
    let tuner = Tuner(args.tuner);
    info!("Controlling {} on device {}", tuner, device.device_id());

    let mut session = TunerSession::new(catalog, device, tuner, file_config.policy());
    if file_config.adopt_device_target() {
        if let Err(e) = session.adopt_device_target() {
            warn!("Could not read the current target: {}", e);
        }
    }

    let release_on_exit = file_config.release_on_exit() && !args.keep_target;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_interactive(&mut session, stdin.lock(), &mut stdout, release_on_exit)?;

    Ok(())
}
