//! Interactive tuner session state.
//!
//! A [`TunerSession`] owns the channel map, the device handle and the
//! target/current/previous channel state. Every operation runs to completion
//! before the next one starts; the session is never shared between threads.

use hdhr_scan::{Program, ScanCatalog, VirtualChannel};
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::device::{DeviceControl, DeviceError, Tuner, TunerAttr, UNSET_TARGET};
use crate::status::{StatusLine, StatusReport};

/// Recoverable errors reported back to the operator.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No target set.")]
    NoTargetSet,

    #[error("Invalid channel {0}")]
    InvalidChannel(String),

    #[error("Device command on {path} failed: {source}")]
    Device {
        path: String,
        #[source]
        source: DeviceError,
    },
}

/// When `change_channel` records the requested channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelUpdate {
    /// Record the requested channel before looking it up. An invalid channel
    /// still becomes the current one and pushes the old one to previous.
    #[default]
    Legacy,
    /// Look the channel up first and leave the state alone when it is unknown.
    ValidateFirst,
}

/// What happens when a device `set` fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceErrors {
    /// Return the failure to the caller.
    #[default]
    Report,
    /// Log it and carry on as if the command succeeded.
    Ignore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    pub channel_update: ChannelUpdate,
    pub device_errors: DeviceErrors,
}

/// Result of a successful channel change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOutcome {
    pub channel: VirtualChannel,
    pub program: Program,
}

pub struct TunerSession<D> {
    catalog: ScanCatalog,
    device: D,
    tuner: Tuner,
    policy: SessionPolicy,
    target: String,
    current_channel: Option<VirtualChannel>,
    previous_channel: Option<VirtualChannel>,
}

impl<D> std::fmt::Debug for TunerSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunerSession")
            .field("tuner", &self.tuner)
            .field("target", &self.target)
            .field("current_channel", &self.current_channel)
            .field("previous_channel", &self.previous_channel)
            .finish_non_exhaustive()
    }
}

impl<D: DeviceControl> TunerSession<D> {
    pub fn new(catalog: ScanCatalog, device: D, tuner: Tuner, policy: SessionPolicy) -> Self {
        Self {
            catalog,
            device,
            tuner,
            policy,
            target: UNSET_TARGET.to_string(),
            current_channel: None,
            previous_channel: None,
        }
    }

    pub fn catalog(&self) -> &ScanCatalog {
        &self.catalog
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn has_target(&self) -> bool {
        !self.target.is_empty() && self.target != UNSET_TARGET
    }

    pub fn current_channel(&self) -> Option<&VirtualChannel> {
        self.current_channel.as_ref()
    }

    pub fn previous_channel(&self) -> Option<&VirtualChannel> {
        self.previous_channel.as_ref()
    }

    /// Point the tuner's output stream at `target`.
    ///
    /// The local target is updated even if the device rejects the command.
    pub fn set_target(&mut self, target: &str) -> Result<(), SessionError> {
        info!("Setting {} target to '{}'", self.tuner, target);
        self.target = target.to_string();
        self.device_set(TunerAttr::Target, target)
    }

    /// Release the device by clearing its target.
    pub fn release(&mut self) -> Result<(), SessionError> {
        self.set_target(UNSET_TARGET)
    }

    /// Take over whatever target the device is already streaming to.
    pub fn adopt_device_target(&mut self) -> Result<(), SessionError> {
        let path = self.tuner.path(TunerAttr::Target);
        let target = self
            .device
            .get(&path)
            .map_err(|source| SessionError::Device { path, source })?;

        if target.is_empty() || target == UNSET_TARGET {
            debug!("{} has no target to adopt", self.tuner);
        } else {
            info!("Adopting existing {} target '{}'", self.tuner, target);
            self.target = target;
        }
        Ok(())
    }

    /// Parse `requested` (e.g. `"11.4"`) and change to it.
    pub fn change_channel_str(&mut self, requested: &str) -> Result<ChangeOutcome, SessionError> {
        if !self.has_target() {
            return Err(SessionError::NoTargetSet);
        }
        let channel: VirtualChannel = requested
            .parse()
            .map_err(|_| SessionError::InvalidChannel(requested.to_string()))?;
        self.change_channel(&channel)
    }

    /// Tune to `requested` and restream it to the current target.
    ///
    /// Issues `channel`, `program` and `target` sets, in that order. The first
    /// failing set aborts the rest; the channel state is already updated by
    /// then.
    pub fn change_channel(&mut self, requested: &VirtualChannel) -> Result<ChangeOutcome, SessionError> {
        if !self.has_target() {
            return Err(SessionError::NoTargetSet);
        }

        if self.policy.channel_update == ChannelUpdate::Legacy {
            self.record_channel(requested);
        }

        let program = match self.catalog.lookup(requested) {
            Some(p) => p.clone(),
            None => {
                warn!("Channel {} is not in the scan listing", requested);
                return Err(SessionError::InvalidChannel(requested.to_string()));
            }
        };

        if self.policy.channel_update == ChannelUpdate::ValidateFirst {
            self.record_channel(requested);
        }

        debug!(
            "Tuning {} to broadcast {} program {} for {}",
            self.tuner, program.broadcast_id, program.program_id, requested
        );
        self.device_set(TunerAttr::Channel, &program.broadcast_id.to_string())?;
        self.device_set(TunerAttr::Program, &program.program_id.to_string())?;
        let target = self.target.clone();
        self.device_set(TunerAttr::Target, &target)?;

        info!("Changed {} to {} ({})", self.tuner, requested, program.name);
        Ok(ChangeOutcome {
            channel: requested.clone(),
            program,
        })
    }

    /// Go back to the previous channel. Does nothing if there is none.
    ///
    /// This is an ordinary channel change, so the channel being left becomes
    /// the new previous one.
    pub fn previous_channel_recall(&mut self) -> Result<Option<ChangeOutcome>, SessionError> {
        match self.previous_channel.clone() {
            Some(previous) => self.change_channel(&previous).map(Some),
            None => Ok(None),
        }
    }

    /// Query the device for tuner and stream status.
    ///
    /// A status reply the grammar does not match is kept as
    /// [`StatusLine::Raw`]. A reply the device marks with `ERROR` never gets
    /// that far: the device layer reports it as [`DeviceError::Rejected`] and
    /// it surfaces here as [`SessionError::Device`].
    pub fn status(&mut self) -> Result<StatusReport, SessionError> {
        let stream_path = self.tuner.path(TunerAttr::StreamInfo);
        let stream_info = match self.device.get(&stream_path) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Failed to read {}: {}", stream_path, e);
                None
            }
        };

        let path = self.tuner.path(TunerAttr::Status);
        let reply = self
            .device
            .get(&path)
            .map_err(|source| SessionError::Device { path, source })?;
        let status = StatusLine::parse(&reply);
        if let StatusLine::Raw(line) = &status {
            debug!("Unrecognized status reply: {:?}", line);
        }

        Ok(StatusReport {
            status,
            stream_info,
            current_channel: self.current_channel.clone(),
            previous_channel: self.previous_channel.clone(),
        })
    }

    fn record_channel(&mut self, channel: &VirtualChannel) {
        self.previous_channel = self.current_channel.replace(channel.clone());
    }

    fn device_set(&mut self, attr: TunerAttr, value: &str) -> Result<(), SessionError> {
        let path = self.tuner.path(attr);
        match self.device.set(&path, value) {
            Ok(()) => Ok(()),
            Err(source) => match self.policy.device_errors {
                DeviceErrors::Report => Err(SessionError::Device { path, source }),
                DeviceErrors::Ignore => {
                    warn!("Ignoring failed set {} {}: {}", path, value, source);
                    Ok(())
                }
            },
        }
    }
}
