use std::fmt;

use rusb::Error as USBError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AntError {
    #[error("ANT transport unavailable: {0}")]
    TransportUnavailable(String),
    #[error("{0}")]
    ConfigStepFailed(#[from] ConfigError),
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("malformed payload: expected at least {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },
    #[error("unexpected event ordering: {0}")]
    UnexpectedEventOrdering(String),
    #[error("{0}")]
    UsbDeviceError(#[from] USBError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// The configuration steps performed while bringing a channel up, in the
/// order they are issued to the radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigStep {
    Reset,
    NetworkKey,
    AssignChannel,
    ChannelId,
    RadioFrequency,
    ChannelPeriod,
    OpenChannel,
}

impl fmt::Display for ConfigStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ConfigStep::Reset => "reset",
            ConfigStep::NetworkKey => "network key",
            ConfigStep::AssignChannel => "channel assignment",
            ConfigStep::ChannelId => "channel ID",
            ConfigStep::RadioFrequency => "radio frequency",
            ConfigStep::ChannelPeriod => "channel period",
            ConfigStep::OpenChannel => "open channel",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
#[error("error configuring {step}: {reason}")]
pub struct ConfigError {
    pub step: ConfigStep,
    pub reason: String,
}

impl ConfigError {
    pub fn new(step: ConfigStep, reason: impl Into<String>) -> Self {
        ConfigError {
            step,
            reason: reason.into(),
        }
    }
}
