/// A channel is a means of communication for an ANT+ device. Before the radio
/// will deliver data on a channel it has to be walked through a fixed
/// configuration sequence: network key, assignment, channel ID, frequency,
/// period and finally open. The radio rejects commands issued out of that
/// order, so `Channel` tracks how far the sequence got and never moves
/// backwards.
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::{
    ant::RunState,
    config::ChannelConfig,
    defines,
    error::{AntError, ConfigError, ConfigStep},
    transport::Transport,
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChannelState {
    Unconfigured,
    Assigned,
    IdConfigured,
    FrequencySet,
    PeriodSet,
    Open,
    Closing,
    Unassigned,
}

/// Channel maintains the state of the channel and the configuration it is
/// brought up with.
#[derive(Debug)]
pub struct Channel {
    state: ChannelState,
    config: ChannelConfig,
    timeout: Duration,
    settle_delay: Duration,
}

impl Channel {
    pub fn new(config: ChannelConfig) -> Self {
        Channel {
            state: ChannelState::Unconfigured,
            config,
            timeout: defines::RESPONSE_TIMEOUT,
            settle_delay: defines::RESET_SETTLE_DELAY,
        }
    }

    /// Overrides the delay observed after the soft reset.
    pub fn settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Runs the full bring-up sequence, starting from a soft reset every
    /// time. The first step the radio does not acknowledge aborts the
    /// sequence and the channel stays at the last state it reached.
    /// Nothing is retried.
    pub fn configure(
        &mut self,
        transport: &dyn Transport,
        run_state: &RunState,
    ) -> std::result::Result<(), ConfigError> {
        let timeout = self.timeout;
        let config = self.config.clone();
        self.state = ChannelState::Unconfigured;

        info!("Resetting module...");
        transport
            .reset()
            .map_err(|e| ConfigError::new(ConfigStep::Reset, e.to_string()))?;
        std::thread::sleep(self.settle_delay);

        info!("Setting network key...");
        let ok = transport.set_network_key(config.network_number, &config.network_key, timeout);
        self.step(ConfigStep::NetworkKey, ok, None)?;

        info!("Assigning channel...");
        let ok = transport.assign_channel(config.channel_type, config.network_number, timeout);
        self.step(ConfigStep::AssignChannel, ok, Some(ChannelState::Assigned))?;

        info!("Setting channel ID...");
        let ok = transport.set_channel_id(
            config.device_number,
            false,
            config.device_type,
            config.transmission_type,
            timeout,
        );
        self.step(ConfigStep::ChannelId, ok, Some(ChannelState::IdConfigured))?;

        info!("Setting radio frequency...");
        let ok = transport.set_channel_frequency(config.rf_frequency_offset, timeout);
        self.step(
            ConfigStep::RadioFrequency,
            ok,
            Some(ChannelState::FrequencySet),
        )?;

        info!("Setting channel period...");
        let ok = transport.set_channel_period(config.channel_period_ticks, timeout);
        self.step(ConfigStep::ChannelPeriod, ok, Some(ChannelState::PeriodSet))?;

        // The open attempt is what starts RF activity, so the flag goes up
        // before the radio answers and comes back down if it refuses.
        info!("Opening channel...");
        run_state.set_broadcasting(true);
        let ok = transport.open_channel(timeout);
        if !ok {
            run_state.set_broadcasting(false);
        }
        self.step(ConfigStep::OpenChannel, ok, Some(ChannelState::Open))?;

        if config.extended_messages_enabled {
            // Not every radio supports extended messages. The answer comes
            // back as a device event.
            info!("Enabling extended messages...");
            if let Err(e) = transport.enable_extended_messages(true) {
                let e = AntError::UnsupportedFeature(format!("extended messages: {}", e));
                warn!("{}", e);
            }
        }
        Ok(())
    }

    /// Starts the shutdown of an assigned channel. Sending the close request
    /// again while closing is allowed; the radio answers a second close with
    /// CHANNEL_IN_WRONG_STATE, which is what lets the unassign go ahead.
    pub fn begin_close(&mut self, transport: &dyn Transport) -> Result<()> {
        match self.state {
            ChannelState::Unconfigured | ChannelState::Unassigned => {
                Err(AntError::UnexpectedEventOrdering(format!(
                    "close requested while channel is {:?}",
                    self.state
                )))
            }
            _ => {
                info!("Closing channel {}...", self.config.channel_number);
                transport.close_channel()?;
                self.advance(ChannelState::Closing);
                Ok(())
            }
        }
    }

    /// Records the confirmed unassignment. Only valid while closing.
    pub fn mark_unassigned(&mut self) -> Result<()> {
        if self.state != ChannelState::Closing {
            return Err(AntError::UnexpectedEventOrdering(format!(
                "unassigned while channel is {:?}",
                self.state
            )));
        }
        self.advance(ChannelState::Unassigned);
        Ok(())
    }

    fn step(
        &mut self,
        step: ConfigStep,
        ok: bool,
        next: Option<ChannelState>,
    ) -> std::result::Result<(), ConfigError> {
        if !ok {
            let err = ConfigError::new(
                step,
                format!("not acknowledged within {:?}", self.timeout),
            );
            error!("{}", err);
            return Err(err);
        }
        info!("{} set", step);
        if let Some(next) = next {
            self.advance(next);
        }
        Ok(())
    }

    fn advance(&mut self, next: ChannelState) {
        if next > self.state {
            debug!("Channel {} state {:?} -> {:?}", self.config.channel_number, self.state, next);
            self.state = next;
        }
    }
}
