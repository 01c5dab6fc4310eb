/// Channel configuration. Built once at startup and handed to the sequencer,
/// which only reads it. Defaults describe an ANT+ heart rate monitor on the
/// public ANT+ network.
use crate::defines;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelType {
    MasterTransmit,
    SlaveReceive,
}

impl ChannelType {
    /// Channel type byte used in the assign channel message.
    pub fn as_byte(self) -> u8 {
        match self {
            ChannelType::MasterTransmit => 0x10,
            ChannelType::SlaveReceive => 0x00,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChannelConfig {
    pub channel_number: u8,
    pub network_number: u8,
    pub network_key: [u8; 8],
    pub channel_type: ChannelType,
    pub device_number: u16,
    pub device_type: u8,
    pub transmission_type: u8,
    pub rf_frequency_offset: u8,
    pub channel_period_ticks: u16,
    pub extended_messages_enabled: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            channel_number: 0,
            network_number: 0,
            network_key: defines::ANT_PLUS_NETWORK_KEY,
            channel_type: ChannelType::SlaveReceive,
            device_number: 0, // wildcard, pair with the first device found
            device_type: defines::HRM_DEVICE_TYPE,
            transmission_type: 0,
            rf_frequency_offset: defines::HRM_RF_FREQUENCY,
            channel_period_ticks: defines::HRM_CHANNEL_PERIOD,
            extended_messages_enabled: true,
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_number(mut self, channel_number: u8) -> Self {
        self.channel_number = channel_number;
        self
    }

    pub fn network(mut self, network_number: u8, network_key: [u8; 8]) -> Self {
        self.network_number = network_number;
        self.network_key = network_key;
        self
    }

    pub fn channel_type(mut self, channel_type: ChannelType) -> Self {
        self.channel_type = channel_type;
        self
    }

    pub fn device_number(mut self, device_number: u16) -> Self {
        self.device_number = device_number;
        self
    }

    pub fn device_type(mut self, device_type: u8) -> Self {
        self.device_type = device_type;
        self
    }

    pub fn transmission_type(mut self, transmission_type: u8) -> Self {
        self.transmission_type = transmission_type;
        self
    }

    /// RF frequency as an offset in MHz from 2400 MHz.
    pub fn rf_frequency_offset(mut self, offset: u8) -> Self {
        self.rf_frequency_offset = offset;
        self
    }

    /// Channel period in 1/32768 s ticks.
    pub fn channel_period_ticks(mut self, ticks: u16) -> Self {
        self.channel_period_ticks = ticks;
        self
    }

    pub fn extended_messages(mut self, enabled: bool) -> Self {
        self.extended_messages_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new() {
        let config = ChannelConfig::new();
        assert_eq!(config.channel_type, ChannelType::SlaveReceive);
        assert_eq!(config.device_number, 0);
        assert_eq!(config.device_type, 120);
        assert_eq!(config.rf_frequency_offset, 57);
        assert_eq!(config.channel_period_ticks, 8070);
        assert!(config.extended_messages_enabled);
    }

    #[test]
    fn builder() {
        let config = ChannelConfig::new()
            .channel_type(ChannelType::MasterTransmit)
            .device_number(12345)
            .transmission_type(1)
            .extended_messages(false);
        assert_eq!(config.channel_type.as_byte(), 0x10);
        assert_eq!(config.device_number, 12345);
        assert_eq!(config.transmission_type, 1);
        assert!(!config.extended_messages_enabled);
    }
}
