/// Radio level constants shared by the message model, the sequencer and the
/// USB transport.
use std::time::Duration;

pub const ANT_STANDARD_DATA_PAYLOAD_SIZE: usize = 8;
pub const ANT_EXT_MESG_DEVICE_ID_FIELD_SIZE: usize = 4;
pub const ANT_EXT_STRING_SIZE: usize = 18;

// Public ANT+ managed network key. Applications bound to a private network
// pass their own key through ChannelConfig.
pub const ANT_PLUS_NETWORK_KEY: [u8; 8] = [0xB9, 0xA5, 0x21, 0xFB, 0xBD, 0x72, 0xC3, 0x45];

/// Wait budget for every blocking configuration command.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);

/// The radio does not answer commands for a while after a soft reset.
pub const RESET_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// How often the run loop checks whether the dispatchers finished the run.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capacity of each of the device and channel event queues.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

// Heart rate monitor profile.
pub const HRM_DEVICE_TYPE: u8 = 120;
pub const HRM_RF_FREQUENCY: u8 = 57;
pub const HRM_CHANNEL_PERIOD: u16 = 8070;

/// Payload offset of the computed heart rate in every HRM data page.
pub const HEART_RATE_OFFSET: usize = 7;
