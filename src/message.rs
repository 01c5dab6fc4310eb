/// Message module provides a way for creating messages to send to the ANT+
/// USB device along with decoding the frames the radio sends back into
/// typed `RadioMessage`s the dispatchers work with.
use crate::defines;
use log::trace;
use std::fmt;

pub const MESG_TX_SYNC: u8 = 0xA4;
pub const MESG_SYNC_SIZE: usize = 1;
pub const MESG_SIZE_SIZE: usize = 1;
pub const MESG_ID_SIZE: usize = 1;
pub const MESG_CHANNEL_NUM_SIZE: usize = 1;
pub const MESG_EXT_MESG_BF_SIZE: usize = 1;
pub const MESG_CHECKSUM_SIZE: usize = 1;

pub const MESG_ANT_MAX_PAYLOAD_SIZE: usize = defines::ANT_STANDARD_DATA_PAYLOAD_SIZE;
pub const MESG_MAX_EXT_DATA_SIZE: usize =
    defines::ANT_EXT_MESG_DEVICE_ID_FIELD_SIZE + defines::ANT_EXT_STRING_SIZE;
pub const MESG_MAX_DATA_SIZE: usize =
    MESG_ANT_MAX_PAYLOAD_SIZE + MESG_EXT_MESG_BF_SIZE + MESG_MAX_EXT_DATA_SIZE;
pub const MESG_HEADER_SIZE: usize = MESG_SYNC_SIZE + MESG_SIZE_SIZE + MESG_ID_SIZE;
pub const MESG_SIZE_OFFSET: usize = MESG_SYNC_SIZE;
pub const MESG_ID_OFFSET: usize = MESG_SYNC_SIZE + MESG_SIZE_SIZE;
pub const MESG_DATA_OFFSET: usize = MESG_HEADER_SIZE;

// Builds a fieldless-plus-fallback enum over a single wire byte along with
// the conversions in both directions and a static catalogue of the known
// values.
macro_rules! byte_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $fallback:ident {
            $($variant:ident = $value:literal => $label:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            $fallback(u8),
        }

        impl $name {
            /// Every catalogued value, in wire order.
            pub const CATALOGUE: &'static [$name] = &[$($name::$variant,)*];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                    $name::$fallback(_) => "UNKNOWN",
                }
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($value => $name::$variant,)*
                    other => $name::$fallback(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $value,)*
                    $name::$fallback(other) => other,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{} (0x{:02X})", self.label(), u8::from(*self))
            }
        }
    };
}

byte_enum! {
    /// ANT message identifiers. Only a handful drive behaviour in this crate,
    /// the rest are catalogued so that an inert id is never confused with an
    /// unknown one.
    MessageId, Unknown {
        Invalid = 0x00 => "INVALID",
        Event = 0x01 => "EVENT",
        Version = 0x3E => "VERSION",
        ResponseEvent = 0x40 => "RESPONSE_EVENT",
        UnassignChannel = 0x41 => "UNASSIGN_CHANNEL",
        AssignChannel = 0x42 => "ASSIGN_CHANNEL",
        ChannelMesgPeriod = 0x43 => "CHANNEL_MESG_PERIOD",
        ChannelSearchTimeout = 0x44 => "CHANNEL_SEARCH_TIMEOUT",
        ChannelRadioFreq = 0x45 => "CHANNEL_RADIO_FREQ",
        NetworkKey = 0x46 => "NETWORK_KEY",
        RadioTxPower = 0x47 => "RADIO_TX_POWER",
        RadioCwMode = 0x48 => "RADIO_CW_MODE",
        SystemReset = 0x4A => "SYSTEM_RESET",
        OpenChannel = 0x4B => "OPEN_CHANNEL",
        CloseChannel = 0x4C => "CLOSE_CHANNEL",
        Request = 0x4D => "REQUEST",
        BroadcastData = 0x4E => "BROADCAST_DATA",
        AcknowledgedData = 0x4F => "ACKNOWLEDGED_DATA",
        BurstData = 0x50 => "BURST_DATA",
        ChannelId = 0x51 => "CHANNEL_ID",
        ChannelStatus = 0x52 => "CHANNEL_STATUS",
        RadioCwInit = 0x53 => "RADIO_CW_INIT",
        Capabilities = 0x54 => "CAPABILITIES",
        StackLimit = 0x55 => "STACKLIMIT",
        ScriptData = 0x56 => "SCRIPT_DATA",
        ScriptCmd = 0x57 => "SCRIPT_CMD",
        IdListAdd = 0x59 => "ID_LIST_ADD",
        IdListConfig = 0x5A => "ID_LIST_CONFIG",
        OpenRxScan = 0x5B => "OPEN_RX_SCAN",
        ExtBroadcastData = 0x5D => "EXT_BROADCAST_DATA",
        ExtAcknowledgedData = 0x5E => "EXT_ACKNOWLEDGED_DATA",
        ExtBurstData = 0x5F => "EXT_BURST_DATA",
        ChannelRadioTxPower = 0x60 => "CHANNEL_RADIO_TX_POWER",
        GetSerialNum = 0x61 => "GET_SERIAL_NUM",
        GetTempCal = 0x62 => "GET_TEMP_CAL",
        SetLpSearchTimeout = 0x63 => "SET_LP_SEARCH_TIMEOUT",
        SerialNumSetChannelId = 0x65 => "SERIAL_NUM_SET_CHANNEL_ID",
        RxExtMesgsEnable = 0x66 => "RX_EXT_MESGS_ENABLE",
        EnableLedFlash = 0x68 => "ENABLE_LED_FLASH",
        XtalEnable = 0x6D => "XTAL_ENABLE",
        StartupMesg = 0x6F => "STARTUP_MESG",
        AutoFreqConfig = 0x70 => "AUTO_FREQ_CONFIG",
        ProxSearchConfig = 0x71 => "PROX_SEARCH_CONFIG",
        AdvBurstData = 0x72 => "ADV_BURST_DATA",
        EventBufferConfig = 0x74 => "EVENT_BUFFER_CONFIG",
        SetSearchPriorityLevel = 0x75 => "SET_SEARCH_PRIORITY_LEVEL",
        HighDutySearchConfig = 0x77 => "HIGH_DUTY_SEARCH_CONFIG",
        AdvBurstConfig = 0x78 => "ADV_BURST_CONFIG",
        EventFilterConfig = 0x79 => "EVENT_FILTER_CONFIG",
        SduConfig = 0x7A => "SDU_CONFIG",
        SetSduMask = 0x7B => "SET_SDU_MASK",
        UserNvmConfig = 0x7C => "USER_NVM_CONFIG",
        EnableEncryption = 0x7D => "ENABLE_ENCRYPTION",
        SetEncryptionKey = 0x7E => "SET_ENCRYPTION_KEY",
        SetEncryptionInfo = 0x7F => "SET_ENCRYPTION_INFO",
        SetSearchSharingCycles = 0x81 => "SET_SEARCH_SHARING_CYCLES",
        EncryptionKeyNvmOperation = 0x83 => "ENCRYPTION_KEY_NVM_OPERATION",
        Fit1SetAgc = 0x8F => "FIT1_SET_AGC",
        SetChannelInputMask = 0x90 => "SET_CHANNEL_INPUT_MASK",
        Fit1SetEquipState = 0x91 => "FIT1_SET_EQUIP_STATE",
        ReadPinsForSect = 0x92 => "READ_PINS_FOR_SECT",
        TimerSelect = 0x93 => "TIMER_SELECT",
        AtodSettings = 0x94 => "ATOD_SETTINGS",
        SetSharedAddress = 0x95 => "SET_SHARED_ADDRESS",
        RssiPower = 0xC0 => "RSSI_POWER",
        RssiBroadcastData = 0xC1 => "RSSI_BROADCAST_DATA",
        RssiAcknowledgedData = 0xC2 => "RSSI_ACKNOWLEDGED_DATA",
        RssiBurstData = 0xC3 => "RSSI_BURST_DATA",
        RssiSearchThreshold = 0xC4 => "RSSI_SEARCH_THRESHOLD",
        Sleep = 0xC5 => "SLEEP",
        SetUsbInfo = 0xC7 => "SET_USB_INFO",
    }
}

byte_enum! {
    /// Response and event codes carried in the third byte of a
    /// RESPONSE_EVENT message.
    EventCode, Other {
        ResponseNoError = 0x00 => "RESPONSE_NO_ERROR",
        EventRxSearchTimeout = 0x01 => "EVENT_RX_SEARCH_TIMEOUT",
        EventRxFail = 0x02 => "EVENT_RX_FAIL",
        EventTx = 0x03 => "EVENT_TX",
        EventTransferRxFailed = 0x04 => "EVENT_TRANSFER_RX_FAILED",
        EventTransferTxCompleted = 0x05 => "EVENT_TRANSFER_TX_COMPLETED",
        EventTransferTxFailed = 0x06 => "EVENT_TRANSFER_TX_FAILED",
        EventChannelClosed = 0x07 => "EVENT_CHANNEL_CLOSED",
        EventRxFailGoToSearch = 0x08 => "EVENT_RX_FAIL_GO_TO_SEARCH",
        EventChannelCollision = 0x09 => "EVENT_CHANNEL_COLLISION",
        ChannelInWrongState = 0x15 => "CHANNEL_IN_WRONG_STATE",
        ChannelNotOpened = 0x16 => "CHANNEL_NOT_OPENED",
        ChannelIdNotSet = 0x18 => "CHANNEL_ID_NOT_SET",
        TransferInProgress = 0x1F => "TRANSFER_IN_PROGRESS",
        InvalidMessage = 0x28 => "INVALID_MESSAGE",
        InvalidNetworkNumber = 0x29 => "INVALID_NETWORK_NUMBER",
        InvalidListId = 0x30 => "INVALID_LIST_ID",
        InvalidScanTxChannel = 0x31 => "INVALID_SCAN_TX_CHANNEL",
        InvalidParameterProvided = 0x33 => "INVALID_PARAMETER_PROVIDED",
    }
}

/// How this crate treats a message id when it arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Handled,
    Ignored,
    Unknown,
}

/// Which of the two event streams a message is delivered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Device,
    Channel,
}

impl MessageId {
    pub fn disposition(self) -> Disposition {
        match self {
            MessageId::StartupMesg
            | MessageId::Version
            | MessageId::ResponseEvent
            | MessageId::BroadcastData
            | MessageId::ExtBroadcastData => Disposition::Handled,
            MessageId::Unknown(_) => Disposition::Unknown,
            _ => Disposition::Ignored,
        }
    }

    /// Data carrying messages always belong to a channel.
    pub fn is_data(self) -> bool {
        matches!(
            self,
            MessageId::BroadcastData
                | MessageId::AcknowledgedData
                | MessageId::BurstData
                | MessageId::ExtBroadcastData
                | MessageId::ExtAcknowledgedData
                | MessageId::ExtBurstData
                | MessageId::AdvBurstData
                | MessageId::RssiBroadcastData
                | MessageId::RssiAcknowledgedData
                | MessageId::RssiBurstData
        )
    }

    // Device level replies that do not lead with a channel number.
    fn has_channel_byte(self) -> bool {
        !matches!(
            self,
            MessageId::StartupMesg
                | MessageId::Version
                | MessageId::Capabilities
                | MessageId::GetSerialNum
        )
    }
}

/// Reasons a radio reports in its startup message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    PowerOn,
    HardwareLine,
    Watchdog,
    Command,
    Synchronous,
    Suspend,
}

// One bit per reason, so a byte of 0x03 reads as power-on plus reset line.
// ANT hardware puts the watchdog at 0x02 and leaves power-on as a zero byte;
// here the watchdog moves up to 0x04, so a real watchdog reset is reported
// as RESET_RST.
const RESET_REASON_BITS: [(u8, ResetReason); 6] = [
    (0x01, ResetReason::PowerOn),
    (0x02, ResetReason::HardwareLine),
    (0x04, ResetReason::Watchdog),
    (0x20, ResetReason::Command),
    (0x40, ResetReason::Synchronous),
    (0x80, ResetReason::Suspend),
];

impl ResetReason {
    pub fn label(self) -> &'static str {
        match self {
            ResetReason::PowerOn => "RESET_POR",
            ResetReason::HardwareLine => "RESET_RST",
            ResetReason::Watchdog => "RESET_WDT",
            ResetReason::Command => "RESET_CMD",
            ResetReason::Synchronous => "RESET_SYNC",
            ResetReason::Suspend => "RESET_SUSPEND",
        }
    }
}

/// Decodes the startup reason bitmask. Several bits may be set at once and
/// each one is reported. A zero byte is a plain power-on.
pub fn reset_reasons(byte: u8) -> Vec<ResetReason> {
    if byte == 0 {
        return vec![ResetReason::PowerOn];
    }
    RESET_REASON_BITS
        .iter()
        .filter(|(bit, _)| byte & bit == *bit)
        .map(|(_, reason)| *reason)
        .collect()
}

/// A message received from the radio, decoded far enough for dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct RadioMessage {
    message_id: MessageId,
    channel: u8,
    payload: Vec<u8>,
    event_code: Option<EventCode>,
    sub_message_id: Option<MessageId>,
}

impl RadioMessage {
    pub fn new(message_id: MessageId, channel: u8, payload: &[u8]) -> Self {
        let (sub_message_id, event_code) = match message_id {
            MessageId::ResponseEvent => (
                payload.get(0).map(|id| MessageId::from(*id)),
                payload.get(1).map(|code| EventCode::from(*code)),
            ),
            _ => (None, None),
        };
        RadioMessage {
            message_id,
            channel,
            payload: payload[..payload.len().min(MESG_MAX_DATA_SIZE)].to_vec(),
            event_code,
            sub_message_id,
        }
    }

    /// A RESPONSE_EVENT acknowledging `sub_message_id` on `channel`.
    pub fn response(channel: u8, sub_message_id: MessageId, code: EventCode) -> Self {
        Self::new(
            MessageId::ResponseEvent,
            channel,
            &[sub_message_id.into(), code.into()],
        )
    }

    /// A channel event, i.e. a RESPONSE_EVENT wrapping EVENT.
    pub fn channel_event(channel: u8, code: EventCode) -> Self {
        Self::response(channel, MessageId::Event, code)
    }

    pub fn broadcast(channel: u8, data: &[u8]) -> Self {
        Self::new(MessageId::BroadcastData, channel, data)
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn event_code(&self) -> Option<EventCode> {
        self.event_code
    }

    pub fn sub_message_id(&self) -> Option<MessageId> {
        self.sub_message_id
    }

    pub fn scope(&self) -> Scope {
        if self.message_id.is_data() || self.sub_message_id == Some(MessageId::Event) {
            Scope::Channel
        } else {
            Scope::Device
        }
    }
}

impl From<&Message> for RadioMessage {
    fn from(mesg: &Message) -> Self {
        let id = MessageId::from(mesg.id);
        match mesg.data.split_first() {
            Some((channel, rest)) if id.has_channel_byte() => RadioMessage::new(id, *channel, rest),
            _ => RadioMessage::new(id, 0, &mesg.data),
        }
    }
}

/// ReadBuffer provides a buffer to walk through data received from the ANT+
/// USB device and turn the data into Messages.
pub struct ReadBuffer {
    index: usize,
    inner: Vec<u8>,
}

impl ReadBuffer {
    pub fn new(buffer: &[u8]) -> Self {
        ReadBuffer {
            index: 0,
            inner: buffer.to_vec(),
        }
    }
}

// This is an iterator over the read in buffer from the ANT+ USB stick.
// The buffer is a variable size [u8] that we will loop through looking
// for a sync byte and then creating an ANT message from the received
// data. If the checksum of a message is invalid, then we continue searching
// for another sync byte.
impl Iterator for ReadBuffer {
    type Item = Message;
    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.inner.len() {
            let index = self.index;
            if self.inner[index] == MESG_TX_SYNC && index + MESG_SIZE_OFFSET < self.inner.len() {
                let size = self.inner[index + MESG_SIZE_OFFSET] as usize;
                let len = index + MESG_HEADER_SIZE + size + MESG_CHECKSUM_SIZE;
                if len <= self.inner.len() {
                    let checksum = self.inner[index..len].iter().fold(0, |acc, b| acc ^ b);
                    if checksum == 0 {
                        self.index = len;
                        let frame = &self.inner[index..len - MESG_CHECKSUM_SIZE];
                        trace!("Decoded frame: {:x?}", frame);
                        return Some(Message::new(
                            frame[MESG_ID_OFFSET],
                            &frame[MESG_DATA_OFFSET..],
                        ));
                    }
                }
            }
            self.index += 1;
        }
        None
    }
}

/// A raw ANT message, either built by one of the command functions below
/// or decoded out of a ReadBuffer.
#[derive(Clone, PartialEq)]
pub struct Message {
    pub id: u8,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(id: u8, data: &[u8]) -> Message {
        Message {
            id,
            data: data.to_vec(),
        }
    }

    // Converts a message into something that can be written out. The frame
    // is followed by two zero bytes of padding.
    pub fn encode(&self) -> Vec<u8> {
        let size = self.data.len();
        let total_size = MESG_HEADER_SIZE + size;
        let mut buf: Vec<u8> = vec![0; total_size + 3];
        buf[0] = MESG_TX_SYNC;
        buf[MESG_SIZE_OFFSET] = size as u8;
        buf[MESG_ID_OFFSET] = self.id;
        buf[MESG_DATA_OFFSET..total_size].copy_from_slice(&self.data);
        buf[total_size] = buf[..total_size].iter().fold(0, |acc, b| acc ^ b);
        buf
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} DATA: {:x?}", MessageId::from(self.id), self.data)
    }
}

pub fn reset() -> Message {
    Message::new(MessageId::SystemReset.into(), &[0])
}

pub fn set_network_key(network_number: u8, key: &[u8; 8]) -> Message {
    let mut data = vec![network_number];
    data.extend(key);
    Message::new(MessageId::NetworkKey.into(), &data)
}

pub fn request(channel: u8, id: MessageId) -> Message {
    Message::new(MessageId::Request.into(), &[channel, id.into()])
}

pub fn assign_channel(channel: u8, channel_type: u8, network: u8) -> Message {
    Message::new(
        MessageId::AssignChannel.into(),
        &[channel, channel_type, network],
    )
}

pub fn set_channel_id(
    channel: u8,
    device_number: u16,
    pairing: bool,
    device_type: u8,
    transmission_type: u8,
) -> Message {
    let device_type = if pairing {
        device_type | 0x80
    } else {
        device_type & 0x7F
    };
    let number = device_number.to_le_bytes();
    Message::new(
        MessageId::ChannelId.into(),
        &[channel, number[0], number[1], device_type, transmission_type],
    )
}

pub fn set_channel_period(channel: u8, period: u16) -> Message {
    let period = period.to_le_bytes();
    Message::new(
        MessageId::ChannelMesgPeriod.into(),
        &[channel, period[0], period[1]],
    )
}

pub fn set_channel_frequency(channel: u8, frequency: u8) -> Message {
    Message::new(MessageId::ChannelRadioFreq.into(), &[channel, frequency])
}

pub fn open_channel(channel: u8) -> Message {
    Message::new(MessageId::OpenChannel.into(), &[channel])
}

pub fn close_channel(channel: u8) -> Message {
    Message::new(MessageId::CloseChannel.into(), &[channel])
}

pub fn unassign_channel(channel: u8) -> Message {
    Message::new(MessageId::UnassignChannel.into(), &[channel])
}

pub fn enable_ext_rx_messages(enable: bool) -> Message {
    Message::new(MessageId::RxExtMesgsEnable.into(), &[0, enable as u8])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new() {
        let data = vec![0; 5];
        let m = Message::new(0, &data);
        assert_eq!(m.id, 0);
        assert_eq!(m.data, vec![0; 5]);
    }

    #[test]
    fn test_read_buffer() {
        let startup_message = Message::new(0x6F, &[0x00]);
        let mut buffer = startup_message.encode();
        buffer.extend_from_slice(&startup_message.encode()[..]);
        buffer.extend_from_slice(&startup_message.encode()[..]);
        let read_buffer = ReadBuffer::new(&buffer[..]);
        let messages: Vec<Message> = read_buffer.collect();
        assert_eq!(messages, vec![startup_message.clone(); 3]);
    }

    #[test]
    fn test_read_buffer_with_invalid_data() {
        let startup_message = Message::new(0x6F, &[0x00]);
        let mut buffer = startup_message.encode();
        buffer.extend_from_slice(&startup_message.encode()[..]);
        buffer.extend_from_slice(&[0, 1, 2, 3]);
        buffer.extend_from_slice(&startup_message.encode()[..]);
        let read_buffer = ReadBuffer::new(&buffer[..]);
        assert_eq!(read_buffer.count(), 3);
    }

    #[test]
    fn test_read_buffer_with_bad_checksum() {
        let startup_message = Message::new(0x6F, &[0x00]);
        let mut corrupt = startup_message.encode();
        corrupt[3] = 0x20;
        let mut buffer = corrupt;
        buffer.extend_from_slice(&startup_message.encode()[..]);
        let mut read_buffer = ReadBuffer::new(&buffer[..]);
        assert_eq!(read_buffer.next(), Some(startup_message));
        assert_eq!(read_buffer.next(), None);
    }

    #[test]
    fn test_read_buffer_with_truncated_frame() {
        // Sync and a size byte claiming more data than was read.
        let mut read_buffer = ReadBuffer::new(&[MESG_TX_SYNC, 9, 0x4E, 0]);
        assert_eq!(read_buffer.next(), None);
    }

    #[test]
    fn test_encode() {
        let data = vec![1, 0xac, 2, 0x5c, 3];
        let len = data.len();
        let m = Message::new(0x54, &data);
        let buf = m.encode();
        let total_size = buf.len() - 3;
        let checksum = buf[..total_size].iter().fold(0, |acc, b| acc ^ b);
        assert_eq!(buf[0], MESG_TX_SYNC);
        assert_eq!(buf[1], len as u8);
        assert_eq!(buf[2], 0x54);
        assert_eq!(buf[3..8], data[..]);
        assert_eq!(buf[total_size], checksum);
    }

    #[test]
    fn catalogue_ids_round_trip() {
        for id in MessageId::CATALOGUE {
            assert_eq!(MessageId::from(u8::from(*id)), *id);
        }
        assert_eq!(MessageId::from(0x4E), MessageId::BroadcastData);
        assert_eq!(MessageId::from(0x3F), MessageId::Unknown(0x3F));
        assert_eq!(u8::from(MessageId::Unknown(0x3F)), 0x3F);
    }

    #[test]
    fn unknown_event_codes_do_not_panic() {
        assert_eq!(EventCode::from(0x28), EventCode::InvalidMessage);
        assert_eq!(EventCode::from(0xEE), EventCode::Other(0xEE));
        assert_eq!(EventCode::Other(0xEE).to_string(), "UNKNOWN (0xEE)");
    }

    #[test]
    fn dispositions() {
        assert_eq!(
            MessageId::BroadcastData.disposition(),
            Disposition::Handled
        );
        assert_eq!(MessageId::BurstData.disposition(), Disposition::Ignored);
        assert_eq!(MessageId::SetUsbInfo.disposition(), Disposition::Ignored);
        assert_eq!(
            MessageId::Unknown(0xFE).disposition(),
            Disposition::Unknown
        );
    }

    #[test]
    fn startup_reasons_report_every_bit() {
        assert_eq!(
            reset_reasons(0x03),
            vec![ResetReason::PowerOn, ResetReason::HardwareLine]
        );
        assert_eq!(reset_reasons(0x00), vec![ResetReason::PowerOn]);
        assert_eq!(
            reset_reasons(0xA0),
            vec![ResetReason::Command, ResetReason::Suspend]
        );
        assert_eq!(ResetReason::HardwareLine.label(), "RESET_RST");
    }

    #[test]
    fn response_event_is_decoded() {
        let frame = Message::new(0x40, &[0, 0x4C, 0x15]);
        let mesg = RadioMessage::from(&frame);
        assert_eq!(mesg.message_id(), MessageId::ResponseEvent);
        assert_eq!(mesg.channel(), 0);
        assert_eq!(mesg.sub_message_id(), Some(MessageId::CloseChannel));
        assert_eq!(mesg.event_code(), Some(EventCode::ChannelInWrongState));
        assert_eq!(mesg.scope(), Scope::Device);
    }

    #[test]
    fn channel_events_and_data_are_channel_scoped() {
        let event = RadioMessage::from(&Message::new(0x40, &[0, 0x01, 0x07]));
        assert_eq!(event.scope(), Scope::Channel);
        assert_eq!(event.event_code(), Some(EventCode::EventChannelClosed));

        let data = RadioMessage::from(&Message::new(0x4E, &[0, 1, 2, 3, 4, 5, 6, 7, 72]));
        assert_eq!(data.scope(), Scope::Channel);
        assert_eq!(data.payload(), &[1, 2, 3, 4, 5, 6, 7, 72]);
        assert_eq!(data.event_code(), None);
    }

    #[test]
    fn device_messages_without_channel_byte() {
        let startup = RadioMessage::from(&Message::new(0x6F, &[0x20]));
        assert_eq!(startup.payload(), &[0x20]);
        assert_eq!(startup.scope(), Scope::Device);

        let version = RadioMessage::from(&Message::new(0x3E, b"AJK3.10\0"));
        assert_eq!(version.payload(), b"AJK3.10\0");
    }

    #[test]
    fn short_response_event_has_no_code() {
        let mesg = RadioMessage::from(&Message::new(0x40, &[0]));
        assert_eq!(mesg.sub_message_id(), None);
        assert_eq!(mesg.event_code(), None);
    }

    // The following tests test message creation. We assert against the
    // literal wire value rather than the enum, so a change to the catalogue
    // above fails here.
    #[test]
    fn test_reset_message() {
        let mesg = reset();
        assert_eq!(mesg.id, 0x4A);
        assert_eq!(mesg.data[..], [0]);
    }

    #[test]
    fn test_set_network_key_message() {
        let mesg = set_network_key(0, &[0; 8]);
        assert_eq!(mesg.id, 0x46);
        assert_eq!(mesg.data[..], [0; 9]);
    }

    #[test]
    fn request_message() {
        let mesg = request(0, MessageId::Capabilities);
        assert_eq!(mesg.id, 0x4D);
        assert_eq!(mesg.data[..], [0, 0x54]);
    }

    #[test]
    fn assign_channel_message() {
        let mesg = assign_channel(0, 0x10, 1);
        assert_eq!(mesg.id, 0x42);
        assert_eq!(mesg.data[..], [0, 0x10, 1]);
    }

    #[test]
    fn set_channel_id_message() {
        let mesg = set_channel_id(0, 1000, false, 0x78, 0);
        assert_eq!(mesg.id, 0x51);
        assert_eq!(mesg.data[..], [0, 0xE8, 0x03, 0x78, 0]);

        let paired = set_channel_id(0, 1000, true, 0x78, 0);
        assert_eq!(paired.data[3], 0xF8);
    }

    #[test]
    fn set_channel_period_message() {
        let mesg = set_channel_period(0, 8070);
        assert_eq!(mesg.id, 0x43);
        assert_eq!(mesg.data[..], [0, 0x86, 0x1F]);
    }

    #[test]
    fn set_channel_frequency_message() {
        let mesg = set_channel_frequency(0, 0x39);
        assert_eq!(mesg.id, 0x45);
        assert_eq!(mesg.data[..], [0, 0x39]);
    }

    #[test]
    fn open_close_unassign_messages() {
        assert_eq!(open_channel(2).id, 0x4B);
        assert_eq!(close_channel(2).id, 0x4C);
        assert_eq!(unassign_channel(2).id, 0x41);
        assert_eq!(unassign_channel(2).data[..], [2]);
    }

    #[test]
    fn enable_ext_rx_messages_message() {
        let mesg = enable_ext_rx_messages(true);
        assert_eq!(mesg.id, 0x66);
        assert_eq!(mesg.data[..], [0, 1]);
    }
}
