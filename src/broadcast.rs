/// Channel scope events. Broadcast data from a heart rate monitor carries the
/// computed heart rate at the same offset in every data page, legacy or not,
/// so that byte is all that is decoded here.
use log::{debug, info, trace, warn};

use crate::{
    defines::{ANT_EXT_MESG_DEVICE_ID_FIELD_SIZE, HEART_RATE_OFFSET},
    error::AntError,
    message::{Disposition, EventCode, MessageId, RadioMessage},
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedSample {
    pub heart_rate: u8,
}

/// Extracts the heart rate from a broadcast payload. EXT_BROADCAST_DATA
/// leads the data page with the sender's channel ID.
pub fn decode_sample(mesg: &RadioMessage) -> Result<DecodedSample> {
    let payload = mesg.payload();
    let offset = match mesg.message_id() {
        MessageId::ExtBroadcastData => ANT_EXT_MESG_DEVICE_ID_FIELD_SIZE + HEART_RATE_OFFSET,
        _ => HEART_RATE_OFFSET,
    };
    payload
        .get(offset)
        .map(|heart_rate| DecodedSample {
            heart_rate: *heart_rate,
        })
        .ok_or(AntError::MalformedPayload {
            expected: offset + 1,
            actual: payload.len(),
        })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelEventDispatcher;

impl ChannelEventDispatcher {
    pub fn new() -> Self {
        ChannelEventDispatcher
    }

    /// Handles one channel scope message. A malformed broadcast drops the
    /// sample and nothing else; the channel keeps running.
    pub fn on_channel_event(&self, mesg: &RadioMessage) -> Option<DecodedSample> {
        match mesg.message_id() {
            MessageId::BroadcastData | MessageId::ExtBroadcastData => match decode_sample(mesg) {
                Ok(sample) => {
                    trace!("Channel {} heart rate {}", mesg.channel(), sample.heart_rate);
                    Some(sample)
                }
                Err(e) => {
                    warn!("Dropping broadcast on channel {}: {}", mesg.channel(), e);
                    None
                }
            },
            MessageId::ResponseEvent => {
                match mesg.event_code() {
                    Some(EventCode::EventChannelClosed) => {
                        info!("Channel {} closed", mesg.channel())
                    }
                    Some(code) => debug!("Channel {} event {}", mesg.channel(), code),
                    None => debug!("Channel {} event without code", mesg.channel()),
                }
                None
            }
            id => {
                match id.disposition() {
                    Disposition::Unknown => debug!("Unknown channel message {}", id),
                    _ => trace!("Ignoring channel message {}", id),
                }
                None
            }
        }
    }
}
