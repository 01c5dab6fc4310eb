/// The radio as seen from the sequencer and the dispatchers. Configuration
/// calls block until the radio acknowledges the command or the timeout
/// expires and report plain success or failure. Close, extended message and
/// query requests are sent without waiting; their outcome arrives later as
/// a device event.
///
/// Received messages are delivered on the `EventSinks` a transport is
/// constructed with, never through this trait.
use std::time::Duration;

use crate::{config::ChannelType, message::MessageId, Result};

pub trait Transport: Send + Sync {
    /// Soft reset of the radio. The caller is responsible for the settle
    /// delay afterwards.
    fn reset(&self) -> Result<()>;

    fn set_network_key(&self, network_number: u8, key: &[u8; 8], timeout: Duration) -> bool;

    fn assign_channel(&self, channel_type: ChannelType, network_number: u8, timeout: Duration)
        -> bool;

    fn set_channel_id(
        &self,
        device_number: u16,
        pairing: bool,
        device_type: u8,
        transmission_type: u8,
        timeout: Duration,
    ) -> bool;

    fn set_channel_frequency(&self, offset: u8, timeout: Duration) -> bool;

    fn set_channel_period(&self, ticks: u16, timeout: Duration) -> bool;

    fn open_channel(&self, timeout: Duration) -> bool;

    fn close_channel(&self) -> Result<()>;

    fn unassign_channel(&self, timeout: Duration) -> bool;

    fn enable_extended_messages(&self, enable: bool) -> Result<()>;

    /// Asks the radio to send message `id` for the bound channel.
    fn request_message(&self, id: MessageId) -> Result<()>;

    /// Releases the radio. No events are delivered once this returns.
    fn shutdown(&self);
}
