/// Event plumbing between a transport and the two dispatchers. A transport
/// pushes every received message into `EventSinks`, which routes it by scope
/// onto one of two bounded queues. Each queue has a single consumer thread,
/// so per-scope delivery order is kept while the two scopes run
/// independently of each other and of the run loop.
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, error, trace, warn};

use crate::{
    ant::RunState,
    broadcast::ChannelEventDispatcher,
    device::DeviceEventDispatcher,
    message::{RadioMessage, Scope},
    sink::SampleSink,
    Result,
};

/// Sending half, owned by the transport.
#[derive(Clone, Debug)]
pub struct EventSinks {
    device: Sender<RadioMessage>,
    channel: Sender<RadioMessage>,
}

impl EventSinks {
    /// Routes a message to its queue. Returns false once the consuming side
    /// has gone away.
    ///
    /// The channel queue applies back-pressure. The device queue never blocks:
    /// its dispatcher may itself be waiting on an acknowledgement that only
    /// the caller can read, so a message that finds it full is dropped.
    pub fn deliver(&self, mesg: RadioMessage) -> bool {
        trace!("Delivering {:?} event {}", mesg.scope(), mesg.message_id());
        match mesg.scope() {
            Scope::Channel => self.channel.send(mesg).is_ok(),
            Scope::Device => match self.device.try_send(mesg) {
                Ok(()) => true,
                Err(TrySendError::Full(mesg)) => {
                    warn!("Device event queue full, dropping {}", mesg.message_id());
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            },
        }
    }
}

/// Receiving half, consumed by `Dispatchers::spawn`.
#[derive(Debug)]
pub struct EventStreams {
    pub device: Receiver<RadioMessage>,
    pub channel: Receiver<RadioMessage>,
}

pub fn event_channels(capacity: usize) -> (EventSinks, EventStreams) {
    let (device_tx, device_rx) = bounded(capacity);
    let (channel_tx, channel_rx) = bounded(capacity);
    (
        EventSinks {
            device: device_tx,
            channel: channel_tx,
        },
        EventStreams {
            device: device_rx,
            channel: channel_rx,
        },
    )
}

/// The two dispatch threads. They exit once every `EventSinks` clone has
/// been dropped, which happens when the transport shuts down.
pub struct Dispatchers {
    device: JoinHandle<()>,
    channel: JoinHandle<()>,
}

impl Dispatchers {
    pub fn spawn(
        streams: EventStreams,
        device: DeviceEventDispatcher,
        channel: ChannelEventDispatcher,
        state: Arc<RunState>,
        mut sink: Box<dyn SampleSink>,
    ) -> Result<Dispatchers> {
        let EventStreams {
            device: device_rx,
            channel: channel_rx,
        } = streams;

        let device = thread::Builder::new()
            .name("ant-device-events".into())
            .spawn(move || {
                for mesg in device_rx.iter() {
                    device.on_device_event(&mesg, &state);
                }
                debug!("Device event stream closed");
            })?;

        let channel = thread::Builder::new()
            .name("ant-channel-events".into())
            .spawn(move || {
                for mesg in channel_rx.iter() {
                    if let Some(sample) = channel.on_channel_event(&mesg) {
                        if let Err(e) = sink.record(sample) {
                            error!("Error recording sample: {}", e);
                        }
                    }
                }
                debug!("Channel event stream closed");
            })?;

        Ok(Dispatchers { device, channel })
    }

    /// Waits for both dispatch threads to drain their queues and exit.
    pub fn join(self) {
        if self.device.join().is_err() {
            error!("Device event dispatcher panicked");
        }
        if self.channel.join().is_err() {
            error!("Channel event dispatcher panicked");
        }
    }
}
