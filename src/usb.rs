/// A UsbContext and UsbDevice for interacting with the physical
/// USB device, and the `Transport` built on top of it.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Sender};
use log::{debug, error, trace, warn};
pub use rusb::{Context, UsbContext};
use rusb::{DeviceHandle, Error};

use super::{error::AntError, Result};
use crate::{
    config::ChannelType,
    events::EventSinks,
    message::{self, EventCode, Message, MessageId, RadioMessage, ReadBuffer},
    transport::Transport,
};

// TODO ANT settings are currently hardcoded and work with the Dynastream
// sticks, but need to verify if these settings work with other ANT+ USB
// devices.
const VENDOR_ID: u16 = 0x0FCF;
const USB_ANT_INTERFACE: u8 = 0;
const USB_ANT_EP_IN: u8 = 0x81;
const USB_ANT_EP_OUT: u8 = 0x01;
const TX_BUF_SIZE: usize = 255;
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// UsbDevice struct that holds the device handle to the USB device.
pub struct UsbDevice<T: UsbContext> {
    handle: DeviceHandle<T>,
}

impl<T: UsbContext> UsbDevice<T> {
    /// Initialize the USB device for the ANT+ device plugged in.
    pub fn init(ctx: &mut T) -> Result<UsbDevice<T>> {
        for device in ctx.devices()?.iter() {
            let device_desc = device.device_descriptor()?;
            if device_desc.vendor_id() == VENDOR_ID {
                let mut handle = device.open()?;
                match handle.reset() {
                    Ok(_) => {
                        handle.claim_interface(USB_ANT_INTERFACE)?;
                        return Ok(UsbDevice { handle });
                    }
                    Err(Error::NotFound) => {
                        let mut handle = device.open()?;
                        handle.claim_interface(USB_ANT_INTERFACE)?;
                        return Ok(UsbDevice { handle });
                    }
                    Err(e) => return Err(AntError::UsbDeviceError(e)),
                }
            }
        }
        Err(AntError::TransportUnavailable(format!(
            "no ANT USB device with vendor id {:#06x} found",
            VENDOR_ID
        )))
    }

    /// Read from the USB device with the specified timeout into `buffer`.
    pub fn read_with_timeout(&self, buffer: &mut [u8], timeout: Duration) -> Result<usize> {
        self.handle
            .read_bulk(USB_ANT_EP_IN, buffer, timeout)
            .map_err(AntError::UsbDeviceError)
    }

    /// Write message to the USB device with a timeout of 1 second.
    pub fn write(&self, message: &[u8]) -> Result<usize> {
        self.write_with_timeout(message, Duration::from_secs(1))
    }

    /// Write message to the USB device with a specified timeout.
    pub fn write_with_timeout(&self, message: &[u8], timeout: Duration) -> Result<usize> {
        self.handle
            .write_bulk(USB_ANT_EP_OUT, message, timeout)
            .map_err(AntError::UsbDeviceError)
    }
}

// Commands waiting on their RESPONSE_EVENT, keyed by the id of the command.
type Pending = Arc<Mutex<Vec<(MessageId, Sender<EventCode>)>>>;

fn lock(pending: &Pending) -> MutexGuard<'_, Vec<(MessageId, Sender<EventCode>)>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

/// Transport over an ANT USB stick, bound to a single channel.
///
/// A reader thread owns the receive side. Acknowledgements for commands
/// issued through the blocking calls are handed to the waiting caller first
/// and then delivered as device events like every other message, so a
/// dispatcher can issue a blocking command without starving the reader.
pub struct UsbTransport<T: UsbContext + 'static> {
    device: Arc<UsbDevice<T>>,
    channel: u8,
    pending: Pending,
    running: Arc<AtomicBool>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl<T: UsbContext + 'static> UsbTransport<T> {
    pub fn init(ctx: &mut T, channel: u8, sinks: EventSinks) -> Result<Self> {
        let device = Arc::new(UsbDevice::init(ctx)?);
        let pending: Pending = Arc::new(Mutex::new(vec![]));
        let running = Arc::new(AtomicBool::new(true));
        let reader = {
            let device = device.clone();
            let pending = pending.clone();
            let running = running.clone();
            thread::Builder::new()
                .name("ant-usb-reader".into())
                .spawn(move || read_loop(&device, &pending, &running, sinks))?
        };
        Ok(UsbTransport {
            device,
            channel,
            pending,
            running,
            reader: Mutex::new(Some(reader)),
        })
    }

    fn send(&self, mesg: &Message) -> Result<()> {
        trace!("Writing {:?}", mesg);
        self.device.write(&mesg.encode())?;
        Ok(())
    }

    // Sends a command and blocks until the radio acknowledges it or the
    // timeout expires. Only RESPONSE_NO_ERROR counts as success.
    fn command(&self, mesg: Message, timeout: Duration) -> bool {
        let id = MessageId::from(mesg.id);
        let (tx, rx) = bounded(1);
        lock(&self.pending).push((id, tx));
        let ok = match self.send(&mesg) {
            Ok(()) => match rx.recv_timeout(timeout) {
                Ok(EventCode::ResponseNoError) => true,
                Ok(code) => {
                    warn!("{} rejected with {}", id, code);
                    false
                }
                Err(_) => {
                    warn!("No response to {} within {:?}", id, timeout);
                    false
                }
            },
            Err(e) => {
                error!("Error writing {}: {}", id, e);
                false
            }
        };
        lock(&self.pending).retain(|(waiting, _)| *waiting != id);
        ok
    }
}

fn read_loop<T: UsbContext>(
    device: &UsbDevice<T>,
    pending: &Pending,
    running: &AtomicBool,
    sinks: EventSinks,
) {
    let mut buffer = [0; TX_BUF_SIZE];
    while running.load(Ordering::SeqCst) {
        match device.read_with_timeout(&mut buffer, READ_TIMEOUT) {
            Ok(len) => {
                for frame in ReadBuffer::new(&buffer[..len]) {
                    let mesg = RadioMessage::from(&frame);
                    notify_waiter(pending, &mesg);
                    if !sinks.deliver(mesg) {
                        debug!("Event consumers gone, stopping reader");
                        return;
                    }
                }
            }
            Err(AntError::UsbDeviceError(rusb::Error::Timeout)) => {}
            Err(e) => {
                error!("Error reading from ANT USB device: {}", e);
                return;
            }
        }
    }
}

fn notify_waiter(pending: &Pending, mesg: &RadioMessage) {
    if mesg.message_id() != MessageId::ResponseEvent {
        return;
    }
    if let (Some(id), Some(code)) = (mesg.sub_message_id(), mesg.event_code()) {
        let mut pending = lock(pending);
        if let Some(index) = pending.iter().position(|(waiting, _)| *waiting == id) {
            let (_, tx) = pending.remove(index);
            let _ = tx.try_send(code);
        }
    }
}

impl<T: UsbContext + 'static> Transport for UsbTransport<T> {
    fn reset(&self) -> Result<()> {
        self.send(&message::reset())
    }

    fn set_network_key(&self, network_number: u8, key: &[u8; 8], timeout: Duration) -> bool {
        self.command(message::set_network_key(network_number, key), timeout)
    }

    fn assign_channel(
        &self,
        channel_type: ChannelType,
        network_number: u8,
        timeout: Duration,
    ) -> bool {
        self.command(
            message::assign_channel(self.channel, channel_type.as_byte(), network_number),
            timeout,
        )
    }

    fn set_channel_id(
        &self,
        device_number: u16,
        pairing: bool,
        device_type: u8,
        transmission_type: u8,
        timeout: Duration,
    ) -> bool {
        self.command(
            message::set_channel_id(
                self.channel,
                device_number,
                pairing,
                device_type,
                transmission_type,
            ),
            timeout,
        )
    }

    fn set_channel_frequency(&self, offset: u8, timeout: Duration) -> bool {
        self.command(message::set_channel_frequency(self.channel, offset), timeout)
    }

    fn set_channel_period(&self, ticks: u16, timeout: Duration) -> bool {
        self.command(message::set_channel_period(self.channel, ticks), timeout)
    }

    fn open_channel(&self, timeout: Duration) -> bool {
        self.command(message::open_channel(self.channel), timeout)
    }

    fn close_channel(&self) -> Result<()> {
        self.send(&message::close_channel(self.channel))
    }

    fn unassign_channel(&self, timeout: Duration) -> bool {
        self.command(message::unassign_channel(self.channel), timeout)
    }

    fn enable_extended_messages(&self, enable: bool) -> Result<()> {
        self.send(&message::enable_ext_rx_messages(enable))
    }

    fn request_message(&self, id: MessageId) -> Result<()> {
        self.send(&message::request(self.channel, id))
    }

    fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(reader) = reader {
            if reader.join().is_err() {
                error!("ANT USB reader panicked");
            }
            debug!("ANT USB transport shut down");
        }
    }
}

impl<T: UsbContext + 'static> Drop for UsbTransport<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
