pub mod ant;
pub mod broadcast;
pub mod channel;
pub mod config;
pub mod defines;
pub mod device;
pub mod error;
pub mod events;
pub mod message;
pub mod sink;
pub mod transport;
pub mod usb;

pub type Result<T> = std::result::Result<T, error::AntError>;

pub use ant::{Ant, Request, RunState};
pub use broadcast::{ChannelEventDispatcher, DecodedSample};
pub use channel::{Channel, ChannelState};
pub use config::{ChannelConfig, ChannelType};
pub use crossbeam_channel::unbounded;
pub use device::DeviceEventDispatcher;
pub use error::{AntError, ConfigError, ConfigStep};
pub use events::{event_channels, Dispatchers, EventSinks};
pub use message::RadioMessage;
pub use transport::Transport;
pub use usb::{Context, UsbTransport};
