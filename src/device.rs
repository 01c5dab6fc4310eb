/// Device scope events: startup and version reports, and the acknowledgements
/// the radio sends back for every command. Besides reporting, the dispatcher
/// drives the last step of shutdown: once the radio says a close request found
/// the channel already closed, the channel is unassigned and the run is done.
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, trace, warn};

use crate::{
    ant::RunState,
    defines,
    error::AntError,
    message::{reset_reasons, Disposition, EventCode, MessageId, RadioMessage, ResetReason},
    transport::Transport,
};

/// What a device event amounted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceOutcome {
    Startup(Vec<ResetReason>),
    Version(String),
    /// Command acknowledged without error.
    Acknowledged(MessageId),
    /// The close found the channel closed and the unassign went through.
    Unassigned,
    UnassignFailed,
    ConfigError { id: MessageId, code: EventCode },
    ExtendedMessagesEnabled,
    ExtendedMessagesUnsupported,
    RequestUnsupported,
    Unhandled {
        id: Option<MessageId>,
        code: Option<EventCode>,
    },
    Ignored,
}

pub struct DeviceEventDispatcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl DeviceEventDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        DeviceEventDispatcher {
            transport,
            timeout: defines::RESPONSE_TIMEOUT,
        }
    }

    pub fn on_device_event(&self, mesg: &RadioMessage, state: &RunState) -> DeviceOutcome {
        match mesg.message_id() {
            MessageId::StartupMesg => {
                let reasons = reset_reasons(mesg.payload().first().copied().unwrap_or(0));
                for reason in &reasons {
                    info!("RESET complete, reason: {}", reason.label());
                }
                DeviceOutcome::Startup(reasons)
            }
            MessageId::Version => {
                let version = String::from_utf8_lossy(mesg.payload())
                    .trim_end_matches('\0')
                    .to_string();
                info!("VERSION: {}", version);
                DeviceOutcome::Version(version)
            }
            MessageId::ResponseEvent => self.on_response(mesg, state),
            id => {
                match id.disposition() {
                    Disposition::Unknown => debug!("Unknown device message {}", id),
                    _ => trace!("Ignoring device message {}: {:x?}", id, mesg.payload()),
                }
                DeviceOutcome::Ignored
            }
        }
    }

    fn on_response(&self, mesg: &RadioMessage, state: &RunState) -> DeviceOutcome {
        let (id, code) = match (mesg.sub_message_id(), mesg.event_code()) {
            (Some(id), Some(code)) => (id, code),
            (id, code) => {
                warn!("Unhandled response {:?} to message {:?}", code, id);
                return DeviceOutcome::Unhandled { id, code };
            }
        };
        match id {
            MessageId::CloseChannel => {
                if code == EventCode::ChannelInWrongState {
                    info!("Channel is already closed");
                    info!("Unassigning channel...");
                    if self.transport.unassign_channel(self.timeout) {
                        info!("Unassigned channel");
                        state.set_done();
                        DeviceOutcome::Unassigned
                    } else {
                        error!("Error unassigning channel");
                        DeviceOutcome::UnassignFailed
                    }
                } else {
                    debug!("Close channel acknowledged with {}", code);
                    DeviceOutcome::Acknowledged(id)
                }
            }
            MessageId::NetworkKey
            | MessageId::AssignChannel
            | MessageId::ChannelId
            | MessageId::ChannelRadioFreq
            | MessageId::ChannelMesgPeriod
            | MessageId::OpenChannel
            | MessageId::UnassignChannel => {
                if code == EventCode::ResponseNoError {
                    return DeviceOutcome::Acknowledged(id);
                }
                error!("Error {} configuring {}", code, id);
                if state.is_broadcasting() {
                    // Configuration already reported success, so this is a
                    // late or duplicate acknowledgement.
                    let e = AntError::UnexpectedEventOrdering(format!(
                        "{} for {} after the channel opened",
                        code, id
                    ));
                    warn!("{}", e);
                }
                DeviceOutcome::ConfigError { id, code }
            }
            MessageId::RxExtMesgsEnable => match code {
                EventCode::InvalidMessage => {
                    info!("Extended messages not supported in this ANT product");
                    DeviceOutcome::ExtendedMessagesUnsupported
                }
                EventCode::ResponseNoError => {
                    info!("Extended messages enabled");
                    DeviceOutcome::ExtendedMessagesEnabled
                }
                _ => {
                    error!("Error {} configuring {}", code, id);
                    DeviceOutcome::ConfigError { id, code }
                }
            },
            MessageId::Request if code == EventCode::InvalidMessage => {
                info!("Requested message not supported in this ANT product");
                DeviceOutcome::RequestUnsupported
            }
            _ => {
                info!("Unhandled response {} to message {}", code, id);
                DeviceOutcome::Unhandled {
                    id: Some(id),
                    code: Some(code),
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transport::mock::{Command, MockTransport};

    fn dispatcher() -> (DeviceEventDispatcher, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        (DeviceEventDispatcher::new(transport.clone()), transport)
    }

    #[test]
    fn startup_reports_each_reason() {
        let (dispatcher, _) = dispatcher();
        let state = RunState::new();
        let mesg = RadioMessage::new(MessageId::StartupMesg, 0, &[0x03]);
        assert_eq!(
            dispatcher.on_device_event(&mesg, &state),
            DeviceOutcome::Startup(vec![ResetReason::PowerOn, ResetReason::HardwareLine])
        );
        assert!(!state.is_done());
    }

    #[test]
    fn version_is_ascii() {
        let (dispatcher, _) = dispatcher();
        let mesg = RadioMessage::new(MessageId::Version, 0, b"AP2USB1.05\0");
        assert_eq!(
            dispatcher.on_device_event(&mesg, &RunState::new()),
            DeviceOutcome::Version("AP2USB1.05".to_string())
        );
    }

    #[test]
    fn close_in_wrong_state_unassigns_and_finishes() {
        let (dispatcher, transport) = dispatcher();
        let state = RunState::new();
        let mesg = RadioMessage::response(0, MessageId::CloseChannel, EventCode::ChannelInWrongState);
        assert_eq!(
            dispatcher.on_device_event(&mesg, &state),
            DeviceOutcome::Unassigned
        );
        assert_eq!(transport.calls(), vec![Command::Unassign]);
        assert!(state.is_done());
    }

    #[test]
    fn failed_unassign_keeps_running() {
        let (dispatcher, transport) = dispatcher();
        transport.fail(Command::Unassign);
        let state = RunState::new();
        let mesg = RadioMessage::response(0, MessageId::CloseChannel, EventCode::ChannelInWrongState);
        assert_eq!(
            dispatcher.on_device_event(&mesg, &state),
            DeviceOutcome::UnassignFailed
        );
        assert!(!state.is_done());
    }

    #[test]
    fn other_orderings_do_not_finish() {
        let (dispatcher, transport) = dispatcher();
        let state = RunState::new();
        let events = [
            RadioMessage::response(0, MessageId::UnassignChannel, EventCode::ResponseNoError),
            RadioMessage::response(0, MessageId::CloseChannel, EventCode::ResponseNoError),
            RadioMessage::channel_event(0, EventCode::EventChannelClosed),
            RadioMessage::response(0, MessageId::OpenChannel, EventCode::ChannelInWrongState),
        ];
        for mesg in events.iter() {
            dispatcher.on_device_event(mesg, &state);
        }
        assert!(!state.is_done());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn configuration_errors_are_reported() {
        let (dispatcher, _) = dispatcher();
        let state = RunState::new();
        let mesg = RadioMessage::response(0, MessageId::ChannelId, EventCode::ChannelInWrongState);
        assert_eq!(
            dispatcher.on_device_event(&mesg, &state),
            DeviceOutcome::ConfigError {
                id: MessageId::ChannelId,
                code: EventCode::ChannelInWrongState
            }
        );
        let ok = RadioMessage::response(0, MessageId::NetworkKey, EventCode::ResponseNoError);
        assert_eq!(
            dispatcher.on_device_event(&ok, &state),
            DeviceOutcome::Acknowledged(MessageId::NetworkKey)
        );

        // Late error after the channel opened stays a report, nothing more.
        state.set_broadcasting(true);
        let late = RadioMessage::response(0, MessageId::OpenChannel, EventCode::Other(0x40));
        assert_eq!(
            dispatcher.on_device_event(&late, &state),
            DeviceOutcome::ConfigError {
                id: MessageId::OpenChannel,
                code: EventCode::Other(0x40)
            }
        );
        assert!(state.is_broadcasting());
        assert!(!state.is_done());
    }

    #[test]
    fn extended_messages_unsupported_is_not_an_error() {
        let (dispatcher, _) = dispatcher();
        let state = RunState::new();
        let unsupported =
            RadioMessage::response(0, MessageId::RxExtMesgsEnable, EventCode::InvalidMessage);
        assert_eq!(
            dispatcher.on_device_event(&unsupported, &state),
            DeviceOutcome::ExtendedMessagesUnsupported
        );
        let enabled =
            RadioMessage::response(0, MessageId::RxExtMesgsEnable, EventCode::ResponseNoError);
        assert_eq!(
            dispatcher.on_device_event(&enabled, &state),
            DeviceOutcome::ExtendedMessagesEnabled
        );
        let failed =
            RadioMessage::response(0, MessageId::RxExtMesgsEnable, EventCode::InvalidParameterProvided);
        assert_eq!(
            dispatcher.on_device_event(&failed, &state),
            DeviceOutcome::ConfigError {
                id: MessageId::RxExtMesgsEnable,
                code: EventCode::InvalidParameterProvided
            }
        );
    }

    #[test]
    fn request_and_unhandled_responses() {
        let (dispatcher, _) = dispatcher();
        let state = RunState::new();
        let request = RadioMessage::response(0, MessageId::Request, EventCode::InvalidMessage);
        assert_eq!(
            dispatcher.on_device_event(&request, &state),
            DeviceOutcome::RequestUnsupported
        );
        let other = RadioMessage::response(0, MessageId::RadioTxPower, EventCode::ResponseNoError);
        assert_eq!(
            dispatcher.on_device_event(&other, &state),
            DeviceOutcome::Unhandled {
                id: Some(MessageId::RadioTxPower),
                code: Some(EventCode::ResponseNoError)
            }
        );
        let request_ok = RadioMessage::response(0, MessageId::Request, EventCode::ResponseNoError);
        assert_eq!(
            dispatcher.on_device_event(&request_ok, &state),
            DeviceOutcome::Unhandled {
                id: Some(MessageId::Request),
                code: Some(EventCode::ResponseNoError)
            }
        );
    }

    #[test]
    fn inert_device_messages_are_ignored() {
        let (dispatcher, _) = dispatcher();
        let state = RunState::new();
        for id in [MessageId::Capabilities, MessageId::ChannelStatus, MessageId::Unknown(0xEE)].iter() {
            let mesg = RadioMessage::new(*id, 0, &[0, 0, 0]);
            assert_eq!(dispatcher.on_device_event(&mesg, &state), DeviceOutcome::Ignored);
        }
    }
}
