use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, error, info, warn};

use super::Result;
use crate::{
    channel::Channel,
    defines,
    error::AntError,
    message::MessageId,
    transport::Transport,
};

/// Flags shared between the run loop, the sequencer and the two event
/// dispatchers. Every access goes through an atomic so a write from a
/// dispatcher thread is never lost and is seen by the next poll.
#[derive(Debug, Default)]
pub struct RunState {
    done: AtomicBool,
    broadcasting: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    pub fn set_done(&self) {
        self.done.store(true, Ordering::SeqCst);
    }

    pub fn is_broadcasting(&self) -> bool {
        self.broadcasting.load(Ordering::SeqCst)
    }

    pub fn set_broadcasting(&self, broadcasting: bool) {
        self.broadcasting.store(broadcasting, Ordering::SeqCst);
    }
}

/// Operator requests for the run loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// Close the channel and wait for the radio to confirm the teardown.
    Stop,
    /// Release the radio right away without waiting for confirmation.
    Abort,
    /// Ask the radio for a message, e.g. its capabilities or the channel
    /// status. The reply is handled by the device event dispatcher.
    Query(MessageId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Running,
    Draining,
    Terminated,
}

/// Ant drives one channel through its lifecycle: configuration, the
/// running poll loop and the confirmed teardown.
pub struct Ant {
    transport: Arc<dyn Transport>,
    channel: Channel,
    state: Arc<RunState>,
    requests: Receiver<Request>,
    phase: Phase,
    poll_interval: Duration,
}

impl Ant {
    pub fn new(
        transport: Arc<dyn Transport>,
        channel: Channel,
        state: Arc<RunState>,
        requests: Receiver<Request>,
    ) -> Self {
        Ant {
            transport,
            channel,
            state,
            requests,
            phase: Phase::Configuring,
            poll_interval: defines::POLL_INTERVAL,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Configures the channel. A failed configuration releases the
    /// transport; a fresh `Ant` is needed to try again.
    pub fn start(&mut self) -> Result<()> {
        if self.phase != Phase::Configuring {
            return Err(AntError::UnexpectedEventOrdering(format!(
                "start requested while {:?}",
                self.phase
            )));
        }
        match self.channel.configure(self.transport.as_ref(), &self.state) {
            Ok(()) => {
                info!("Channel {} open", self.channel.config().channel_number);
                self.phase = Phase::Running;
                Ok(())
            }
            Err(e) => {
                self.terminate();
                Err(e.into())
            }
        }
    }

    /// Polls until the dispatchers report the channel unassigned, or the
    /// operator aborts. Teardown is only ever driven by confirmed events.
    pub fn run(&mut self) -> Result<()> {
        match self.phase {
            Phase::Running | Phase::Draining => {}
            phase => {
                return Err(AntError::UnexpectedEventOrdering(format!(
                    "run requested while {:?}",
                    phase
                )))
            }
        }
        let mut requests_open = true;
        while self.phase != Phase::Terminated {
            if self.state.is_done() {
                if let Err(e) = self.channel.mark_unassigned() {
                    warn!("{}", e);
                }
                self.terminate();
                break;
            }
            if !requests_open {
                std::thread::sleep(self.poll_interval);
                continue;
            }
            match self.requests.recv_timeout(self.poll_interval) {
                Ok(Request::Stop) => self.stop(),
                Ok(Request::Query(id)) => {
                    debug!("Requesting {}", id);
                    if let Err(e) = self.transport.request_message(id) {
                        error!("Error requesting {}: {}", id, e);
                    }
                }
                Ok(Request::Abort) => {
                    warn!("Aborting without waiting for the channel to close");
                    self.terminate();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Request channel closed");
                    requests_open = false;
                }
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        match self.channel.begin_close(self.transport.as_ref()) {
            Ok(()) => {
                debug!("Setting phase to Draining");
                self.phase = Phase::Draining;
            }
            Err(e) => error!("Error closing channel: {}", e),
        }
    }

    fn terminate(&mut self) {
        if self.phase == Phase::Terminated {
            return;
        }
        info!("Disconnecting module...");
        self.transport.shutdown();
        self.phase = Phase::Terminated;
    }
}
