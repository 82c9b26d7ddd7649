use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;

use super::{CardTransport, TransportError};

/// Scripted transport for tests
///
/// Replays the queued responses in order and records every command it was
/// given. Once the script runs out, further transmissions fail with
/// [`TransportError::Transmission`].
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Responses still to be returned
    pub responses: VecDeque<Bytes>,
    /// Commands that were sent
    pub commands: Vec<Bytes>,
    /// Whether the transport is connected
    pub connected: bool,
    /// Artificial latency added to each exchange
    pub latency: Option<Duration>,
}

impl MockTransport {
    /// Create a new mock transport with the given responses
    pub fn new<I, B>(responses: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            commands: Vec::new(),
            connected: true,
            latency: None,
        }
    }

    /// Create a mock transport that answers a single exchange with success (91 00)
    pub fn with_success() -> Self {
        Self::new([Bytes::from_static(&[0x91, 0x00])])
    }

    /// Sleep for `latency` before answering each command
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue another response
    pub fn push_response(&mut self, response: impl Into<Bytes>) {
        self.responses.push_back(response.into());
    }

    /// Instruction bytes of the recorded commands
    pub fn instructions(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter_map(|c| c.get(1).copied())
            .collect()
    }
}

impl CardTransport for MockTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.connected {
            return Err(TransportError::Connection);
        }

        self.commands.push(Bytes::copy_from_slice(command));

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        self.responses
            .pop_front()
            .ok_or(TransportError::Transmission)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.connected = true;
        self.commands.clear();
        Ok(())
    }
}
