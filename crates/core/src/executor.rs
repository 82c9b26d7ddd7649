//! Executor for DESFire command exchanges
//!
//! The executor turns commands into wire frames, sends them through a
//! [`CardTransport`] and reassembles responses that the card splits across
//! several continuation frames.

use std::fmt;
use std::time::Instant;

use bytes::BytesMut;
use tracing::{Level, debug, info, instrument, trace, warn};

use crate::command::{ApduCommand, Command, INS_ADDITIONAL_FRAME};
use crate::config::ExecutorConfig;
use crate::response::status::Status;
use crate::transport::{CardTransport, TransportError};
use crate::{Error, Response, Result};

/// Trait for APDU command execution
pub trait Executor: Send + Sync + fmt::Debug {
    /// The transport type used by this executor
    type Transport: CardTransport;

    /// Get a reference to the underlying transport
    fn transport(&self) -> &Self::Transport;

    /// Get a mutable reference to the underlying transport
    fn transport_mut(&mut self) -> &mut Self::Transport;

    /// Get the execution limits
    fn config(&self) -> &ExecutorConfig;

    /// Send one frame and parse the single response frame
    ///
    /// No continuation handling is performed; a `91 AF` reply is returned as is.
    fn transmit(&mut self, command: &Command) -> Result<Response> {
        let command_bytes = command.to_bytes()?;
        let response_bytes = self.transport_mut().transmit_raw(&command_bytes)?;
        let response = Response::from_bytes(&response_bytes)?;
        let status = response.status();
        let level = status.tracing_level();
        if level == Level::WARN {
            warn!(ins = command.ins, %status, "Card rejected command");
        } else if level == Level::INFO {
            info!(ins = command.ins, %status, "Card reported duplicate");
        } else {
            trace!(ins = command.ins, %status, len = response.payload().len(), "Received frame");
        }
        Ok(response)
    }

    /// Send a command and collect every continuation frame of its response
    ///
    /// While the card answers `91 AF`, an additional-frame request is sent and
    /// the returned data is appended. The accumulated data is returned with the
    /// status of the final frame. An error status on any follow-up frame aborts
    /// the chain and the partial data is discarded.
    ///
    /// If the first frame is not a continuation it is returned unchanged, so
    /// callers can interpret statuses such as `91 DE` themselves.
    #[instrument(level = "debug", skip_all, fields(ins = command.ins))]
    fn transmit_chained(&mut self, command: &Command) -> Result<Response> {
        let config = *self.config();
        let deadline = Instant::now() + config.chain_timeout;

        let first = self.transmit(command)?;
        if first.outcome() != Status::Continuation {
            return Ok(first);
        }

        let mut data = BytesMut::from(first.payload().as_ref());
        let follow_up = Command::new(INS_ADDITIONAL_FRAME);

        for frame in 1..=config.max_continuation_frames {
            if Instant::now() >= deadline {
                warn!(frame, "Continuation chain ran past its deadline");
                return Err(TransportError::Timeout.into());
            }

            let next = self.transmit(&follow_up)?;
            match next.outcome() {
                Status::Continuation => {
                    if next.payload().is_empty() {
                        return Err(Error::protocol("continuation frame without data"));
                    }
                    data.extend_from_slice(next.payload());
                }
                Status::Success => {
                    data.extend_from_slice(next.payload());
                    trace!(frames = frame + 1, len = data.len(), "Chain complete");
                    return Ok(Response::new(data.freeze(), next.status()));
                }
                Status::DuplicateExists | Status::Error(..) => {
                    debug!(frame, status = %next.status(), "Chain aborted by card");
                    return Err(Error::Status(next.status()));
                }
            }
        }

        Err(Error::ChainLimitExceeded(config.max_continuation_frames))
    }

    /// Execute a typed command and parse its result
    fn execute<C>(&mut self, command: &C) -> Result<C::Success>
    where
        C: ApduCommand,
    {
        let chained = command.chained();
        let command = command.to_command();
        let response = if chained {
            self.transmit_chained(&command)?
        } else {
            self.transmit(&command)?
        };
        C::parse_response(response)
    }

    /// Reset the executor, including the transport
    fn reset(&mut self) -> Result<()>;
}

/// Executor that drives a single card transport
#[derive(Debug)]
pub struct CardExecutor<T: CardTransport> {
    transport: T,
    config: ExecutorConfig,
}

impl<T: CardTransport> CardExecutor<T> {
    /// Create a new executor with default limits
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ExecutorConfig::default())
    }

    /// Create a new executor with explicit limits
    pub const fn with_config(transport: T, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    /// Release the transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: CardTransport> Executor for CardExecutor<T> {
    type Transport = T;

    fn transport(&self) -> &Self::Transport {
        &self.transport
    }

    fn transport_mut(&mut self) -> &mut Self::Transport {
        &mut self.transport
    }

    fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    fn reset(&mut self) -> Result<()> {
        self.transport.reset()?;
        Ok(())
    }
}
