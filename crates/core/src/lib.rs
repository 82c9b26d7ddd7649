//! Core traits and types for DESFire native command exchanges
//!
//! This crate covers the wire layer shared by every DESFire operation:
//!
//! - building the wrapped command envelope ([`Command`], [`ApduCommand`])
//! - parsing response frames and classifying status words ([`Response`], [`StatusWord`])
//! - moving bytes to the card ([`CardTransport`])
//! - reassembling responses split over continuation frames ([`CardExecutor`])
//! - little-endian field codecs ([`codec`])
//!
//! Card-level operations built on top of it live in the `desfire-ev1` crate.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod codec;
pub mod command;
pub mod config;
pub mod executor;
pub mod response;
pub mod transport;

mod error;
pub use error::{Error, Result};

pub use command::{ApduCommand, Command};
pub use config::ExecutorConfig;
pub use executor::{CardExecutor, Executor};
pub use response::status::{Status, StatusWord};
pub use response::{Response, utils};
pub use transport::{CardTransport, TransportError};

#[cfg(any(test, feature = "mock"))]
pub use transport::MockTransport;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, Command, Error, ExecutorConfig, Response, Result,
        command::ApduCommand,
        executor::{CardExecutor, Executor},
        response::status::{Status, StatusWord},
        transport::{CardTransport, TransportError},
    };
}
