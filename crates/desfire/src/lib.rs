//! DESFire EV1 native command driver
//!
//! Drives a DESFire EV1 card through any [`CardTransport`]: DES mutual
//! authentication, the application directory, and the four file kinds
//! (standard, value, linear record and cyclic record) with value
//! transactions.
//!
//! ```no_run
//! use desfire_ev1::{AccessRights, ApplicationId, AuthMode, CommMode, Desfire, KeyReference, KeySettings};
//! # fn run<T: desfire_ev1::CardTransport>(transport: T) -> desfire_ev1::Result<()> {
//! let mut card = Desfire::new(transport);
//! let aid = ApplicationId::new([0x01, 0x02, 0x03]);
//!
//! card.select_picc()?;
//! card.create_application(aid, KeySettings::DEFAULT, 1)?;
//! card.select_application(aid)?;
//! card.authenticate(&KeyReference::factory_master(), AuthMode::Legacy)?;
//! card.create_std_data_file(1, CommMode::Plain, AccessRights::FREE, 32)?;
//! card.write_data(1, 0, b"hello")?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod authenticate;
pub mod card;
pub mod chunks;
pub mod commands;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod directory;
pub mod error;
pub mod files;
pub mod keys;
pub mod session;
pub mod types;

pub use authenticate::{AuthMode, AuthState, MutualAuthentication};
pub use card::Desfire;
pub use chunks::WriteChunks;
pub use config::DesfireConfig;
pub use error::{AuthFailure, Error, ErrorCategory, Result};
pub use keys::{DesKey, KeyReference};
pub use session::AuthenticationState;
pub use types::{
    AccessRights, ApplicationId, CommMode, CreateOutcome, FileKind, FileLayout, FileSettings,
    KeySettings, KeySettingsInfo, ValueFileConfig, Version, VersionInfo,
};

pub use desfire_apdu_core::{CardTransport, ExecutorConfig, StatusWord, TransportError};
