//! DESFire session
//!
//! [`Desfire`] owns the executor (and through it the transport) for one
//! card. Operations are grouped by concern: card level and authentication
//! here, the application directory in [`directory`](crate::directory) and
//! file access in [`files`](crate::files).

use desfire_apdu_core::{ApduCommand, CardExecutor, CardTransport, Executor};
use rand::RngCore;
use tracing::{debug, info};

use crate::authenticate::{AuthMode, MutualAuthentication};
use crate::commands::{FormatPiccCommand, GetVersionCommand, SelectApplicationCommand};
use crate::config::DesfireConfig;
use crate::keys::KeyReference;
use crate::session::{AuthenticationState, SessionState};
use crate::types::{ApplicationId, Version};
use crate::{Error, Result};

/// Session with one DESFire EV1 card
///
/// Every operation takes `&mut self`: one command is in flight at a time.
/// Wrap the session in a mutex to share it between threads.
#[derive(Debug)]
pub struct Desfire<T: CardTransport> {
    executor: CardExecutor<T>,
    config: DesfireConfig,
    state: SessionState,
}

impl<T: CardTransport> Desfire<T> {
    /// Open a session over `transport` with default limits
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DesfireConfig::default())
    }

    /// Open a session over `transport`
    pub fn with_config(transport: T, config: DesfireConfig) -> Self {
        Self {
            executor: CardExecutor::with_config(transport, config.executor),
            config,
            state: SessionState::default(),
        }
    }

    /// Session configuration
    pub const fn config(&self) -> &DesfireConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        self.executor.transport()
    }

    /// Application selected by the last successful select, if any
    pub const fn selected_application(&self) -> Option<ApplicationId> {
        self.state.selected()
    }

    /// Authentication state observed by this session
    pub const fn authentication(&self) -> &AuthenticationState {
        self.state.authentication()
    }

    /// End the session, handing back the transport
    pub fn into_transport(self) -> T {
        self.executor.into_transport()
    }

    pub(crate) fn execute<C: ApduCommand>(&mut self, command: &C) -> Result<C::Success> {
        self.executor.execute(command).map_err(Error::from)
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Read manufacturing data
    pub fn get_version(&mut self) -> Result<Version> {
        self.execute(&GetVersionCommand)
    }

    /// Erase every application and file on the card
    ///
    /// Requires authentication with the PICC master key.
    pub fn format_card(&mut self) -> Result<()> {
        self.execute(&FormatPiccCommand)?;
        info!("Card formatted");
        Ok(())
    }

    /// Select an application; the zero id selects the PICC
    ///
    /// Authentication is reset whether or not the card accepts the select.
    pub fn select_application(&mut self, aid: ApplicationId) -> Result<()> {
        let result = self.execute(&SelectApplicationCommand::new(aid));
        self.state.on_select(aid, result.is_ok());
        result
    }

    /// Select the PICC level
    pub fn select_picc(&mut self) -> Result<()> {
        self.select_application(ApplicationId::PICC)
    }

    /// Authenticate against `key` of the selected application
    pub fn authenticate(&mut self, key: &KeyReference, mode: AuthMode) -> Result<()> {
        self.authenticate_with_rng(key, mode, &mut rand::rng())
    }

    /// Authenticate, drawing the host challenge from `rng`
    pub fn authenticate_with_rng<R>(
        &mut self,
        key: &KeyReference,
        mode: AuthMode,
        rng: &mut R,
    ) -> Result<()>
    where
        R: RngCore + ?Sized,
    {
        // The card drops any previous authentication as soon as a new one starts
        self.state.reset_authentication();

        MutualAuthentication::new(key, mode).run(&mut self.executor, rng)?;

        self.state.on_authenticated(key.key_no());
        debug!(key_no = key.key_no(), "Session authenticated");
        Ok(())
    }
}
