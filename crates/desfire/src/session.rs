//! Client-side mirror of the card's selection and authentication state
//!
//! The card is the source of truth. This mirror only records what the
//! driver has observed so callers can inspect it; operations are never
//! refused on its basis.

use tracing::debug;

use crate::types::ApplicationId;

/// Authentication state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthenticationState {
    /// No completed handshake for the current selection
    #[default]
    Unauthenticated,
    /// A handshake completed against `key_no` of `application`
    Authenticated {
        /// Application that was selected during the handshake
        application: ApplicationId,
        /// Key slot that was proven
        key_no: u8,
    },
}

impl AuthenticationState {
    /// Check if a handshake has completed for the current selection
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Observed card-side state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SessionState {
    selected: Option<ApplicationId>,
    authentication: AuthenticationState,
}

impl SessionState {
    /// Currently selected application, if known
    pub(crate) const fn selected(&self) -> Option<ApplicationId> {
        self.selected
    }

    pub(crate) const fn authentication(&self) -> &AuthenticationState {
        &self.authentication
    }

    /// Record a selection attempt; authentication is dropped whatever the outcome
    pub(crate) fn on_select(&mut self, aid: ApplicationId, succeeded: bool) {
        self.selected = succeeded.then_some(aid);
        self.reset_authentication();
        debug!(%aid, succeeded, "Selection changed");
    }

    /// Record a successful handshake
    pub(crate) fn on_authenticated(&mut self, key_no: u8) {
        // The card starts at PICC level after activation
        let application = self.selected.unwrap_or(ApplicationId::PICC);
        self.authentication = AuthenticationState::Authenticated {
            application,
            key_no,
        };
    }

    /// Record that the application was deleted
    pub(crate) fn on_application_deleted(&mut self, aid: ApplicationId) {
        if self.selected == Some(aid) {
            self.selected = Some(ApplicationId::PICC);
            self.reset_authentication();
        }
    }

    pub(crate) fn reset_authentication(&mut self) {
        self.authentication = AuthenticationState::Unauthenticated;
    }
}
