//! Session state machine.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::identity::Identity;

/// Authentication state of the storefront session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Identity),
}

impl SessionState {
    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous | Self::Authenticating => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Errors raised by session transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The requested transition is not allowed from the current state.
    #[error("cannot move session from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Identity holder for one storefront session.
///
/// State changes are published on a watch channel so that dependants (the cart manager) can
/// re-derive their partition from the current identity.
#[derive(Debug)]
pub struct Session {
    state: watch::Sender<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(SessionState::Anonymous),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// `Anonymous -> Authenticating`, when credentials are submitted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is anonymous.
    pub fn begin_authentication(&self) -> Result<(), SessionError> {
        self.transition("authenticating", |state| match state {
            SessionState::Anonymous => Some(SessionState::Authenticating),
            SessionState::Authenticating | SessionState::Authenticated(_) => None,
        })
    }

    /// `Authenticating -> Authenticated`, once a valid credential was received.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless authentication is in progress.
    pub fn complete_authentication(&self, identity: Identity) -> Result<(), SessionError> {
        let email = identity.email.clone();

        self.transition("authenticated", move |state| match state {
            SessionState::Authenticating => Some(SessionState::Authenticated(identity)),
            SessionState::Anonymous | SessionState::Authenticated(_) => None,
        })?;

        info!(email = %email, "session authenticated");

        Ok(())
    }

    /// `Authenticating -> Anonymous`, when credentials were rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless authentication is in progress.
    pub fn reject_authentication(&self) -> Result<(), SessionError> {
        self.transition("anonymous", |state| match state {
            SessionState::Authenticating => Some(SessionState::Anonymous),
            SessionState::Anonymous | SessionState::Authenticated(_) => None,
        })
    }

    /// `Authenticated -> Anonymous`, on explicit sign-out.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is authenticated.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.transition("anonymous", |state| match state {
            SessionState::Authenticated(_) => Some(SessionState::Anonymous),
            SessionState::Anonymous | SessionState::Authenticating => None,
        })?;

        info!("session signed out");

        Ok(())
    }

    fn transition(
        &self,
        to: &'static str,
        next: impl FnOnce(&SessionState) -> Option<SessionState>,
    ) -> Result<(), SessionError> {
        let current = self.state.borrow().clone();

        let Some(next) = next(&current) else {
            return Err(SessionError::InvalidTransition {
                from: current.name(),
                to,
            });
        };

        debug!(from = %current, to, "session transition");

        self.state.send_replace(next);

        Ok(())
    }
}
