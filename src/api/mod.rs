//! # API Module
//!
//! HTTP handlers for the local login server. The server exists only to run
//! the authorization code flow once; after a successful callback the handlers
//! signal the orchestrator, which shuts the server down.
//!
//! ## Endpoints
//!
//! - [`login`] - sets the anti-CSRF state cookie and redirects to Spotify
//! - [`callback`] - validates the state, exchanges the code, installs the token
//! - [`health`] - status and version for monitoring
//!
//! ## Security Considerations
//!
//! - The `state` query parameter must equal the `spotify_state_auth` cookie set
//!   by `/login`; anything else is rejected before the code is exchanged.
//! - A second successful callback is refused by the session
//!   (`AlreadyAuthorized`).

mod health;
mod login;

use tokio::sync::mpsc;

use crate::spotify::AuthSession;

pub use health::health;
pub use login::{CallbackParams, CallbackResponse, STATE_COOKIE, callback, login};

/// State shared by the login routes.
#[derive(Clone)]
pub struct LoginState {
    pub session: AuthSession,
    /// Receives one message per completed authorization.
    pub authorized: mpsc::Sender<()>,
}
