//! Authentication module for the admin session lifecycle.
//!
//! This module provides:
//! - `token`: fail-closed expiry checks on JWT `exp` claims
//! - `CredentialStore`: persistence of the four session keys (file, keychain, memory)
//! - `TokenRefresher`: one-shot exchange of a refresh token for a new access token
//! - `SessionManager`: the single writer of session state
//! - `RouteGuard`: redirect decisions derived from the session view

pub mod guard;
pub mod refresh;
pub mod session;
pub mod store;
pub mod token;

pub use guard::{GuardDecision, RouteGuard, DEFAULT_ROUTE, SIGN_IN_ROUTE};
pub use refresh::TokenRefresher;
pub use session::{EndReason, InitOutcome, Session, SessionEnded, SessionManager, SessionView};
pub use store::{CredentialStore, FileStore, KeyringStore, MemoryStore, StoreError};
