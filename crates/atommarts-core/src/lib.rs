//! Core library for the Atommarts marketplace admin dashboard.
//!
//! This crate holds everything the front-ends share:
//! - `auth`: session lifecycle (credential store, token expiry, refresh, route guards)
//! - `api`: REST client for the marketplace admin endpoints
//! - `models`: API payloads and status helpers
//! - `config`: persisted application settings
//! - `utils`: display formatting

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{
    CredentialStore, GuardDecision, InitOutcome, RouteGuard, Session, SessionEnded,
    SessionManager, SessionView, TokenRefresher,
};
pub use config::Config;
