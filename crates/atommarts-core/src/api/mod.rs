//! REST API client module for the marketplace admin backend.
//!
//! This module provides the `ApiClient` for signing in, refreshing access
//! tokens, and reading or moderating payouts, products, categories, orders
//! and dashboard statistics.
//!
//! Data endpoints use JWT bearer authentication with the access token held
//! by the `SessionManager`.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthResponse};
pub use error::ApiError;
