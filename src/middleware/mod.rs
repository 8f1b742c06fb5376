//! HTTP middleware components.

/// Issuer token authentication middleware
pub mod auth;
