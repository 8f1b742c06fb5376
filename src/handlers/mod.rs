//! HTTP request handlers (route handlers).
//!
//! Each handler validates its input before touching the store, delegates to
//! the services layer, and maps business outcomes into 200 responses.

/// Service health endpoint
pub mod health;
/// Key generate/verify/redeem/revoke endpoints
pub mod keys;
