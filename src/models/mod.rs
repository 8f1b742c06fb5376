//! Data models representing database entities and API types.

/// Key record entity, plan and status enums
pub mod key_record;
/// Request/response bodies for the key endpoints
pub mod requests;
