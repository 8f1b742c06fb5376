//! Business logic services.
//!
//! Services contain the key engine separated from HTTP handlers: key-string
//! generation, record preparation, the issuance pipeline, verification,
//! redemption, and best-effort entitlement delivery.

pub mod entitlement;
pub mod issuance;
pub mod key_factory;
pub mod record_preparer;
pub mod redemption;
pub mod verification;
