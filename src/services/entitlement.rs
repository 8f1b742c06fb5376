//! Best-effort entitlement delivery on redemption.
//!
//! When an endpoint is configured, every successful redemption fires a signed
//! `key.redeemed` webhook so an external system can grant whatever the plan
//! entitles (a role, a download, an account flag). Delivery is fire-and-forget:
//! failures are logged and never roll back the redemption.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::key_record::Plan;

type HmacSha256 = Hmac<Sha256>;

/// Payload sent to the entitlement endpoint.
///
/// ```json
/// {
///   "event_type": "key.redeemed",
///   "event_id": "550e8400-...",
///   "created_at": "2025-01-15T10:30:00Z",
///   "data": { "plan": "PREMIUM", "lookup_id": "ab12...", "redeemed_by": "u1" }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct EntitlementPayload {
    pub event_type: &'static str,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub data: EntitlementData,
}

#[derive(Debug, Serialize)]
pub struct EntitlementData {
    pub plan: Plan,
    pub lookup_id: String,
    pub redeemed_by: String,
}

/// Client for the configured entitlement endpoint.
#[derive(Debug, Clone)]
pub struct EntitlementNotifier {
    client: reqwest::Client,
    url: String,
    secret: String,
}

impl EntitlementNotifier {
    /// Build a notifier if `ENTITLEMENT_URL` is configured.
    ///
    /// # Errors
    ///
    /// Fails when the URL is set without a secret, or the URL is not HTTPS
    /// (HTTP is allowed for localhost during development).
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let Some(url) = config.entitlement_url.clone() else {
            return Ok(None);
        };
        let secret = config.entitlement_secret.clone().ok_or_else(|| {
            AppError::InvalidRequest(
                "ENTITLEMENT_SECRET is required when ENTITLEMENT_URL is set".to_string(),
            )
        })?;

        validate_entitlement_url(&url)?;

        // 5 second timeout prevents hanging on slow endpoints
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|err| AppError::InvalidRequest(format!("HTTP client error: {err}")))?;

        Ok(Some(Self {
            client,
            url,
            secret,
        }))
    }

    /// Deliver a `key.redeemed` event. Never fails the caller; the outcome is
    /// only logged.
    pub async fn notify_redemption(&self, plan: Plan, lookup_id: String, redeemed_by: String) {
        let event_id = Uuid::new_v4();
        let payload = EntitlementPayload {
            event_type: "key.redeemed",
            event_id,
            created_at: Utc::now(),
            data: EntitlementData {
                plan,
                lookup_id,
                redeemed_by,
            },
        };

        let payload_json = match serde_json::to_string(&payload) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!("Failed to serialize entitlement payload: {err}");
                return;
            }
        };

        let signature = generate_signature(&self.secret, &payload_json);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-Entitlement-Signature", &signature)
            .header("X-Entitlement-Event-Id", event_id.to_string())
            .body(payload_json)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(%event_id, "entitlement delivered");
            }
            Ok(resp) => {
                tracing::error!(%event_id, status = %resp.status(), "entitlement endpoint rejected event");
            }
            Err(err) => {
                tracing::error!(%event_id, "entitlement delivery failed: {err}");
            }
        }
    }
}

/// HMAC-SHA256 signature over the payload, `sha256=<hex>`.
///
/// Receivers recompute HMAC-SHA256(secret, body) and compare in constant
/// time.
fn generate_signature(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(payload.as_bytes());
    let result = mac.finalize();
    format!("sha256={}", hex::encode(result.into_bytes()))
}

/// Validate the entitlement URL.
///
/// HTTPS required; HTTP only for localhost.
fn validate_entitlement_url(url: &str) -> Result<(), AppError> {
    let parsed = url::Url::parse(url)
        .map_err(|_| AppError::InvalidRequest("Invalid entitlement URL".to_string()))?;

    match parsed.scheme() {
        "https" => Ok(()),
        "http" => {
            if matches!(parsed.host_str(), Some("localhost" | "127.0.0.1" | "0.0.0.0")) {
                Ok(())
            } else {
                Err(AppError::InvalidRequest(
                    "HTTP entitlement URLs are only allowed for localhost".to_string(),
                ))
            }
        }
        _ => Err(AppError::InvalidRequest(
            "Entitlement URL must use HTTP or HTTPS".to_string(),
        )),
    }
}
