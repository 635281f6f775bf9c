use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::events::WebhookEvent;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-MuTTE-Signature";

/// Posts delivery events to tenant webhook URLs.
///
/// Every failure path ends in a log line, never an error: webhook
/// delivery must not influence the send outcome already recorded.
pub struct WebhookNotifier {
    http_client: reqwest::Client,
    signing_secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(signing_secret: Option<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("MuTTE-Webhook/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            signing_secret,
        }
    }

    fn sign(&self, payload: &str) -> Option<String> {
        let secret = self.signing_secret.as_ref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Deliver one event, swallowing all failures.
    pub async fn notify(&self, url: &str, event: &WebhookEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize webhook payload");
                return;
            }
        };

        let mut request = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json");

        if let Some(signature) = self.sign(&payload) {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        match request.body(payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(
                    url,
                    event = event.event.as_str(),
                    email_log_id = event.email_log_id,
                    "webhook delivered"
                );
            }
            Ok(response) => {
                warn!(
                    url,
                    status = response.status().as_u16(),
                    email_log_id = event.email_log_id,
                    "webhook endpoint returned an error status"
                );
            }
            Err(e) => {
                warn!(url, error = %e, email_log_id = event.email_log_id, "webhook delivery failed");
            }
        }
    }

    /// Deliver one event on a background task.
    pub fn notify_detached(self: &Arc<Self>, url: String, event: WebhookEvent) {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            notifier.notify(&url, &event).await;
        });
    }
}
