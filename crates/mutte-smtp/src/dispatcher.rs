//! Delivery loop with transient-failure retries

use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::DispatchError;
use crate::retry::RetryPolicy;
use crate::transport::TransportFactory;
use crate::types::{DeliveryReceipt, OutgoingEmail, SmtpCredentials};

/// Drives delivery of one message through a tenant's SMTP server.
pub struct Dispatcher {
    factory: Arc<dyn TransportFactory>,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(factory: Arc<dyn TransportFactory>, policy: RetryPolicy) -> Self {
        Self { factory, policy }
    }

    /// Attempt delivery, retrying transient failures with backoff.
    ///
    /// Permanent failures return after a single attempt. Transient ones
    /// are retried up to `max_attempts` total attempts; the error from
    /// the final attempt is returned once the budget is spent.
    pub async fn dispatch(
        &self,
        credentials: &SmtpCredentials,
        email: &OutgoingEmail,
    ) -> Result<DeliveryReceipt, DispatchError> {
        let transport = self.factory.build(credentials)?;

        let mut attempt = 1u32;
        loop {
            match transport.deliver(email).await {
                Ok(receipt) => {
                    if attempt > 1 {
                        debug!(attempt, "delivery succeeded after retry");
                    }
                    return Ok(receipt);
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient delivery failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
