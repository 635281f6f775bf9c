//! Scriptable transport doubles for tests
//!
//! Not gated behind `cfg(test)` so that dependent crates can drive
//! their own delivery tests with them.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::errors::DispatchError;
use crate::transport::{MailTransport, TransportFactory};
use crate::types::{DeliveryReceipt, OutgoingEmail, SmtpCredentials};

/// One scripted delivery result.
#[derive(Debug, Clone, Copy)]
pub enum MockOutcome {
    Deliver,
    TransientFailure,
    PermanentFailure,
    Rejected(u16),
}

impl MockOutcome {
    fn into_result(self) -> Result<DeliveryReceipt, DispatchError> {
        match self {
            MockOutcome::Deliver => Ok(DeliveryReceipt {
                message_id: format!("<{}@mock.invalid>", Uuid::new_v4()),
            }),
            MockOutcome::TransientFailure => Err(DispatchError::Connection(
                "connection reset by peer".to_string(),
            )),
            MockOutcome::PermanentFailure => Err(DispatchError::Rejected {
                code: 550,
                message: "mailbox unavailable".to_string(),
            }),
            MockOutcome::Rejected(code) => Err(DispatchError::Rejected {
                code,
                message: "rejected".to_string(),
            }),
        }
    }
}

/// Transport that replays a script of outcomes, then a fallback.
pub struct MockTransport {
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: MockOutcome,
    attempts: AtomicUsize,
    deliveries: Mutex<Vec<OutgoingEmail>>,
}

impl MockTransport {
    pub fn always_succeeding() -> Arc<Self> {
        Self::with_script(vec![], MockOutcome::Deliver)
    }

    pub fn always_failing(outcome: MockOutcome) -> Arc<Self> {
        Self::with_script(vec![], outcome)
    }

    /// Plays `script` in order, then `fallback` for every later call.
    pub fn with_script(script: Vec<MockOutcome>, fallback: MockOutcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            attempts: AtomicUsize::new(0),
            deliveries: Mutex::new(Vec::new()),
        })
    }

    /// Number of delivery attempts observed so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Every message handed to the transport, in order, including
    /// attempts that were scripted to fail.
    pub fn deliveries(&self) -> Vec<OutgoingEmail> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for MockTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.deliveries.lock().unwrap().push(email.clone());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        outcome.into_result()
    }
}

/// Factory that hands out a shared [`MockTransport`].
pub struct MockTransportFactory {
    transport: Arc<MockTransport>,
    fail_build: bool,
    builds: AtomicUsize,
}

impl MockTransportFactory {
    pub fn new(transport: Arc<MockTransport>) -> Self {
        Self {
            transport,
            fail_build: false,
            builds: AtomicUsize::new(0),
        }
    }

    /// Factory whose `build` always fails, for credential error paths.
    pub fn failing() -> Self {
        Self {
            transport: MockTransport::always_succeeding(),
            fail_build: true,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl TransportFactory for MockTransportFactory {
    fn build(
        &self,
        _credentials: &SmtpCredentials,
    ) -> Result<Arc<dyn MailTransport>, DispatchError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.fail_build {
            return Err(DispatchError::Connection(
                "could not resolve host".to_string(),
            ));
        }
        Ok(Arc::clone(&self.transport) as Arc<dyn MailTransport>)
    }
}
