//! Transport construction and message assembly on top of lettre

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment as MessagePart, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParametersBuilder},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::DispatchError;
use crate::types::{DeliveryReceipt, OutgoingEmail, SmtpCredentials};

/// Delivers an assembled message to a single SMTP server.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DispatchError>;
}

/// Builds a transport from tenant credentials.
///
/// Credentials differ per tenant, so a transport cannot be shared
/// across requests the way a single-account mailer could be.
pub trait TransportFactory: Send + Sync {
    fn build(&self, credentials: &SmtpCredentials)
        -> Result<Arc<dyn MailTransport>, DispatchError>;
}

/// Production factory backed by lettre's async SMTP transport.
pub struct LettreTransportFactory {
    timeout: Duration,
}

impl LettreTransportFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl TransportFactory for LettreTransportFactory {
    fn build(
        &self,
        credentials: &SmtpCredentials,
    ) -> Result<Arc<dyn MailTransport>, DispatchError> {
        let auth = Credentials::new(credentials.username.clone(), credentials.password.clone());

        let mailer = if credentials.secure {
            // Implicit TLS from the first byte
            AsyncSmtpTransport::<Tokio1Executor>::relay(&credentials.host)?
                .port(credentials.port)
                .credentials(auth)
                .timeout(Some(self.timeout))
                .build()
        } else {
            // Plain connection, upgraded via STARTTLS when the server offers it
            let tls = TlsParametersBuilder::new(credentials.host.clone()).build()?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&credentials.host)
                .port(credentials.port)
                .tls(Tls::Opportunistic(tls))
                .credentials(auth)
                .timeout(Some(self.timeout))
                .build()
        };

        Ok(Arc::new(LettreTransport { mailer }))
    }
}

struct LettreTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl MailTransport for LettreTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DispatchError> {
        let from: Mailbox = email.from.parse()?;
        let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

        let message = build_message(email, &message_id)?;
        self.mailer.send(message).await?;

        Ok(DeliveryReceipt { message_id })
    }
}

fn build_message(email: &OutgoingEmail, message_id: &str) -> Result<Message, DispatchError> {
    let mut builder = Message::builder()
        .from(email.from.parse::<Mailbox>()?)
        .subject(email.subject.clone())
        .message_id(Some(message_id.to_string()));

    for addr in &email.to {
        builder = builder.to(addr.parse::<Mailbox>()?);
    }
    for addr in &email.cc {
        builder = builder.cc(addr.parse::<Mailbox>()?);
    }
    for addr in &email.bcc {
        builder = builder.bcc(addr.parse::<Mailbox>()?);
    }

    let body = match &email.text_body {
        Some(text) => MultiPart::alternative_plain_html(text.clone(), email.html_body.clone()),
        None => MultiPart::alternative().singlepart(SinglePart::html(email.html_body.clone())),
    };

    let message = if email.attachments.is_empty() {
        builder.multipart(body)?
    } else {
        let mut mixed = MultiPart::mixed().multipart(body);
        for attachment in &email.attachments {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|_| DispatchError::ContentType(attachment.content_type.clone()))?;
            mixed = mixed.singlepart(
                MessagePart::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }
        builder.multipart(mixed)?
    };

    Ok(message)
}
