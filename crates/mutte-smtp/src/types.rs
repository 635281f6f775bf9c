use serde::{Deserialize, Serialize};

/// Decrypted connection details for a tenant's SMTP server
#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub host: String,
    pub port: u16,
    /// Implicit TLS on connect; otherwise STARTTLS is attempted
    pub secure: bool,
    pub username: String,
    pub password: String,
}

/// File attachment carried alongside the message body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// A fully resolved message ready for delivery
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Returned on successful delivery
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub message_id: String,
}
