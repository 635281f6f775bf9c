use thiserror::Error;

/// SMTP status codes that signal a temporary condition worth retrying.
const TRANSIENT_SMTP_CODES: [u16; 4] = [421, 450, 451, 452];

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("invalid attachment content type: {0}")]
    ContentType(String),

    #[error("{0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("delivery rejected ({code}): {message}")]
    Rejected { code: u16, message: String },
}

impl DispatchError {
    /// Whether a retry has a chance of succeeding.
    ///
    /// Malformed input and permanent server responses are final.
    /// Timeouts, connection failures and 4xx transient codes are not.
    pub fn is_transient(&self) -> bool {
        match self {
            DispatchError::Address(_)
            | DispatchError::Message(_)
            | DispatchError::ContentType(_) => false,
            DispatchError::Smtp(e) => {
                if e.is_timeout() || e.is_transient() {
                    true
                } else if e.is_permanent() || e.is_client() || e.is_response() {
                    false
                } else {
                    // Connection-level failures (refused, reset, TLS handshake)
                    true
                }
            }
            DispatchError::Connection(_) => true,
            DispatchError::Rejected { code, .. } => TRANSIENT_SMTP_CODES.contains(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_code_classification() {
        for code in [421, 450, 451, 452] {
            let err = DispatchError::Rejected {
                code,
                message: "try again later".to_string(),
            };
            assert!(err.is_transient(), "code {} should be transient", code);
        }
        for code in [500, 550, 553, 554] {
            let err = DispatchError::Rejected {
                code,
                message: "mailbox unavailable".to_string(),
            };
            assert!(!err.is_transient(), "code {} should be permanent", code);
        }
    }

    #[test]
    fn test_connection_failures_are_transient() {
        let err = DispatchError::Connection("connection refused".to_string());
        assert!(err.is_transient());
    }

    #[test]
    fn test_malformed_input_is_permanent() {
        let err = DispatchError::Address("not-an-address".parse::<lettre::Address>().unwrap_err());
        assert!(!err.is_transient());

        let err = DispatchError::ContentType("definitely not a mime type".to_string());
        assert!(!err.is_transient());
    }
}
