//! Send orchestration
//!
//! Every send leaves exactly one log row behind. The row is committed
//! as `sending` before any SMTP traffic, flipped to `sent` or `failed`
//! afterwards, and the webhook fires only once a terminal state is
//! known.

use mutte_core::template;
use mutte_entities::tenants;
use mutte_smtp::{Attachment, Dispatcher, OutgoingEmail};
use mutte_tenants::TenantService;
use mutte_webhooks::{WebhookEvent, WebhookNotifier};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::errors::SendError;
use crate::services::log_service::EmailLogService;

#[derive(Debug, Clone)]
pub struct SendRequest {
    /// Sender override; the tenant's `from_email` when absent.
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub attachments: Vec<Attachment>,
    pub variables: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub email_log_id: i32,
    pub message_id: String,
}

pub struct EmailService {
    logs: EmailLogService,
    tenants: Arc<TenantService>,
    dispatcher: Dispatcher,
    notifier: Arc<WebhookNotifier>,
    default_webhook_url: Option<String>,
}

impl EmailService {
    pub fn new(
        logs: EmailLogService,
        tenants: Arc<TenantService>,
        dispatcher: Dispatcher,
        notifier: Arc<WebhookNotifier>,
        default_webhook_url: Option<String>,
    ) -> Self {
        Self {
            logs,
            tenants,
            dispatcher,
            notifier,
            default_webhook_url,
        }
    }

    pub fn logs(&self) -> &EmailLogService {
        &self.logs
    }

    /// Relay one message through the tenant's SMTP server.
    pub async fn send(
        &self,
        tenant: &tenants::Model,
        request: SendRequest,
    ) -> Result<SendOutcome, SendError> {
        if request.to.is_empty() {
            return Err(SendError::Validation(
                "Missing required fields: to, subject, htmlBody".to_string(),
            ));
        }

        let log = self
            .logs
            .begin_sending(tenant.id, &request.to, &request.subject)
            .await?;

        match self.deliver(tenant, &request).await {
            Ok(message_id) => {
                let updated = self.logs.mark_sent(log.id, &message_id).await;
                self.notify(
                    tenant,
                    WebhookEvent::sent(
                        tenant.id,
                        log.id,
                        request.to.clone(),
                        request.subject.clone(),
                    ),
                );
                info!(
                    tenant_id = %tenant.id,
                    email_log_id = log.id,
                    message_id = %message_id,
                    "email sent"
                );

                // The message is out; a lost status update is a server
                // fault even though delivery succeeded.
                updated.map_err(|e| SendError::LogPersistence(e.to_string()))?;

                Ok(SendOutcome {
                    email_log_id: log.id,
                    message_id,
                })
            }
            Err(e) => {
                let reason = e.to_string();
                if let Err(log_err) = self.logs.mark_failed(log.id, &reason).await {
                    error!(
                        email_log_id = log.id,
                        error = %log_err,
                        "failed to record delivery failure"
                    );
                }
                self.notify(
                    tenant,
                    WebhookEvent::failed(
                        tenant.id,
                        log.id,
                        request.to.clone(),
                        request.subject.clone(),
                        reason.clone(),
                    ),
                );
                error!(
                    tenant_id = %tenant.id,
                    email_log_id = log.id,
                    error = %reason,
                    "email delivery failed"
                );
                Err(e)
            }
        }
    }

    async fn deliver(
        &self,
        tenant: &tenants::Model,
        request: &SendRequest,
    ) -> Result<String, SendError> {
        let credentials = self.tenants.smtp_credentials(tenant)?;

        let variables = request.variables.as_ref();
        // Placeholders apply to the bodies only; the subject is relayed
        // verbatim so the log row, webhook and message all agree.
        let email = OutgoingEmail {
            from: request
                .from
                .clone()
                .unwrap_or_else(|| tenant.from_email.clone()),
            to: request.to.clone(),
            cc: request.cc.clone(),
            bcc: request.bcc.clone(),
            subject: request.subject.clone(),
            html_body: template::render(&request.html_body, variables),
            text_body: request
                .text_body
                .as_ref()
                .map(|text| template::render(text, variables)),
            attachments: request.attachments.clone(),
        };

        let receipt = self.dispatcher.dispatch(&credentials, &email).await?;
        Ok(receipt.message_id)
    }

    fn notify(&self, tenant: &tenants::Model, event: WebhookEvent) {
        let url = tenant
            .webhook_url
            .clone()
            .or_else(|| self.default_webhook_url.clone());
        if let Some(url) = url {
            self.notifier.notify_detached(url, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutte_core::async_trait::async_trait;
    use mutte_core::{ApiError, EncryptionService};
    use mutte_database::test_utils::TestDatabase;
    use mutte_smtp::{
        DeliveryReceipt, DispatchError, MailTransport, RetryPolicy, SmtpCredentials,
        TransportFactory,
    };
    use mutte_tenants::types::CreateTenantRequest;
    use sea_orm::{ConnectionTrait, DatabaseConnection};

    /// Deletes the log rows while the message is in flight, leaving the
    /// terminal status update nothing to update.
    struct RowEatingTransport {
        db: Arc<DatabaseConnection>,
        succeed: bool,
    }

    #[async_trait]
    impl MailTransport for RowEatingTransport {
        async fn deliver(&self, _email: &OutgoingEmail) -> Result<DeliveryReceipt, DispatchError> {
            self.db
                .execute_unprepared("DELETE FROM email_logs")
                .await
                .unwrap();
            if self.succeed {
                Ok(DeliveryReceipt {
                    message_id: "<mid@mock.invalid>".to_string(),
                })
            } else {
                Err(DispatchError::Rejected {
                    code: 550,
                    message: "mailbox unavailable".to_string(),
                })
            }
        }
    }

    struct FixedFactory(Arc<dyn MailTransport>);

    impl TransportFactory for FixedFactory {
        fn build(
            &self,
            _credentials: &SmtpCredentials,
        ) -> Result<Arc<dyn MailTransport>, DispatchError> {
            Ok(Arc::clone(&self.0))
        }
    }

    async fn setup(succeed: bool) -> anyhow::Result<(TestDatabase, EmailService, tenants::Model)> {
        let db = TestDatabase::with_migrations().await?;
        let encryption = Arc::new(
            EncryptionService::new(&EncryptionService::generate_key()).unwrap(),
        );
        let tenants = Arc::new(TenantService::new(db.connection_arc(), encryption));

        let created = tenants
            .create(&CreateTenantRequest {
                name: "acme".to_string(),
                smtp_host: "smtp.example.com".to_string(),
                smtp_port: "587".to_string(),
                smtp_user: "mailer".to_string(),
                smtp_pass: "hunter2".to_string(),
                smtp_secure: false,
                from_email: "noreply@example.com".to_string(),
                webhook_url: None,
            })
            .await?;
        let tenant = tenants.find_by_api_key(&created.api_key).await?.unwrap();

        let transport = Arc::new(RowEatingTransport {
            db: db.connection_arc(),
            succeed,
        });
        let service = EmailService::new(
            EmailLogService::new(db.connection_arc()),
            tenants,
            Dispatcher::new(Arc::new(FixedFactory(transport)), RetryPolicy::new(1, 1)),
            Arc::new(WebhookNotifier::new(None)),
            None,
        );

        Ok((db, service, tenant))
    }

    fn request() -> SendRequest {
        SendRequest {
            from: None,
            to: vec!["rcpt@example.org".to_string()],
            cc: vec![],
            bcc: vec![],
            subject: "Hello".to_string(),
            html_body: "<p>Hi</p>".to_string(),
            text_body: None,
            attachments: vec![],
            variables: None,
        }
    }

    #[tokio::test]
    async fn test_lost_status_update_after_delivery_is_a_server_fault() -> anyhow::Result<()> {
        let (_db, service, tenant) = setup(true).await?;

        let err = service.send(&tenant, request()).await.unwrap_err();
        assert!(matches!(err, SendError::LogPersistence(_)));
        assert!(matches!(
            ApiError::from(err),
            ApiError::Internal(msg) if msg == "Internal server error"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_error_not_masked_by_failed_status_update() -> anyhow::Result<()> {
        let (_db, service, tenant) = setup(false).await?;

        let err = service.send(&tenant, request()).await.unwrap_err();
        match err {
            SendError::Dispatch(DispatchError::Rejected { code, .. }) => assert_eq!(code, 550),
            other => panic!("unexpected error: {other}"),
        }

        Ok(())
    }
}
