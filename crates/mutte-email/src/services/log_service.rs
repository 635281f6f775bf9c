//! Email log persistence
//!
//! The `sending` row is committed before dispatch so that a crash
//! mid-delivery leaves an audit trail. The terminal update is a second
//! independent write.

use chrono::Utc;
use mutte_entities::{email_logs, EmailStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ListEmailsOptions {
    pub status: Option<EmailStatus>,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug)]
pub struct EmailLogPage {
    pub items: Vec<email_logs::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

pub struct EmailLogService {
    db: Arc<DatabaseConnection>,
}

impl EmailLogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert the `sending` row. Committed immediately so the attempt
    /// is visible even if the process dies during dispatch.
    pub async fn begin_sending(
        &self,
        tenant_id: Uuid,
        to: &[String],
        subject: &str,
    ) -> Result<email_logs::Model, sea_orm::DbErr> {
        let log = email_logs::ActiveModel {
            tenant_id: Set(tenant_id),
            to_address: Set(to.join(", ")),
            subject: Set(subject.to_string()),
            status: Set(EmailStatus::Sending.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        log.insert(&*self.db).await
    }

    /// Record a successful delivery. Retried once: the message is
    /// already out, so giving up on the first hiccup would leave the
    /// row stuck in `sending`.
    pub async fn mark_sent(
        &self,
        id: i32,
        provider_message_id: &str,
    ) -> Result<email_logs::Model, sea_orm::DbErr> {
        match self.apply_sent(id, provider_message_id).await {
            Ok(model) => Ok(model),
            Err(e) => {
                warn!(id, error = %e, "retrying sent-status update");
                self.apply_sent(id, provider_message_id).await
            }
        }
    }

    async fn apply_sent(
        &self,
        id: i32,
        provider_message_id: &str,
    ) -> Result<email_logs::Model, sea_orm::DbErr> {
        let update = email_logs::ActiveModel {
            id: Set(id),
            status: Set(EmailStatus::Sent.as_str().to_string()),
            provider_message_id: Set(Some(provider_message_id.to_string())),
            sent_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        update.update(&*self.db).await
    }

    /// Record a failed delivery. Also retried once.
    pub async fn mark_failed(
        &self,
        id: i32,
        error_message: &str,
    ) -> Result<email_logs::Model, sea_orm::DbErr> {
        match self.apply_failed(id, error_message).await {
            Ok(model) => Ok(model),
            Err(e) => {
                warn!(id, error = %e, "retrying failed-status update");
                self.apply_failed(id, error_message).await
            }
        }
    }

    async fn apply_failed(
        &self,
        id: i32,
        error_message: &str,
    ) -> Result<email_logs::Model, sea_orm::DbErr> {
        let update = email_logs::ActiveModel {
            id: Set(id),
            status: Set(EmailStatus::Failed.as_str().to_string()),
            error_message: Set(Some(error_message.to_string())),
            ..Default::default()
        };
        update.update(&*self.db).await
    }

    /// Fetch one log entry, scoped to its owning tenant.
    pub async fn get_for_tenant(
        &self,
        tenant_id: Uuid,
        id: i32,
    ) -> Result<Option<email_logs::Model>, sea_orm::DbErr> {
        email_logs::Entity::find_by_id(id)
            .filter(email_logs::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await
    }

    /// List a tenant's log entries, newest first.
    pub async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        options: &ListEmailsOptions,
    ) -> Result<EmailLogPage, sea_orm::DbErr> {
        let page = options.page.max(1);
        let per_page = options.per_page.clamp(1, 100);

        let mut query = email_logs::Entity::find()
            .filter(email_logs::Column::TenantId.eq(tenant_id))
            .order_by_desc(email_logs::Column::CreatedAt)
            .order_by_desc(email_logs::Column::Id);

        if let Some(status) = options.status {
            query = query.filter(email_logs::Column::Status.eq(status.as_str()));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok(EmailLogPage {
            items,
            total,
            page,
            per_page,
        })
    }
}
