//! Tenants entity
//!
//! The four `smtp_*` credential columns are stored AES-256-GCM encrypted
//! (base64 of nonce || ciphertext) and decrypted only at send time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub api_key: String,
    pub smtp_host: String,
    pub smtp_port: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_secure: bool,
    pub from_email: String,
    pub webhook_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::email_logs::Entity")]
    EmailLogs,
}

impl Related<super::email_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmailLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
