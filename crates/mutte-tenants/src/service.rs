//! Tenant CRUD and credential handling

use chrono::Utc;
use mutte_core::EncryptionService;
use mutte_entities::tenants;
use mutte_smtp::SmtpCredentials;
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::TenantError;
use crate::types::{CreateTenantRequest, TenantResponse, UpdateTenantRequest};

const API_KEY_PREFIX: &str = "matte_";
const MASKED: &str = "***";

pub struct TenantService {
    db: Arc<DatabaseConnection>,
    encryption: Arc<EncryptionService>,
}

impl TenantService {
    pub fn new(db: Arc<DatabaseConnection>, encryption: Arc<EncryptionService>) -> Self {
        Self { db, encryption }
    }

    fn generate_api_key() -> String {
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
    }

    pub async fn create(
        &self,
        request: &CreateTenantRequest,
    ) -> Result<tenants::Model, TenantError> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &request.name),
            ("smtpHost", &request.smtp_host),
            ("smtpPort", &request.smtp_port),
            ("smtpUser", &request.smtp_user),
            ("smtpPass", &request.smtp_pass),
            ("fromEmail", &request.from_email),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(TenantError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let existing = tenants::Entity::find()
            .filter(tenants::Column::Name.eq(&request.name))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(TenantError::NameTaken(request.name.clone()));
        }

        let now = Utc::now();
        let tenant = tenants::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.clone()),
            api_key: Set(Self::generate_api_key()),
            smtp_host: Set(self.encryption.encrypt(&request.smtp_host)?),
            smtp_port: Set(self.encryption.encrypt(&request.smtp_port)?),
            smtp_user: Set(self.encryption.encrypt(&request.smtp_user)?),
            smtp_pass: Set(self.encryption.encrypt(&request.smtp_pass)?),
            smtp_secure: Set(request.smtp_secure),
            from_email: Set(request.from_email.clone()),
            webhook_url: Set(request.webhook_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(tenant.insert(&*self.db).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<tenants::Model, TenantError> {
        tenants::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or(TenantError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<tenants::Model>, TenantError> {
        Ok(tenants::Entity::find()
            .order_by_asc(tenants::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn find_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<tenants::Model>, TenantError> {
        Ok(tenants::Entity::find()
            .filter(tenants::Column::ApiKey.eq(api_key))
            .one(&*self.db)
            .await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateTenantRequest,
    ) -> Result<tenants::Model, TenantError> {
        let tenant = self.get(id).await?;

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(TenantError::Validation(
                    "Tenant name must not be empty".to_string(),
                ));
            }
            if *name != tenant.name {
                let existing = tenants::Entity::find()
                    .filter(tenants::Column::Name.eq(name))
                    .one(&*self.db)
                    .await?;
                if existing.is_some() {
                    return Err(TenantError::NameTaken(name.clone()));
                }
            }
        }

        let mut active: tenants::ActiveModel = tenant.into();

        if let Some(name) = &request.name {
            active.name = Set(name.clone());
        }
        if let Some(host) = &request.smtp_host {
            active.smtp_host = Set(self.encryption.encrypt(host)?);
        }
        if let Some(port) = &request.smtp_port {
            active.smtp_port = Set(self.encryption.encrypt(port)?);
        }
        if let Some(user) = &request.smtp_user {
            active.smtp_user = Set(self.encryption.encrypt(user)?);
        }
        if let Some(pass) = &request.smtp_pass {
            active.smtp_pass = Set(self.encryption.encrypt(pass)?);
        }
        if let Some(secure) = request.smtp_secure {
            active.smtp_secure = Set(secure);
        }
        if let Some(from_email) = &request.from_email {
            active.from_email = Set(from_email.clone());
        }
        if let Some(webhook_url) = &request.webhook_url {
            // Empty string clears the override
            if webhook_url.is_empty() {
                active.webhook_url = Set(None);
            } else {
                active.webhook_url = Set(Some(webhook_url.clone()));
            }
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), TenantError> {
        let result = tenants::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(TenantError::NotFound);
        }
        Ok(())
    }

    /// Decrypt the stored connection details for dispatch.
    pub fn smtp_credentials(
        &self,
        tenant: &tenants::Model,
    ) -> Result<SmtpCredentials, TenantError> {
        let port_str = self.encryption.decrypt(&tenant.smtp_port)?;
        let port = port_str
            .parse::<u16>()
            .map_err(|_| TenantError::InvalidPort(port_str.clone()))?;

        Ok(SmtpCredentials {
            host: self.encryption.decrypt(&tenant.smtp_host)?,
            port,
            secure: tenant.smtp_secure,
            username: self.encryption.decrypt(&tenant.smtp_user)?,
            password: self.encryption.decrypt(&tenant.smtp_pass)?,
        })
    }

    /// Shape a tenant for the admin API. Host and port are shown in
    /// the clear so the configuration can be reviewed; the username
    /// and password are masked.
    pub fn to_response(&self, tenant: &tenants::Model) -> Result<TenantResponse, TenantError> {
        Ok(TenantResponse {
            id: tenant.id,
            name: tenant.name.clone(),
            api_key: tenant.api_key.clone(),
            smtp_host: self.encryption.decrypt(&tenant.smtp_host)?,
            smtp_port: self.encryption.decrypt(&tenant.smtp_port)?,
            smtp_user: MASKED.to_string(),
            smtp_pass: MASKED.to_string(),
            smtp_secure: tenant.smtp_secure,
            from_email: tenant.from_email.clone(),
            webhook_url: tenant.webhook_url.clone(),
            created_at: tenant.created_at.to_rfc3339(),
            updated_at: tenant.updated_at.to_rfc3339(),
        })
    }
}
