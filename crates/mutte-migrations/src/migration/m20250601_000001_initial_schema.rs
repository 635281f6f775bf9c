use sea_orm_migration::prelude::*;

/// Initial schema: tenants and their email delivery log.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tenants table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("tenants"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("api_key")).string().not_null())
                    // smtp_* columns hold encrypted values, stored as text
                    .col(ColumnDef::new(Alias::new("smtp_host")).string().not_null())
                    .col(ColumnDef::new(Alias::new("smtp_port")).string().not_null())
                    .col(ColumnDef::new(Alias::new("smtp_user")).string().not_null())
                    .col(ColumnDef::new(Alias::new("smtp_pass")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("smtp_secure"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alias::new("from_email")).string().not_null())
                    .col(ColumnDef::new(Alias::new("webhook_url")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenants_name")
                    .table(Alias::new("tenants"))
                    .col(Alias::new("name"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenants_api_key")
                    .table(Alias::new("tenants"))
                    .col(Alias::new("api_key"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create email_logs table with foreign key to tenants
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("email_logs"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("tenant_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("to_address")).string().not_null())
                    .col(ColumnDef::new(Alias::new("subject")).string().not_null())
                    .col(ColumnDef::new(Alias::new("status")).string().not_null())
                    .col(ColumnDef::new(Alias::new("error_message")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("provider_message_id"))
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("sent_at"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_logs_tenant_id")
                            .from(Alias::new("email_logs"), Alias::new("tenant_id"))
                            .to(Alias::new("tenants"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_logs_tenant_id")
                    .table(Alias::new("email_logs"))
                    .col(Alias::new("tenant_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("email_logs")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("tenants")).to_owned())
            .await?;
        Ok(())
    }
}
