//! Test utilities for database integration tests
//!
//! Provides an in-memory SQLite database per test. SQLite keeps the
//! in-memory database alive only as long as its connection, so the pool
//! is pinned to a single connection.

use crate::DbConnection;
use mutte_migrations::Migrator;
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Test database backed by an in-memory SQLite instance
pub struct TestDatabase {
    pub db: Arc<DbConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database without any schema
    pub async fn new() -> anyhow::Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        // A second pool connection would see an empty database
        opt.max_connections(1).sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to test database: {}", e))?;

        Ok(TestDatabase { db: Arc::new(db) })
    }

    /// Create a fresh in-memory database with all migrations applied
    pub async fn with_migrations() -> anyhow::Result<Self> {
        let test_db = Self::new().await?;

        Migrator::up(&*test_db.db, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

        Ok(test_db)
    }

    /// Execute raw SQL for test setup
    pub async fn execute_sql(&self, sql: &str) -> anyhow::Result<ExecResult> {
        let statement = Statement::from_string(DatabaseBackend::Sqlite, sql.to_owned());
        let result = self
            .db
            .execute(statement)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(result)
    }

    /// Query raw SQL and return results
    pub async fn query_sql(&self, sql: &str) -> anyhow::Result<Vec<QueryResult>> {
        let statement = Statement::from_string(DatabaseBackend::Sqlite, sql.to_owned());
        let result = self
            .db
            .query_all(statement)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(result)
    }

    /// Get the database connection
    pub fn connection(&self) -> &DbConnection {
        &self.db
    }

    /// Get the database connection as Arc
    pub fn connection_arc(&self) -> Arc<DbConnection> {
        Arc::clone(&self.db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_setup() -> anyhow::Result<()> {
        let test_db = TestDatabase::new().await?;

        let result = test_db.query_sql("SELECT 1 as test_value").await?;
        assert_eq!(result.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_with_migrations() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;

        let result = test_db
            .query_sql("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .await?;

        let tables: Vec<String> = result
            .iter()
            .filter_map(|row| row.try_get::<String>("", "name").ok())
            .collect();

        assert!(tables.contains(&"tenants".to_string()));
        assert!(tables.contains(&"email_logs".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_databases_are_isolated() -> anyhow::Result<()> {
        let first = TestDatabase::with_migrations().await?;
        let second = TestDatabase::new().await?;

        first
            .execute_sql(
                "INSERT INTO tenants (id, name, api_key, smtp_host, smtp_port, smtp_user, \
                 smtp_pass, smtp_secure, from_email, created_at, updated_at) VALUES \
                 ('00000000-0000-0000-0000-000000000001', 'acme', 'matte_x', 'h', 'p', 'u', \
                 's', 0, 'a@b.c', '2025-06-01 00:00:00', '2025-06-01 00:00:00')",
            )
            .await?;

        let result = second
            .query_sql("SELECT name FROM sqlite_master WHERE name = 'tenants'")
            .await?;
        assert!(result.is_empty(), "schema must not leak across instances");

        Ok(())
    }
}
