//! Database connection and query utilities

pub use sea_orm;
mod connection;

pub use connection::{establish_connection, DbConnection};

// Export test utilities for use by other crates in their tests
pub mod test_utils;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_establish_connection_runs_migrations() -> anyhow::Result<()> {
        let db = establish_connection("sqlite::memory:").await?;

        let statement = sea_orm::Statement::from_string(
            db.get_database_backend(),
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'tenants'".to_owned(),
        );
        let row = db.query_one(statement).await?;
        assert!(row.is_some(), "migrations should create the tenants table");

        Ok(())
    }
}
