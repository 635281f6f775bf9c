//! Database connection management

use mutte_migrations::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

pub type DbConnection = DatabaseConnection;

pub async fn establish_connection(database_url: &str) -> anyhow::Result<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(database_url);
    if database_url.starts_with("sqlite") {
        // SQLite in-memory databases exist per connection
        opt.max_connections(1);
    } else {
        opt.max_connections(100).min_connections(5);
    }

    let db = Database::connect(opt)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    // Run migrations
    Migrator::up(&db, None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    Ok(Arc::new(db))
}
