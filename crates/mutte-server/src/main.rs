//! MuTTE server entrypoint
//!
//! Loads configuration, connects to the database, and serves the
//! relay API.

mod app;

use clap::Parser;
use mutte_core::{AppConfig, SecretsCache};
use mutte_smtp::LettreTransportFactory;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MUTTE_LOG_LEVEL")]
    log_level: String,

    /// Log format: compact, full
    #[arg(long, default_value = "compact", env = "MUTTE_LOG_FORMAT")]
    log_format: String,
}

fn init_tracing(cli: &Cli) {
    // If RUST_LOG is set, use it directly; otherwise default to the
    // requested level for our crates and keep dependencies quiet
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "mutte_server={level},\
             mutte_core={level},\
             mutte_database={level},\
             mutte_migrations={level},\
             mutte_entities={level},\
             mutte_smtp={level},\
             mutte_webhooks={level},\
             mutte_tenants={level},\
             mutte_email={level},\
             sqlx=warn,\
             sea_orm=warn,\
             tower=warn,\
             hyper=warn,\
             reqwest=warn,\
             rustls=warn",
            level = cli.log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let secrets = SecretsCache::from_env();
    let config = AppConfig::load(&secrets).await?;

    let db = mutte_database::establish_connection(&config.database_url).await?;
    info!("database ready");

    let factory = Arc::new(LettreTransportFactory::new(Duration::from_secs(
        config.smtp_timeout_secs,
    )));
    let state = app::build_state(db, &config, factory)?;
    let router = app::build_router(&state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
