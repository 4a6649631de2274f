use dotenvy::dotenv;
use kiosk_ledger::{
    config::{
        catalog::load_catalog_if_present,
        database::{DatabaseConfig, create_connection, create_tables},
        server::ServerConfig,
    },
    core::seed::seed_from_catalog,
    errors::Result,
    web::{self, AppState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Tracing first, so configuration problems are reported
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. .env is optional; variables may come from the environment
    if dotenv().is_ok() {
        info!("Loaded .env file");
    }

    // 3. Configuration
    let server_config = ServerConfig::from_env()
        .inspect_err(|e| error!("Invalid server configuration: {}", e))?;
    let database_config = DatabaseConfig::from_env()
        .inspect_err(|e| error!("Invalid database configuration: {}", e))?;
    info!(
        max_connections = database_config.max_connections,
        default_grade = server_config.default_grade,
        "Configuration loaded"
    );

    // 4. Database
    let db = create_connection(&database_config)
        .await
        .inspect(|_| info!("Database connection established"))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready"))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed reference data into empty tables
    match load_catalog_if_present(&server_config.catalog_path)? {
        Some(catalog) => {
            seed_from_catalog(&db, &catalog)
                .await
                .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
        }
        None => info!(
            path = %server_config.catalog_path.display(),
            "No catalog file found, skipping seeding"
        ),
    }

    // 6. Serve
    let listener = TcpListener::bind(server_config.bind_address())
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", server_config.bind_address(), e))?;

    web::serve(
        listener,
        AppState {
            db: Arc::new(db),
            default_grade: server_config.default_grade,
        },
    )
    .await
}
