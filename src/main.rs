//! Library Manager - book catalog server and admin console

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_manager::{
    admin,
    api,
    capability::BearerCapability,
    config::{AppConfig, DatabaseConfig, LoggingConfig},
    repository::PgBookStore,
    services::Services,
    AppState,
};

/// Book catalog REST server with a terminal admin console
#[derive(Parser, Debug)]
#[command(name = "library-manager")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Insert books from a JSON array file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Open the terminal admin console
    Admin {
        /// REST base URL, e.g. http://localhost:8080/library/v1
        #[arg(long)]
        url: Option<String>,

        /// Bearer token carrying the edit capability
        #[arg(long)]
        token: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        // No tracing subscriber here, the console owns the terminal
        Command::Admin { url, token } => {
            if let Some(url) = url {
                config.admin.base_url = url;
            }
            if token.is_some() {
                config.admin.token = token;
            }
            admin::run(&config.admin)
        }
        Command::Serve => {
            init_tracing(&config.logging);
            runtime()?.block_on(serve(config))
        }
        Command::Migrate => {
            init_tracing(&config.logging);
            runtime()?.block_on(migrate(config))
        }
        Command::Import { file } => {
            init_tracing(&config.logging);
            runtime()?.block_on(import(config, file))
        }
    }
}

/// Runtime for the server-side commands
fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("library_manager={},tower_http=debug", logging.level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect(database: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .connect(&database.url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Connected to database");
    Ok(pool)
}

async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    let pool = connect(&config.database).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("Database migrations completed");
    Ok(())
}

async fn import(config: AppConfig, file: PathBuf) -> anyhow::Result<()> {
    let pool = connect(&config.database).await?;
    let services = Services::new(Arc::new(PgBookStore::new(pool)));
    let summary = services.import.import_file(&file).await?;

    println!("Imported {} of {} books", summary.imported, summary.total);
    for failure in &summary.skipped {
        println!("  skipped entry {}: {}", failure.index, failure.reason);
    }
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Library Manager v{}", env!("CARGO_PKG_VERSION"));

    let pool = connect(&config.database).await?;

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("invalid host address {}", config.server.host))?,
        config.server.port,
    );

    let store = Arc::new(PgBookStore::new(pool));
    let capability = Arc::new(BearerCapability::new(&config.auth));
    let state = AppState::new(config, store, capability);
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
