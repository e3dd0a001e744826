use bookstore::config::Config;
use bookstore::database::Sqlite;
use bookstore::http::{AppState, HttpServer, HttpServerConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        environment = ?config.environment(),
        database = config.database_url(),
        "starting bookstore"
    );

    let sqlite = Sqlite::new(config.database_url()).await?;

    let state = AppState::new(sqlite.clone());
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    tracing::info!(addr = %http_server.local_addr()?, "listening");

    let result = http_server.run(shutdown_signal()).await;

    tracing::info!("closing database");
    sqlite.close().await;
    result
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down"),
        Err(err) => {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
