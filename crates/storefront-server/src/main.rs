mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use storefront_api::{AuthHandler, CommentHandler};
use storefront_db::{Store, StoreConfig};

use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_server=debug,storefront_api=debug,storefront_db=info,tower_http=debug".into()),
        )
        .init();

    // Config
    let database_url =
        std::env::var("STOREFRONT_DATABASE_URL").unwrap_or_else(|_| "storefront.db".into());
    let host = std::env::var("STOREFRONT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("STOREFRONT_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let config = StoreConfig::new(database_url);

    // Schema first, then hand the same config to both handlers
    Store::new(config.clone()).migrate()?;

    let state = AppState {
        auth: Arc::new(AuthHandler::new(config.clone())),
        comments: Arc::new(CommentHandler::new(config)),
    };

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
