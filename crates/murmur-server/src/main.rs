use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use murmur_api::auth::AppStateInner;
use murmur_api::mail::{Mailer, ResendClient};
use murmur_api::routes::{api_router, pages_router};
use murmur_api::suggest::SuggestClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur=debug,tower_http=debug".into()),
        )
        .init();

    // Config. The store location and session secret have no usable
    // defaults, so their absence is fatal before anything binds.
    let db_path = std::env::var("MURMUR_DB_PATH").context("MURMUR_DB_PATH is not set")?;
    let jwt_secret = std::env::var("MURMUR_JWT_SECRET").context("MURMUR_JWT_SECRET is not set")?;
    let host = std::env::var("MURMUR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MURMUR_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let mailer = match std::env::var("MURMUR_RESEND_API_KEY") {
        Ok(key) => Mailer::Resend(ResendClient::new(key)),
        Err(_) => {
            warn!("MURMUR_RESEND_API_KEY not set, verification codes will only be logged");
            Mailer::Log
        }
    };

    let suggest = match (
        std::env::var("MURMUR_SUGGEST_URL"),
        std::env::var("MURMUR_SUGGEST_API_KEY"),
    ) {
        (Ok(url), Ok(key)) => Some(SuggestClient::new(url, key)),
        _ => None,
    };

    // Init database
    let db = murmur_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        jwt_secret,
        mailer,
        suggest,
    });

    let app = api_router(state.clone())
        .merge(pages_router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Murmur server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
