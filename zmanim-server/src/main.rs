mod routes;
mod state;

use anyhow::Result;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zmanim_core::config::Settings;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let settings = Settings::load()?;
    let addr = settings.bind_addr();
    let state = AppState::new(settings)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("zmanim-server listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::feed::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
