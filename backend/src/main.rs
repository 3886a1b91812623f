//! JSON API server for the vidblog content site.

mod admin;
mod client_ip;
mod handlers;
mod request_context;
mod routes;
mod state;
mod youtube;

use std::env;
use std::net::SocketAddr;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

    tracing::info!("Starting vidblog backend server");
    tracing::info!("Data directory: {}", data_dir);

    let app_state = state::AppState::new(&data_dir)?;
    tracing::info!(
        "Loaded {} videos, {} blogs",
        app_state.content.count_videos()?,
        app_state.content.count_blogs()?
    );

    let app = routes::create_router(app_state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
    let addr = format!("{}:{}", bind_addr, port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Connect info feeds the voter-identity fallback when no proxy
    // header is present.
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
