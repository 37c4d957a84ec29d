//! HTTP surface.
//!
//! ```text
//! GET /login                        landing page, starts a session
//! GET /login/{session_id}/qrcode    PNG of the session's QR code
//! GET /login/{session_id}/status    JSON status view
//! GET /login/{session_id}           404 unsupported_action
//! GET /user/{user_id}/notes         RSS
//! GET /user/{user_id}/collect       RSS, needs a cookie
//! GET /board/{board_id}             RSS
//! GET /health
//! ```

pub mod error;
mod feeds;
mod login;

pub use error::RouteError;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::{AppContext, Result};

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
}

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(feeds::health))
        .route(login::LOGIN_MOUNT, get(login::landing))
        .route("/login/{session_id}", get(login::missing_action))
        .route("/login/{session_id}/{action}", get(login::session_action))
        .route("/user/{user_id}/notes", get(feeds::user_notes))
        .route("/user/{user_id}/collect", get(feeds::user_collect))
        .route("/board/{board_id}", get(feeds::board))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { ctx })
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve until Ctrl-C, then stop the login worker
pub async fn serve(ctx: Arc<AppContext>, listener: TcpListener) -> Result<()> {
    axum::serve(listener, router(ctx.clone()))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    ctx.shutdown().await;
    Ok(())
}
