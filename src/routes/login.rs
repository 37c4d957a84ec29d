use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::login::render_landing_page;
use crate::routes::{error::RouteError, AppState};

pub const LOGIN_MOUNT: &str = "/login";

/// Start a login session and serve the page that shows its QR code
pub async fn landing(State(state): State<AppState>) -> Result<Html<String>, RouteError> {
    let session_id = state.ctx.login.create_session().await.map_err(|e| {
        warn!("Login session creation failed: {}", e);
        RouteError::LoginUnavailable(e.to_string())
    })?;

    info!(session_id = %session_id, "Serving login page");
    Ok(Html(render_landing_page(&session_id, LOGIN_MOUNT)))
}

/// `/login/{session_id}` names no action
pub async fn missing_action(Path(_session_id): Path<String>) -> RouteError {
    RouteError::UnsupportedAction
}

/// `/login/{session_id}/{action}` with `qrcode` or `status`
pub async fn session_action(
    State(state): State<AppState>,
    Path((session_id, action)): Path<(String, String)>,
) -> Result<Response, RouteError> {
    match action.as_str() {
        "qrcode" => {
            let png = state.ctx.login.qrcode(&session_id).await?;
            Ok((
                [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "no-store")],
                png,
            )
                .into_response())
        }
        "status" => {
            let view = state
                .ctx
                .login
                .status(&session_id)
                .await
                .ok_or(RouteError::SessionMissing)?;
            Ok(([(CACHE_CONTROL, "no-store")], Json(view)).into_response())
        }
        _ => Err(RouteError::UnsupportedAction),
    }
}
