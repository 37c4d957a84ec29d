use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::domain::Feed;
use crate::render::{render_rss, RSS_CONTENT_TYPE};
use crate::routes::{error::RouteError, AppState};

fn rss(feed: &Feed) -> Response {
    ([(CONTENT_TYPE, RSS_CONTENT_TYPE)], render_rss(feed)).into_response()
}

pub async fn user_notes(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, RouteError> {
    let feed = state.ctx.user_notes(&user_id).await?;
    Ok(rss(&feed))
}

pub async fn user_collect(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, RouteError> {
    let feed = state.ctx.user_collect(&user_id).await?;
    Ok(rss(&feed))
}

pub async fn board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Response, RouteError> {
    let feed = state.ctx.board(&board_id).await?;
    Ok(rss(&feed))
}

pub async fn health() -> &'static str {
    "ok"
}
