use std::sync::Arc;

use tracing::{info, warn};

use crate::app::{AppContext, Result};
use crate::render::render_rss;
use crate::routes;

pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let listener = routes::bind(&ctx.config.server.addr()).await?;
    routes::serve(ctx, listener).await
}

/// Serve and open the landing page in the desktop browser
pub async fn login(ctx: Arc<AppContext>) -> Result<()> {
    let listener = routes::bind(&ctx.config.server.addr()).await?;
    let url = format!("http://{}/login", listener.local_addr()?);

    info!("Opening {}", url);
    if let Err(e) = open::that(&url) {
        warn!("Could not open a browser: {}. Visit {} manually.", e, url);
    }

    routes::serve(ctx, listener).await
}

pub async fn user(ctx: &AppContext, user_id: &str, collect: bool) -> Result<()> {
    let feed = if collect {
        ctx.user_collect(user_id).await?
    } else {
        ctx.user_notes(user_id).await?
    };
    println!("{}", render_rss(&feed));
    Ok(())
}

pub async fn board(ctx: &AppContext, board_id: &str) -> Result<()> {
    let feed = ctx.board(board_id).await?;
    println!("{}", render_rss(&feed));
    Ok(())
}
