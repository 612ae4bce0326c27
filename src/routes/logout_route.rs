use std::sync::Arc;

use axum::extract::State;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use hyper::StatusCode;
use tracing::warn;

use crate::utils::app_error::AppError;
use crate::utils::token::SESSION_COOKIE;
use crate::AppState;

pub async fn logout_route(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return Err(AppError::unauthorized()),
    };

    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(&token)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error deleting session : {e}");
            AppError::internal_server_error()
        })?;

    Ok((jar.remove(Cookie::named(SESSION_COOKIE)), StatusCode::OK))
}
