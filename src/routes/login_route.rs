use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::structs::auth::LoginUser;
use crate::structs::user::PublicUser;
use crate::utils::app_error::AppError;
use crate::utils::token::{generate_session_token, SESSION_COOKIE};
use crate::utils::validation::hash_password;
use crate::AppState;

pub const SESSION_LIFETIME: Duration = Duration::days(30);

pub async fn login_route(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(login): Json<LoginUser>,
) -> Result<(CookieJar, Json<PublicUser>), AppError> {
    let email = login.email.trim().to_lowercase();
    let password = hash_password(&login.password);

    // OAuth accounts have a NULL password and never match here.
    let user = sqlx::query_as::<_, PublicUser>(
        "SELECT id, email, name, image, role, is_banned, created_at \
         FROM users WHERE lower(email) = $1 AND password = $2",
    )
    .bind(&email)
    .bind(&password)
    .fetch_optional(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error getting user with email `{email}` from database : {e}");
        AppError::internal_server_error()
    })?;

    let Some(user) = user else {
        warn!("Failed login attempt for `{email}`");
        return Err(AppError::forbidden("Invalid credentials."));
    };
    if user.is_banned {
        return Err(AppError::forbidden("Your account is banned."));
    }

    let token = generate_session_token();
    let expires_at = OffsetDateTime::now_utc() + SESSION_LIFETIME;

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(user.id)
        .bind(expires_at)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error creating session for user {} : {e}", user.id);
            AppError::internal_server_error()
        })?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(SESSION_LIFETIME)
        .finish();

    Ok((jar.add(cookie), Json(user)))
}
