use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use hyper::StatusCode;
use tracing::warn;

use crate::structs::auth::SignupUser;
use crate::structs::user::PublicUser;
use crate::utils::app_error::AppError;
use crate::utils::validation::{check_signup_infos, hash_password};
use crate::AppState;

pub async fn signup_route(
    State(app_state): State<Arc<AppState>>,
    Json(signup): Json<SignupUser>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let name = signup.name.trim();
    let email = signup.email.trim().to_lowercase();

    check_signup_infos(name, &email, &signup.password)?;

    let user = sqlx::query_as::<_, PublicUser>(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) \
         RETURNING id, email, name, image, role, is_banned, created_at",
    )
    .bind(name)
    .bind(&email)
    .bind(hash_password(&signup.password))
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| match e {
        // The unique index on lower(email) is the duplicate check.
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            warn!("Email address `{email}` already used");
            AppError::conflict("An account with this email already exists.")
        }
        e => {
            warn!("Error creating account : {e}");
            AppError::internal_server_error()
        }
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}
